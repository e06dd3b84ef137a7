use lopdf::content::{Content, Operation};
use lopdf::{Object, StringFormat};
use tracing::debug;

use crate::differences::DifferenceMap;
use crate::error::RemapError;
use crate::registry::FontRegistry;
use crate::types::Number;
use crate::utils::*;

const SPACE: u8 = 0x20;

/// An element of a `TJ` array.
#[derive(Debug, Clone)]
pub enum TextElement {
    Text(Vec<u8>, StringFormat),
    Adjust(Number),
}

impl TextElement {
    fn from_obj(o: &Object) -> Result<TextElement, RemapError> {
        match o {
            Object::String(s, format) => Ok(TextElement::Text(s.clone(), format.clone())),
            &Object::Integer(i) => Ok(TextElement::Adjust(Number::Integer(i))),
            &Object::Real(r) => Ok(TextElement::Adjust(Number::Real(r))),
            _ => Err(unsupported("TJ", o)),
        }
    }
}

fn object_kind(o: &Object) -> &'static str {
    match o {
        Object::Null => "null",
        Object::Boolean(_) => "boolean",
        Object::Integer(_) => "integer",
        Object::Real(_) => "real",
        Object::Name(_) => "name",
        Object::String(..) => "string",
        Object::Array(_) => "array",
        Object::Dictionary(_) => "dictionary",
        Object::Stream(_) => "stream",
        Object::Reference(_) => "reference",
    }
}

fn unsupported(operator: &str, o: &Object) -> RemapError {
    RemapError::UnsupportedOperand {
        operator: operator.to_owned(),
        kind: object_kind(o),
    }
}

/// Splits after every space byte, so each segment but the last ends with the
/// space it was split at. A trailing space leaves an empty final segment.
fn split_after_spaces(s: &[u8]) -> Vec<&[u8]> {
    let mut parts: Vec<&[u8]> = s.split_inclusive(|&b| b == SPACE).collect();
    if s.last() == Some(&SPACE) {
        parts.push(&[]);
    }
    parts
}

#[derive(Debug, Clone, Default)]
pub(crate) struct TextState {
    pub(crate) font: Option<Vec<u8>>,
    pub(crate) word_spacing: Number,
}

/// Rewrites the text showing operators of one content stream so their strings
/// use the codes of the registry's difference maps.
#[derive(Debug)]
pub(crate) struct Processor<'a> {
    registry: &'a FontRegistry,
    ts: TextState,
}

impl<'a> Processor<'a> {
    pub(crate) fn new(registry: &'a FontRegistry) -> Processor<'a> {
        Processor {
            registry,
            ts: TextState::default(),
        }
    }

    fn active_map(&self) -> Option<&'a DifferenceMap> {
        let registry = self.registry;
        self.ts.font.as_ref().and_then(|font| registry.get(font))
    }

    fn reencode(&self, s: &[u8]) -> Vec<u8> {
        match self.active_map() {
            Some(map) => map.reencode(s),
            None => s.to_vec(),
        }
    }

    pub(crate) fn process_operations(
        &mut self,
        operations: Vec<Operation>,
    ) -> Result<Vec<Operation>, RemapError> {
        let mut output = Vec::with_capacity(operations.len());
        for mut operation in operations {
            match operation.operator.as_str() {
                "Tw" => {
                    // Dropped: after reencoding the space glyph may no longer
                    // be code 32, so spacing is carried by TJ adjustments.
                    self.ts.word_spacing = operation
                        .operands
                        .first()
                        .and_then(as_number)
                        .ok_or_else(|| malformed(&operation))?;
                    debug!("word spacing {}", self.ts.word_spacing);
                    continue;
                }
                "Tf" => {
                    let name = operation
                        .operands
                        .first()
                        .and_then(|o| o.as_name().ok())
                        .ok_or_else(|| malformed(&operation))?;
                    debug!("font {}", name_to_string(name));
                    self.ts.font = Some(name.to_vec());
                }
                "Tj" => {
                    for operand in operation.operands.iter_mut() {
                        if let Object::String(s, _) = operand {
                            *s = self.reencode(s);
                        }
                    }
                }
                "TJ" => {
                    operation.operands = operation
                        .operands
                        .iter()
                        .map(|operand| self.show_positioned(operand))
                        .collect::<Result<_, _>>()?;
                }
                _ => {}
            }
            output.push(operation);
        }
        Ok(output)
    }

    fn show_positioned(&self, operand: &Object) -> Result<Object, RemapError> {
        let Object::Array(array) = operand else {
            return Err(unsupported("TJ", operand));
        };
        let mut elements = Vec::with_capacity(array.len());
        for e in array {
            match TextElement::from_obj(e)? {
                TextElement::Text(s, format) => self.push_text(&mut elements, &s, format),
                TextElement::Adjust(n) => elements.push(n.into()),
            }
        }
        Ok(Object::Array(elements))
    }

    fn push_text(&self, elements: &mut Vec<Object>, s: &[u8], format: StringFormat) {
        let parts = if self.ts.word_spacing.is_zero() {
            vec![s]
        } else {
            split_after_spaces(s)
        };
        if parts.len() <= 1 {
            elements.push(Object::String(self.reencode(s), format));
            return;
        }

        let spacing: Object = self.ts.word_spacing.scale(-1000).into();
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                elements.push(spacing.clone());
            }
            elements.push(Object::String(self.reencode(part), format.clone()));
        }
    }
}

fn malformed(operation: &Operation) -> RemapError {
    RemapError::MalformedOperator(format!("{} {:?}", operation.operator, operation.operands))
}

/// Decodes a content stream, rewrites it against `registry` and encodes it
/// again.
pub(crate) fn reencode_content(
    content: &[u8],
    registry: &FontRegistry,
) -> Result<Vec<u8>, RemapError> {
    let content = Content::decode(content)?;
    let operations = Processor::new(registry).process_operations(content.operations)?;
    Ok(Content { operations }.encode()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(operator: &str, operands: Vec<Object>) -> Operation {
        Operation::new(operator, operands)
    }

    fn string(s: &[u8]) -> Object {
        Object::String(s.to_vec(), StringFormat::Literal)
    }

    fn font(key: &str) -> Operation {
        op("Tf", vec![Object::Name(key.as_bytes().to_vec()), Object::Integer(12)])
    }

    fn registry() -> FontRegistry {
        let mut registry = FontRegistry::new();
        registry.insert("F1", [(100, 0x20), (101, 0x41)].into_iter().collect());
        registry
    }

    fn strings(o: &Object) -> Vec<Vec<u8>> {
        o.as_array()
            .unwrap()
            .iter()
            .filter_map(|e| e.as_str().ok().map(|s| s.to_vec()))
            .collect()
    }

    #[test]
    fn show_string_uses_active_font_map() {
        let registry = registry();
        let ops = vec![
            op("Tj", vec![string(&[100, 101, 102])]),
            font("F1"),
            op("Tj", vec![string(&[100, 101, 102])]),
            font("F2"),
            op("Tj", vec![string(&[100])]),
        ];
        let out = Processor::new(&registry).process_operations(ops).unwrap();

        assert_eq!(out.len(), 5);
        assert_eq!(out[0].operands[0].as_str().unwrap(), &[100, 101, 102]);
        assert_eq!(out[1].operator, "Tf");
        assert_eq!(out[2].operands[0].as_str().unwrap(), &[0x20, 0x41, 102]);
        assert_eq!(out[4].operands[0].as_str().unwrap(), &[100]);
    }

    #[test]
    fn word_spacing_is_dropped_and_split_into_adjustments() {
        let registry = FontRegistry::new();
        let ops = vec![
            op("Tw", vec![Object::Real(0.2)]),
            op("TJ", vec![Object::Array(vec![string(b"A B")])]),
        ];
        let out = Processor::new(&registry).process_operations(ops).unwrap();

        assert_eq!(out.len(), 1);
        let array = out[0].operands[0].as_array().unwrap();
        assert_eq!(array.len(), 3);
        assert_eq!(array[0].as_str().unwrap(), b"A ");
        assert_eq!(array[1].as_i64().unwrap(), -200);
        assert_eq!(array[2].as_str().unwrap(), b"B");
    }

    #[test]
    fn zero_word_spacing_keeps_strings_whole() {
        let registry = FontRegistry::new();
        let ops = vec![
            op("Tw", vec![Object::Integer(0)]),
            op("TJ", vec![Object::Array(vec![string(b"A B"), Object::Integer(-50)])]),
        ];
        let out = Processor::new(&registry).process_operations(ops).unwrap();

        let array = out[0].operands[0].as_array().unwrap();
        assert_eq!(array.len(), 2);
        assert_eq!(array[0].as_str().unwrap(), b"A B");
        assert_eq!(array[1].as_i64().unwrap(), -50);
    }

    #[test]
    fn split_happens_on_original_codes_before_reencoding() {
        let registry = registry();
        let ops = vec![
            font("F1"),
            op("Tw", vec![Object::Integer(1)]),
            // 100 becomes a space only after reencoding and must not split
            op("TJ", vec![Object::Array(vec![string(&[101, 100, 0x20, 101, 0x20])])]),
        ];
        let out = Processor::new(&registry).process_operations(ops).unwrap();

        assert_eq!(out.len(), 2);
        let array = out[1].operands[0].as_array().unwrap();
        assert_eq!(array.len(), 5);
        assert_eq!(array[1].as_i64().unwrap(), -1000);
        assert_eq!(array[3].as_i64().unwrap(), -1000);
        assert_eq!(
            strings(&out[1].operands[0]),
            vec![vec![0x41, 0x20, 0x20], vec![0x41, 0x20], vec![]]
        );
    }

    #[test]
    fn word_spacing_persists_until_reset() {
        let registry = FontRegistry::new();
        let ops = vec![
            op("Tw", vec![Object::Integer(2)]),
            op("BT", vec![]),
            op("TJ", vec![Object::Array(vec![string(b"a b")])]),
            op("ET", vec![]),
            op("Tw", vec![Object::Integer(0)]),
            op("TJ", vec![Object::Array(vec![string(b"a b")])]),
        ];
        let out = Processor::new(&registry).process_operations(ops).unwrap();

        assert_eq!(out.len(), 4);
        assert_eq!(out[1].operands[0].as_array().unwrap().len(), 3);
        assert_eq!(out[3].operands[0].as_array().unwrap().len(), 1);
    }

    #[test]
    fn positioned_strings_keep_their_format() {
        let registry = registry();
        let ops = vec![
            font("F1"),
            op("Tw", vec![Object::Integer(1)]),
            op(
                "TJ",
                vec![Object::Array(vec![
                    Object::String(vec![101, 0x20, 100], StringFormat::Hexadecimal),
                    Object::Real(-12.5),
                    string(&[100]),
                ])],
            ),
        ];
        let out = Processor::new(&registry).process_operations(ops).unwrap();

        let array = out[1].operands[0].as_array().unwrap();
        assert_eq!(array.len(), 5);
        assert!(matches!(&array[0], Object::String(s, StringFormat::Hexadecimal) if s == &[0x41, 0x20]));
        assert!(matches!(&array[2], Object::String(s, StringFormat::Hexadecimal) if s == &[0x20]));
        assert!(matches!(array[3], Object::Real(r) if r == -12.5));
        assert!(matches!(&array[4], Object::String(s, StringFormat::Literal) if s == &[0x20]));
    }

    #[test]
    fn element_kinds() {
        assert!(matches!(
            TextElement::from_obj(&Object::Integer(-40)),
            Ok(TextElement::Adjust(Number::Integer(-40)))
        ));
        assert!(matches!(
            TextElement::from_obj(&string(b"x")),
            Ok(TextElement::Text(s, StringFormat::Literal)) if s == b"x"
        ));
        assert!(TextElement::from_obj(&Object::Null).is_err());
    }

    #[test]
    fn unexpected_operands_are_fatal() {
        let registry = FontRegistry::new();

        let bad_element = vec![op(
            "TJ",
            vec![Object::Array(vec![Object::Name(b"X".to_vec())])],
        )];
        assert!(matches!(
            Processor::new(&registry).process_operations(bad_element),
            Err(RemapError::UnsupportedOperand { kind: "name", .. })
        ));

        let not_array = vec![op("TJ", vec![string(b"x")])];
        assert!(matches!(
            Processor::new(&registry).process_operations(not_array),
            Err(RemapError::UnsupportedOperand { kind: "string", .. })
        ));

        let no_font = vec![op("Tf", vec![Object::Integer(12)])];
        assert!(matches!(
            Processor::new(&registry).process_operations(no_font),
            Err(RemapError::MalformedOperator(_))
        ));
    }

    #[test]
    fn content_roundtrip_through_bytes() {
        let registry = registry();
        let content = b"BT /F1 12 Tf 0.5 Tw (\x64\x65) Tj [(\x65 \x64) -20] TJ ET";
        let out = reencode_content(content, &registry).unwrap();

        let ops = Content::decode(&out).unwrap().operations;
        let operators: Vec<&str> = ops.iter().map(|o| o.operator.as_str()).collect();
        assert_eq!(operators, vec!["BT", "Tf", "Tj", "TJ", "ET"]);
        assert_eq!(ops[2].operands[0].as_str().unwrap(), &[0x20, 0x41]);
        assert_eq!(
            strings(&ops[3].operands[0]),
            vec![vec![0x41, 0x20], vec![0x20]]
        );
    }
}

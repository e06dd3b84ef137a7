use std::collections::HashMap;

use lopdf::{Dictionary, Document};
use tracing::debug;

use crate::differences::DifferenceMap;
use crate::error::RemapError;
use crate::font_program::FontProgramDecoder;
use crate::utils::*;

/// Difference maps of one page's fonts, keyed by font resource name.
///
/// Fonts whose encoding is a name (standard or otherwise) have no entry and
/// their codes are never rewritten.
#[derive(Debug, Clone, Default)]
pub struct FontRegistry {
    maps: HashMap<Vec<u8>, DifferenceMap>,
}

impl FontRegistry {
    pub fn new() -> FontRegistry {
        FontRegistry::default()
    }

    /// Builds the registry for a page's `/Font` resource dictionary.
    pub fn build(
        doc: &Document,
        fonts: &Dictionary,
        decoder: &dyn FontProgramDecoder,
    ) -> Result<FontRegistry, RemapError> {
        let mut registry = FontRegistry::new();
        for (key, font) in fonts.iter() {
            let Some(font) = <&Dictionary>::from_obj(doc, font) else {
                debug!("font {} is not a dictionary", name_to_string(key));
                continue;
            };
            if let Some(map) = DifferenceMap::for_font(doc, font, decoder)? {
                debug!("font {} remaps {} codes", name_to_string(key), map.len());
                registry.insert(key.clone(), map);
            }
        }
        Ok(registry)
    }

    pub fn insert(&mut self, font_key: impl Into<Vec<u8>>, map: DifferenceMap) {
        self.maps.insert(font_key.into(), map);
    }

    pub fn get(&self, font_key: &[u8]) -> Option<&DifferenceMap> {
        self.maps.get(font_key)
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font_program::{FontProgram, GlyphCodeTable};
    use lopdf::{Object, Stream, dictionary};

    struct SpaceDecoder;

    impl FontProgramDecoder for SpaceDecoder {
        fn glyph_codes(&self, _program: &FontProgram) -> Result<GlyphCodeTable, RemapError> {
            Ok(GlyphCodeTable::from_codes([(0x20, "space")]))
        }
    }

    struct FailingDecoder;

    impl FontProgramDecoder for FailingDecoder {
        fn glyph_codes(&self, _program: &FontProgram) -> Result<GlyphCodeTable, RemapError> {
            Err(RemapError::FontProgram("corrupt".to_owned()))
        }
    }

    fn fonts(doc: &mut Document) -> Dictionary {
        let program = doc.add_object(Stream::new(dictionary! {}, vec![]));
        let descriptor = doc.add_object(dictionary! { "FontFile3" => program });
        let custom = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "Encoding" => dictionary! {
                "Differences" => vec![Object::Integer(7), Object::Name(b"space".to_vec())],
            },
            "FontDescriptor" => descriptor,
        });
        dictionary! {
            "F1" => custom,
            "F2" => dictionary! { "Type" => "Font", "Encoding" => "WinAnsiEncoding" },
            "F3" => Object::Integer(1),
        }
    }

    #[test]
    fn registers_dictionary_encodings_only() {
        let mut doc = Document::with_version("1.5");
        let fonts = fonts(&mut doc);

        let registry = FontRegistry::build(&doc, &fonts, &SpaceDecoder).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(b"F1").and_then(|m| m.get(7)), Some(0x20));
        assert!(registry.get(b"F2").is_none());
        assert!(registry.get(b"F3").is_none());
    }

    #[test]
    fn unreadable_program_is_fatal() {
        let mut doc = Document::with_version("1.5");
        let fonts = fonts(&mut doc);

        let result = FontRegistry::build(&doc, &fonts, &FailingDecoder);
        assert!(matches!(result, Err(RemapError::FontProgram(_))));
    }
}

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object};
use tracing::debug;

use crate::error::RemapError;
use crate::font_program::{FontProgramDecoder, GlyphCodeTable, find_font_program};
use crate::utils::*;

/// Fonts declaring this encoding by name already use standard codes.
const STANDARD_ENCODING: &[u8] = b"WinAnsiEncoding";

/// Sparse map from a font's custom byte codes to the codes its embedded
/// program assigns to the same glyphs. Codes without an entry are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DifferenceMap {
    codes: BTreeMap<u8, u8>,
}

impl DifferenceMap {
    /// Walks a `/Differences` array. An integer sets the next custom code,
    /// every glyph name consumes one code and maps it when the glyph is known
    /// to `glyph_codes`.
    pub fn from_differences<'a, I>(differences: I, glyph_codes: &GlyphCodeTable) -> DifferenceMap
    where
        I: IntoIterator<Item = &'a Object>,
    {
        let (_, codes) = differences.into_iter().fold(
            (0i64, BTreeMap::new()),
            |(next_code, mut codes), entry| match entry {
                &Object::Integer(code) => (code, codes),
                Object::Name(name) => {
                    let glyph = name_to_string(name);
                    match (u8::try_from(next_code), glyph_codes.code(&glyph)) {
                        (Ok(custom), Some(standard)) => {
                            codes.insert(custom, standard);
                        }
                        (Err(_), _) => debug!("code {} for /{} is out of range", next_code, glyph),
                        (_, None) => debug!("/{} is not in the font program", glyph),
                    }
                    (next_code + 1, codes)
                }
                other => {
                    debug!("ignoring {:?} in /Differences", other);
                    (next_code, codes)
                }
            },
        );
        DifferenceMap { codes }
    }

    /// Derives the map for a font dictionary. Returns `None` when the font's
    /// encoding is not in dictionary form, in which case its codes are left
    /// alone entirely.
    pub(crate) fn for_font(
        doc: &Document,
        font: &Dictionary,
        decoder: &dyn FontProgramDecoder,
    ) -> Result<Option<DifferenceMap>, RemapError> {
        let encoding = match maybe_get_obj(doc, font, b"Encoding") {
            Some(Object::Name(name)) if name == STANDARD_ENCODING => {
                debug!("font uses the standard encoding");
                return Ok(None);
            }
            Some(Object::Dictionary(encoding)) => encoding,
            other => {
                debug!("encoding {:?} has no differences to remap", other);
                return Ok(None);
            }
        };

        let Some(differences) = maybe_get_array(doc, encoding, b"Differences") else {
            return Ok(Some(DifferenceMap::default()));
        };
        let Some(program) = find_font_program(doc, font) else {
            debug!("no embedded font program, codes pass through");
            return Ok(Some(DifferenceMap::default()));
        };

        let glyph_codes = decoder.glyph_codes(&program)?;
        let map = DifferenceMap::from_differences(
            differences.iter().filter_map(|o| maybe_deref(doc, o)),
            &glyph_codes,
        );
        debug!("difference map {:?}", map.codes);
        Ok(Some(map))
    }

    pub fn get(&self, code: u8) -> Option<u8> {
        self.codes.get(&code).copied()
    }

    pub fn insert(&mut self, custom: u8, standard: u8) {
        self.codes.insert(custom, standard);
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// The standard codes this map produces.
    pub fn targets(&self) -> impl Iterator<Item = u8> + '_ {
        self.codes.values().copied()
    }

    /// Replaces every mapped byte, keeping the rest.
    pub fn reencode(&self, bytes: &[u8]) -> Vec<u8> {
        bytes.iter().map(|&b| self.get(b).unwrap_or(b)).collect()
    }
}

impl FromIterator<(u8, u8)> for DifferenceMap {
    fn from_iter<T: IntoIterator<Item = (u8, u8)>>(iter: T) -> Self {
        DifferenceMap {
            codes: iter.into_iter().collect(),
        }
    }
}

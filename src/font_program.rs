//! Access to the glyph tables built into embedded font programs.
//!
//! Only the built-in encoding of a program is read: which single-byte code
//! the font itself assigns to each glyph name. Parsing the program formats
//! is left to `cff-parser`, `ttf-parser` and `type1-encoding-parser`.

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Stream};
use tracing::{debug, warn};

use crate::error::RemapError;
use crate::utils::*;

const NOTDEF: &str = ".notdef";
const CFF_TAG: ttf_parser::Tag = ttf_parser::Tag::from_bytes(b"CFF ");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFileKind {
    /// Bare CFF data, `/FontFile3` with `/Subtype /Type1C`.
    Cff,
    /// An OpenType wrapper, `/FontFile3` with `/Subtype /OpenType`.
    OpenType,
    /// A Type 1 program from `/FontFile`.
    Type1,
}

#[derive(Debug, Clone)]
pub struct FontProgram {
    pub kind: FontFileKind,
    pub data: Vec<u8>,
}

/// Glyph name to the byte code the font program assigns it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphCodeTable {
    codes: HashMap<String, u8>,
}

impl GlyphCodeTable {
    /// Builds a table from `(code, glyph name)` pairs. `.notdef` is never
    /// recorded, and when a glyph is reachable from several codes the highest
    /// code wins.
    pub fn from_codes<I, S>(entries: I) -> GlyphCodeTable
    where
        I: IntoIterator<Item = (u8, S)>,
        S: Into<String>,
    {
        let mut entries: Vec<(u8, String)> = entries
            .into_iter()
            .map(|(code, name)| (code, name.into()))
            .filter(|(_, name)| name != NOTDEF)
            .collect();
        entries.sort_by_key(|&(code, _)| code);

        let mut codes = HashMap::new();
        for (code, name) in entries {
            codes.insert(name, code);
        }
        GlyphCodeTable { codes }
    }

    pub fn code(&self, glyph_name: &str) -> Option<u8> {
        self.codes.get(glyph_name).copied()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Turns font program bytes into a [`GlyphCodeTable`].
pub trait FontProgramDecoder {
    fn glyph_codes(&self, program: &FontProgram) -> Result<GlyphCodeTable, RemapError>;
}

/// Decodes the program formats that can be embedded in a simple font.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedFontDecoder;

impl FontProgramDecoder for EmbeddedFontDecoder {
    fn glyph_codes(&self, program: &FontProgram) -> Result<GlyphCodeTable, RemapError> {
        match program.kind {
            FontFileKind::Cff => cff_glyph_codes(&program.data),
            FontFileKind::OpenType => {
                let face = ttf_parser::RawFace::parse(&program.data, 0).map_err(|e| {
                    RemapError::FontProgram(format!("unreadable OpenType font program: {}", e))
                })?;
                match face.table(CFF_TAG) {
                    Some(cff) => cff_glyph_codes(cff),
                    None => {
                        debug!("OpenType font program has no CFF table");
                        Ok(GlyphCodeTable::default())
                    }
                }
            }
            FontFileKind::Type1 => type1_glyph_codes(&program.data),
        }
    }
}

/// Number of entries in the Name INDEX, i.e. how many top-level fonts the
/// CFF data declares.
fn cff_font_count(data: &[u8]) -> Option<u16> {
    let header_size = *data.get(2)? as usize;
    let count = data.get(header_size..header_size + 2)?;
    Some(u16::from_be_bytes([count[0], count[1]]))
}

fn cff_glyph_codes(data: &[u8]) -> Result<GlyphCodeTable, RemapError> {
    if let Some(count) = cff_font_count(data).filter(|&count| count > 1) {
        warn!(
            "CFF font program declares {} fonts, only the first one is used",
            count
        );
    }
    let table = cff_parser::Table::parse(data)
        .ok_or_else(|| RemapError::FontProgram("unreadable CFF font program".to_owned()))?;

    let mut entries = Vec::new();
    for (code, sid) in table.encoding.get_code_to_sid_table(&table.charset) {
        if let Some(name) = cff_parser::string_by_id(&table, sid) {
            entries.push((code as u8, name.to_string()));
        }
    }
    debug!("CFF built-in encoding has {} codes", entries.len());
    Ok(GlyphCodeTable::from_codes(entries))
}

fn type1_glyph_codes(data: &[u8]) -> Result<GlyphCodeTable, RemapError> {
    let Some(encoding) = type1_encoding_parser::get_encoding_map(data)
        .into_iter()
        .next()
    else {
        return Err(RemapError::FontProgram(
            "unreadable Type 1 font program".to_owned(),
        ));
    };

    let entries: Vec<(u8, String)> = encoding
        .into_iter()
        .filter_map(|(code, name)| Some((u8::try_from(code).ok()?, name_to_string(&name))))
        .collect();
    debug!("Type 1 built-in encoding has {} codes", entries.len());
    Ok(GlyphCodeTable::from_codes(entries))
}

/// Finds the font program embedded through the font descriptor, if any.
pub(crate) fn find_font_program(doc: &Document, font: &Dictionary) -> Option<FontProgram> {
    let descriptor: &Dictionary = maybe_get(doc, font, b"FontDescriptor")?;

    if let Some(file) = maybe_get::<&Stream>(doc, descriptor, b"FontFile3") {
        let kind = match maybe_get_name(doc, &file.dict, b"Subtype") {
            Some(b"OpenType") => FontFileKind::OpenType,
            _ => FontFileKind::Cff,
        };
        return Some(FontProgram {
            kind,
            data: get_contents(file),
        });
    }

    maybe_get::<&Stream>(doc, descriptor, b"FontFile").map(|file| FontProgram {
        kind: FontFileKind::Type1,
        data: get_contents(file),
    })
}

//! PDF font encoding rewriting
//!
//! This library rewrites simple fonts whose `/Differences` point byte codes at
//! custom glyph names so that their text becomes extractable. Shown strings are
//! recoded to the codes the embedded font program itself uses for the same
//! glyphs, and every font is switched to `/Identity-H` with an attached
//! ToUnicode map. The rendered glyphs stay the same.

mod convert;
mod data;
mod differences;
mod error;
mod font_program;
mod fonts;
mod processor;
mod registry;
mod types;
mod utils;
mod widths;

// Re-export error type
pub use error::RemapError;

// Re-export conversion API
pub use convert::{Unicodifier, UnicodifierBuilder, convert_bytes, convert_path};

// Re-export the remapping building blocks
pub use differences::DifferenceMap;
pub use font_program::{
    EmbeddedFontDecoder, FontFileKind, FontProgram, FontProgramDecoder, GlyphCodeTable,
};
pub use processor::TextElement;
pub use registry::FontRegistry;
pub use types::Number;
pub use widths::WidthTable;

use lopdf::{Dictionary, Document, Object};
use tracing::warn;

use crate::differences::DifferenceMap;
use crate::types::Number;
use crate::utils::*;

const DEFAULT_FIRST_CHAR: i64 = 0;
const DEFAULT_LAST_CHAR: i64 = 255;

/// A simple font's `/Widths` together with the code range it covers.
///
/// The empty table has bounds `0, 0`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidthTable {
    first_char: i64,
    last_char: i64,
    widths: Vec<Number>,
}

impl WidthTable {
    /// A table whose range is exactly covered by `widths`.
    pub fn new(first_char: i64, widths: Vec<Number>) -> WidthTable {
        let last_char = if widths.is_empty() {
            first_char
        } else {
            first_char + widths.len() as i64 - 1
        };
        WidthTable {
            first_char,
            last_char,
            widths,
        }
    }

    /// Reads `/FirstChar`, `/LastChar` and `/Widths`. The declared range is
    /// kept as is even when `/Widths` is shorter.
    pub(crate) fn from_font(doc: &Document, font: &Dictionary) -> WidthTable {
        WidthTable {
            first_char: maybe_get(doc, font, b"FirstChar").unwrap_or(DEFAULT_FIRST_CHAR),
            last_char: maybe_get(doc, font, b"LastChar").unwrap_or(DEFAULT_LAST_CHAR),
            widths: maybe_get(doc, font, b"Widths").unwrap_or_default(),
        }
    }

    pub fn first_char(&self) -> i64 {
        self.first_char
    }

    pub fn last_char(&self) -> i64 {
        self.last_char
    }

    pub fn widths(&self) -> &[Number] {
        &self.widths
    }

    pub fn width(&self, code: i64) -> Option<Number> {
        let index = usize::try_from(code - self.first_char).ok()?;
        self.widths.get(index).copied()
    }

    /// Moves every width to the code its glyph gets under `map`.
    ///
    /// The new range spans the smallest to the largest mapped code. Codes the
    /// map does not cover are dropped, and slots nothing lands on get width 0.
    pub fn remap(&self, map: &DifferenceMap) -> WidthTable {
        let (Some(new_first), Some(new_last)) = (map.targets().min(), map.targets().max()) else {
            return WidthTable::default();
        };
        let mut widths = vec![Number::default(); (new_last - new_first) as usize + 1];

        for code in self.first_char.max(0)..=self.last_char.min(u8::MAX as i64) {
            let Some(new_code) = map.get(code as u8) else {
                continue;
            };
            match self.width(code) {
                Some(width) => widths[(new_code - new_first) as usize] = width,
                None => warn!("no width for code {} in /Widths", code),
            }
        }

        WidthTable {
            first_char: new_first as i64,
            last_char: new_last as i64,
            widths,
        }
    }

    /// Writes the table back into a font dictionary.
    pub(crate) fn apply(self, font: &mut Dictionary) {
        font.set("FirstChar", Object::Integer(self.first_char));
        font.set("LastChar", Object::Integer(self.last_char));
        font.set(
            "Widths",
            Object::Array(self.widths.into_iter().map(Object::from).collect()),
        );
    }
}

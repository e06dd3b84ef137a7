use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::debug;

use crate::data::IDENTITY_UCS_CMAP;
use crate::differences::DifferenceMap;
use crate::widths::WidthTable;

const IDENTITY_ENCODING: &[u8] = b"Identity-H";

/// Adds the ToUnicode CMap stream shared by every rewritten font.
pub(crate) fn add_to_unicode_stream(doc: &mut Document) -> ObjectId {
    doc.add_object(Stream::new(Dictionary::new(), IDENTITY_UCS_CMAP.to_vec()))
}

/// Returns a copy of `font` switched to `/Identity-H` with the shared
/// ToUnicode map. When the font was remapped its widths follow the new codes;
/// otherwise they are left untouched.
pub(crate) fn unicodify_font(
    doc: &Document,
    font: &Dictionary,
    map: Option<&DifferenceMap>,
    to_unicode: ObjectId,
) -> Dictionary {
    let mut new_font = font.clone();
    new_font.set("Encoding", Object::Name(IDENTITY_ENCODING.to_vec()));
    new_font.set("ToUnicode", Object::Reference(to_unicode));

    if let Some(map) = map {
        let widths = WidthTable::from_font(doc, font).remap(map);
        debug!(
            "widths now cover {}..={}",
            widths.first_char(),
            widths.last_char()
        );
        widths.apply(&mut new_font);
    }
    new_font
}

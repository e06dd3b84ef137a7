use std::io::Read;
use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::debug;

use crate::error::RemapError;
use crate::font_program::{EmbeddedFontDecoder, FontProgramDecoder};
use crate::fonts::{add_to_unicode_stream, unicodify_font};
use crate::processor::reencode_content;
use crate::registry::FontRegistry;
use crate::utils::*;

/// Rewrites one page: its content stream against the page's font registry,
/// and every font of its `/Font` resources.
///
/// Fonts and content are written as new objects so fonts shared with other
/// pages are never modified in place.
fn convert_page(
    doc: &mut Document,
    page_id: ObjectId,
    to_unicode: ObjectId,
    decoder: &dyn FontProgramDecoder,
) -> Result<(), RemapError> {
    let (mut resources, fonts, content) = {
        let page_dict = doc.get_dictionary(page_id)?;
        let Some(resources) = get_inherited::<&Dictionary>(doc, page_dict, b"Resources") else {
            debug!("page {:?} has no resources", page_id);
            return Ok(());
        };
        let Some(fonts) = maybe_get::<&Dictionary>(doc, resources, b"Font") else {
            debug!("page {:?} has no fonts", page_id);
            return Ok(());
        };

        let registry = FontRegistry::build(doc, fonts, decoder)?;
        let content = reencode_content(&doc.get_page_content(page_id)?, &registry)?;

        let fonts: Vec<(Vec<u8>, Object)> = fonts
            .iter()
            .map(|(key, font)| {
                let new_font = match <&Dictionary>::from_obj(doc, font) {
                    Some(font) => {
                        Object::Dictionary(unicodify_font(doc, font, registry.get(key), to_unicode))
                    }
                    None => font.clone(),
                };
                (key.clone(), new_font)
            })
            .collect();
        (resources.clone(), fonts, content)
    };

    let mut new_fonts = Dictionary::new();
    for (key, font) in fonts {
        match font {
            Object::Dictionary(font) => {
                let font_id = doc.add_object(font);
                new_fonts.set(key, font_id);
            }
            other => {
                new_fonts.set(key, other);
            }
        }
    }
    resources.set("Font", new_fonts);
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content));

    let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
    page.set("Contents", content_id);
    page.set("Resources", resources);
    Ok(())
}

/// Builder for configuring conversion options.
///
/// # Examples
///
/// ```no_run
/// use pdf_unicodify::Unicodifier;
///
/// Unicodifier::builder()
///     .password("secret")
///     .build()
///     .convert_path("encrypted.pdf", "searchable.pdf")?;
/// # Ok::<(), pdf_unicodify::RemapError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct UnicodifierBuilder {
    password: Option<String>,
}

impl UnicodifierBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the password for encrypted PDFs.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Build the converter configuration.
    pub fn build(self) -> Unicodifier {
        Unicodifier {
            password: self.password,
        }
    }
}

/// Replaces custom single-byte font encodings with `/Identity-H` plus a
/// ToUnicode map, rewriting shown strings so the same glyphs are drawn.
///
/// Either every page is converted or an error is returned; nothing is written
/// on failure.
///
/// # Examples
///
/// ```no_run
/// use pdf_unicodify::Unicodifier;
///
/// Unicodifier::default().convert_path("scan.pdf", "searchable.pdf")?;
///
/// let bytes = std::fs::read("scan.pdf")?;
/// let converted = Unicodifier::default().convert_bytes(&bytes)?;
/// # Ok::<(), pdf_unicodify::RemapError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Unicodifier {
    password: Option<String>,
}

impl Unicodifier {
    /// Create a builder for configuring conversion options.
    pub fn builder() -> UnicodifierBuilder {
        UnicodifierBuilder::new()
    }

    /// Convert the PDF at `input` and save the result to `output`.
    pub fn convert_path<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
    ) -> Result<(), RemapError> {
        let mut doc = Document::load(input)?;
        self.convert_document(&mut doc)?;
        doc.save(output)?;
        Ok(())
    }

    /// Convert a PDF held in memory, returning the saved result.
    pub fn convert_bytes(&self, bytes: &[u8]) -> Result<Vec<u8>, RemapError> {
        let mut doc = Document::load_mem(bytes)?;
        self.convert_document(&mut doc)?;
        let mut output = Vec::new();
        doc.save_to(&mut output)?;
        Ok(output)
    }

    /// Convert a PDF read from `reader`, returning the saved result.
    pub fn convert_reader<R: Read>(&self, mut reader: R) -> Result<Vec<u8>, RemapError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        self.convert_bytes(&bytes)
    }

    /// Convert a loaded document in place using the built-in font program
    /// decoders.
    pub fn convert_document(&self, doc: &mut Document) -> Result<(), RemapError> {
        self.convert_document_with(doc, &EmbeddedFontDecoder)
    }

    /// Convert a loaded document in place, reading font programs with
    /// `decoder`.
    pub fn convert_document_with(
        &self,
        doc: &mut Document,
        decoder: &dyn FontProgramDecoder,
    ) -> Result<(), RemapError> {
        if doc.is_encrypted() {
            doc.decrypt(self.password.as_deref().unwrap_or(""))?;
        }

        let to_unicode = add_to_unicode_stream(doc);
        for (page_num, page_id) in doc.get_pages() {
            debug!("converting page {}", page_num);
            convert_page(doc, page_id, to_unicode, decoder)?;
        }
        Ok(())
    }
}

/// Convert the PDF at `input` into `output` using default settings.
///
/// This is a convenience function equivalent to
/// `Unicodifier::default().convert_path(input, output)`.
pub fn convert_path<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<(), RemapError> {
    Unicodifier::default().convert_path(input, output)
}

/// Convert a PDF in memory using default settings.
///
/// This is a convenience function equivalent to
/// `Unicodifier::default().convert_bytes(bytes)`.
pub fn convert_bytes(bytes: &[u8]) -> Result<Vec<u8>, RemapError> {
    Unicodifier::default().convert_bytes(bytes)
}

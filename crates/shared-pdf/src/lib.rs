//! Shared PDF handling utilities
//!
//! This crate turns a parsed PDF into flat form-field records, along with
//! the string decoding and page geometry helpers that go with it.

pub mod encryption;
pub mod error;
pub mod fields;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
pub mod geometry;
#[cfg(test)]
mod property_tests;
pub mod text;

pub use encryption::decrypt_document;
pub use error::PdfError;
pub use fields::{extract_form_fields, extract_from_bytes, extract_from_path, ExtractedFields};
pub use geometry::{page_box, PageBox};
pub use text::decode_text_string;

/// Parse PDF bytes into a lopdf document, decrypting owner-password-only files
pub fn load_document(bytes: &[u8]) -> Result<lopdf::Document, PdfError> {
    let mut doc = lopdf::Document::load_mem(bytes).map_err(|e| PdfError::Parse(e.to_string()))?;
    decrypt_document(&mut doc)?;
    Ok(doc)
}

/// Follow an indirect reference to the object it names.
///
/// Direct objects are returned unchanged.
pub fn resolve<'a>(
    doc: &'a lopdf::Document,
    object: &'a lopdf::Object,
) -> Result<&'a lopdf::Object, PdfError> {
    let mut current = object;
    // Reference chains are legal but never deep in practice
    for _ in 0..8 {
        match current {
            lopdf::Object::Reference(id) => {
                current = doc
                    .get_object(*id)
                    .map_err(|_| PdfError::MissingObject(id.0, id.1))?;
            }
            other => return Ok(other),
        }
    }
    Err(PdfError::Parse("reference chain too deep".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Document, Object};

    #[test]
    fn test_load_document_rejects_garbage() {
        let err = load_document(b"not a pdf at all").unwrap_err();
        assert!(matches!(err, PdfError::Parse(_)));
    }

    #[test]
    fn test_resolve_follows_references() {
        let mut doc = Document::with_version("1.7");
        let id = doc.add_object(Object::Integer(42));
        let reference = Object::Reference(id);
        assert!(matches!(resolve(&doc, &reference).unwrap(), Object::Integer(42)));
    }

    #[test]
    fn test_resolve_reports_dangling_reference() {
        let doc = Document::with_version("1.7");
        let reference = Object::Reference((99, 0));
        let err = resolve(&doc, &reference).unwrap_err();
        assert!(matches!(err, PdfError::MissingObject(99, 0)));
    }
}

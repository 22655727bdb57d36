//! Form field extraction
//!
//! Walks pages in document order and every annotation on each page,
//! producing one [`FieldRecord`] per annotation. Nothing is filtered or
//! deduplicated here: unnamed widgets are kept and repeated names across
//! pages stay repeated. Consumers decide what to do with them.

use std::path::Path;

use lopdf::{Dictionary, Document, Object};
use shared_types::{FieldRecord, SignatureRecord, SIGNATURE_FIELD_TYPE};
use tracing::debug;

use crate::error::PdfError;
use crate::geometry::region_from_object;
use crate::text::decode_text_string;
use crate::{load_document, resolve};

/// `/T`, `/V` and `/FT` may live on an ancestor field; bounded for cyclic trees
const MAX_PARENT_DEPTH: usize = 32;

/// Value reported for a signed signature field whose dictionary has no `/Name`
const SIGNED_MARKER: &str = "signed";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedFields {
    pub fields: Vec<FieldRecord>,
    pub signatures: Vec<SignatureRecord>,
}

/// Load PDF bytes and extract their form fields
pub fn extract_from_bytes(bytes: &[u8]) -> Result<ExtractedFields, PdfError> {
    let doc = load_document(bytes)?;
    extract_form_fields(&doc)
}

/// Read a PDF from disk and extract its form fields
pub fn extract_from_path(path: &Path) -> Result<ExtractedFields, PdfError> {
    let bytes = std::fs::read(path)?;
    extract_from_bytes(&bytes)
}

/// Extract every annotation on every page as a field record.
///
/// A dangling annotation reference or a non-dictionary annotation aborts
/// the whole extraction; no partial result is returned.
pub fn extract_form_fields(doc: &Document) -> Result<ExtractedFields, PdfError> {
    let mut extracted = ExtractedFields::default();

    for (&page_number, &page_id) in doc.get_pages().iter() {
        let page = doc
            .get_object(page_id)
            .map_err(|_| PdfError::MissingObject(page_id.0, page_id.1))?
            .as_dict()
            .map_err(|_| PdfError::Parse(format!("page {} is not a dictionary", page_number)))?;

        let annots = match page.get(b"Annots") {
            Ok(obj) => resolve(doc, obj)?,
            Err(_) => continue,
        };
        let Object::Array(annots) = annots else {
            debug!("Page {} has a non-array /Annots entry, skipping", page_number);
            continue;
        };

        for annot_ref in annots {
            let annot = resolve(doc, annot_ref)?.as_dict().map_err(|_| {
                PdfError::Parse(format!(
                    "annotation on page {} is not a dictionary",
                    page_number
                ))
            })?;

            let field = read_field(doc, annot, page_number)?;
            debug!(
                "Extracted field: name={:?} value={:?} type={:?} page={}",
                field.name, field.value, field.field_type, field.page
            );

            if field.is_signature() {
                let signature = SignatureRecord::from_field(&field);
                debug!("Found signature field: {:?}", signature);
                extracted.signatures.push(signature);
            }
            extracted.fields.push(field);
        }
    }

    debug!(
        "Total fields extracted: {}, signatures: {}",
        extracted.fields.len(),
        extracted.signatures.len()
    );
    Ok(extracted)
}

fn read_field(doc: &Document, annot: &Dictionary, page: u32) -> Result<FieldRecord, PdfError> {
    let name = match inherited(doc, annot, b"T")? {
        Some(Object::String(bytes, _)) => Some(decode_text_string(bytes)),
        _ => None,
    };

    let field_type = match inherited(doc, annot, b"FT")? {
        Some(Object::Name(name)) => Some(field_type_label(name)),
        _ => None,
    };

    let value = match inherited(doc, annot, b"V")? {
        Some(obj) => render_value(doc, obj)?,
        None => None,
    };

    let rect = annot
        .get(b"Rect")
        .ok()
        .and_then(|obj| region_from_object(doc, obj));

    Ok(FieldRecord {
        name,
        value,
        field_type,
        page,
        rect,
    })
}

/// Look a key up on the widget, then along its `/Parent` chain
fn inherited<'a>(
    doc: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Result<Option<&'a Object>, PdfError> {
    let mut current = dict;

    for _ in 0..MAX_PARENT_DEPTH {
        if let Ok(obj) = current.get(key) {
            return Ok(Some(resolve(doc, obj)?));
        }
        let Ok(parent) = current.get(b"Parent") else {
            return Ok(None);
        };
        match resolve(doc, parent)? {
            Object::Dictionary(parent) => current = parent,
            _ => return Ok(None),
        }
    }

    Ok(None)
}

fn field_type_label(name: &[u8]) -> String {
    match name {
        b"Tx" => "Text".to_string(),
        b"Btn" => "Button".to_string(),
        b"Ch" => "Choice".to_string(),
        b"Sig" => SIGNATURE_FIELD_TYPE.to_string(),
        other => String::from_utf8_lossy(other).into_owned(),
    }
}

fn render_value(doc: &Document, value: &Object) -> Result<Option<String>, PdfError> {
    let rendered = match resolve(doc, value)? {
        Object::Null => None,
        Object::Boolean(b) => Some(b.to_string()),
        Object::Integer(i) => Some(i.to_string()),
        Object::Real(r) => Some(r.to_string()),
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        Object::String(bytes, _) => Some(decode_text_string(bytes)),
        // Multi-select choice fields
        Object::Array(items) => {
            let mut parts = Vec::with_capacity(items.len());
            for item in items {
                if let Some(part) = render_value(doc, item)? {
                    parts.push(part);
                }
            }
            Some(parts.join(", "))
        }
        // A signature field's value is its signature dictionary
        Object::Dictionary(dict) => Some(signer_name(dict)),
        Object::Stream(stream) => Some(signer_name(&stream.dict)),
        Object::Reference(_) => None,
    };
    Ok(rendered)
}

fn signer_name(dict: &Dictionary) -> String {
    match dict.get(b"Name") {
        Ok(Object::String(bytes, _)) => decode_text_string(bytes),
        _ => SIGNED_MARKER.to_string(),
    }
}

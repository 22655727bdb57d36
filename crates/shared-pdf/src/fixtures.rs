//! In-memory AcroForm documents for tests
//!
//! Builds small but structurally valid PDFs: a page tree, one widget
//! annotation per field, and a catalog `/AcroForm` listing every field.

use lopdf::encryption::get_encryption_key;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, StringFormat};

use crate::encryption::crypt_object;

const DEFAULT_RECT: [f32; 4] = [72.0, 600.0, 272.0, 624.0];

/// First element of the trailer `/ID`, which salts the file key
const FIXTURE_FILE_ID: &[u8; 16] = b"formcheck-fixtur";

/// Standard security handler applied to a fixture (RC4, 40-bit, revision 2)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FixtureEncryption {
    #[default]
    None,
    /// Owner password only; opens with the empty user password
    OwnerOnly,
    /// Needs a user password the reader does not know
    UserPassword,
}

#[derive(Debug, Clone)]
enum FixtureValue {
    Text(String),
    Name(String),
    Signed(String),
}

#[derive(Debug, Clone)]
pub struct FixtureField {
    name: Option<String>,
    field_type: Option<&'static str>,
    value: Option<FixtureValue>,
    rect: [f32; 4],
}

impl FixtureField {
    /// Text field, optionally filled
    pub fn text(name: &str, value: Option<&str>) -> Self {
        Self {
            name: Some(name.to_string()),
            field_type: Some("Tx"),
            value: value.map(|v| FixtureValue::Text(v.to_string())),
            rect: DEFAULT_RECT,
        }
    }

    /// Checkbox; ticked boxes carry `/Yes`, unticked `/Off`
    pub fn checkbox(name: &str, checked: bool) -> Self {
        let state = if checked { "Yes" } else { "Off" };
        Self {
            name: Some(name.to_string()),
            field_type: Some("Btn"),
            value: Some(FixtureValue::Name(state.to_string())),
            rect: DEFAULT_RECT,
        }
    }

    /// Signature field; `signed_by` becomes the signature dictionary's `/Name`
    pub fn signature(name: &str, signed_by: Option<&str>) -> Self {
        Self {
            name: Some(name.to_string()),
            field_type: Some("Sig"),
            value: signed_by.map(|s| FixtureValue::Signed(s.to_string())),
            rect: DEFAULT_RECT,
        }
    }

    /// Bare widget with no `/T`, `/FT` or `/V`
    pub fn unnamed() -> Self {
        Self {
            name: None,
            field_type: None,
            value: None,
            rect: DEFAULT_RECT,
        }
    }

    /// Place the widget at `[x1, y1, x2, y2]`
    pub fn at(mut self, rect: [f32; 4]) -> Self {
        self.rect = rect;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct FormFixture {
    pages: Vec<Vec<FixtureField>>,
    encryption: FixtureEncryption,
}

impl FormFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page carrying the given fields
    pub fn page(mut self, fields: Vec<FixtureField>) -> Self {
        self.pages.push(fields);
        self
    }

    /// Encrypt every string and stream when built
    pub fn encrypted(mut self, encryption: FixtureEncryption) -> Self {
        self.encryption = encryption;
        self
    }

    pub fn build(&self) -> Document {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let mut page_ids = Vec::with_capacity(self.pages.len());
        let mut field_ids = Vec::new();

        for fields in &self.pages {
            let annot_ids: Vec<ObjectId> = fields
                .iter()
                .map(|field| add_widget(&mut doc, field))
                .collect();
            field_ids.extend(annot_ids.iter().copied());

            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(pages_id),
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ],
            };
            if !annot_ids.is_empty() {
                page.set(
                    "Annots",
                    Object::Array(annot_ids.into_iter().map(Object::Reference).collect()),
                );
            }
            page_ids.push(doc.add_object(page));
        }

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().copied().map(Object::Reference).collect::<Vec<_>>(),
            "Count" => Object::Integer(page_ids.len() as i64),
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let acroform_id = doc.add_object(dictionary! {
            "Fields" => field_ids.into_iter().map(Object::Reference).collect::<Vec<_>>(),
        });
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
            "AcroForm" => Object::Reference(acroform_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        if self.encryption != FixtureEncryption::None {
            encrypt(&mut doc, self.encryption);
        }
        doc
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut doc = self.build();
        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .expect("writing a fixture to memory cannot fail");
        buffer
    }
}

fn encrypt(doc: &mut Document, encryption: FixtureEncryption) {
    let mut handler = dictionary! {
        "Filter" => "Standard",
        "V" => Object::Integer(1),
        "R" => Object::Integer(2),
        "Length" => Object::Integer(40),
        "O" => Object::String(vec![0x5A; 32], StringFormat::Hexadecimal),
        "P" => Object::Integer(-4),
    };
    // lopdf treats a missing /U as matching any password; a /U that no
    // key reproduces rejects the empty one
    if encryption == FixtureEncryption::UserPassword {
        handler.set("U", Object::String(vec![0; 32], StringFormat::Hexadecimal));
    }

    let handler_id = doc.add_object(handler);
    let file_id = Object::String(FIXTURE_FILE_ID.to_vec(), StringFormat::Hexadecimal);
    doc.trailer.set("ID", Object::Array(vec![file_id.clone(), file_id]));
    doc.trailer.set("Encrypt", Object::Reference(handler_id));

    let key = get_encryption_key(doc, "", false).expect("fixture security handler is complete");
    for (&id, object) in doc.objects.iter_mut() {
        if id != handler_id {
            crypt_object(&key, id, object).expect("fixture objects are encryptable");
        }
    }
}

fn add_widget(doc: &mut Document, field: &FixtureField) -> ObjectId {
    let mut widget = Dictionary::new();
    widget.set("Type", Object::Name(b"Annot".to_vec()));
    widget.set("Subtype", Object::Name(b"Widget".to_vec()));
    widget.set(
        "Rect",
        Object::Array(field.rect.iter().map(|&c| Object::Real(c)).collect()),
    );

    if let Some(name) = &field.name {
        widget.set("T", Object::string_literal(name.as_str()));
    }
    if let Some(field_type) = field.field_type {
        widget.set("FT", Object::Name(field_type.as_bytes().to_vec()));
    }

    match &field.value {
        Some(FixtureValue::Text(text)) => widget.set("V", Object::string_literal(text.as_str())),
        Some(FixtureValue::Name(state)) => {
            widget.set("V", Object::Name(state.as_bytes().to_vec()));
            widget.set("AS", Object::Name(state.as_bytes().to_vec()));
        }
        Some(FixtureValue::Signed(signer)) => {
            let sig_id = doc.add_object(dictionary! {
                "Type" => "Sig",
                "Filter" => "Adobe.PPKLite",
                "SubFilter" => "adbe.pkcs7.detached",
                "Name" => Object::string_literal(signer.as_str()),
            });
            widget.set("V", Object::Reference(sig_id));
        }
        None => {}
    }

    doc.add_object(widget)
}

//! Standard security handler support
//!
//! Forms handed out by banks and FSPs are often protected with an owner
//! password only, so they open without prompting. Such documents are
//! decrypted with the empty user password as soon as they are loaded.
//! Anything needing a real user password is reported as a parse error.
//!
//! lopdf's own `Document::decrypt` only rewrites top-level strings and
//! streams, which leaves field names and values inside widget dictionaries
//! encrypted. This module walks every nested object instead.

use lopdf::encryption::{decrypt_object, get_encryption_key, DecryptionError};
use lopdf::{Document, Object, ObjectId, StringFormat};
use tracing::debug;

use crate::error::PdfError;

/// Decrypt `doc` in place if it carries an `/Encrypt` dictionary
pub fn decrypt_document(doc: &mut Document) -> Result<(), PdfError> {
    if !doc.is_encrypted() {
        return Ok(());
    }

    let encrypt_id = doc
        .trailer
        .get(b"Encrypt")
        .and_then(Object::as_reference)
        .map_err(|_| PdfError::Parse("encrypted document: /Encrypt is not a reference".to_string()))?;

    let metadata_encrypted = doc
        .get_encrypted()
        .ok()
        .and_then(|dict| dict.get(b"EncryptMetadata").ok())
        .and_then(|obj| obj.as_bool().ok())
        .unwrap_or(true);

    let key = get_encryption_key(doc, "", true)
        .map_err(|e| PdfError::Parse(format!("encrypted document: {}", e)))?;

    for (&id, object) in doc.objects.iter_mut() {
        if id == encrypt_id || skip_object(object, metadata_encrypted) {
            continue;
        }
        crypt_object(&key, id, object)
            .map_err(|e| PdfError::Parse(format!("encrypted document: {}", e)))?;
    }

    doc.trailer.remove(b"Encrypt");
    debug!("Decrypted document with the empty user password");
    Ok(())
}

/// Cross-reference streams are never encrypted, nor is metadata when
/// `/EncryptMetadata` is false
fn skip_object(object: &Object, metadata_encrypted: bool) -> bool {
    let Object::Stream(stream) = object else {
        return false;
    };
    match stream.dict.get(b"Type") {
        Ok(Object::Name(name)) if name == b"XRef" => true,
        Ok(Object::Name(name)) if name == b"Metadata" => !metadata_encrypted,
        _ => false,
    }
}

/// Apply the RC4 object cipher to every string and stream in `object`.
///
/// RC4 is symmetric, so the same pass encrypts plaintext objects.
pub(crate) fn crypt_object(
    key: &[u8],
    id: ObjectId,
    object: &mut Object,
) -> Result<(), DecryptionError> {
    match object {
        Object::String(content, _) => {
            *content = crypt_bytes(key, id, std::mem::take(content))?;
        }
        Object::Array(items) => {
            for item in items.iter_mut() {
                crypt_object(key, id, item)?;
            }
        }
        Object::Dictionary(dict) => {
            for (_, value) in dict.iter_mut() {
                crypt_object(key, id, value)?;
            }
        }
        Object::Stream(stream) => {
            for (_, value) in stream.dict.iter_mut() {
                crypt_object(key, id, value)?;
            }
            let content = crypt_bytes(key, id, std::mem::take(&mut stream.content))?;
            stream.set_content(content);
        }
        _ => {}
    }
    Ok(())
}

fn crypt_bytes(key: &[u8], id: ObjectId, bytes: Vec<u8>) -> Result<Vec<u8>, DecryptionError> {
    decrypt_object(key, id, &Object::String(bytes, StringFormat::Literal))
}

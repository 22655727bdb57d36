//! FAIS disclosure letter
//!
//! Signed by the client on up to three pages. Signature labels are
//! presented as `Signature N (page P)`, and unsigned signature widgets may
//! be rescued by the ink heuristic when one is configured.

use shared_types::FormType;

use crate::classifier::FormDefinition;
use crate::schema::{FieldGroup, FormSchema, RequiredField};

/// Field names only the FAIS letter carries
pub const KEYWORDS: &[&str] = &["FSP Name", "FSP Number", "Representative Code"];

/// Signature widgets, one per signing page
pub const SIGNATURE_FIELDS: &[&str] = &["Signature1", "Signature2", "Signature3"];

const SIGNATURE_PREFIX: &str = "Signature";

pub fn definition() -> FormDefinition {
    FormDefinition::new(KEYWORDS, schema())
}

pub fn schema() -> FormSchema {
    let mut required = vec![
        RequiredField::paged("Client Name"),
        RequiredField::paged("ID Number"),
        RequiredField::paged("Date"),
    ];
    required.extend(
        SIGNATURE_FIELDS
            .iter()
            .map(|name| RequiredField::signature(name, SIGNATURE_PREFIX)),
    );

    FormSchema {
        form_type: FormType::FaisLetter,
        groups: vec![FieldGroup::numbered(
            "Product Category",
            "Product Category",
            1..=4,
        )],
        required,
    }
}

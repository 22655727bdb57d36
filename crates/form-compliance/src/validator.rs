//! Schema validation: which groups and required fields are unmet

use std::path::Path;

use shared_types::{FieldRecord, MissingItems};
use tracing::debug;

use crate::schema::{FieldGroup, FormSchema, RequiredField};
use crate::signature::SignatureHeuristic;

/// Image fallback for unsigned signature fields.
///
/// Only consulted for required fields marked `image_fallback` whose first
/// record exists, has no value, and has a widget rectangle to crop.
#[derive(Clone, Copy)]
pub struct ImageFallback<'a> {
    pub heuristic: &'a dyn SignatureHeuristic,
    pub pdf_path: &'a Path,
}

/// Check `fields` against `schema`, returning the unmet labels.
///
/// Groups are reported first, then required fields, each in schema order.
pub fn validate(
    fields: &[FieldRecord],
    schema: &FormSchema,
    fallback: Option<ImageFallback<'_>>,
) -> MissingItems {
    let mut missing = MissingItems::new();

    for group in &schema.groups {
        if !group_satisfied(fields, group) {
            missing.insert(group.label.as_str());
        }
    }

    for required in &schema.required {
        if let Some(label) = check_required(fields, required, fallback) {
            missing.insert(label);
        }
    }

    missing
}

/// Any record named as a group member with a value satisfies the group
pub fn group_satisfied(fields: &[FieldRecord], group: &FieldGroup) -> bool {
    fields.iter().any(|f| {
        f.name
            .as_deref()
            .is_some_and(|name| group.contains(name))
            && f.has_value()
    })
}

/// Label to report for an unmet required field, or None when satisfied.
///
/// Only the first record with the field's name is considered; later
/// duplicates are ignored even if they carry a value.
fn check_required(
    fields: &[FieldRecord],
    required: &RequiredField,
    fallback: Option<ImageFallback<'_>>,
) -> Option<String> {
    let Some(record) = fields.iter().find(|f| f.name_is(&required.name)) else {
        return Some(required.label(None));
    };

    if record.has_value() {
        return None;
    }

    if required.image_fallback && ink_found(record, fallback) {
        debug!(
            "Ink found for unsigned field {} on page {}",
            required.name, record.page
        );
        return None;
    }

    Some(required.label(Some(record.page)))
}

fn ink_found(record: &FieldRecord, fallback: Option<ImageFallback<'_>>) -> bool {
    match (fallback, record.rect) {
        (Some(fallback), Some(region)) => {
            fallback
                .heuristic
                .is_signature_present(fallback.pdf_path, record.page, region)
        }
        _ => false,
    }
}

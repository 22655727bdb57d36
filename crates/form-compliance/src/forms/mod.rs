//! Built-in form catalogue
//!
//! Each module describes one form type: the keyword fields that identify
//! it and the schema a completed copy must satisfy.
//!
//! ## Priority
//!
//! [`builtin_catalogue`] returns definitions in classification priority
//! order. A document carrying keywords from more than one form is
//! classified as the earliest entry.

pub mod fais_letter;
pub mod risk_profile;

use crate::classifier::FormDefinition;

/// All known forms, highest classification priority first
pub fn builtin_catalogue() -> Vec<FormDefinition> {
    vec![fais_letter::definition(), risk_profile::definition()]
}

//! Risk profile questionnaire
//!
//! Each question is a row of numbered checkboxes; answering a question
//! means ticking any one of them.

use shared_types::FormType;

use crate::classifier::FormDefinition;
use crate::schema::{FieldGroup, FormSchema, RequiredField};

/// Field names only the questionnaire carries
pub const KEYWORDS: &[&str] = &["TOTAL SCORE", "Risk Profile Result"];

pub fn definition() -> FormDefinition {
    FormDefinition::new(KEYWORDS, schema())
}

pub fn schema() -> FormSchema {
    FormSchema {
        form_type: FormType::RiskProfileQuestionnaire,
        groups: vec![
            FieldGroup::numbered("Investment Term", "Investment Term", 1..=5),
            FieldGroup::numbered("Investment Experience", "Investment Experience", 1..=4),
            FieldGroup::numbered("Risk Tolerance", "Risk Tolerance", 1..=5),
        ],
        required: vec![
            RequiredField::plain("Client Name"),
            RequiredField::plain("Date"),
            RequiredField::plain("TOTAL SCORE"),
        ],
    }
}

//! Form type classification
//!
//! Each known form carries a handful of keyword field names that only
//! appear on that form. Definitions are tried in declaration order and the
//! first one with any keyword present wins; the number of matching
//! keywords does not matter.

use std::collections::HashSet;

use serde::Serialize;
use shared_types::{FieldRecord, FormType};

use crate::schema::FormSchema;

/// A known form: the keywords that identify it and the schema it must satisfy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormDefinition {
    pub keywords: Vec<String>,
    pub schema: FormSchema,
}

impl FormDefinition {
    pub fn new(keywords: &[&str], schema: FormSchema) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            schema,
        }
    }

    pub fn form_type(&self) -> FormType {
        self.schema.form_type
    }

    /// True when any keyword is among the document's field names
    pub fn matches(&self, names: &HashSet<&str>) -> bool {
        self.keywords.iter().any(|k| names.contains(k.as_str()))
    }
}

/// Ordered list of form definitions, highest priority first
#[derive(Debug, Clone)]
pub struct Classifier {
    definitions: Vec<FormDefinition>,
}

impl Classifier {
    pub fn new(definitions: Vec<FormDefinition>) -> Self {
        Self { definitions }
    }

    /// First definition whose keywords hit, or None for an unknown form
    pub fn classify(&self, fields: &[FieldRecord]) -> Option<&FormDefinition> {
        let names = field_names(fields);
        self.definitions.iter().find(|d| d.matches(&names))
    }

    pub fn classify_type(&self, fields: &[FieldRecord]) -> FormType {
        self.classify(fields)
            .map(FormDefinition::form_type)
            .unwrap_or(FormType::Unknown)
    }

    pub fn definitions(&self) -> &[FormDefinition] {
        &self.definitions
    }
}

/// Distinct non-null field names
pub fn field_names(fields: &[FieldRecord]) -> HashSet<&str> {
    fields.iter().filter_map(|f| f.name.as_deref()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms;

    fn named(name: &str) -> FieldRecord {
        FieldRecord {
            name: Some(name.to_string()),
            value: None,
            field_type: Some("Text".to_string()),
            page: 1,
            rect: None,
        }
    }

    fn unnamed() -> FieldRecord {
        FieldRecord {
            name: None,
            value: Some("x".to_string()),
            field_type: None,
            page: 1,
            rect: None,
        }
    }

    #[test]
    fn test_builtin_priority_order() {
        let classifier = Classifier::new(forms::builtin_catalogue());
        let order: Vec<FormType> = classifier
            .definitions()
            .iter()
            .map(FormDefinition::form_type)
            .collect();
        assert_eq!(
            order,
            vec![FormType::FaisLetter, FormType::RiskProfileQuestionnaire]
        );
    }

    #[test]
    fn test_classifies_risk_profile() {
        let classifier = Classifier::new(forms::builtin_catalogue());
        let fields = vec![named("Client Name"), named("TOTAL SCORE")];
        assert_eq!(
            classifier.classify_type(&fields),
            FormType::RiskProfileQuestionnaire
        );
    }

    #[test]
    fn test_classifies_fais_letter() {
        let classifier = Classifier::new(forms::builtin_catalogue());
        let fields = vec![named("Signature1"), named("FSP Number")];
        assert_eq!(classifier.classify_type(&fields), FormType::FaisLetter);
    }

    #[test]
    fn test_earlier_definition_wins_on_overlap() {
        let classifier = Classifier::new(forms::builtin_catalogue());
        // One FAIS keyword against two risk-profile keywords
        let fields = vec![
            named("TOTAL SCORE"),
            named("Risk Profile Result"),
            named("FSP Name"),
        ];
        assert_eq!(classifier.classify_type(&fields), FormType::FaisLetter);
    }

    #[test]
    fn test_declaration_order_not_keyword_count() {
        let reversed: Vec<FormDefinition> = forms::builtin_catalogue().into_iter().rev().collect();
        let classifier = Classifier::new(reversed);
        let fields = vec![named("FSP Name"), named("FSP Number"), named("TOTAL SCORE")];
        assert_eq!(
            classifier.classify_type(&fields),
            FormType::RiskProfileQuestionnaire
        );
    }

    #[test]
    fn test_unknown_when_nothing_matches() {
        let classifier = Classifier::new(forms::builtin_catalogue());
        let fields = vec![named("Client Name"), named("Date"), unnamed()];
        assert!(classifier.classify(&fields).is_none());
        assert_eq!(classifier.classify_type(&fields), FormType::Unknown);
    }

    #[test]
    fn test_empty_catalogue_is_always_unknown() {
        let classifier = Classifier::new(Vec::new());
        assert_eq!(classifier.classify_type(&[named("TOTAL SCORE")]), FormType::Unknown);
    }

    #[test]
    fn test_keyword_match_is_exact() {
        let classifier = Classifier::new(forms::builtin_catalogue());
        let fields = vec![named("total score"), named("TOTAL SCORE ")];
        assert_eq!(classifier.classify_type(&fields), FormType::Unknown);
    }
}

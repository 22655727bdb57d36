//! Form schemas: required fields and field groups per form type

use std::ops::RangeInclusive;

use serde::Serialize;
use shared_types::FormType;

/// A set of field-name aliases; any one non-empty member satisfies it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldGroup {
    pub label: String,
    pub members: Vec<String>,
}

impl FieldGroup {
    pub fn new<I, S>(label: &str, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label: label.to_string(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    /// Group of numbered variants, e.g. `Investment Term1` ..= `Investment Term5`
    pub fn numbered(label: &str, base: &str, numbers: RangeInclusive<u32>) -> Self {
        Self::new(label, numbers.map(|n| format!("{}{}", base, n)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|m| m == name)
    }
}

/// How a missing required field is presented to consumers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "style", rename_all = "snake_case")]
pub enum LabelStyle {
    /// The field name as-is
    Plain,
    /// Field name plus ` (page N)` when the field exists in the document.
    /// With `spaced_prefix`, a space goes between that prefix and the rest
    /// of the name (`Signature2` -> `Signature 2`).
    Paged { spaced_prefix: Option<String> },
}

impl LabelStyle {
    pub fn format(&self, name: &str, page: Option<u32>) -> String {
        match self {
            LabelStyle::Plain => name.to_string(),
            LabelStyle::Paged { spaced_prefix } => {
                let display = match spaced_prefix {
                    Some(prefix) => space_after_prefix(name, prefix),
                    None => name.to_string(),
                };
                match page {
                    Some(page) => format!("{} (page {})", display, page),
                    None => display,
                }
            }
        }
    }
}

fn space_after_prefix(name: &str, prefix: &str) -> String {
    match name.strip_prefix(prefix) {
        Some(rest) if !rest.is_empty() && !rest.starts_with(char::is_whitespace) => {
            format!("{} {}", prefix, rest)
        }
        _ => name.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequiredField {
    pub name: String,
    pub label_style: LabelStyle,
    /// Signature field that may be satisfied by ink found on the page image
    pub image_fallback: bool,
}

impl RequiredField {
    pub fn plain(name: &str) -> Self {
        Self {
            name: name.to_string(),
            label_style: LabelStyle::Plain,
            image_fallback: false,
        }
    }

    pub fn paged(name: &str) -> Self {
        Self {
            name: name.to_string(),
            label_style: LabelStyle::Paged {
                spaced_prefix: None,
            },
            image_fallback: false,
        }
    }

    /// Signature field, eligible for the image fallback
    pub fn signature(name: &str, prefix: &str) -> Self {
        Self {
            name: name.to_string(),
            label_style: LabelStyle::Paged {
                spaced_prefix: Some(prefix.to_string()),
            },
            image_fallback: true,
        }
    }

    pub fn label(&self, page: Option<u32>) -> String {
        self.label_style.format(&self.name, page)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSchema {
    pub form_type: FormType,
    pub groups: Vec<FieldGroup>,
    pub required: Vec<RequiredField>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_group_members() {
        let group = FieldGroup::numbered("Investment Term", "Investment Term", 1..=5);
        assert_eq!(group.members.len(), 5);
        assert_eq!(group.members[0], "Investment Term1");
        assert_eq!(group.members[4], "Investment Term5");
        assert!(group.contains("Investment Term3"));
        assert!(!group.contains("Investment Term"));
        assert!(!group.contains("Investment Term6"));
    }

    #[test]
    fn test_plain_label_is_name() {
        let field = RequiredField::plain("TOTAL SCORE");
        assert_eq!(field.label(Some(3)), "TOTAL SCORE");
        assert_eq!(field.label(None), "TOTAL SCORE");
    }

    #[test]
    fn test_signature_label_spaces_prefix_and_adds_page() {
        let field = RequiredField::signature("Signature2", "Signature");
        assert_eq!(field.label(Some(4)), "Signature 2 (page 4)");
        assert_eq!(field.label(None), "Signature 2");
        assert!(field.image_fallback);
    }

    #[test]
    fn test_spaced_prefix_leaves_other_names_alone() {
        let style = LabelStyle::Paged {
            spaced_prefix: Some("Signature".to_string()),
        };
        assert_eq!(style.format("Signature", None), "Signature");
        assert_eq!(style.format("Signature 3", None), "Signature 3");
        assert_eq!(style.format("Client Name", Some(1)), "Client Name (page 1)");
    }

    #[test]
    fn test_paged_label_without_prefix() {
        let field = RequiredField::paged("ID Number");
        assert_eq!(field.label(Some(2)), "ID Number (page 2)");
        assert!(!field.image_fallback);
    }
}

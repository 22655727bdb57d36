/// Field type label reported for `/FT /Sig` fields
pub const SIGNATURE_FIELD_TYPE: &str = "Signature";

/// Missing-item sentinel for documents that match no known form
pub const UNKNOWN_FORM_SENTINEL: &str = "Unknown form type";

/// Checkbox export value meaning "not ticked"
const CHECKBOX_OFF: &str = "Off";

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RegionBox {
    pub x1: f32, // Lower-left, PDF points
    pub y1: f32,
    pub x2: f32, // Upper-right, PDF points
    pub y2: f32,
}

impl RegionBox {
    /// Build a box from two arbitrary corners, normalising the order
    pub fn from_corners(ax: f32, ay: f32, bx: f32, by: f32) -> Self {
        Self {
            x1: ax.min(bx),
            y1: ay.min(by),
            x2: ax.max(bx),
            y2: ay.max(by),
        }
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FieldRecord {
    pub name: Option<String>,
    pub value: Option<String>,
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    pub page: u32, // 1-indexed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rect: Option<RegionBox>,
}

impl FieldRecord {
    /// True when the field carries a usable value.
    ///
    /// Blank strings and the unticked checkbox state do not count.
    pub fn has_value(&self) -> bool {
        match self.value.as_deref().map(str::trim) {
            Some(v) => !v.is_empty() && v != CHECKBOX_OFF,
            None => false,
        }
    }

    pub fn is_signature(&self) -> bool {
        self.field_type.as_deref() == Some(SIGNATURE_FIELD_TYPE)
    }

    pub fn name_is(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SignatureRecord {
    pub name: Option<String>,
    pub signed: bool,
    pub page: u32,
}

impl SignatureRecord {
    /// Derive the signature view of a field record
    pub fn from_field(field: &FieldRecord) -> Self {
        Self {
            name: field.name.clone(),
            signed: field.value.as_deref().is_some_and(|v| !v.is_empty()),
            page: field.page,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FormType {
    #[serde(rename = "FAIS Letter")]
    FaisLetter,
    #[serde(rename = "Risk Profile Questionnaire")]
    RiskProfileQuestionnaire,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl FormType {
    pub fn label(&self) -> &'static str {
        match self {
            FormType::FaisLetter => "FAIS Letter",
            FormType::RiskProfileQuestionnaire => "Risk Profile Questionnaire",
            FormType::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for FormType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Insertion-ordered set of missing requirement labels
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct MissingItems(Vec<String>);

impl MissingItems {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Add a label; returns false if it was already present
    pub fn insert(&mut self, label: impl Into<String>) -> bool {
        let label = label.into();
        if self.0.contains(&label) {
            return false;
        }
        self.0.push(label);
        true
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.iter().any(|l| l == label)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl<S: Into<String>> FromIterator<S> for MissingItems {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut items = MissingItems::new();
        for label in iter {
            items.insert(label);
        }
        items
    }
}

impl<'a> IntoIterator for &'a MissingItems {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ValidationResult {
    pub form_type: FormType,
    pub missing: MissingItems,
}

impl ValidationResult {
    /// Result for a document that matched no known form
    pub fn unknown() -> Self {
        Self {
            form_type: FormType::Unknown,
            missing: std::iter::once(UNKNOWN_FORM_SENTINEL).collect(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FormReport {
    pub form_type: FormType,
    pub missing: MissingItems,
    pub fields: Vec<FieldRecord>,
    pub signatures: Vec<SignatureRecord>,
    pub checked_at: u64,
}

pub mod classifier;
pub mod error;
pub mod forms;
pub mod schema;
pub mod signature;
#[cfg(test)]
mod test_support;
pub mod validator;

use std::path::Path;
use std::sync::Arc;

use shared_pdf::ExtractedFields;
use shared_types::{FieldRecord, FormReport, FormType, ValidationResult};
use tracing::info;

pub use classifier::{Classifier, FormDefinition};
pub use error::InspectError;
pub use schema::{FieldGroup, FormSchema, LabelStyle, RequiredField};
pub use signature::SignatureHeuristic;
pub use validator::{validate, ImageFallback};

/// FormInspector entry point: extract, classify, validate
pub struct FormInspector {
    classifier: Classifier,
    heuristic: Option<Arc<dyn SignatureHeuristic>>,
}

impl FormInspector {
    /// Inspector over the built-in catalogue with no image fallback
    pub fn new() -> Self {
        Self::with_catalogue(forms::builtin_catalogue())
    }

    /// Inspector over a custom catalogue, highest priority first
    pub fn with_catalogue(definitions: Vec<FormDefinition>) -> Self {
        Self {
            classifier: Classifier::new(definitions),
            heuristic: None,
        }
    }

    pub fn with_signature_heuristic(mut self, heuristic: Arc<dyn SignatureHeuristic>) -> Self {
        self.heuristic = Some(heuristic);
        self
    }

    pub fn catalogue(&self) -> &[FormDefinition] {
        self.classifier.definitions()
    }

    /// Known form types in classification order
    pub fn form_types(&self) -> Vec<FormType> {
        self.catalogue()
            .iter()
            .map(FormDefinition::form_type)
            .collect()
    }

    /// Inspect an in-memory PDF. The image fallback needs a file on disk,
    /// so it is never consulted here.
    pub fn inspect_bytes(&self, bytes: &[u8]) -> Result<FormReport, InspectError> {
        let extracted = shared_pdf::extract_from_bytes(bytes)?;
        let result = self.evaluate(&extracted.fields, None);
        Ok(report(result, extracted))
    }

    pub fn inspect_path(&self, path: &Path) -> Result<FormReport, InspectError> {
        let extracted = shared_pdf::extract_from_path(path)?;
        let result = self.evaluate(&extracted.fields, Some(path));
        Ok(report(result, extracted))
    }

    /// Classify `fields` and validate them against the matching schema.
    ///
    /// `pdf_path` enables the image fallback when a heuristic is configured.
    pub fn evaluate(&self, fields: &[FieldRecord], pdf_path: Option<&Path>) -> ValidationResult {
        let Some(definition) = self.classifier.classify(fields) else {
            info!("No known form matched {} field(s)", fields.len());
            return ValidationResult::unknown();
        };

        let fallback = match (self.heuristic.as_deref(), pdf_path) {
            (Some(heuristic), Some(pdf_path)) => Some(ImageFallback {
                heuristic,
                pdf_path,
            }),
            _ => None,
        };

        let missing = validate(fields, &definition.schema, fallback);
        info!(
            "Classified as {} with {} missing item(s)",
            definition.form_type(),
            missing.len()
        );

        ValidationResult {
            form_type: definition.form_type(),
            missing,
        }
    }
}

impl Default for FormInspector {
    fn default() -> Self {
        Self::new()
    }
}

fn report(result: ValidationResult, extracted: ExtractedFields) -> FormReport {
    FormReport {
        form_type: result.form_type,
        missing: result.missing,
        fields: extracted.fields,
        signatures: extracted.signatures,
        checked_at: chrono::Utc::now().timestamp() as u64,
    }
}

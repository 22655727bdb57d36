pub mod types;

pub use types::{
    FieldRecord, FormReport, FormType, MissingItems, RegionBox, SignatureRecord,
    ValidationResult, SIGNATURE_FIELD_TYPE, UNKNOWN_FORM_SENTINEL,
};

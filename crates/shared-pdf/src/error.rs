use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    #[error("PDF references missing object {0} {1} R")]
    MissingObject(u32, u16),

    #[error("Failed to read PDF: {0}")]
    Io(#[from] std::io::Error),
}

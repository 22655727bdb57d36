use shared_pdf::PdfError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InspectError {
    #[error(transparent)]
    Pdf(#[from] PdfError),
}

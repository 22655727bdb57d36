//! Image-based signature presence heuristic
//!
//! Best effort only: a page raster is cropped to the signature widget,
//! binarized at a fixed threshold and scanned for ink blobs. There is no
//! handwriting verification. A false negative adds a spurious missing item,
//! a false positive hides one; validation never depends on anything else
//! from this module.

pub mod ink;
pub mod raster;

use std::path::Path;

use shared_types::RegionBox;
use thiserror::Error;

pub use ink::{count_ink_blobs, crop_region, InkBlobHeuristic, DEFAULT_INK_THRESHOLD};
pub use raster::{EmbeddedImageRasterizer, PageRasterizer, RenderedPage};

/// Decides whether a signature region of a page contains ink
pub trait SignatureHeuristic: Send + Sync {
    /// `page` is 1-indexed; `region` is in PDF points
    fn is_signature_present(&self, pdf_path: &Path, page: u32, region: RegionBox) -> bool;
}

/// Heuristic that never finds a signature
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInkDetection;

impl SignatureHeuristic for NoInkDetection {
    fn is_signature_present(&self, _pdf_path: &Path, _page: u32, _region: RegionBox) -> bool {
        false
    }
}

#[derive(Error, Debug)]
pub enum HeuristicError {
    #[error("Failed to load PDF: {0}")]
    Pdf(String),

    #[error("Failed to read PDF: {0}")]
    Io(#[from] std::io::Error),

    #[error("Page {0} does not exist")]
    PageOutOfRange(u32),

    #[error("Page {0} has no embedded page image")]
    NoPageImage(u32),

    #[error("Unsupported page image: {0}")]
    UnsupportedImage(String),

    #[error("Failed to decode page image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Signature region falls outside the page image")]
    EmptyRegion,
}

//! Ink blob detection over a cropped, binarized page region

use std::path::Path;

use image::GrayImage;
use shared_types::RegionBox;
use tracing::{debug, warn};

use super::raster::{PageRasterizer, RenderedPage};
use super::{HeuristicError, SignatureHeuristic};

/// Luma below this is ink
pub const DEFAULT_INK_THRESHOLD: u8 = 128;

/// Any blob at all counts as a signature unless configured otherwise
const DEFAULT_MIN_BLOB_PIXELS: usize = 1;

pub struct InkBlobHeuristic<R> {
    rasterizer: R,
    threshold: u8,
    min_blob_pixels: usize,
}

impl<R: PageRasterizer> InkBlobHeuristic<R> {
    pub fn new(rasterizer: R) -> Self {
        Self {
            rasterizer,
            threshold: DEFAULT_INK_THRESHOLD,
            min_blob_pixels: DEFAULT_MIN_BLOB_PIXELS,
        }
    }

    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    /// Ignore specks smaller than this many pixels
    pub fn with_min_blob_pixels(mut self, pixels: usize) -> Self {
        self.min_blob_pixels = pixels.max(1);
        self
    }

    fn detect(&self, pdf_path: &Path, page: u32, region: RegionBox) -> Result<bool, HeuristicError> {
        let rendered = self.rasterizer.rasterize(pdf_path, page)?;
        let crop = crop_region(&rendered, region).ok_or(HeuristicError::EmptyRegion)?;
        let blobs = count_ink_blobs(&crop, self.threshold, self.min_blob_pixels);
        debug!(
            "Ink heuristic: page {} region {:?} -> {} blob(s)",
            page, region, blobs
        );
        Ok(blobs > 0)
    }
}

impl<R: PageRasterizer> SignatureHeuristic for InkBlobHeuristic<R> {
    fn is_signature_present(&self, pdf_path: &Path, page: u32, region: RegionBox) -> bool {
        match self.detect(pdf_path, page, region) {
            Ok(found) => found,
            Err(e) => {
                warn!("Signature ink check skipped for page {}: {}", page, e);
                false
            }
        }
    }
}

/// Map a region in PDF points onto the page raster and crop it.
///
/// PDF space grows upwards from the MediaBox origin, image space grows
/// downwards from the top-left corner.
pub fn crop_region(page: &RenderedPage, region: RegionBox) -> Option<GrayImage> {
    let (img_w, img_h) = page.image.dimensions();
    let pb = page.page_box;
    if pb.width <= 0.0 || pb.height <= 0.0 || img_w == 0 || img_h == 0 {
        return None;
    }

    let sx = img_w as f32 / pb.width;
    let sy = img_h as f32 / pb.height;
    let top_edge = pb.y0 + pb.height;

    let left = ((region.x1 - pb.x0) * sx).floor().max(0.0) as u32;
    let right = (((region.x2 - pb.x0) * sx).ceil().max(0.0) as u32).min(img_w);
    let top = ((top_edge - region.y2) * sy).floor().max(0.0) as u32;
    let bottom = (((top_edge - region.y1) * sy).ceil().max(0.0) as u32).min(img_h);

    if right <= left || bottom <= top {
        return None;
    }

    Some(image::imageops::crop_imm(&page.image, left, top, right - left, bottom - top).to_image())
}

/// Count 8-connected regions of pixels darker than `threshold`
/// that have at least `min_blob_pixels` pixels
pub fn count_ink_blobs(image: &GrayImage, threshold: u8, min_blob_pixels: usize) -> usize {
    let (width, height) = image.dimensions();
    let (w, h) = (width as usize, height as usize);
    let is_ink = |x: usize, y: usize| image.get_pixel(x as u32, y as u32).0[0] < threshold;

    let mut visited = vec![false; w * h];
    let mut stack = Vec::new();
    let mut blobs = 0;

    for start_y in 0..h {
        for start_x in 0..w {
            let idx = start_y * w + start_x;
            if visited[idx] || !is_ink(start_x, start_y) {
                continue;
            }

            visited[idx] = true;
            stack.push((start_x, start_y));
            let mut size = 0usize;

            while let Some((x, y)) = stack.pop() {
                size += 1;
                for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
                    for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                        let n = ny * w + nx;
                        if !visited[n] && is_ink(nx, ny) {
                            visited[n] = true;
                            stack.push((nx, ny));
                        }
                    }
                }
            }

            if size >= min_blob_pixels {
                blobs += 1;
            }
        }
    }

    blobs
}

//! Page rasters for the ink heuristic

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use shared_pdf::{load_document, page_box, resolve, PageBox};
use tracing::debug;

use super::HeuristicError;

/// A page as pixels, together with the PDF-space box it covers
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub image: GrayImage,
    pub page_box: PageBox,
}

/// Produces a grayscale raster of one page
pub trait PageRasterizer: Send + Sync {
    /// `page` is 1-indexed
    fn rasterize(&self, pdf_path: &Path, page: u32) -> Result<RenderedPage, HeuristicError>;
}

/// Uses the largest image XObject on the page as its raster.
///
/// Suited to scanned forms, where each page is a full-page scan with the
/// fillable widgets laid over it. Supports JPEG (`DCTDecode`) and 8-bit
/// `DeviceGray`/`DeviceRGB` samples, behind any chain of Flate or LZW
/// filters.
///
/// The most recently parsed document is kept, so checking every signature
/// field of one upload parses the PDF once. The entry is reused only while
/// the file's size and modification time are unchanged.
#[derive(Debug, Default)]
pub struct EmbeddedImageRasterizer {
    cache: Mutex<Option<CachedDocument>>,
}

#[derive(Debug)]
struct CachedDocument {
    path: PathBuf,
    len: u64,
    modified: Option<SystemTime>,
    doc: Arc<Document>,
}

impl EmbeddedImageRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn document(&self, pdf_path: &Path) -> Result<Arc<Document>, HeuristicError> {
        let metadata = std::fs::metadata(pdf_path)?;
        let len = metadata.len();
        let modified = metadata.modified().ok();

        {
            let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(cached) = cache.as_ref() {
                if cached.path == pdf_path && cached.len == len && cached.modified == modified {
                    return Ok(Arc::clone(&cached.doc));
                }
            }
        }

        debug!("Parsing {} for page rasters", pdf_path.display());
        let bytes = std::fs::read(pdf_path)?;
        let doc = load_document(&bytes).map_err(|e| HeuristicError::Pdf(e.to_string()))?;
        let doc = Arc::new(doc);

        *self.cache.lock().unwrap_or_else(PoisonError::into_inner) = Some(CachedDocument {
            path: pdf_path.to_path_buf(),
            len,
            modified,
            doc: Arc::clone(&doc),
        });
        Ok(doc)
    }
}

impl PageRasterizer for EmbeddedImageRasterizer {
    fn rasterize(&self, pdf_path: &Path, page: u32) -> Result<RenderedPage, HeuristicError> {
        let doc = self.document(pdf_path)?;
        let page_id = *doc
            .get_pages()
            .get(&page)
            .ok_or(HeuristicError::PageOutOfRange(page))?;

        let stream = largest_page_image(&doc, page_id).ok_or(HeuristicError::NoPageImage(page))?;
        let image = decode_image(stream)?;

        Ok(RenderedPage {
            image,
            page_box: page_box(&doc, page_id),
        })
    }
}

fn largest_page_image(doc: &Document, page_id: ObjectId) -> Option<&Stream> {
    let page = doc.get_object(page_id).ok()?.as_dict().ok()?;
    let resources = resolve(doc, page.get(b"Resources").ok()?).ok()?.as_dict().ok()?;
    let xobjects = resolve(doc, resources.get(b"XObject").ok()?).ok()?.as_dict().ok()?;

    xobjects
        .iter()
        .filter_map(|(_, obj)| match resolve(doc, obj).ok()? {
            Object::Stream(stream) if is_image(stream) => Some(stream),
            _ => None,
        })
        .max_by_key(|stream| {
            let (w, h) = dimensions(stream).unwrap_or((0, 0));
            u64::from(w) * u64::from(h)
        })
}

fn is_image(stream: &Stream) -> bool {
    matches!(stream.dict.get(b"Subtype"), Ok(Object::Name(name)) if name == b"Image")
}

fn dimensions(stream: &Stream) -> Option<(u32, u32)> {
    let width = stream.dict.get(b"Width").ok()?.as_i64().ok()?;
    let height = stream.dict.get(b"Height").ok()?.as_i64().ok()?;
    Some((u32::try_from(width).ok()?, u32::try_from(height).ok()?))
}

fn filter_names(stream: &Stream) -> Vec<Vec<u8>> {
    match stream.dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.clone()],
        Ok(Object::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Object::Name(name) => Some(name.clone()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Run the content through `filters`, which must all be lossless
/// transport filters
fn undo_filters(stream: &Stream, filters: &[Vec<u8>]) -> Result<Vec<u8>, HeuristicError> {
    if filters.is_empty() {
        return Ok(stream.content.clone());
    }

    // lopdf refuses to decode image streams, so decode a bare copy
    let mut dict = Dictionary::new();
    dict.set(
        "Filter",
        Object::Array(filters.iter().cloned().map(Object::Name).collect()),
    );
    if let Ok(params) = stream.dict.get(b"DecodeParms") {
        dict.set("DecodeParms", params.clone());
    }

    Stream::new(dict, stream.content.clone())
        .decompressed_content()
        .map_err(|e| HeuristicError::UnsupportedImage(format!("filter chain: {}", e)))
}

fn decode_image(stream: &Stream) -> Result<GrayImage, HeuristicError> {
    let filters = filter_names(stream);

    if let Some(dct) = filters.iter().position(|f| f == b"DCTDecode") {
        if dct + 1 != filters.len() {
            return Err(HeuristicError::UnsupportedImage(
                "filters after DCTDecode".to_string(),
            ));
        }
        let jpeg = undo_filters(stream, &filters[..dct])?;
        let decoded = image::load_from_memory_with_format(&jpeg, ImageFormat::Jpeg)?;
        return Ok(decoded.to_luma8());
    }

    let (width, height) = dimensions(stream)
        .ok_or_else(|| HeuristicError::UnsupportedImage("missing Width/Height".to_string()))?;

    let bits = stream
        .dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(8);
    if bits != 8 {
        return Err(HeuristicError::UnsupportedImage(format!(
            "{} bits per component",
            bits
        )));
    }

    let samples = undo_filters(stream, &filters)?;

    let malformed = || HeuristicError::UnsupportedImage("sample data does not match size".to_string());
    match stream.dict.get(b"ColorSpace") {
        Ok(Object::Name(space)) if space == b"DeviceGray" => {
            GrayImage::from_raw(width, height, samples).ok_or_else(malformed)
        }
        Ok(Object::Name(space)) if space == b"DeviceRGB" => {
            let rgb = RgbImage::from_raw(width, height, samples).ok_or_else(malformed)?;
            Ok(DynamicImage::ImageRgb8(rgb).to_luma8())
        }
        Ok(other) => Err(HeuristicError::UnsupportedImage(format!(
            "color space {:?}",
            other
        ))),
        Err(_) => Err(HeuristicError::UnsupportedImage(
            "missing ColorSpace".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{scanned_form, scanned_form_encoded, write_temp, ScanEncoding};
    use lopdf::dictionary;
    use shared_pdf::fixtures::FormFixture;

    #[test]
    fn test_rasterizes_embedded_gray_scan() {
        let mut scan = GrayImage::from_pixel(60, 80, image::Luma([255]));
        scan.put_pixel(10, 10, image::Luma([0]));
        let file = write_temp(&scanned_form(FormFixture::new().page(vec![]), &scan));

        let rendered = EmbeddedImageRasterizer::new().rasterize(file.path(), 1).unwrap();
        assert_eq!(rendered.image.dimensions(), (60, 80));
        assert_eq!(rendered.image.get_pixel(10, 10).0[0], 0);
        assert_eq!(rendered.page_box.width, 612.0);
        assert_eq!(rendered.page_box.height, 792.0);
    }

    #[test]
    fn test_page_out_of_range() {
        let scan = GrayImage::from_pixel(4, 4, image::Luma([255]));
        let file = write_temp(&scanned_form(FormFixture::new().page(vec![]), &scan));

        let err = EmbeddedImageRasterizer::new().rasterize(file.path(), 2).unwrap_err();
        assert!(matches!(err, HeuristicError::PageOutOfRange(2)));
    }

    #[test]
    fn test_page_without_scan_is_reported() {
        let file = write_temp(&FormFixture::new().page(vec![]).to_bytes());

        let err = EmbeddedImageRasterizer::new().rasterize(file.path(), 1).unwrap_err();
        assert!(matches!(err, HeuristicError::NoPageImage(1)));
    }

    fn dotted_scan() -> GrayImage {
        let mut scan = GrayImage::from_pixel(64, 64, image::Luma([255]));
        for x in 16..48 {
            for y in 16..48 {
                scan.put_pixel(x, y, image::Luma([0]));
            }
        }
        scan
    }

    #[test]
    fn test_rasterizes_flate_compressed_samples() {
        let scan = dotted_scan();
        let bytes = scanned_form_encoded(FormFixture::new().page(vec![]), &scan, ScanEncoding::Flate);
        let file = write_temp(&bytes);

        let rendered = EmbeddedImageRasterizer::new().rasterize(file.path(), 1).unwrap();
        assert_eq!(rendered.image, scan);
    }

    #[test]
    fn test_rasterizes_flate_wrapped_jpeg() {
        let scan = dotted_scan();
        let bytes = scanned_form_encoded(
            FormFixture::new().page(vec![]),
            &scan,
            ScanEncoding::FlateJpeg,
        );
        let file = write_temp(&bytes);

        let rendered = EmbeddedImageRasterizer::new().rasterize(file.path(), 1).unwrap();
        assert_eq!(rendered.image.dimensions(), (64, 64));
        // JPEG is lossy; the block centres keep their tone
        assert!(rendered.image.get_pixel(32, 32).0[0] < 64);
        assert!(rendered.image.get_pixel(4, 4).0[0] > 192);
    }

    #[test]
    fn test_document_is_parsed_once_per_file() {
        let scan = dotted_scan();
        let file = write_temp(&scanned_form(FormFixture::new().page(vec![]), &scan));
        let rasterizer = EmbeddedImageRasterizer::new();

        let first = rasterizer.document(file.path()).unwrap();
        let second = rasterizer.document(file.path()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        // A different file replaces the cached entry
        let other = write_temp(&FormFixture::new().page(vec![]).to_bytes());
        let third = rasterizer.document(other.path()).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert!(matches!(
            rasterizer.rasterize(other.path(), 1),
            Err(HeuristicError::NoPageImage(1))
        ));
    }

    #[test]
    fn test_rewritten_file_is_reparsed() {
        let file = write_temp(&FormFixture::new().page(vec![]).to_bytes());
        let rasterizer = EmbeddedImageRasterizer::new();
        assert!(matches!(
            rasterizer.rasterize(file.path(), 1),
            Err(HeuristicError::NoPageImage(1))
        ));

        let scan = dotted_scan();
        std::fs::write(file.path(), scanned_form(FormFixture::new().page(vec![]), &scan)).unwrap();
        let rendered = rasterizer.rasterize(file.path(), 1).unwrap();
        assert_eq!(rendered.image, scan);
    }

    #[test]
    fn test_rejects_filters_after_dct() {
        let stream = Stream::new(
            dictionary! {
                "Subtype" => "Image",
                "Filter" => vec![Object::from("DCTDecode"), Object::from("FlateDecode")],
            },
            vec![0xFF, 0xD8],
        );
        assert!(matches!(
            decode_image(&stream),
            Err(HeuristicError::UnsupportedImage(_))
        ));
    }

    #[test]
    fn test_rejects_unsupported_bit_depth() {
        let stream = Stream::new(
            dictionary! {
                "Subtype" => "Image",
                "Width" => Object::Integer(8),
                "Height" => Object::Integer(1),
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => Object::Integer(1),
            },
            vec![0xFF],
        );
        assert!(matches!(
            decode_image(&stream),
            Err(HeuristicError::UnsupportedImage(_))
        ));
    }
}

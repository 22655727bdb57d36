//! Scanned-form fixtures for heuristic and inspector tests

use std::io::{Cursor, Write};

use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::{DynamicImage, GrayImage, ImageFormat};
use lopdf::{dictionary, Document, Object, Stream};
use shared_pdf::fixtures::FormFixture;
use tempfile::NamedTempFile;

/// How the scan's samples are stored in the image XObject
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanEncoding {
    Raw,
    Flate,
    /// JPEG data, then Flate on top: `[/FlateDecode /DCTDecode]`
    FlateJpeg,
}

/// Build the fixture and lay `scan` under page 1 as a raw DeviceGray image
pub fn scanned_form(fixture: FormFixture, scan: &GrayImage) -> Vec<u8> {
    scanned_form_encoded(fixture, scan, ScanEncoding::Raw)
}

pub fn scanned_form_encoded(fixture: FormFixture, scan: &GrayImage, encoding: ScanEncoding) -> Vec<u8> {
    let mut doc = fixture.build();
    attach_scan(&mut doc, scan, encoding);
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

fn zlib(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}

fn jpeg(scan: &GrayImage) -> Vec<u8> {
    let mut buffer = Vec::new();
    DynamicImage::ImageLuma8(scan.clone())
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)
        .unwrap();
    buffer
}

fn attach_scan(doc: &mut Document, scan: &GrayImage, encoding: ScanEncoding) {
    let (w, h) = scan.dimensions();
    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => Object::Integer(w as i64),
        "Height" => Object::Integer(h as i64),
        "ColorSpace" => "DeviceGray",
        "BitsPerComponent" => Object::Integer(8),
    };
    let content = match encoding {
        ScanEncoding::Raw => scan.as_raw().clone(),
        ScanEncoding::Flate => {
            dict.set("Filter", "FlateDecode");
            zlib(scan.as_raw())
        }
        ScanEncoding::FlateJpeg => {
            dict.set(
                "Filter",
                vec![Object::from("FlateDecode"), Object::from("DCTDecode")],
            );
            zlib(&jpeg(scan))
        }
    };
    let image_id = doc.add_object(Stream::new(dict, content));

    let page_id = *doc.get_pages().get(&1).unwrap();
    doc.get_object_mut(page_id)
        .unwrap()
        .as_dict_mut()
        .unwrap()
        .set(
            "Resources",
            dictionary! {
                "XObject" => dictionary! { "Scan" => Object::Reference(image_id) },
            },
        );
}

pub fn write_temp(bytes: &[u8]) -> NamedTempFile {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(file.path(), bytes).unwrap();
    file
}

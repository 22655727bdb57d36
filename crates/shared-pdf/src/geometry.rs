//! Page geometry in PDF user-space points

use lopdf::{Dictionary, Document, Object, ObjectId};
use shared_types::RegionBox;

use crate::resolve;

/// Default US Letter media box
const DEFAULT_PAGE_BOX: PageBox = PageBox {
    x0: 0.0,
    y0: 0.0,
    width: 612.0,
    height: 792.0,
};

/// MediaBox inheritance is bounded to guard against cyclic page trees
const MAX_INHERITANCE_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub x0: f32,
    pub y0: f32,
    pub width: f32,
    pub height: f32,
}

/// Resolve a page's MediaBox, walking up the page tree if needed
pub fn page_box(doc: &Document, page_id: ObjectId) -> PageBox {
    let mut current = doc.get_object(page_id).and_then(Object::as_dict).ok();

    for _ in 0..MAX_INHERITANCE_DEPTH {
        let Some(dict) = current else { break };

        if let Some(region) = dict
            .get(b"MediaBox")
            .ok()
            .and_then(|obj| region_from_object(doc, obj))
        {
            return PageBox {
                x0: region.x1,
                y0: region.y1,
                width: region.width(),
                height: region.height(),
            };
        }

        current = parent_dict(doc, dict);
    }

    DEFAULT_PAGE_BOX
}

/// Read a four-number rectangle (`/Rect`, `/MediaBox`) as a region
pub fn region_from_object(doc: &Document, object: &Object) -> Option<RegionBox> {
    let array = resolve(doc, object).ok()?.as_array().ok()?;
    if array.len() < 4 {
        return None;
    }

    let mut coords = [0.0f32; 4];
    for (slot, item) in coords.iter_mut().zip(array.iter()) {
        *slot = resolve(doc, item).ok()?.as_float().ok()?;
    }

    Some(RegionBox::from_corners(
        coords[0], coords[1], coords[2], coords[3],
    ))
}

fn parent_dict<'a>(doc: &'a Document, dict: &'a Dictionary) -> Option<&'a Dictionary> {
    let parent = dict.get(b"Parent").ok()?;
    resolve(doc, parent).ok()?.as_dict().ok()
}

//! Page thumbnail metadata
//!
//! The JS renderer draws a placeholder of the right shape before the real
//! thumbnail arrives, so it needs each page's size and orientation up front.

use lopdf::{Dictionary, Document, Object};
use pdfinsanity_core::PdfInsanityError;
use serde::Serialize;

/// Letter, used when no MediaBox is found anywhere up the tree
const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// Page tree depth we are willing to walk for inherited attributes
const MAX_TREE_DEPTH: usize = 64;

/// Information about a single PDF page
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PageInfo {
    /// Page number (1-indexed), as the renderer expects it
    pub page_num: u32,
    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// Page rotation in degrees (0, 90, 180, 270)
    pub rotation: i32,
    /// Orientation as displayed, rotation included
    pub orientation: PageOrientation,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub enum PageOrientation {
    Portrait,
    Landscape,
    Square,
}

impl PageOrientation {
    fn of(width: f64, height: f64, rotation: i32) -> Self {
        let (width, height) = if rotation == 90 || rotation == 270 {
            (height, width)
        } else {
            (width, height)
        };
        if (width - height).abs() < 1.0 {
            PageOrientation::Square
        } else if width > height {
            PageOrientation::Landscape
        } else {
            PageOrientation::Portrait
        }
    }
}

/// Metadata for every page of a PDF, in page order
pub fn page_infos(bytes: &[u8]) -> Result<Vec<PageInfo>, PdfInsanityError> {
    let doc =
        Document::load_mem(bytes).map_err(|e| PdfInsanityError::ParseError(e.to_string()))?;

    doc.get_pages()
        .into_iter()
        .map(|(page_num, page_id)| {
            let page = doc.get_dictionary(page_id).map_err(|_| {
                PdfInsanityError::ParseError(format!("Page {} is not a dictionary", page_num))
            })?;
            PageInfo::from_dictionary(&doc, page, page_num)
        })
        .collect()
}

impl PageInfo {
    fn from_dictionary(
        doc: &Document,
        page: &Dictionary,
        page_num: u32,
    ) -> Result<Self, PdfInsanityError> {
        let media_box = match inherited(doc, page, b"MediaBox") {
            Some(object) => parse_box(doc, object)?,
            None => DEFAULT_MEDIA_BOX,
        };
        let width = (media_box[2] - media_box[0]).abs();
        let height = (media_box[3] - media_box[1]).abs();

        let rotation = inherited(doc, page, b"Rotate")
            .and_then(|object| object.as_i64().ok())
            .map(|angle| normalize_rotation(angle as i32))
            .unwrap_or(0);

        Ok(Self {
            page_num,
            width: width as f32,
            height: height as f32,
            rotation,
            orientation: PageOrientation::of(width, height, rotation),
        })
    }
}

/// Look `key` up on the page, then on each ancestor
fn inherited<'a>(doc: &'a Document, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut node = page;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// Parse a box array [x1, y1, x2, y2], following a reference if needed
fn parse_box(doc: &Document, object: &Object) -> Result<[f64; 4], PdfInsanityError> {
    let object = match object {
        Object::Reference(id) => doc
            .get_object(*id)
            .map_err(|e| PdfInsanityError::ParseError(e.to_string()))?,
        other => other,
    };
    let array = object
        .as_array()
        .map_err(|_| PdfInsanityError::ParseError("MediaBox is not an array".to_string()))?;
    if array.len() != 4 {
        return Err(PdfInsanityError::ParseError(
            "MediaBox must have 4 elements".to_string(),
        ));
    }

    let mut result = [0.0; 4];
    for (i, obj) in array.iter().enumerate() {
        result[i] = match obj {
            Object::Integer(n) => *n as f64,
            Object::Real(n) => *n as f64,
            _ => {
                return Err(PdfInsanityError::ParseError(format!(
                    "MediaBox element {} is not a number",
                    i
                )))
            }
        };
    }
    Ok(result)
}

fn normalize_rotation(angle: i32) -> i32 {
    angle.rem_euclid(360)
}

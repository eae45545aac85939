//! Page tree helpers shared by compose and merge

use crate::error::PdfInsanityError;
use lopdf::{Document, Object, ObjectId};

/// Attributes a page may inherit from its ancestors in the page tree
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// US Letter, used when no node in the chain declares a MediaBox
const DEFAULT_MEDIA_BOX: [i64; 4] = [0, 0, 612, 792];

/// Page ids in document order
pub(crate) fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

/// Copy inherited attributes onto the page itself.
///
/// Needed before a page is re-parented under a different `Pages` node.
/// A page with no MediaBox anywhere in its chain gets [`DEFAULT_MEDIA_BOX`].
pub(crate) fn materialize_inherited(
    doc: &mut Document,
    page_id: ObjectId,
) -> Result<(), PdfInsanityError> {
    let mut inherited = Vec::new();
    {
        let page = doc
            .get_dictionary(page_id)
            .map_err(|e| PdfInsanityError::OperationError(format!("Invalid page object: {}", e)))?;

        let missing: Vec<&[u8]> = INHERITABLE
            .iter()
            .copied()
            .filter(|key| !page.has(key))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }

        let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
        // Bounded walk in case of a cyclic tree
        let mut depth = 0;
        while let Some(parent_id) = parent {
            if depth > 64 {
                break;
            }
            depth += 1;
            let Ok(node) = doc.get_dictionary(parent_id) else {
                break;
            };
            for key in &missing {
                if inherited.iter().any(|(k, _)| k == key) {
                    continue;
                }
                if let Ok(value) = node.get(key) {
                    inherited.push((*key, value.clone()));
                }
            }
            parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        }

        let media_box: &[u8] = b"MediaBox";
        if missing.contains(&media_box) && !inherited.iter().any(|(k, _)| *k == media_box) {
            let default = DEFAULT_MEDIA_BOX.iter().map(|&v| Object::Integer(v)).collect();
            inherited.push((media_box, Object::Array(default)));
        }
    }

    if inherited.is_empty() {
        return Ok(());
    }
    let page = doc
        .get_dictionary_mut(page_id)
        .map_err(|e| PdfInsanityError::OperationError(format!("Invalid page object: {}", e)))?;
    for (key, value) in inherited {
        page.set(key.to_vec(), value);
    }
    Ok(())
}

/// Id of the root `Pages` node referenced by the catalog
pub(crate) fn root_pages_id(doc: &Document) -> Result<ObjectId, PdfInsanityError> {
    let catalog_id = doc
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| PdfInsanityError::OperationError("No Root in trailer".into()))?;

    let catalog = doc
        .get_dictionary(catalog_id)
        .map_err(|_| PdfInsanityError::OperationError("Invalid catalog".into()))?;

    catalog
        .get(b"Pages")
        .and_then(Object::as_reference)
        .map_err(|_| PdfInsanityError::OperationError("No Pages in catalog".into()))
}

/// Replace the page tree with a single flat `Pages` node holding `kids`.
///
/// Every kid must already be materialized: the root loses its inheritable
/// attributes.
pub(crate) fn set_flat_page_tree(
    doc: &mut Document,
    kids: &[ObjectId],
) -> Result<(), PdfInsanityError> {
    let pages_id = root_pages_id(doc)?;

    match doc.objects.get_mut(&pages_id) {
        Some(Object::Dictionary(pages_dict)) => {
            pages_dict.set(
                "Kids",
                Object::Array(kids.iter().map(|&id| Object::Reference(id)).collect()),
            );
            pages_dict.set("Count", Object::Integer(kids.len() as i64));
            pages_dict.remove(b"Parent");
            // Kids are materialized; anything left here would leak onto foreign pages
            for key in INHERITABLE {
                pages_dict.remove(key);
            }
        }
        _ => {
            return Err(PdfInsanityError::OperationError(
                "Invalid pages dictionary".into(),
            ))
        }
    }

    for &kid in kids {
        if let Ok(page) = doc.get_dictionary_mut(kid) {
            page.set("Parent", Object::Reference(pages_id));
        }
    }
    Ok(())
}

/// Serialize, optionally compressing streams first
pub(crate) fn save(mut doc: Document, compress: bool) -> Result<Vec<u8>, PdfInsanityError> {
    if compress {
        doc.compress();
    }
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| PdfInsanityError::OperationError(format!("Save failed: {}", e)))?;
    Ok(buffer)
}

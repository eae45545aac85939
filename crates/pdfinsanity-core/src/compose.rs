//! Build a document from an arrangement of another document's pages
//!
//! The arrangement is a list of 0-based page indices into the source. Any
//! order is allowed and an index may repeat; a repeated page gets its own
//! page dictionary sharing the original's content and resources.

use crate::error::PdfInsanityError;
use crate::page_tree::{materialize_inherited, page_ids, save, set_flat_page_tree};
use lopdf::{Document, ObjectId};
use std::collections::HashSet;

/// Compose a new PDF holding exactly the pages at `indices`, in that order.
///
/// The algorithm:
/// 1. Validate every index against the source page count
/// 2. Copy inherited attributes onto each page so it survives re-parenting
/// 3. Reuse a page object on first use, clone it on every repeat
/// 4. Rebuild a flat page tree and prune what is no longer reachable
pub fn compose_document(
    bytes: &[u8],
    indices: &[u32],
    compress: bool,
) -> Result<Vec<u8>, PdfInsanityError> {
    if indices.is_empty() {
        return Err(PdfInsanityError::InvalidPageIndex(
            "No pages specified".into(),
        ));
    }

    let mut doc =
        Document::load_mem(bytes).map_err(|e| PdfInsanityError::ParseError(e.to_string()))?;
    let pages = page_ids(&doc);

    if let Some(&bad) = indices.iter().find(|&&i| i as usize >= pages.len()) {
        return Err(PdfInsanityError::InvalidPageIndex(format!(
            "Page index {} does not exist (document has {} pages)",
            bad,
            pages.len()
        )));
    }

    for &page_id in &pages {
        materialize_inherited(&mut doc, page_id)?;
    }

    let mut used: HashSet<ObjectId> = HashSet::with_capacity(indices.len());
    let mut kids = Vec::with_capacity(indices.len());
    for &index in indices {
        let page_id = pages[index as usize];
        if used.insert(page_id) {
            kids.push(page_id);
        } else {
            let copy = doc
                .get_object(page_id)
                .map_err(|e| PdfInsanityError::OperationError(e.to_string()))?
                .clone();
            kids.push(doc.add_object(copy));
        }
    }

    set_flat_page_tree(&mut doc, &kids)?;
    doc.prune_objects();

    save(doc, compress)
}

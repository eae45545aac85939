//! PDF Merge algorithm
//!
//! Combines multiple PDFs into a single document.

use crate::error::PdfInsanityError;
use crate::page_tree::{materialize_inherited, page_ids, save, set_flat_page_tree};
use lopdf::{Document, Object, ObjectId};
use std::collections::BTreeMap;

/// Merge multiple PDFs into one
///
/// The algorithm:
/// 1. If empty, return error
/// 2. If single document, return it as-is
/// 3. Use the first document as the destination
/// 4. For each further source document:
///    a. Calculate ID offset to avoid conflicts
///    b. Import all objects with remapped IDs
///    c. Append its pages to the destination page list
/// 5. Rebuild one flat page tree, prune orphans, serialize
pub fn merge_documents(documents: &[&[u8]], compress: bool) -> Result<Vec<u8>, PdfInsanityError> {
    let (first, rest) = documents
        .split_first()
        .ok_or_else(|| PdfInsanityError::OperationError("No documents to merge".into()))?;

    if rest.is_empty() {
        return Ok(first.to_vec());
    }

    let mut dest = load(first, 0)?;
    let mut dest_page_refs = page_ids(&dest);
    for &page_id in &dest_page_refs {
        materialize_inherited(&mut dest, page_id)?;
    }
    let mut dest_max_id = dest.max_id;

    for (i, bytes) in rest.iter().enumerate() {
        let mut source = load(bytes, i + 1)?;
        let source_pages = page_ids(&source);
        for &page_id in &source_pages {
            materialize_inherited(&mut source, page_id)?;
        }

        let id_offset = dest_max_id;

        let remapped: BTreeMap<ObjectId, Object> = source
            .objects
            .into_iter()
            .map(|(old_id, object)| {
                (
                    (old_id.0 + id_offset, old_id.1),
                    remap_object_refs(object, id_offset),
                )
            })
            .collect();
        dest.objects.extend(remapped);

        dest_page_refs.extend(
            source_pages
                .into_iter()
                .map(|page| (page.0 + id_offset, page.1)),
        );

        dest_max_id = (source.max_id + id_offset).max(dest_max_id);
    }

    dest.max_id = dest_max_id;
    set_flat_page_tree(&mut dest, &dest_page_refs)?;
    // Drops the catalogs and page tree roots of the merged-in sources
    dest.prune_objects();

    save(dest, compress)
}

fn load(bytes: &[u8], position: usize) -> Result<Document, PdfInsanityError> {
    Document::load_mem(bytes).map_err(|e| {
        PdfInsanityError::ParseError(format!("Failed to load document {}: {}", position, e))
    })
}

/// Recursively remap object references in an object
fn remap_object_refs(obj: Object, offset: u32) -> Object {
    match obj {
        Object::Reference(id) => Object::Reference((id.0 + offset, id.1)),
        Object::Array(arr) => Object::Array(
            arr.into_iter()
                .map(|o| remap_object_refs(o, offset))
                .collect(),
        ),
        Object::Dictionary(mut dict) => {
            for (_, value) in dict.iter_mut() {
                *value = remap_object_refs(std::mem::replace(value, Object::Null), offset);
            }
            Object::Dictionary(dict)
        }
        Object::Stream(mut stream) => {
            for (_, value) in stream.dict.iter_mut() {
                *value = remap_object_refs(std::mem::replace(value, Object::Null), offset);
            }
            Object::Stream(stream)
        }
        other => other,
    }
}

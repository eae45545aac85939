//! Page edit transaction
//!
//! A working arrangement of a document's pages is a sequence of
//! [`PageReference`]s, each carrying the 0-based index of the page in the
//! document as last saved. Reorders, deletions and clones only rearrange or
//! filter that sequence; nothing touches PDF bytes until the arrangement is
//! committed by the document collection.

use crate::list::{move_item, ClickKind, Item, ItemId, OrderedSelectableList};
use std::collections::HashSet;

/// One page slot of the working arrangement. The payload is the original page index.
pub type PageReference = Item<u32>;

impl PageReference {
    /// Fresh slot pointing at `original_index`
    pub fn page(original_index: u32) -> Self {
        Item::new(original_index)
    }

    pub fn original_index(&self) -> u32 {
        self.payload
    }
}

/// True iff `working` differs from the identity arrangement of `page_count` pages
pub fn is_dirty(page_count: u32, working: &[PageReference]) -> bool {
    if working.len() != page_count as usize {
        return true;
    }
    working
        .iter()
        .enumerate()
        .any(|(i, page)| page.original_index() as usize != i)
}

/// The clean identity arrangement, with fresh ids
pub fn discard(page_count: u32) -> Vec<PageReference> {
    (0..page_count).map(PageReference::page).collect()
}

/// Duplicate every selected slot right after itself. Copies get fresh ids.
pub fn clone_selected(working: &[PageReference], selected: &HashSet<ItemId>) -> Vec<PageReference> {
    let mut result = Vec::with_capacity(working.len() + selected.len());
    for page in working {
        result.push(page.clone());
        if selected.contains(&page.id) {
            result.push(PageReference::page(page.original_index()));
        }
    }
    result
}

/// Drop every selected slot
pub fn delete_selected(
    working: &[PageReference],
    selected: &HashSet<ItemId>,
) -> Vec<PageReference> {
    working
        .iter()
        .filter(|page| !selected.contains(&page.id))
        .cloned()
        .collect()
}

/// Original indices of the selected slots, in working order
pub fn extract_indices(working: &[PageReference], selected: &HashSet<ItemId>) -> Vec<u32> {
    working
        .iter()
        .filter(|page| selected.contains(&page.id))
        .map(PageReference::original_index)
        .collect()
}

/// Move `moved` into the slot of `target`
pub fn reorder(working: &[PageReference], moved: ItemId, target: ItemId) -> Vec<PageReference> {
    let mut result = working.to_vec();
    move_item(&mut result, moved, target);
    result
}

/// The commit payload: original indices in working order
pub fn original_indices(working: &[PageReference]) -> Vec<u32> {
    working.iter().map(PageReference::original_index).collect()
}

/// Page list of the inspected document
#[derive(Debug, Clone)]
pub struct PageEditor {
    document_id: ItemId,
    revision: u64,
    page_count: u32,
    pages: OrderedSelectableList<u32>,
}

impl PageEditor {
    /// Start from the identity arrangement of a document revision
    pub fn open(document_id: ItemId, revision: u64, page_count: u32) -> Self {
        Self {
            document_id,
            revision,
            page_count,
            pages: OrderedSelectableList::from_items(discard(page_count)),
        }
    }

    pub fn document_id(&self) -> ItemId {
        self.document_id
    }

    /// Revision of the document this arrangement was opened against
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Page count of the document as last saved
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn pages(&self) -> &[PageReference] {
        self.pages.items()
    }

    pub fn is_selected(&self, id: ItemId) -> bool {
        self.pages.is_selected(id)
    }

    pub fn has_selection(&self) -> bool {
        self.pages.has_selection()
    }

    pub fn is_dirty(&self) -> bool {
        is_dirty(self.page_count, self.pages.items())
    }

    /// Pages cannot be inspected, so a double click acts as a plain click.
    pub fn route_click(&mut self, kind: ClickKind, id: ItemId) {
        let kind = match kind {
            ClickKind::Double => ClickKind::Plain,
            other => other,
        };
        self.pages.route_click(kind, id);
    }

    pub fn click_outside(&mut self) {
        self.pages.clear_selection();
    }

    pub fn reorder(&mut self, moved: ItemId, target: ItemId) -> bool {
        self.pages.reorder(moved, target)
    }

    pub fn discard(&mut self) {
        self.pages.set_items(discard(self.page_count));
    }

    pub fn clone_selected(&mut self) {
        let cloned = clone_selected(self.pages.items(), &self.pages.selection_set());
        self.pages.set_items(cloned);
    }

    pub fn delete_selected(&mut self) {
        let kept = delete_selected(self.pages.items(), &self.pages.selection_set());
        self.pages.set_items(kept);
    }

    /// Original indices of the selected pages, for "extract as"
    pub fn extract_selection(&self) -> Vec<u32> {
        extract_indices(self.pages.items(), &self.pages.selection_set())
    }

    /// Original indices to hand to a commit
    pub fn commit_indices(&self) -> Vec<u32> {
        original_indices(self.pages.items())
    }
}

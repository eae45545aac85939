//! Ordered, selectable item lists
//!
//! One generic list backs both the document list and the page list of the
//! inspected document. The list owns display order, the selection and the
//! optional inspected id, and turns resolved clicks into selection changes.
//!
//! Invariants held after every operation:
//! - ids are unique within the list
//! - every selected id is present in the list
//! - the inspected id, if any, is present in the list

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque item identifier. Stable across reorders, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Mint a fresh id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ItemId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// An identified list element
#[derive(Debug, Clone, PartialEq)]
pub struct Item<T> {
    pub id: ItemId,
    pub payload: T,
}

impl<T> Item<T> {
    /// Wrap a payload under a freshly minted id
    pub fn new(payload: T) -> Self {
        Self {
            id: ItemId::new(),
            payload,
        }
    }
}

/// Pointer interaction, resolved once at the UI boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClickKind {
    /// No modifier: select exactly the clicked item
    Plain,
    /// Ctrl/Cmd: toggle the clicked item
    Toggle,
    /// Shift: extend the selection to a contiguous range
    Range,
    /// Double click: toggle inspection
    Double,
}

impl ClickKind {
    /// Resolve raw event flags. Double click wins, then ctrl/meta, then shift.
    pub fn from_modifiers(ctrl: bool, meta: bool, shift: bool, double: bool) -> Self {
        if double {
            ClickKind::Double
        } else if ctrl || meta {
            ClickKind::Toggle
        } else if shift {
            ClickKind::Range
        } else {
            ClickKind::Plain
        }
    }
}

/// Move `moved` into the slot currently held by `target`.
///
/// Returns false (and leaves `items` alone) when the ids are equal or either
/// one is absent.
pub fn move_item<T>(items: &mut Vec<Item<T>>, moved: ItemId, target: ItemId) -> bool {
    if moved == target {
        return false;
    }
    let Some(from) = items.iter().position(|item| item.id == moved) else {
        return false;
    };
    let Some(to) = items.iter().position(|item| item.id == target) else {
        return false;
    };

    let item = items.remove(from);
    items.insert(to, item);
    true
}

/// Ordered collection with selection and inspection state
#[derive(Debug, Clone)]
pub struct OrderedSelectableList<T> {
    items: Vec<Item<T>>,
    /// Selected ids in the order they were added; the last one anchors range clicks
    selection: Vec<ItemId>,
    inspected: Option<ItemId>,
}

impl<T> Default for OrderedSelectableList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            selection: Vec::new(),
            inspected: None,
        }
    }
}

impl<T> OrderedSelectableList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from existing items. Later duplicates of an id are dropped.
    pub fn from_items(items: impl IntoIterator<Item = Item<T>>) -> Self {
        let mut list = Self::new();
        for item in items {
            list.push_item(item);
        }
        list
    }

    /// Append payloads under fresh ids, returning the ids in insertion order
    pub fn insert(&mut self, payloads: impl IntoIterator<Item = T>) -> Vec<ItemId> {
        payloads
            .into_iter()
            .map(|payload| {
                let item = Item::new(payload);
                let id = item.id;
                self.items.push(item);
                id
            })
            .collect()
    }

    /// Append an already identified item. Returns false if the id is taken.
    pub fn push_item(&mut self, item: Item<T>) -> bool {
        if self.contains(item.id) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Remove every item whose id is in `ids`, pruning selection and inspection
    pub fn remove(&mut self, ids: impl IntoIterator<Item = ItemId>) -> Vec<Item<T>> {
        let ids: HashSet<ItemId> = ids.into_iter().collect();
        if ids.is_empty() {
            return Vec::new();
        }

        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.items)
            .into_iter()
            .partition(|item| ids.contains(&item.id));
        self.items = kept;

        self.selection.retain(|id| !ids.contains(id));
        if self.inspected.is_some_and(|id| ids.contains(&id)) {
            self.inspected = None;
        }
        removed
    }

    /// Replace the whole sequence, pruning state that no longer resolves
    pub fn set_items(&mut self, items: Vec<Item<T>>) {
        let mut seen = HashSet::with_capacity(items.len());
        self.items = items
            .into_iter()
            .filter(|item| seen.insert(item.id))
            .collect();
        self.selection.retain(|id| seen.contains(id));
        if self.inspected.is_some_and(|id| !seen.contains(&id)) {
            self.inspected = None;
        }
    }

    /// Swap the payload of `id`, keeping its id and position
    pub fn replace_payload(&mut self, id: ItemId, payload: T) -> Option<T> {
        self.items
            .iter_mut()
            .find(|item| item.id == id)
            .map(|item| std::mem::replace(&mut item.payload, payload))
    }

    /// Drag-and-drop reorder; see [`move_item`]
    pub fn reorder(&mut self, moved: ItemId, target: ItemId) -> bool {
        move_item(&mut self.items, moved, target)
    }

    /// Apply a resolved click on `id`. Clicks on unknown ids are ignored.
    pub fn route_click(&mut self, kind: ClickKind, id: ItemId) {
        if !self.contains(id) {
            return;
        }
        match kind {
            ClickKind::Double => self.toggle_inspected(id),
            ClickKind::Toggle => self.toggle_selected(id),
            ClickKind::Range => self.select_range(id),
            ClickKind::Plain => self.select_only(id),
        }
    }

    /// Make `id` the whole selection
    pub fn select_only(&mut self, id: ItemId) {
        if self.contains(id) {
            self.selection = vec![id];
        }
    }

    pub fn toggle_selected(&mut self, id: ItemId) {
        if !self.contains(id) {
            return;
        }
        if let Some(pos) = self.selection.iter().position(|s| *s == id) {
            self.selection.remove(pos);
        } else {
            self.selection.push(id);
        }
    }

    /// Union the display-order range between the anchor and `id` into the selection.
    ///
    /// The anchor is the most recently added selected id; with an empty
    /// selection the range degenerates to `id` alone. The clicked id ends up
    /// last so it anchors the next range click.
    pub fn select_range(&mut self, id: ItemId) {
        let Some(clicked) = self.position(id) else {
            return;
        };
        let anchor = self
            .selection
            .last()
            .and_then(|anchor| self.position(*anchor))
            .unwrap_or(clicked);
        let (start, end) = if anchor <= clicked {
            (anchor, clicked)
        } else {
            (clicked, anchor)
        };

        let range: Vec<ItemId> = self.items[start..=end]
            .iter()
            .map(|item| item.id)
            .filter(|range_id| *range_id != id)
            .collect();
        for range_id in range {
            if !self.selection.contains(&range_id) {
                self.selection.push(range_id);
            }
        }
        self.selection.retain(|selected| *selected != id);
        self.selection.push(id);
    }

    pub fn toggle_inspected(&mut self, id: ItemId) {
        if !self.contains(id) {
            return;
        }
        self.inspected = if self.inspected == Some(id) {
            None
        } else {
            Some(id)
        };
    }

    /// Point inspection at `id`. Returns false if `id` is unknown.
    pub fn inspect(&mut self, id: ItemId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.inspected = Some(id);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn clear_inspection(&mut self) {
        self.inspected = None;
    }

    /// Click that hit no item
    pub fn click_outside(&mut self) {
        self.clear_selection();
        self.clear_inspection();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    pub fn position(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    pub fn get(&self, id: ItemId) -> Option<&Item<T>> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item<T>> {
        self.items.iter()
    }

    /// Items in display order
    pub fn items(&self) -> &[Item<T>] {
        &self.items
    }

    pub fn ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.id).collect()
    }

    /// Selected ids in the order they were added
    pub fn selected_ids(&self) -> &[ItemId] {
        &self.selection
    }

    pub fn selection_set(&self) -> HashSet<ItemId> {
        self.selection.iter().copied().collect()
    }

    /// Selected ids in display order
    pub fn selected_in_display_order(&self) -> Vec<ItemId> {
        self.items
            .iter()
            .filter(|item| self.selection.contains(&item.id))
            .map(|item| item.id)
            .collect()
    }

    pub fn is_selected(&self, id: ItemId) -> bool {
        self.selection.contains(&id)
    }

    pub fn has_selection(&self) -> bool {
        !self.selection.is_empty()
    }

    pub fn inspected(&self) -> Option<ItemId> {
        self.inspected
    }
}

//! Selection Set
//!
//! Tracks which items the user has marked. Membership is by [`ItemId`], and
//! ids that no longer appear in the catalog are kept: a refresh that drops an
//! item and later brings it back restores the mark.

use std::collections::BTreeSet;

use crate::item::ItemId;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: BTreeSet<ItemId>,
}

impl SelectionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert if absent, remove if present. Returns whether the id is now selected.
    pub fn toggle(&mut self, id: &ItemId) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.clone());
            true
        }
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemId> {
        self.ids.iter()
    }
}

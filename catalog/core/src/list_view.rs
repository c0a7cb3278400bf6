//! List/Filter View
//!
//! Holds the full catalog, the subset visible under the current filter and
//! the cursor into that subset.
//!
//! # Invariants
//!
//! - When the visible subset is non-empty, `cursor < visible_len()`
//! - When it is empty, `cursor == 0` and [`ListView::current_item`] is `None`
//! - The visible subset keeps the backing order
//!
//! Focus follows identity: when the backing items or the filter change, the
//! cursor moves to wherever the previously focused item ended up.

use crate::item::{Item, ItemId};

/// Whether keys edit the filter or drive the list
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Browsing,
    Filtering,
}

#[derive(Clone, Debug, Default)]
pub struct ListView {
    items: Vec<Item>,
    /// Indices into `items`
    visible: Vec<usize>,
    cursor: usize,
    filter: String,
    mode: InputMode,
}

impl ListView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Core operations
    // =========================================================================

    /// Replace the backing items and reapply the filter
    pub fn set_items(&mut self, items: Vec<Item>) {
        let focused = self.current_item().map(|item| item.id.clone());

        self.items = items;
        self.recompute_visible();

        let found = focused.as_ref().and_then(|id| self.position_of_id(id));
        self.cursor = match found {
            Some(pos) => pos,
            None => self.clamped(self.cursor),
        };
    }

    /// Replace the filter text and recompute the visible subset
    pub fn set_filter_text(&mut self, text: impl Into<String>) {
        let focused = self.visible.get(self.cursor).copied();

        self.filter = text.into();
        self.recompute_visible();

        let found = focused.and_then(|backing| self.visible.iter().position(|&i| i == backing));
        self.cursor = match found {
            Some(pos) => pos,
            None if self.cursor < self.visible.len() => self.cursor,
            None => 0,
        };
    }

    /// Move the cursor by `delta`, clamped to the visible range
    pub fn move_cursor(&mut self, delta: isize) {
        if self.visible.is_empty() {
            self.cursor = 0;
            return;
        }
        let target = self.cursor.saturating_add_signed(delta);
        self.cursor = self.clamped(target);
    }

    /// The focused item, if any is visible
    pub fn current_item(&self) -> Option<&Item> {
        self.visible.get(self.cursor).map(|&i| &self.items[i])
    }

    /// Put the cursor on the first visible item
    pub fn focus_first(&mut self) {
        self.cursor = 0;
    }

    // =========================================================================
    // Filter entry
    // =========================================================================

    /// Start editing the filter; existing text is kept for editing
    pub fn begin_filter(&mut self) {
        self.mode = InputMode::Filtering;
    }

    pub fn push_filter_char(&mut self, c: char) {
        let mut text = self.filter.clone();
        text.push(c);
        self.set_filter_text(text);
    }

    pub fn pop_filter_char(&mut self) {
        let mut text = self.filter.clone();
        if text.pop().is_some() {
            self.set_filter_text(text);
        }
    }

    /// Keep the filter and return to browsing
    pub fn accept_filter(&mut self) {
        self.mode = InputMode::Browsing;
    }

    /// Drop the filter and return to browsing
    pub fn cancel_filter(&mut self) {
        self.mode = InputMode::Browsing;
        self.clear_filter();
    }

    pub fn clear_filter(&mut self) {
        if !self.filter.is_empty() {
            self.set_filter_text(String::new());
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn visible_items(&self) -> impl Iterator<Item = &Item> + '_ {
        self.visible.iter().map(move |&i| &self.items[i])
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn total_len(&self) -> usize {
        self.items.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn filter_text(&self) -> &str {
        &self.filter
    }

    pub fn has_filter(&self) -> bool {
        !self.filter.is_empty()
    }

    pub fn input_mode(&self) -> InputMode {
        self.mode
    }

    pub fn is_filtering(&self) -> bool {
        self.mode == InputMode::Filtering
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn recompute_visible(&mut self) {
        let filter = self.filter.as_str();
        self.visible = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.matches(filter))
            .map(|(i, _)| i)
            .collect();
    }

    fn position_of_id(&self, id: &ItemId) -> Option<usize> {
        self.visible.iter().position(|&i| &self.items[i].id == id)
    }

    fn clamped(&self, index: usize) -> usize {
        index.min(self.visible.len().saturating_sub(1))
    }
}

// Selection state, keyed by render-facing ids. Owned by the UI layer;
// must be reconciled against the live id set after every structural edit
// so stale ids never remain selected.

use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: HashSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// A plain click replaces the whole selection with the clicked id.
    pub fn click(&mut self, id: impl Into<String>) {
        self.ids.clear();
        self.ids.insert(id.into());
    }

    /// Multi-select: add the id, or drop it if already selected.
    pub fn toggle(&mut self, id: impl Into<String>) {
        let id = id.into();
        if !self.ids.remove(&id) {
            self.ids.insert(id);
        }
    }

    /// Background/canvas click.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Keep only ids the predicate accepts. Called with the current
    /// node/edge id set after removals and reloads.
    pub fn retain<F: FnMut(&str) -> bool>(&mut self, mut keep: F) {
        self.ids.retain(|id| keep(id));
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

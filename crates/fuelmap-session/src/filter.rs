//! Brand filter over the ranked catalog.

use std::collections::BTreeSet;

use fuelmap_core::{BrandTag, RankedPlace};

/// The user's brand selection. An empty selection shows everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterEngine {
    selection: BTreeSet<BrandTag>,
}

impl FilterEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_selection(&mut self, tags: impl IntoIterator<Item = BrandTag>) {
        self.selection = tags.into_iter().collect();
    }

    /// Flips `tag` in the selection. Returns whether it is now selected.
    pub fn toggle(&mut self, tag: BrandTag) -> bool {
        if self.selection.remove(&tag) {
            false
        } else {
            self.selection.insert(tag);
            true
        }
    }

    pub fn clear(&mut self) {
        self.selection.clear();
    }

    #[must_use]
    pub fn selection(&self) -> &BTreeSet<BrandTag> {
        &self.selection
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.selection.is_empty()
    }

    /// Keeps the entries whose brand is selected, preserving input order.
    ///
    /// Untagged places only survive when no filter is active.
    #[must_use]
    pub fn visible(&self, ranked: Vec<RankedPlace>) -> Vec<RankedPlace> {
        if self.selection.is_empty() {
            return ranked;
        }
        ranked
            .into_iter()
            .filter(|r| r.place.brand.is_some_and(|b| self.selection.contains(&b)))
            .collect()
    }
}

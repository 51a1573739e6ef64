//! The workspace value passed into every core function.
//!
//! There is deliberately no "active workspace" global: selection and
//! persistence belong to outer collaborators, and the core only ever sees an
//! explicit snapshot.

use serde::{Deserialize, Serialize};

use crate::core::dataset::Dataset;
use crate::core::view::View;

/// A snapshot of everything the user has imported and defined.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    pub datasets: Vec<Dataset>,
    pub views: Vec<View>,
}

impl Workspace {
    pub fn new(datasets: Vec<Dataset>, views: Vec<View>) -> Self {
        Self { datasets, views }
    }

    pub fn dataset(&self, id: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.id == id)
    }

    pub fn view(&self, id: &str) -> Option<&View> {
        self.views.iter().find(|v| v.id == id)
    }

    /// Returns a copy with `dataset` added or replaced by id.
    pub fn with_dataset(&self, dataset: Dataset) -> Self {
        let mut copy = self.clone();
        match copy.datasets.iter_mut().find(|d| d.id == dataset.id) {
            Some(slot) => *slot = dataset,
            None => copy.datasets.push(dataset),
        }
        copy
    }

    /// Returns a copy without the named dataset. Views that referenced it
    /// are kept as-is; materialization degrades them to empty results.
    pub fn without_dataset(&self, id: &str) -> Self {
        let mut copy = self.clone();
        copy.datasets.retain(|d| d.id != id);
        copy
    }

    pub fn with_view(&self, view: View) -> Self {
        let mut copy = self.clone();
        match copy.views.iter_mut().find(|v| v.id == view.id) {
            Some(slot) => *slot = view,
            None => copy.views.push(view),
        }
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_lookup_and_replace() {
        let ws = Workspace::default()
            .with_dataset(Dataset::new("a", "first", vec![], vec![]))
            .with_dataset(Dataset::new("b", "second", vec![], vec![]));
        assert_eq!(ws.dataset("a").unwrap().name, "first");
        assert!(ws.dataset("c").is_none());

        let replaced = ws.with_dataset(Dataset::new("a", "renamed", vec![], vec![]));
        assert_eq!(replaced.datasets.len(), 2);
        assert_eq!(replaced.dataset("a").unwrap().name, "renamed");
        // original snapshot untouched
        assert_eq!(ws.dataset("a").unwrap().name, "first");
    }

    #[test]
    fn dataset_removal_keeps_views() {
        let view = View {
            id: "v".into(),
            name: "v".into(),
            combine_mode: crate::core::view::CombineMode::RowIndex,
            columns: vec![],
            join_config: None,
        };
        let ws = Workspace::new(vec![Dataset::new("a", "a", vec![], vec![])], vec![view]);
        let pruned = ws.without_dataset("a");
        assert!(pruned.dataset("a").is_none());
        assert_eq!(pruned.views.len(), 1);
    }
}

//! Partitioning of a dataset into numbered study groups.

use crate::models::{Dataset, GroupId, VocabItem};
use std::collections::HashMap;

/// Items grouped by group identifier.
#[derive(Debug, Clone, Default)]
pub struct GroupIndex {
    groups: HashMap<GroupId, Vec<VocabItem>>,
    ids: Vec<GroupId>,
}

impl GroupIndex {
    /// Build the index. Items within a group are ordered by ascending
    /// sequence key; group ids are sorted numerically.
    pub fn build(dataset: &Dataset) -> Self {
        let mut sorted: Vec<&VocabItem> = dataset.items().iter().collect();
        sorted.sort_by_key(|item| item.key);

        let mut groups: HashMap<GroupId, Vec<VocabItem>> = HashMap::new();
        for item in sorted {
            groups.entry(item.group).or_default().push(item.clone());
        }

        let mut ids: Vec<GroupId> = groups.keys().copied().collect();
        ids.sort_unstable();

        Self { groups, ids }
    }

    /// Distinct group ids, ascending.
    pub fn group_ids(&self) -> &[GroupId] {
        &self.ids
    }

    /// Canonical order of a group, if it exists.
    pub fn items(&self, group: GroupId) -> Option<&[VocabItem]> {
        self.groups.get(&group).map(Vec::as_slice)
    }

    /// Number of words in a group (0 for unknown groups).
    pub fn group_len(&self, group: GroupId) -> usize {
        self.groups.get(&group).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

//! Marked rows

use std::collections::BTreeSet;

use crate::core::{EntityId, Snapshot};

/// Result of toggling a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Marked,
    Unmarked,
}

/// Identity-keyed set of marked entities
///
/// Membership is independent of list order and survives reconciliation
/// until the entity disappears from a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    marked: BTreeSet<EntityId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, id: &str) -> Mark {
        if self.marked.remove(id) {
            Mark::Unmarked
        } else {
            self.marked.insert(id.to_string());
            Mark::Marked
        }
    }

    pub fn clear(&mut self) {
        self.marked.clear();
    }

    pub fn is_marked(&self, id: &str) -> bool {
        self.marked.contains(id)
    }

    /// Marked identities in lexicographic order
    pub fn active_identities(&self) -> Vec<EntityId> {
        self.marked.iter().cloned().collect()
    }

    /// Drop marks for entities no longer in `snapshot`, returning how many went
    pub fn prune(&mut self, snapshot: &Snapshot) -> usize {
        let before = self.marked.len();
        self.marked.retain(|id| snapshot.contains(id));
        before - self.marked.len()
    }

    pub fn len(&self) -> usize {
        self.marked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marked.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ContainerSummary, Entity, EntityKind};
    use chrono::Utc;

    fn snapshot(ids: &[&str]) -> Snapshot {
        let now = Utc::now();
        Snapshot::new(
            EntityKind::Container,
            ids.iter()
                .map(|id| {
                    Entity::from_container(
                        &ContainerSummary {
                            id: id.to_string(),
                            ..Default::default()
                        },
                        now,
                    )
                })
                .collect(),
        )
    }

    #[test]
    fn test_toggle_is_its_own_inverse() {
        let mut selection = SelectionSet::new();
        assert_eq!(selection.toggle("a"), Mark::Marked);
        assert!(selection.is_marked("a"));
        assert_eq!(selection.toggle("a"), Mark::Unmarked);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_active_identities_are_sorted() {
        let mut selection = SelectionSet::new();
        selection.toggle("c");
        selection.toggle("a");
        selection.toggle("b");
        assert_eq!(selection.active_identities(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_prune_removes_absent_identities() {
        let mut selection = SelectionSet::new();
        selection.toggle("a");
        selection.toggle("gone");

        let removed = selection.prune(&snapshot(&["a", "b"]));
        assert_eq!(removed, 1);
        assert_eq!(selection.active_identities(), vec!["a"]);
    }

    #[test]
    fn test_clear() {
        let mut selection = SelectionSet::new();
        selection.toggle("a");
        selection.clear();
        assert_eq!(selection.len(), 0);
    }
}

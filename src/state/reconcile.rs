//! Snapshot reconciliation
//!
//! [`reconcile`] turns a pair of snapshots plus the active filter into a
//! [`RenderPlan`]: either nothing to do, or the ordered rows to show with the
//! resolved focus and the identities that should flash as new.

use std::collections::HashSet;

use crate::core::{Entity, EntityId, Snapshot, Tier};
use crate::state::Filter;

/// Focus before the rebuild
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusHint {
    pub id: Option<EntityId>,
    pub index: Option<usize>,
}

impl FocusHint {
    pub fn new(id: Option<&str>, index: Option<usize>) -> Self {
        Self {
            id: id.map(str::to_string),
            index,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Rebuild even when the snapshot did not change (filter edits)
    pub force: bool,
    /// Report entities absent from the previous snapshot as new
    pub highlight_new: bool,
}

/// Ordered rows ready to render
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderList {
    pub rows: Vec<Entity>,
    pub focus: Option<usize>,
    pub new_ids: Vec<EntityId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderPlan {
    Unchanged,
    Render(RenderList),
}

pub fn reconcile(
    previous: Option<&Snapshot>,
    next: &Snapshot,
    filter: &Filter,
    focus: &FocusHint,
    options: ReconcileOptions,
) -> RenderPlan {
    if !options.force && previous == Some(next) {
        return RenderPlan::Unchanged;
    }

    let (primary, secondary): (Vec<&Entity>, Vec<&Entity>) = next
        .entities()
        .iter()
        .partition(|e| e.tier() == Tier::Primary);

    let rows: Vec<Entity> = primary
        .into_iter()
        .chain(secondary)
        .filter(|e| filter.matches(e))
        .cloned()
        .collect();

    let new_ids = match previous {
        Some(prev) if options.highlight_new => {
            let known: HashSet<&str> = prev.entities().iter().map(|e| e.id.as_str()).collect();
            rows.iter()
                .filter(|e| !known.contains(e.id.as_str()))
                .map(|e| e.id.clone())
                .collect()
        }
        _ => vec![],
    };

    let focus = resolve_focus(&rows, focus);

    RenderPlan::Render(RenderList {
        rows,
        focus,
        new_ids,
    })
}

/// Restore focus by identity, else clamp the previous index
fn resolve_focus(rows: &[Entity], hint: &FocusHint) -> Option<usize> {
    if rows.is_empty() {
        return None;
    }

    if let Some(id) = &hint.id {
        if let Some(idx) = rows.iter().position(|e| &e.id == id) {
            return Some(idx);
        }
    }

    Some(hint.index.unwrap_or(0).min(rows.len() - 1))
}

/// Owner of a pane's snapshot transitions
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    current: Option<Snapshot>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile a freshly polled snapshot against the current one
    ///
    /// The first snapshot ever applied highlights nothing.
    pub fn apply(&mut self, next: Snapshot, filter: &Filter, focus: &FocusHint) -> RenderPlan {
        let options = ReconcileOptions {
            force: false,
            highlight_new: self.current.is_some(),
        };
        let plan = reconcile(self.current.as_ref(), &next, filter, focus, options);
        self.current = Some(next);
        plan
    }

    /// Rebuild rows from the current snapshot, e.g. after a filter edit
    pub fn rerender(&self, filter: &Filter, focus: &FocusHint) -> RenderPlan {
        match &self.current {
            Some(snapshot) => reconcile(
                Some(snapshot),
                snapshot,
                filter,
                focus,
                ReconcileOptions {
                    force: true,
                    highlight_new: false,
                },
            ),
            None => RenderPlan::Unchanged,
        }
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.current.as_ref()
    }
}

//! Transient row highlights
//!
//! Highlights are deadline based: each carries an expiry instant and the UI
//! tick calls [`Highlighter::expire`]. Removing a highlight for a row that is
//! already gone is a no-op.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::core::{EntityId, HighlightStyle};

/// How long each highlight style lasts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightDurations {
    pub created: Duration,
    pub deleted: Duration,
    pub uploading: Duration,
}

impl HighlightDurations {
    pub fn for_style(&self, style: HighlightStyle) -> Duration {
        match style {
            HighlightStyle::Created => self.created,
            HighlightStyle::Deleted => self.deleted,
            HighlightStyle::Uploading => self.uploading,
        }
    }
}

impl Default for HighlightDurations {
    fn default() -> Self {
        Self {
            created: Duration::from_millis(1000),
            deleted: Duration::from_millis(2500),
            uploading: Duration::from_millis(5000),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Highlight {
    style: HighlightStyle,
    until: Instant,
}

#[derive(Debug, Clone, Default)]
pub struct Highlighter {
    durations: HighlightDurations,
    active: HashMap<EntityId, Highlight>,
}

impl Highlighter {
    pub fn new(durations: HighlightDurations) -> Self {
        Self {
            durations,
            active: HashMap::new(),
        }
    }

    /// Highlight a row, replacing any highlight it already has
    pub fn apply(&mut self, id: &str, style: HighlightStyle, now: Instant) {
        let until = now + self.durations.for_style(style);
        self.active.insert(id.to_string(), Highlight { style, until });
    }

    pub fn remove(&mut self, id: &str) {
        self.active.remove(id);
    }

    /// Remove the highlight of `id` only if it has the given style
    pub fn remove_style(&mut self, id: &str, style: HighlightStyle) {
        if self.style_of(id) == Some(style) {
            self.active.remove(id);
        }
    }

    /// Drop expired highlights; true if anything changed
    pub fn expire(&mut self, now: Instant) -> bool {
        let before = self.active.len();
        self.active.retain(|_, h| h.until > now);
        before != self.active.len()
    }

    /// Drop highlights of rows for which `keep` is false
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.active.retain(|id, _| keep(id));
    }

    pub fn style_of(&self, id: &str) -> Option<HighlightStyle> {
        self.active.get(id).map(|h| h.style)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

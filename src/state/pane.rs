//! Per-tab pane state
//!
//! A [`Pane`] owns everything one entity table needs between polls: the
//! reconciler and its rendered rows, focus, marks, filter, highlights and
//! the open dialog. It is only ever touched from the main loop.

use std::collections::VecDeque;
use std::time::Instant;

use tracing::{debug, info};

use crate::actions::{self, BatchReport, Dispatch, Operation, OperationPlan};
use crate::core::{Entity, EntityKind, HighlightStyle, NotificationLevel, RuntimeError, Snapshot};
use crate::keys::{Input, UiEvent};
use crate::state::{
    Dialog, Filter, FocusHint, HighlightDurations, Highlighter, Mark, Reconciler, RenderPlan,
    SelectionSet,
};

/// Whether any rows are marked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneMode {
    Normal,
    Selecting,
}

/// What the main loop must do after the pane handled an input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaneOutcome {
    None,
    Execute(OperationPlan),
    ToggleShowAll,
    Notify(String, NotificationLevel),
}

#[derive(Debug, Clone)]
pub struct Pane {
    kind: EntityKind,
    reconciler: Reconciler,
    rows: Vec<Entity>,
    focus: Option<usize>,
    selection: SelectionSet,
    filter: Filter,
    dialog: Option<Dialog>,
    /// Report dialogs waiting for the open one to close
    pending: VecDeque<Dialog>,
    highlighter: Highlighter,
    advance_on_mark: bool,
    last_error: Option<RuntimeError>,
}

impl Pane {
    pub fn new(kind: EntityKind, durations: HighlightDurations, advance_on_mark: bool) -> Self {
        Self {
            kind,
            reconciler: Reconciler::new(),
            rows: vec![],
            focus: None,
            selection: SelectionSet::new(),
            filter: Filter::default(),
            dialog: None,
            pending: VecDeque::new(),
            highlighter: Highlighter::new(durations),
            advance_on_mark,
            last_error: None,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn rows(&self) -> &[Entity] {
        &self.rows
    }

    pub fn focus(&self) -> Option<usize> {
        self.focus
    }

    pub fn focused(&self) -> Option<&Entity> {
        self.focus.and_then(|idx| self.rows.get(idx))
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    pub fn highlight_of(&self, id: &str) -> Option<HighlightStyle> {
        self.highlighter.style_of(id)
    }

    pub fn last_error(&self) -> Option<&RuntimeError> {
        self.last_error.as_ref()
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.reconciler.snapshot()
    }

    pub fn mode(&self) -> PaneMode {
        if self.selection.is_empty() {
            PaneMode::Normal
        } else {
            PaneMode::Selecting
        }
    }

    pub fn open_dialog(&mut self, dialog: Dialog) {
        debug!("Opening dialog: {}", dialog.title());
        self.dialog = Some(dialog);
    }

    /// Open `dialog` now, or once every dialog ahead of it has closed
    pub fn queue_dialog(&mut self, dialog: Dialog) {
        if self.dialog.is_some() {
            debug!("Queueing dialog: {}", dialog.title());
            self.pending.push_back(dialog);
        } else {
            self.open_dialog(dialog);
        }
    }

    pub fn close_dialog(&mut self) {
        self.dialog = self.pending.pop_front();
    }

    fn focus_hint(&self) -> FocusHint {
        FocusHint::new(self.focused().map(|e| e.id.as_str()), self.focus)
    }

    /// Reconcile a polled snapshot; true if the rows were rebuilt
    pub fn apply_snapshot(&mut self, snapshot: Snapshot, now: Instant) -> bool {
        self.last_error = None;
        self.selection.prune(&snapshot);
        self.highlighter.retain(|id| snapshot.contains(id));

        let hint = self.focus_hint();
        match self.reconciler.apply(snapshot, &self.filter, &hint) {
            RenderPlan::Unchanged => false,
            RenderPlan::Render(list) => {
                for id in &list.new_ids {
                    self.highlighter.apply(id, HighlightStyle::Created, now);
                }
                self.rows = list.rows;
                self.focus = list.focus;
                true
            }
        }
    }

    /// Record a failed poll; rows are left as they were
    pub fn apply_poll_error(&mut self, error: RuntimeError) {
        self.last_error = Some(error);
    }

    fn rerender(&mut self) {
        let hint = self.focus_hint();
        if let RenderPlan::Render(list) = self.reconciler.rerender(&self.filter, &hint) {
            self.rows = list.rows;
            self.focus = list.focus;
        }
    }

    /// Expire highlights; true if a redraw is needed
    pub fn tick(&mut self, now: Instant) -> bool {
        self.highlighter.expire(now)
    }

    pub fn next_item(&mut self) {
        if let Some(idx) = self.focus {
            self.focus = Some((idx + 1).min(self.rows.len().saturating_sub(1)));
        } else if !self.rows.is_empty() {
            self.focus = Some(0);
        }
    }

    pub fn previous_item(&mut self) {
        if let Some(idx) = self.focus {
            self.focus = Some(idx.saturating_sub(1));
        } else if !self.rows.is_empty() {
            self.focus = Some(0);
        }
    }

    fn toggle_mark(&mut self) -> PaneOutcome {
        let Some(id) = self.focused().map(|e| e.id.clone()) else {
            return PaneOutcome::None;
        };
        if self.selection.toggle(&id) == Mark::Marked && self.advance_on_mark {
            self.next_item();
        }
        PaneOutcome::None
    }

    /// Route one resolved input through the dialog or the pane
    pub fn handle(&mut self, input: Input, now: Instant) -> PaneOutcome {
        if self.dialog.is_some() {
            return self.handle_dialog(input);
        }

        match input {
            Input::Event(UiEvent::NextItem) => self.next_item(),
            Input::Event(UiEvent::PrevItem) => self.previous_item(),
            Input::Event(UiEvent::SetMark) => return self.toggle_mark(),
            Input::Event(UiEvent::ClearMarks) => self.selection.clear(),
            Input::Event(UiEvent::ToggleShowAll) => return PaneOutcome::ToggleShowAll,
            Input::Event(UiEvent::CloseDialog) => {
                if self.filter.clear() {
                    self.rerender();
                }
            }
            Input::Event(UiEvent::SubmitDialog) => {}
            Input::Event(event) => return self.dispatch(event, now),
            Input::Key(key) => self.edit_filter(&key),
        }
        PaneOutcome::None
    }

    fn edit_filter(&mut self, key: &crossterm::event::KeyEvent) {
        use crossterm::event::{KeyCode, KeyModifiers};

        let changed = match key.code {
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.filter.push(c);
                true
            }
            KeyCode::Backspace => self.filter.pop(),
            _ => false,
        };

        if changed {
            debug!("Filter for {}s now {:?}", self.kind, self.filter.text());
            self.rerender();
        }
    }

    fn dispatch(&mut self, event: UiEvent, now: Instant) -> PaneOutcome {
        let Some(snapshot) = self.reconciler.snapshot() else {
            return PaneOutcome::None;
        };
        let focused = self.focus.and_then(|idx| self.rows.get(idx));

        match actions::dispatch(event, focused, &mut self.selection, snapshot) {
            Dispatch::Ignored => PaneOutcome::None,
            Dispatch::Rejected(message) => PaneOutcome::Notify(message, NotificationLevel::Warning),
            Dispatch::OpenPrompt(purpose) => {
                let initial = actions::prompt_initial(&purpose, self.focused());
                self.open_dialog(Dialog::prompt(purpose, initial));
                PaneOutcome::None
            }
            Dispatch::Execute(plan) => {
                self.mark_in_flight(&plan, now);
                PaneOutcome::Execute(plan)
            }
        }
    }

    fn mark_in_flight(&mut self, plan: &OperationPlan, now: Instant) {
        let style = match plan.operation {
            Operation::Remove => HighlightStyle::Deleted,
            Operation::Push { .. } => HighlightStyle::Uploading,
            _ => return,
        };
        for id in &plan.targets {
            self.highlighter.apply(id, style, now);
        }
    }

    fn handle_dialog(&mut self, input: Input) -> PaneOutcome {
        match input {
            Input::Event(UiEvent::CloseDialog) => {
                self.close_dialog();
                PaneOutcome::None
            }
            Input::Event(UiEvent::SubmitDialog) => self.submit_dialog(),
            other => {
                if let Some(dialog) = self.dialog.as_mut() {
                    dialog.handle(&other);
                }
                PaneOutcome::None
            }
        }
    }

    fn submit_dialog(&mut self) -> PaneOutcome {
        let Some(prompt) = self.dialog.as_mut().and_then(Dialog::prompt_mut) else {
            self.close_dialog();
            return PaneOutcome::None;
        };

        match actions::submit_prompt(&prompt.purpose, &prompt.input) {
            Ok(plan) => {
                self.close_dialog();
                PaneOutcome::Execute(plan)
            }
            Err(e) => {
                info!("Rejected {} input: {}", prompt.purpose.title(), e);
                prompt.error = Some(e.to_string());
                PaneOutcome::None
            }
        }
    }

    /// Fold a finished batch back into the pane
    pub fn apply_report(&mut self, report: &BatchReport) {
        for (id, _) in report.failures() {
            self.highlighter.remove_style(&id, HighlightStyle::Deleted);
            self.highlighter.remove_style(&id, HighlightStyle::Uploading);
        }
        if let Operation::Push { .. } = report.operation {
            for id in report.succeeded() {
                self.highlighter.remove_style(id, HighlightStyle::Uploading);
            }
        }

        if let Some(dialog) = report.failure_dialog() {
            self.queue_dialog(dialog);
        } else if let Some(dialog) = report.result_dialog() {
            self.queue_dialog(dialog);
        }
    }
}

//! UI Application logic

use std::time::Instant;

use crossterm::event::{Event, KeyEvent, KeyEventKind, MouseEventKind};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use tracing::{debug, info};

use crate::actions::{BatchReport, OperationPlan};
use crate::core::{ConsoleError, EntityKind, NotificationLevel, RuntimeError, Snapshot, Tab};
use crate::keys::{Input, Keymap, UiEvent};
use crate::state::{AppState, Dialog, PaneMode, PaneOutcome};
use crate::ui::components::{render_dialog, RenderableList, TableModel};

/// Work the UI hands back to the main loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    Execute(Tab, OperationPlan),
    ToggleShowAll(Tab),
}

/// UI Application controller
pub struct UiApp {
    pub state: AppState,
    keymap: Keymap,
    pub should_quit: bool,
}

impl UiApp {
    /// Create a new UI app
    pub fn new(state: AppState, keymap: Keymap) -> Self {
        Self {
            state,
            keymap,
            should_quit: false,
        }
    }

    /// Handle a terminal event
    pub fn handle_event(&mut self, event: Event, now: Instant) -> Option<AppCommand> {
        match event {
            Event::Key(key_event) => self.handle_key_event(key_event, now),
            Event::Mouse(mouse) => {
                let event = match mouse.kind {
                    MouseEventKind::ScrollDown => UiEvent::NextItem,
                    MouseEventKind::ScrollUp => UiEvent::PrevItem,
                    _ => return None,
                };
                self.route(Input::Event(event), now)
            }
            Event::Resize(width, height) => {
                debug!("Terminal resized to {}x{}", width, height);
                None
            }
            _ => None,
        }
    }

    /// Handle keyboard events
    pub fn handle_key_event(&mut self, key: KeyEvent, now: Instant) -> Option<AppCommand> {
        // Only handle key press events (not release or repeat)
        if key.kind != KeyEventKind::Press {
            return None;
        }

        let mode = self.state.current_tab.mode();
        let mut input = self.keymap.resolve(mode, &key);

        // A prompt takes every key as text except the dialog controls
        let in_prompt = self
            .state
            .active_pane()
            .dialog()
            .is_some_and(|d| d.prompt_ref().is_some());
        if in_prompt {
            if let Input::Event(event) = input {
                if !matches!(
                    event,
                    UiEvent::CloseDialog | UiEvent::SubmitDialog | UiEvent::Quit
                ) {
                    input = Input::Key(key);
                }
            }
        }

        self.route(input, now)
    }

    fn route(&mut self, input: Input, now: Instant) -> Option<AppCommand> {
        let dialog_open = self.state.active_pane().dialog().is_some();

        match input {
            Input::Event(UiEvent::Quit) => {
                info!("Quit requested");
                self.should_quit = true;
                return None;
            }
            Input::Event(UiEvent::Help) if !dialog_open => {
                self.open_help();
                return None;
            }
            Input::Event(UiEvent::NextTab) if !dialog_open => {
                self.state.next_tab();
                info!("Switching to tab: {}", self.state.current_tab);
                return None;
            }
            Input::Event(UiEvent::PrevTab) if !dialog_open => {
                self.state.previous_tab();
                info!("Switching to tab: {}", self.state.current_tab);
                return None;
            }
            _ => {}
        }

        let tab = self.state.current_tab;
        match self.state.pane_mut(tab).handle(input, now) {
            PaneOutcome::None => None,
            PaneOutcome::Execute(plan) => {
                let message = format!(
                    "{} {}",
                    plan.operation.verb(),
                    describe_targets(plan.kind, &plan.targets)
                );
                self.state.add_notification(message, NotificationLevel::Info);
                Some(AppCommand::Execute(tab, plan))
            }
            PaneOutcome::ToggleShowAll => Some(AppCommand::ToggleShowAll(tab)),
            PaneOutcome::Notify(message, level) => {
                self.state.add_notification(message, level);
                None
            }
        }
    }

    fn open_help(&mut self) {
        let mode = self.state.current_tab.mode();
        let bindings = self
            .keymap
            .bindings_for(mode)
            .into_iter()
            .map(|(key, event)| (key.to_string(), event.to_string()))
            .collect();
        self.state.active_pane_mut().open_dialog(Dialog::help(bindings));
    }

    /// Fold a poll cycle into the pane for `kind`; true if a redraw is needed
    pub fn on_poll(
        &mut self,
        kind: EntityKind,
        result: Result<Snapshot, RuntimeError>,
        now: Instant,
    ) -> bool {
        match result {
            Ok(snapshot) => {
                let recovered = !self.state.docker_connected
                    || self.state.pane(kind.tab()).last_error().is_some();
                self.state.docker_connected = true;
                let changed = self.state.pane_mut(kind.tab()).apply_snapshot(snapshot, now);
                changed || recovered
            }
            Err(e) => {
                debug!("Poll of {}s failed: {}", kind, e);
                self.state.docker_connected = false;
                let err = ConsoleError::from(e.clone());
                let level = if err.is_retryable() {
                    NotificationLevel::Warning
                } else {
                    NotificationLevel::Error
                };
                self.state.add_notification(err.user_message(), level);
                self.state.pane_mut(kind.tab()).apply_poll_error(e);
                true
            }
        }
    }

    /// Show the outcome of a finished batch
    pub fn on_report(&mut self, tab: Tab, report: &BatchReport) {
        let failures = report.failures().len();
        if failures == 0 {
            debug!("Batch {} completed", report.batch);
        } else {
            self.state.add_notification(
                format!("{} of {} failed", failures, report.outcomes.len()),
                NotificationLevel::Error,
            );
        }
        self.state.pane_mut(tab).apply_report(report);
    }

    /// Periodic housekeeping; true if a redraw is needed
    pub fn tick(&mut self, now: Instant) -> bool {
        self.state.clear_old_notifications(10);
        self.state
            .panes_mut()
            .fold(false, |changed, pane| pane.tick(now) || changed)
    }

    /// Render the UI
    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();

        let main_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Header
                Constraint::Min(3),    // Table
                Constraint::Length(1), // Status line
            ])
            .split(area);

        self.render_header(frame, main_layout[0]);

        let pane = self.state.active_pane();
        TableModel::from_pane(pane).render(frame, main_layout[1]);

        self.render_status(frame, main_layout[2]);

        if let Some(dialog) = pane.dialog() {
            render_dialog(frame, area, dialog);
        }
    }

    /// Render the header
    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let status_indicator = if self.state.docker_connected {
            ("●", Color::Green)
        } else {
            ("○", Color::Red)
        };

        let mut spans = vec![
            Span::styled(
                " dockconsole ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw("| "),
        ];

        for tab in Tab::all() {
            let style = if *tab == self.state.current_tab {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(format!("{} ", tab.name()), style));
        }

        let info = &self.state.connection_info;
        spans.push(Span::raw("| "));
        spans.push(Span::styled(status_indicator.0, Style::default().fg(status_indicator.1)));
        spans.push(Span::styled(
            format!(" {} (API {})", info.version, info.api_version),
            Style::default().fg(Color::Gray),
        ));

        frame.render_widget(
            Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black)),
            area,
        );
    }

    /// Render the status line
    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let pane = self.state.active_pane();
        let mut spans = vec![];

        let show_all = self.state.show_all[self.state.current_tab.index()];
        spans.push(Span::styled(
            if show_all { " [all] " } else { " [running] " },
            Style::default().fg(Color::Gray),
        ));

        if pane.mode() == PaneMode::Selecting {
            spans.push(Span::styled(
                format!("[{} marked] ", pane.selection().len()),
                Style::default().fg(Color::Yellow),
            ));
        }

        if !pane.filter().is_empty() {
            spans.push(Span::raw(format!("/{} ", pane.filter().text())));
        }

        if let Some(error) = pane.last_error() {
            spans.push(Span::styled(
                error.to_string(),
                Style::default().fg(Color::Red),
            ));
        } else if let Some(note) = self.state.latest_notification() {
            let color = match note.level {
                NotificationLevel::Info => Color::Gray,
                NotificationLevel::Success => Color::Green,
                NotificationLevel::Warning => Color::Yellow,
                NotificationLevel::Error => Color::Red,
            };
            spans.push(Span::styled(note.message.clone(), Style::default().fg(color)));
        } else {
            let help = self
                .keymap
                .key_for(self.state.current_tab.mode(), UiEvent::Help)
                .map(|k| format!("[{}]:Help ", k))
                .unwrap_or_default();
            spans.push(Span::styled(help, Style::default().fg(Color::Gray)));
        }

        frame.render_widget(
            Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black)),
            area,
        );
    }
}

fn describe_targets(kind: EntityKind, targets: &[String]) -> String {
    match targets {
        [one] => format!("{} {}", kind, one),
        many => format!("{} {}s", many.len(), kind),
    }
}

//! Modal dialogs
//!
//! A dialog is an orthogonal sub-state of a pane: while one is open it
//! receives every input except close and submit, which the pane handles.

use crossterm::event::{KeyCode, KeyModifiers};

use crate::core::{DialogConfig, DialogHeight, EntityId, RuntimeError};
use crate::docker::InspectRecord;
use crate::keys::{Input, UiEvent};

const PAGE: usize = 10;

/// What a prompt's input will be used for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptPurpose {
    Rename { target: EntityId },
    Commit { target: EntityId },
    TagImage { target: EntityId },
}

impl PromptPurpose {
    pub fn title(&self) -> &'static str {
        match self {
            PromptPurpose::Rename { .. } => "Rename Container",
            PromptPurpose::Commit { .. } => "Commit Container",
            PromptPurpose::TagImage { .. } => "Tag Image",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PromptPurpose::Rename { .. } => "New name:",
            PromptPurpose::Commit { .. } | PromptPurpose::TagImage { .. } => "Repository[:tag]:",
        }
    }

    pub fn target(&self) -> &str {
        match self {
            PromptPurpose::Rename { target }
            | PromptPurpose::Commit { target }
            | PromptPurpose::TagImage { target } => target,
        }
    }
}

/// Single-line text input with an optional validation message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub purpose: PromptPurpose,
    pub input: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogBody {
    Lines(Vec<String>),
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Prompt(Prompt),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub config: DialogConfig,
    pub body: DialogBody,
    scroll: usize,
}

impl Dialog {
    pub fn new(config: DialogConfig, body: DialogBody) -> Self {
        Self {
            config,
            body,
            scroll: 0,
        }
    }

    pub fn message(title: impl Into<String>, lines: Vec<String>) -> Self {
        Self::new(DialogConfig::new(title).with_width(60), DialogBody::Lines(lines))
    }

    /// One line per failed target, each naming its own status
    ///
    /// The title is the shared status when every failure agrees on one.
    pub fn runtime_failures(failures: &[(EntityId, RuntimeError)]) -> Self {
        let mut titles = failures.iter().map(|(_, e)| e.dialog_title());
        let title = match titles.next() {
            Some(first) if titles.all(|t| t == first) => first,
            Some(_) => format!("{} operations failed", failures.len()),
            None => "Error".to_string(),
        };

        let lines = failures
            .iter()
            .map(|(id, e)| format!("{}: {}", id, e))
            .collect();

        Self::message(title, lines)
    }

    pub fn table(title: impl Into<String>, headers: &[&str], rows: Vec<Vec<String>>) -> Self {
        Self::new(
            DialogConfig::new(title).with_height(DialogHeight::Percent(80)),
            DialogBody::Table {
                headers: headers.iter().map(|h| h.to_string()).collect(),
                rows,
            },
        )
    }

    pub fn inspect(record: &InspectRecord) -> Self {
        let rows = record
            .items
            .iter()
            .map(|(k, v)| vec![k.clone(), v.clone()])
            .collect();
        Self::table(record.title.clone(), &["Key", "Value"], rows)
    }

    pub fn prompt(purpose: PromptPurpose, initial: impl Into<String>) -> Self {
        Self::new(
            DialogConfig::new(purpose.title()).with_width(50),
            DialogBody::Prompt(Prompt {
                purpose,
                input: initial.into(),
                error: None,
            }),
        )
    }

    pub fn help(bindings: Vec<(String, String)>) -> Self {
        let rows = bindings.into_iter().map(|(k, e)| vec![k, e]).collect();
        let mut dialog = Self::table("Help", &["Key", "Action"], rows);
        dialog.config = dialog.config.with_width(50);
        dialog
    }

    pub fn title(&self) -> &str {
        &self.config.title
    }

    pub fn prompt_ref(&self) -> Option<&Prompt> {
        match &self.body {
            DialogBody::Prompt(p) => Some(p),
            _ => None,
        }
    }

    pub fn prompt_mut(&mut self) -> Option<&mut Prompt> {
        match &mut self.body {
            DialogBody::Prompt(p) => Some(p),
            _ => None,
        }
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Number of scrollable content lines
    pub fn len(&self) -> usize {
        match &self.body {
            DialogBody::Lines(lines) => lines.len(),
            DialogBody::Table { rows, .. } => rows.len(),
            DialogBody::Prompt(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Feed an input to the dialog; false if it was not used
    pub fn handle(&mut self, input: &Input) -> bool {
        if let DialogBody::Prompt(prompt) = &mut self.body {
            return edit_prompt(prompt, input);
        }

        match input {
            Input::Event(UiEvent::NextItem) => self.scroll_by(1),
            Input::Event(UiEvent::PrevItem) => self.scroll_back(1),
            Input::Key(key) => match key.code {
                KeyCode::Down | KeyCode::Char('j') => self.scroll_by(1),
                KeyCode::Up | KeyCode::Char('k') => self.scroll_back(1),
                KeyCode::PageDown => self.scroll_by(PAGE),
                KeyCode::PageUp => self.scroll_back(PAGE),
                KeyCode::Home => {
                    self.scroll = 0;
                    true
                }
                _ => false,
            },
            Input::Event(_) => false,
        }
    }

    fn scroll_by(&mut self, n: usize) -> bool {
        let max = self.len().saturating_sub(1);
        self.scroll = (self.scroll + n).min(max);
        true
    }

    fn scroll_back(&mut self, n: usize) -> bool {
        self.scroll = self.scroll.saturating_sub(n);
        true
    }
}

fn edit_prompt(prompt: &mut Prompt, input: &Input) -> bool {
    let Input::Key(key) = input else {
        return false;
    };

    match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            prompt.input.push(c);
            prompt.error = None;
            true
        }
        KeyCode::Backspace => {
            prompt.input.pop();
            prompt.error = None;
            true
        }
        _ => false,
    }
}

//! Mapping input events to runtime operations
//!
//! Bulk-capable actions target the marked rows when any are marked, else the
//! focused row. Prompt and query actions always target the focused row.

pub mod execute;

use tracing::debug;

use crate::core::{Entity, EntityId, EntityKind, Snapshot, ValidationError, UNTAGGED};
use crate::keys::UiEvent;
use crate::state::{PromptPurpose, SelectionSet};

pub use execute::{execute, spawn_batch, BatchReport, OperationOutput, TargetOutcome};

pub const DEFAULT_TAG: &str = "latest";

/// A runtime call to issue against each target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Remove,
    Start,
    Stop,
    Pause,
    Unpause,
    Kill,
    Restart,
    Rename { new_name: String },
    Commit { repo: String, tag: String },
    Tag { repo: String, tag: String },
    Inspect,
    Diff,
    Top,
    History,
    Push { repo: String, tag: String },
}

impl Operation {
    /// Present participle used in notifications
    pub fn verb(&self) -> &'static str {
        match self {
            Operation::Remove => "Removing",
            Operation::Start => "Starting",
            Operation::Stop => "Stopping",
            Operation::Pause => "Pausing",
            Operation::Unpause => "Unpausing",
            Operation::Kill => "Killing",
            Operation::Restart => "Restarting",
            Operation::Rename { .. } => "Renaming",
            Operation::Commit { .. } => "Committing",
            Operation::Tag { .. } => "Tagging",
            Operation::Inspect => "Inspecting",
            Operation::Diff => "Diffing",
            Operation::Top => "Listing processes of",
            Operation::History => "Loading history of",
            Operation::Push { .. } => "Pushing",
        }
    }

    /// Whether the operation changes runtime state
    pub fn is_mutation(&self) -> bool {
        !self.is_query()
    }

    /// Operations whose result is shown in a dialog
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            Operation::Inspect
                | Operation::Diff
                | Operation::Top
                | Operation::History
                | Operation::Push { .. }
        )
    }
}

/// An operation together with the entities it applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationPlan {
    pub kind: EntityKind,
    pub operation: Operation,
    pub targets: Vec<EntityId>,
}

/// What an input event asks the pane to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Not an action, or nothing to act on
    Ignored,
    Execute(OperationPlan),
    OpenPrompt(PromptPurpose),
    /// The action does not apply to the focused row
    Rejected(String),
}

fn bulk_operation(event: UiEvent, kind: EntityKind) -> Option<Operation> {
    let op = match (event, kind) {
        (UiEvent::DeleteSelected, _) => Operation::Remove,
        (UiEvent::StartSelected, EntityKind::Container) => Operation::Start,
        (UiEvent::StopSelected, EntityKind::Container) => Operation::Stop,
        (UiEvent::PauseSelected, EntityKind::Container) => Operation::Pause,
        (UiEvent::UnpauseSelected, EntityKind::Container) => Operation::Unpause,
        (UiEvent::KillSelected, EntityKind::Container) => Operation::Kill,
        (UiEvent::RestartSelected, EntityKind::Container) => Operation::Restart,
        _ => return None,
    };
    Some(op)
}

/// Map an event to a dispatch decision
///
/// For bulk actions the selection is pruned against `snapshot` first and
/// cleared once the batch is issued.
pub fn dispatch(
    event: UiEvent,
    focused: Option<&Entity>,
    selection: &mut SelectionSet,
    snapshot: &Snapshot,
) -> Dispatch {
    let kind = snapshot.kind();

    if let Some(operation) = bulk_operation(event, kind) {
        selection.prune(snapshot);
        let targets = if selection.is_empty() {
            match focused {
                Some(e) => vec![e.id.clone()],
                None => return Dispatch::Ignored,
            }
        } else {
            let marked = selection.active_identities();
            selection.clear();
            marked
        };

        debug!("{} {} {}(s)", operation.verb(), targets.len(), kind);
        return Dispatch::Execute(OperationPlan {
            kind,
            operation,
            targets,
        });
    }

    let Some(entity) = focused else {
        return Dispatch::Ignored;
    };
    let target = entity.id.clone();

    let single = |operation: Operation| {
        Dispatch::Execute(OperationPlan {
            kind,
            operation,
            targets: vec![entity.id.clone()],
        })
    };

    match (event, kind) {
        (UiEvent::Rename, EntityKind::Container) => {
            Dispatch::OpenPrompt(PromptPurpose::Rename { target })
        }
        (UiEvent::Commit, EntityKind::Container) => {
            Dispatch::OpenPrompt(PromptPurpose::Commit { target })
        }
        (UiEvent::TagImage, EntityKind::Image) => {
            Dispatch::OpenPrompt(PromptPurpose::TagImage { target })
        }
        (UiEvent::InspectDetails, _) => single(Operation::Inspect),
        (UiEvent::ViewDiff, EntityKind::Container) => single(Operation::Diff),
        (UiEvent::ViewTop, EntityKind::Container) => {
            if entity.is_running() {
                single(Operation::Top)
            } else {
                Dispatch::Rejected(format!("{} is not running", entity.label()))
            }
        }
        (UiEvent::ViewHistory, EntityKind::Image) => single(Operation::History),
        (UiEvent::PushImage, EntityKind::Image) => match push_reference(entity) {
            Some((repo, tag)) => single(Operation::Push { repo, tag }),
            None => Dispatch::Rejected("Untagged images cannot be pushed".to_string()),
        },
        _ => Dispatch::Ignored,
    }
}

fn push_reference(entity: &Entity) -> Option<(String, String)> {
    if entity.names.first().map(String::as_str) == Some(UNTAGGED) {
        return None;
    }
    let (repo, tag) = split_repo_name(&entity.id);
    Some((repo, tag_or_default(tag)))
}

/// Text a prompt starts with
pub fn prompt_initial(purpose: &PromptPurpose, focused: Option<&Entity>) -> String {
    match (purpose, focused) {
        (PromptPurpose::Rename { .. }, Some(e)) => e.names.first().cloned().unwrap_or_default(),
        _ => String::new(),
    }
}

/// Validate a submitted prompt, producing the plan to execute
pub fn submit_prompt(
    purpose: &PromptPurpose,
    input: &str,
) -> Result<OperationPlan, ValidationError> {
    let input = input.trim();
    let target = purpose.target().to_string();

    let (kind, operation) = match purpose {
        PromptPurpose::Rename { .. } => {
            if input.is_empty() {
                return Err(ValidationError::EmptyName);
            }
            if input.chars().any(char::is_whitespace) {
                return Err(ValidationError::InvalidName(input.to_string()));
            }
            (
                EntityKind::Container,
                Operation::Rename {
                    new_name: input.to_string(),
                },
            )
        }
        PromptPurpose::Commit { .. } => {
            let (repo, tag) = parse_reference(input)?;
            (EntityKind::Container, Operation::Commit { repo, tag })
        }
        PromptPurpose::TagImage { .. } => {
            let (repo, tag) = parse_reference(input)?;
            (EntityKind::Image, Operation::Tag { repo, tag })
        }
    };

    Ok(OperationPlan {
        kind,
        operation,
        targets: vec![target],
    })
}

fn parse_reference(input: &str) -> Result<(String, String), ValidationError> {
    if input.is_empty() {
        return Err(ValidationError::EmptyRepository);
    }
    if input.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidReference(input.to_string()));
    }

    let (repo, tag) = split_repo_name(input);
    if repo.is_empty() || repo.ends_with('/') {
        return Err(ValidationError::InvalidReference(input.to_string()));
    }

    Ok((repo, tag_or_default(tag)))
}

/// Split `repo[:tag]`, scanning from the end
///
/// A `:` seen before any `/` separates the tag. A `/` seen first means the
/// colon, if any, belongs to a registry port and the tag is empty.
pub fn split_repo_name(name: &str) -> (String, Option<String>) {
    for (idx, c) in name.char_indices().rev() {
        match c {
            ':' => return (name[..idx].to_string(), Some(name[idx + 1..].to_string())),
            '/' => return (name.to_string(), Some(String::new())),
            _ => {}
        }
    }
    (name.to_string(), None)
}

fn tag_or_default(tag: Option<String>) -> String {
    match tag {
        Some(t) if !t.is_empty() => t,
        _ => DEFAULT_TAG.to_string(),
    }
}

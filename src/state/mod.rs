//! Application state management

pub mod app_state;
pub mod dialog;
pub mod filter;
pub mod highlight;
pub mod pane;
pub mod reconcile;
pub mod selection;

pub use app_state::{AppState, Notification};
pub use dialog::{Dialog, DialogBody, Prompt, PromptPurpose};
pub use filter::Filter;
pub use highlight::{HighlightDurations, Highlighter};
pub use pane::{Pane, PaneMode, PaneOutcome};
pub use reconcile::{reconcile, FocusHint, ReconcileOptions, Reconciler, RenderList, RenderPlan};
pub use selection::{Mark, SelectionSet};

//! UI components

pub mod dialog;
pub mod entity_table;

pub use dialog::{dialog_area, render_dialog};
pub use entity_table::{RenderableList, TableModel, TableRow};

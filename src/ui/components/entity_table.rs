//! Entity table widget
//!
//! [`TableModel`] is plain data built from a pane; anything implementing
//! [`RenderableList`] can be turned into a ratatui [`Table`].

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Row, Table, TableState},
    Frame,
};

use crate::core::{Column, EntityKind, HighlightStyle, Tier};
use crate::state::{Pane, PaneMode};

/// Something that can be rendered as a selectable table
pub trait RenderableList {
    fn title(&self) -> String;

    fn header(&self) -> Vec<String>;

    fn widths(&self) -> Vec<Constraint>;

    fn rows(&self) -> Vec<Row<'_>>;

    fn selected(&self) -> Option<usize>;

    /// Build the table widget
    fn build_table(&self) -> Table<'_> {
        let header = Row::new(self.header())
            .style(Style::default().add_modifier(Modifier::BOLD))
            .bottom_margin(0);

        Table::new(self.rows(), self.widths())
            .header(header)
            .block(Block::default().title(self.title()).borders(Borders::ALL))
            .row_highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ")
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let mut state = TableState::default();
        state.select(self.selected());
        frame.render_stateful_widget(self.build_table(), area, &mut state);
    }
}

/// One rendered row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub id: String,
    pub cells: Vec<String>,
    pub marked: bool,
    pub highlight: Option<HighlightStyle>,
    pub tier: Tier,
}

/// Data-only view of a pane's table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableModel {
    pub kind: EntityKind,
    pub columns: Vec<Column>,
    pub rows: Vec<TableRow>,
    pub focus: Option<usize>,
    pub marked: usize,
    pub filter: String,
}

impl TableModel {
    pub fn from_pane(pane: &Pane) -> Self {
        let kind = pane.kind();
        let columns = kind.columns().to_vec();

        let rows = pane
            .rows()
            .iter()
            .map(|e| TableRow {
                id: e.id.clone(),
                cells: columns.iter().map(|c| e.field(*c).to_string()).collect(),
                marked: pane.selection().is_marked(&e.id),
                highlight: pane.highlight_of(&e.id),
                tier: e.tier(),
            })
            .collect();

        Self {
            kind,
            columns,
            rows,
            focus: pane.focus(),
            marked: if pane.mode() == PaneMode::Selecting {
                pane.selection().len()
            } else {
                0
            },
            filter: pane.filter().text().to_string(),
        }
    }

    fn row_style(row: &TableRow) -> Style {
        let base = match row.tier {
            Tier::Primary => Style::default(),
            Tier::Secondary => Style::default().fg(Color::DarkGray),
        };

        let base = match row.highlight {
            Some(HighlightStyle::Created) => base.fg(Color::Green).add_modifier(Modifier::BOLD),
            Some(HighlightStyle::Deleted) => base.fg(Color::Red).add_modifier(Modifier::CROSSED_OUT),
            Some(HighlightStyle::Uploading) => base.fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            None => base,
        };

        if row.marked {
            base.fg(Color::Yellow)
        } else {
            base
        }
    }
}

fn column_width(column: Column) -> Constraint {
    match column {
        Column::Id => Constraint::Length(12),
        Column::Image => Constraint::Min(15),
        Column::Command => Constraint::Min(15),
        Column::Status => Constraint::Length(22),
        Column::Names => Constraint::Min(10),
        Column::Tag => Constraint::Min(25),
        Column::Created => Constraint::Length(14),
    }
}

impl RenderableList for TableModel {
    fn title(&self) -> String {
        let name = self.kind.tab().name();
        let mut title = format!(" {} ({}) ", name, self.rows.len());
        if self.marked > 0 {
            title.push_str(&format!("[{} marked] ", self.marked));
        }
        if !self.filter.is_empty() {
            title.push_str(&format!("filter: {} ", self.filter));
        }
        title
    }

    fn header(&self) -> Vec<String> {
        std::iter::once(String::new())
            .chain(self.columns.iter().map(|c| c.header().to_uppercase()))
            .collect()
    }

    fn widths(&self) -> Vec<Constraint> {
        std::iter::once(Constraint::Length(1))
            .chain(self.columns.iter().map(|c| column_width(*c)))
            .collect()
    }

    fn rows(&self) -> Vec<Row<'_>> {
        self.rows
            .iter()
            .map(|row| {
                let mark = if row.marked { "*" } else { " " };
                let cells = std::iter::once(Line::from(mark))
                    .chain(row.cells.iter().map(|c| Line::from(c.as_str())));
                Row::new(cells).style(Self::row_style(row))
            })
            .collect()
    }

    fn selected(&self) -> Option<usize> {
        self.focus
    }
}

//! Modal dialog host

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::core::{DialogAlign, DialogConfig, DialogHeight};
use crate::state::{Dialog, DialogBody, Prompt};

/// Render `dialog` over `area`, sized and placed by its [`DialogConfig`]
pub fn render_dialog(frame: &mut Frame, area: Rect, dialog: &Dialog) {
    let popup = dialog_area(&dialog.config, content_height(dialog), area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .title(format!(" {} ", dialog.config.title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    match &dialog.body {
        DialogBody::Lines(lines) => {
            let text: Vec<Line> = lines.iter().map(|l| Line::from(l.as_str())).collect();
            let paragraph = Paragraph::new(Text::from(text))
                .wrap(Wrap { trim: false })
                .scroll((dialog.scroll() as u16, 0));
            frame.render_widget(paragraph, inner);
        }
        DialogBody::Table { headers, rows } => {
            render_table(frame, inner, headers, rows, dialog.scroll());
        }
        DialogBody::Prompt(prompt) => render_prompt(frame, inner, prompt),
    }
}

fn render_table(frame: &mut Frame, area: Rect, headers: &[String], rows: &[Vec<String>], scroll: usize) {
    let columns = headers
        .len()
        .max(rows.iter().map(Vec::len).max().unwrap_or(0))
        .max(1);

    let header = Row::new(headers.iter().map(String::as_str))
        .style(Style::default().add_modifier(Modifier::BOLD));

    let body: Vec<Row> = rows
        .iter()
        .skip(scroll)
        .map(|r| Row::new(r.iter().map(String::as_str)))
        .collect();

    // Leading columns fit their widest cell, capped at half the dialog; the last fills
    let mut widths: Vec<Constraint> = (0..columns - 1)
        .map(|i| {
            let widest = headers
                .get(i)
                .into_iter()
                .chain(rows.iter().filter_map(|r| r.get(i)))
                .map(|cell| cell.width())
                .max()
                .unwrap_or(0);
            Constraint::Length((widest as u16).saturating_add(1).min(area.width / 2))
        })
        .collect();
    widths.push(Constraint::Fill(1));

    let table = Table::new(body, widths).header(header);
    frame.render_widget(table, area);
}

fn render_prompt(frame: &mut Frame, area: Rect, prompt: &Prompt) {
    let mut lines = vec![
        Line::from(Span::styled(
            prompt.purpose.label(),
            Style::default().fg(Color::Gray),
        )),
        Line::from(vec![
            Span::raw("> "),
            Span::styled(prompt.input.as_str(), Style::default().fg(Color::White)),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]),
    ];

    if let Some(error) = &prompt.error {
        lines.push(Line::from(Span::styled(
            error.as_str(),
            Style::default().fg(Color::Red),
        )));
    }

    frame.render_widget(Paragraph::new(Text::from(lines)), area);
}

/// Rows of content, plus borders, for packed dialogs
fn content_height(dialog: &Dialog) -> u16 {
    let body = match &dialog.body {
        DialogBody::Lines(lines) => lines.len(),
        DialogBody::Table { rows, .. } => rows.len() + 1,
        DialogBody::Prompt(_) => 3,
    };
    (body as u16).saturating_add(2)
}

/// Place a dialog inside `area`
pub fn dialog_area(config: &DialogConfig, packed_height: u16, area: Rect) -> Rect {
    let width = (area.width as u32 * config.width_percent as u32 / 100) as u16;
    let height = match config.height {
        DialogHeight::Pack => packed_height.max(3),
        DialogHeight::Percent(p) => (area.height as u32 * p.min(100) as u32 / 100) as u16,
    }
    .min(area.height);

    let x = match config.align {
        DialogAlign::Left => area.x,
        DialogAlign::Center => area.x + (area.width - width) / 2,
        DialogAlign::Right => area.x + area.width - width,
    };
    let y = area.y + (area.height - height) / 2;

    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PromptPurpose;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[test]
    fn test_dialog_area_packs_and_centers() {
        let area = Rect::new(0, 0, 100, 40);
        let config = DialogConfig::new("x").with_width(60);

        let rect = dialog_area(&config, 5, area);
        assert_eq!(rect, Rect::new(20, 17, 60, 5));
    }

    #[test]
    fn test_dialog_area_percent_and_alignment() {
        let area = Rect::new(0, 0, 100, 40);
        let mut config = DialogConfig::new("x")
            .with_width(50)
            .with_height(DialogHeight::Percent(50));
        config.align = DialogAlign::Right;

        let rect = dialog_area(&config, 0, area);
        assert_eq!(rect, Rect::new(50, 10, 50, 20));
    }

    #[test]
    fn test_dialog_area_never_exceeds_screen() {
        let area = Rect::new(0, 0, 40, 5);
        let rect = dialog_area(&DialogConfig::new("x"), 50, area);
        assert!(rect.height <= area.height);
    }

    #[test]
    fn test_render_prompt_with_error() {
        let backend = TestBackend::new(60, 20);
        let mut terminal = Terminal::new(backend).unwrap();

        let mut dialog = Dialog::prompt(
            PromptPurpose::Commit {
                target: "abc".to_string(),
            },
            "bad name",
        );
        dialog.prompt_mut().unwrap().error = Some("invalid reference".to_string());

        terminal
            .draw(|f| render_dialog(f, f.area(), &dialog))
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Commit Container"));
        assert!(text.contains("invalid reference"));
    }

    #[test]
    fn test_render_table_dialog() {
        let backend = TestBackend::new(80, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        let dialog = Dialog::table(
            "History",
            &["Id", "Created By"],
            vec![vec!["abc".to_string(), "/bin/sh -c apk add".to_string()]],
        );

        terminal
            .draw(|f| render_dialog(f, f.area(), &dialog))
            .unwrap();
    }
}

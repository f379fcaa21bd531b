//! Field rendering utilities for forms

use crate::state::FormField;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Rows taken by one field: bordered input plus its error line
pub const FIELD_HEIGHT: u16 = 4;

/// Draw a form field with the error line beneath it
pub fn draw_field(
    frame: &mut Frame,
    area: Rect,
    field: &FormField,
    is_active: bool,
    error: Option<&str>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(1)])
        .split(area);

    let border_style = match (is_active, error.is_some()) {
        (true, _) => Style::default().fg(Color::Cyan),
        (false, true) => Style::default().fg(Color::Red),
        (false, false) => Style::default().fg(Color::DarkGray),
    };

    let content = if field.is_checkbox() {
        checkbox_line(field, is_active)
    } else {
        input_line(field, is_active)
    };

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);
    if !field.is_checkbox() {
        block = block.title(format!(" {} ", field.label));
    }
    frame.render_widget(Paragraph::new(content).block(block), chunks[0]);

    if let Some(message) = error {
        let error_line = Paragraph::new(Line::from(Span::styled(
            format!(" {message}"),
            Style::default().fg(Color::Red),
        )));
        frame.render_widget(error_line, chunks[1]);
    }
}

fn input_line(field: &FormField, is_active: bool) -> Line<'static> {
    let value = field.display_value();
    let mut spans = if value.is_empty() && !is_active {
        vec![Span::styled(
            field.placeholder.clone(),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )]
    } else {
        let style = if is_active {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::Gray)
        };
        vec![Span::styled(value, style)]
    };
    if is_active {
        spans.push(Span::styled("▌", Style::default().fg(Color::Cyan)));
    }
    Line::from(spans)
}

fn checkbox_line(field: &FormField, is_active: bool) -> Line<'static> {
    let box_style = if field.is_checked() {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else if is_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Line::from(vec![
        Span::styled(field.display_value(), box_style),
        Span::raw(" "),
        Span::raw(field.label.clone()),
    ])
}

/// Draw a line of muted help text
pub fn draw_help_text(frame: &mut Frame, area: Rect, text: &str) {
    let help = Paragraph::new(Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(help, area);
}

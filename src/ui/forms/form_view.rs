//! Sign-in, sign-up and employee form screens

use super::field_renderer::{draw_field, draw_help_text, FIELD_HEIGHT};
use crate::platform::{LINK_SHORTCUT, SUBMIT_SHORTCUT};
use crate::state::{FormKind, FormModel, SubmitPhase};
use crate::ui::components::{render_button, BUTTON_HEIGHT};
use crate::ui::layout::centered_column;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const FORM_WIDTH: u16 = 60;

/// Draw the mounted form
pub fn draw(frame: &mut Frame, area: Rect, form: &FormModel) {
    let column = centered_column(area, FORM_WIDTH);

    let error_height = if form.submit_error().is_some() { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),             // Title + subtitle
            Constraint::Length(error_height),  // Top-level error
            Constraint::Min(FIELD_HEIGHT),     // Fields
            Constraint::Length(BUTTON_HEIGHT), // Submit
            Constraint::Length(1),             // Link / help
        ])
        .split(column);

    draw_header(frame, chunks[0], form.kind);
    if let Some(message) = form.submit_error() {
        draw_submit_error(frame, chunks[1], message);
    }
    draw_fields(frame, chunks[2], form);

    let label = match form.phase() {
        SubmitPhase::Submitting => "Please wait...",
        SubmitPhase::Idle | SubmitPhase::Validating => form.kind.submit_label(),
    };
    render_button(
        frame,
        chunks[3],
        label,
        form.is_submit_row_active(),
        !form.is_submitting(),
    );

    draw_help_text(frame, chunks[4], &footer_text(form.kind));
}

fn draw_header(frame: &mut Frame, area: Rect, kind: FormKind) {
    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            kind.title(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            kind.subtitle(),
            Style::default().fg(Color::Gray),
        )),
    ]);
    frame.render_widget(header, area);
}

fn draw_submit_error(frame: &mut Frame, area: Rect, message: &str) {
    let error = Paragraph::new(Line::from(Span::styled(
        message.to_string(),
        Style::default().fg(Color::Red),
    )))
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );
    frame.render_widget(error, area);
}

/// Fields that fit are drawn; the window follows the focused field
fn draw_fields(frame: &mut Frame, area: Rect, form: &FormModel) {
    let slots = (area.height / FIELD_HEIGHT).max(1) as usize;
    let offset = scroll_offset(form.active_field_index, form.fields.len(), slots);

    for (row, (index, field)) in form
        .fields
        .iter()
        .enumerate()
        .skip(offset)
        .take(slots)
        .enumerate()
    {
        let field_area = Rect {
            x: area.x,
            y: area.y + row as u16 * FIELD_HEIGHT,
            width: area.width,
            height: FIELD_HEIGHT,
        };
        draw_field(
            frame,
            field_area,
            field,
            index == form.active_field_index,
            form.visible_error(&field.name),
        );
    }
}

/// First field index to draw so that `active` is inside a window of `slots`
fn scroll_offset(active: usize, field_count: usize, slots: usize) -> usize {
    let max_offset = field_count.saturating_sub(slots);
    let focused = active.min(field_count.saturating_sub(1));
    focused.saturating_sub(slots.saturating_sub(1)).min(max_offset)
}

fn footer_text(kind: FormKind) -> String {
    match kind {
        FormKind::SignIn => format!("No account? Sign up ({LINK_SHORTCUT})"),
        FormKind::SignUp => format!("Already have an account? Sign in ({LINK_SHORTCUT})"),
        FormKind::Employee => format!("{SUBMIT_SHORTCUT} to submit  Esc to go back"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_offset_keeps_focus_visible() {
        // Everything fits
        assert_eq!(scroll_offset(0, 2, 5), 0);
        assert_eq!(scroll_offset(2, 2, 5), 0);
        // Window slides with focus
        assert_eq!(scroll_offset(0, 7, 3), 0);
        assert_eq!(scroll_offset(3, 7, 3), 1);
        assert_eq!(scroll_offset(6, 7, 3), 4);
        // Submit row shows the last fields
        assert_eq!(scroll_offset(7, 7, 3), 4);
    }

    #[test]
    fn test_footer_mentions_link() {
        assert!(footer_text(FormKind::SignIn).starts_with("No account? Sign up"));
        assert!(footer_text(FormKind::SignUp).starts_with("Already have an account?"));
    }
}

//! Layout helpers and the status bar

use crate::app::App;
use crate::state::View;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Split the screen into content and a one-line status bar
pub fn create_layout(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);
    (chunks[0], chunks[1])
}

/// A column of at most `width` cells, centered horizontally, with a
/// one-row top margin
pub fn centered_column(area: Rect, width: u16) -> Rect {
    let width = width.min(area.width);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y.saturating_add(1).min(area.bottom()),
        width,
        height: area.height.saturating_sub(1),
    }
}

/// Draw the status bar
pub fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::raw(" ")];

    spans.push(Span::styled(
        view_hints(app.state.current_view),
        Style::default().fg(Color::Gray),
    ));

    if let Some(msg) = &app.status_message {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(msg, Style::default().fg(Color::Green)));
    }

    let session_email = app
        .state
        .home
        .session
        .as_ref()
        .filter(|_| app.state.current_view == View::Home)
        .map(|s| s.email.as_str());
    if let Some(email) = session_email {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(email, Style::default().fg(Color::Blue)));
    }

    let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status, area);

    let quit_hint = " ^C:quit ";
    let quit_area = Rect {
        x: area.x + area.width.saturating_sub(quit_hint.len() as u16),
        y: area.y,
        width: (quit_hint.len() as u16).min(area.width),
        height: 1,
    };
    let quit_widget =
        Paragraph::new(quit_hint).style(Style::default().bg(Color::DarkGray).fg(Color::Gray));
    frame.render_widget(quit_widget, quit_area);
}

/// Keyboard hints for the current view
fn view_hints(view: View) -> &'static str {
    match view {
        View::Welcome => "↑↓:select  Enter:open  i:sign in  u:sign up  q:quit",
        View::SignIn | View::SignUp => "Tab:next  Enter:next/submit  ^S:submit  ^N:switch  Esc:back",
        View::Employee => "Tab:next  Space:toggle  ^S:submit  Esc:back",
        View::Home => "e:employee form  l:log out  q:quit",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_column_narrower_than_area() {
        let area = Rect::new(0, 0, 100, 40);
        let column = centered_column(area, 60);
        assert_eq!(column, Rect::new(20, 1, 60, 39));
    }

    #[test]
    fn test_centered_column_clamps_to_area() {
        let area = Rect::new(5, 2, 30, 10);
        let column = centered_column(area, 60);
        assert_eq!(column, Rect::new(5, 3, 30, 9));
    }

    #[test]
    fn test_create_layout_reserves_status_line() {
        let (content, status) = create_layout(Rect::new(0, 0, 80, 24));
        assert_eq!(content.height, 23);
        assert_eq!(status, Rect::new(0, 23, 80, 1));
    }
}

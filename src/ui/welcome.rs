//! Welcome screen

use super::components::{render_key_button, BUTTON_HEIGHT};
use super::layout::centered_column;
use crate::app::App;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let column = centered_column(area, 40);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(4),             // Title
            Constraint::Length(BUTTON_HEIGHT), // Sign In
            Constraint::Length(BUTTON_HEIGHT), // Sign Up
            Constraint::Min(0),
        ])
        .split(column);

    let title = Paragraph::new(vec![
        Line::from(Span::styled(
            "Welcome to FORMS",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Sign in or create an account",
            Style::default().fg(Color::Gray),
        )),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(title, chunks[1]);

    let selected = app.state.selected_index;
    render_key_button(frame, chunks[2], "i", "Sign In", selected == 0);
    render_key_button(frame, chunks[3], "u", "Sign Up", selected == 1);
}

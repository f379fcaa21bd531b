//! Home screen: greeting, playlists and recommendations

use super::layout::centered_column;
use crate::app::App;
use crate::state::{HomeState, SAMPLE_PLAYLISTS, SAMPLE_RECOMMENDATIONS};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let column = centered_column(area, 70);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Greeting
            Constraint::Length(SAMPLE_PLAYLISTS.len() as u16 + 2),
            Constraint::Length(SAMPLE_RECOMMENDATIONS.len() as u16 + 2),
            Constraint::Min(0),
        ])
        .split(column);

    let greeting = Paragraph::new(vec![
        Line::from(Span::styled(
            greeting_text(&app.state.home),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Your music. Your vibe.",
            Style::default().fg(Color::Gray),
        )),
    ]);
    frame.render_widget(greeting, chunks[0]);

    let playlists: Vec<ListItem> = SAMPLE_PLAYLISTS
        .iter()
        .map(|p| {
            ListItem::new(Line::from(vec![
                Span::styled(p.title, Style::default().fg(Color::White)),
                Span::styled(
                    format!("  {} songs", p.songs),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();
    frame.render_widget(
        List::new(playlists).block(
            Block::default()
                .title(" Your Playlists ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        ),
        chunks[1],
    );

    let recommendations: Vec<ListItem> = SAMPLE_RECOMMENDATIONS
        .iter()
        .map(|r| {
            ListItem::new(Line::from(vec![
                Span::styled("♪ ", Style::default().fg(Color::Magenta)),
                Span::styled(r.song, Style::default().fg(Color::White)),
                Span::styled(
                    format!("  {}", r.artist),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();
    frame.render_widget(
        List::new(recommendations).block(
            Block::default()
                .title(" Recommended for you ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        ),
        chunks[2],
    );
}

fn greeting_text(home: &HomeState) -> String {
    match (&home.display_name, home.resolving) {
        (Some(name), _) => format!("Welcome Back {name}"),
        (None, true) => "Loading your profile...".to_string(),
        (None, false) => "Welcome Back".to_string(),
    }
}

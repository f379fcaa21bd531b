//! UI module for rendering the TUI

mod components;
mod forms;
mod home;
mod layout;
mod welcome;

use crate::app::App;
use crate::state::View;
use ratatui::Frame;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let (main_area, status_area) = layout::create_layout(frame.area());

    match app.state.current_view {
        View::Welcome => welcome::draw(frame, main_area, app),
        View::SignIn | View::SignUp | View::Employee => {
            if let Some(form) = &app.state.form {
                forms::draw(frame, main_area, form);
            }
        }
        View::Home => home::draw(frame, main_area, app),
    }

    layout::draw_status_bar(frame, status_area, app);

    // Error dialog goes on top of everything
    if let Some(message) = app.state.current_error() {
        let remaining = app.state.error_count().saturating_sub(1);
        components::render_error_dialog(frame, message, remaining);
    }
}

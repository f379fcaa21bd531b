//! Application state definitions

use super::forms::{FormKind, FormModel};
use crate::backend::Session;
use std::collections::VecDeque;

/// Current view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Welcome,
    SignIn,
    SignUp,
    Employee,
    Home,
}

impl View {
    /// Form shown by this view, if any
    pub fn form_kind(&self) -> Option<FormKind> {
        match self {
            View::SignIn => Some(FormKind::SignIn),
            View::SignUp => Some(FormKind::SignUp),
            View::Employee => Some(FormKind::Employee),
            View::Welcome | View::Home => None,
        }
    }

    pub fn is_form_view(&self) -> bool {
        self.form_kind().is_some()
    }
}

/// A playlist card on the home screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub title: &'static str,
    pub songs: u32,
}

/// A recommended track on the home screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub artist: &'static str,
    pub song: &'static str,
}

pub const SAMPLE_PLAYLISTS: &[Playlist] = &[
    Playlist {
        title: "Chill Vibes",
        songs: 35,
    },
    Playlist {
        title: "Top Hits 2024",
        songs: 50,
    },
    Playlist {
        title: "Focus & Study",
        songs: 28,
    },
];

pub const SAMPLE_RECOMMENDATIONS: &[Recommendation] = &[
    Recommendation {
        artist: "Lana Del Rey",
        song: "Candy Necklace",
    },
    Recommendation {
        artist: "The Weekend",
        song: "Blinding Lights",
    },
    Recommendation {
        artist: "Joji",
        song: "Glimpse of Us",
    },
];

/// Home screen state, reset on every mount
#[derive(Debug, Clone, Default)]
pub struct HomeState {
    /// Session last reported by the observer
    pub session: Option<Session>,
    /// Name resolved from the users collection
    pub display_name: Option<String>,
    /// A profile lookup is in flight
    pub resolving: bool,
}

/// Main application state
#[derive(Debug, Default)]
pub struct AppState {
    // Navigation
    pub current_view: View,
    pub view_history: Vec<View>,

    // Welcome screen button (0 = Sign In, 1 = Sign Up)
    pub selected_index: usize,

    // Form mounted for the current form view
    pub form: Option<FormModel>,

    // Home
    pub home: HomeState,

    // Modal error queue for failures outside a form
    errors: VecDeque<String>,
}

impl AppState {
    /// Mount a fresh form for `kind`, discarding any previous one
    pub fn mount_form(&mut self, kind: FormKind) {
        self.form = Some(FormModel::new(kind));
    }

    /// Drop the current form and its values
    pub fn clear_form(&mut self) {
        self.form = None;
    }

    /// Mounted form, only if it is the one of `kind`
    pub fn form_mut(&mut self, kind: FormKind) -> Option<&mut FormModel> {
        self.form.as_mut().filter(|f| f.kind == kind)
    }

    /// Queue an error for the modal dialog
    pub fn push_error(&mut self, message: String) {
        self.errors.push_back(message);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Error currently shown in the dialog
    pub fn current_error(&self) -> Option<&str> {
        self.errors.front().map(String::as_str)
    }

    /// Errors waiting in the dialog queue, including the shown one
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn dismiss_error(&mut self) {
        self.errors.pop_front();
    }

    /// Move welcome selection down
    pub fn move_selection_down(&mut self, max: usize) {
        if max > 0 && self.selected_index < max - 1 {
            self.selected_index += 1;
        }
    }

    /// Move welcome selection up
    pub fn move_selection_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_view_is_welcome() {
        let state = AppState::default();
        assert_eq!(state.current_view, View::Welcome);
        assert!(state.form.is_none());
    }

    #[test]
    fn test_form_views() {
        assert_eq!(View::SignIn.form_kind(), Some(FormKind::SignIn));
        assert_eq!(View::SignUp.form_kind(), Some(FormKind::SignUp));
        assert_eq!(View::Employee.form_kind(), Some(FormKind::Employee));
        assert!(!View::Home.is_form_view());
        assert!(!View::Welcome.is_form_view());
    }

    #[test]
    fn test_form_mut_checks_kind() {
        let mut state = AppState::default();
        state.mount_form(FormKind::SignIn);
        assert!(state.form_mut(FormKind::SignIn).is_some());
        assert!(state.form_mut(FormKind::SignUp).is_none());
        state.clear_form();
        assert!(state.form_mut(FormKind::SignIn).is_none());
    }

    #[test]
    fn test_error_queue_is_fifo() {
        let mut state = AppState::default();
        assert!(!state.has_errors());
        state.push_error("first".into());
        state.push_error("second".into());
        assert_eq!(state.current_error(), Some("first"));
        assert_eq!(state.error_count(), 2);
        state.dismiss_error();
        assert_eq!(state.current_error(), Some("second"));
        state.dismiss_error();
        assert!(!state.has_errors());
    }

    #[test]
    fn test_selection_bounds() {
        let mut state = AppState::default();
        state.move_selection_up();
        assert_eq!(state.selected_index, 0);
        state.move_selection_down(2);
        state.move_selection_down(2);
        assert_eq!(state.selected_index, 1);
    }

    #[test]
    fn test_sample_home_data() {
        assert_eq!(SAMPLE_PLAYLISTS.len(), 3);
        assert_eq!(SAMPLE_RECOMMENDATIONS[2].artist, "Joji");
    }
}

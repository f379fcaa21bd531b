//! Platform-specific configuration

use crossterm::event::KeyModifiers;

/// Platform-appropriate modifier for the sign-in/sign-up link
/// - macOS: SUPER (Cmd key)
/// - Linux/Windows: CONTROL (Ctrl key)
#[cfg(target_os = "macos")]
pub const LINK_MODIFIER: KeyModifiers = KeyModifiers::SUPER;

#[cfg(not(target_os = "macos"))]
pub const LINK_MODIFIER: KeyModifiers = KeyModifiers::CONTROL;

/// Submit shortcut display for form help text
/// Ctrl+S works on all platforms (Enter on the submit button also works)
pub const SUBMIT_SHORTCUT: &str = "Ctrl+S";

/// Link shortcut display
/// - macOS: "Cmd+N"
/// - Linux/Windows: "Ctrl+N"
#[cfg(target_os = "macos")]
pub const LINK_SHORTCUT: &str = "Cmd+N";

#[cfg(not(target_os = "macos"))]
pub const LINK_SHORTCUT: &str = "Ctrl+N";

//! Form rendering module
//!
//! - `field_renderer`: Field rendering utilities
//! - `form_view`: The sign-in, sign-up and employee screens

mod field_renderer;
mod form_view;

pub use form_view::draw;

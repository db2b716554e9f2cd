//! TUI rendering components.

mod panels;
mod render;
#[cfg(test)]
mod render_tests;
pub mod theme;

pub use render::{centered_rect, describe_preset, draw, format_age, truncate_to_width};

//! dispatch CLI library
//!
//! Launches agent presets into git worktrees and terminal pane grids, and
//! hosts the interactive review interface (ratatui).

pub mod app;
pub mod launch_cmd;
pub mod services;
pub mod tui;
pub mod ui;

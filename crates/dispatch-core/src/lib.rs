//! Dispatch Core Library
//!
//! Everything needed to fan one task out across isolated checkouts:
//! - Preset and settings files
//! - Preset resolution into launch units
//! - Git worktree lifecycle and sidecar metadata
//! - Pane bootstrap commands and the grid layout
//! - Launch coordination against a terminal backend

pub mod agents;
pub mod command;
pub mod config;
pub mod error;
pub mod git;
pub mod launcher;
pub mod layout;
pub mod paths;
pub mod resolver;
pub mod session;
pub mod terminal;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
pub mod tracing_init;
pub mod workspace;

pub use config::{AppSettings, Config};
pub use error::{Error, Result};
pub use launcher::{LaunchReport, LaunchRequest, Launcher};

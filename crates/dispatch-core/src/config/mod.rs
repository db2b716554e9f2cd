//! Configuration files kept in the data directory.

pub mod preset;
pub mod settings;

pub use preset::{Command, Config, Preset, Window, parse_hex_color};
pub use settings::{AppSettings, TerminalKind};

//! Preset file (`settings.yaml`): named layouts of agent windows.
//!
//! ```yaml
//! default: pair
//! presets:
//!   pair:
//!     - agent: claude
//!       n: 2
//!       commands:
//!         - command: npm run dev
//!           title: Dev Server
//!           color: "#2e8b57"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Longest command text used verbatim as a pane title.
const TITLE_MAX_CHARS: usize = 30;

/// Parsed preset file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Preset used when none is named explicitly.
    pub default: String,
    pub presets: BTreeMap<String, Preset>,
}

/// Ordered list of windows; file order is launch order.
pub type Preset = Vec<Window>;

/// One agent and the auxiliary panes that accompany each of its replicas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Window {
    pub agent: String,
    /// Replica count. Zero or negative means one.
    #[serde(rename = "n", alias = "replicate")]
    pub replicate: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<Command>,
}

impl Window {
    /// A window without an agent can never launch anything.
    pub fn is_valid(&self) -> bool {
        !self.agent.trim().is_empty()
    }
}

/// Extra pane running a shell command next to an agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Command {
    /// Empty means "open a shell and run nothing".
    pub command: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    /// `#rrggbb` or `rrggbb`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub color: String,
}

impl Command {
    /// Title shown for this pane: explicit title, else the (shortened)
    /// command, else `terminal`.
    pub fn display_title(&self) -> String {
        if !self.title.is_empty() {
            return self.title.clone();
        }
        let command = self.command.trim();
        if command.is_empty() {
            return "terminal".to_string();
        }
        if command.chars().count() > TITLE_MAX_CHARS {
            let head: String = command.chars().take(TITLE_MAX_CHARS - 3).collect();
            format!("{head}...")
        } else {
            command.to_string()
        }
    }

    /// Explicit color, when it parses.
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        parse_hex_color(&self.color)
    }
}

impl Config {
    /// Load the preset file. `Ok(None)` when the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No preset file");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Some(Self::from_yaml(&data)?))
    }

    pub fn from_yaml(data: &str) -> Result<Self> {
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(data)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }

    pub fn preset(&self, name: &str) -> Option<&Preset> {
        self.presets.get(name)
    }

    /// Preset names in display order.
    pub fn preset_names(&self) -> Vec<String> {
        self.presets.keys().cloned().collect()
    }
}

/// Parse `#rrggbb` / `rrggbb` into channels.
pub fn parse_hex_color(value: &str) -> Option<(u8, u8, u8)> {
    let hex = value.strip_prefix('#').unwrap_or(value);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

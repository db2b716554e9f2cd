//! Application settings (`dispatch.yaml`).

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

const HEADER: &str = "# Dispatch App Settings\n# This file is auto-generated. Edit carefully.\n\n";

pub const MIN_RETENTION_DAYS: u32 = 1;
pub const MAX_RETENTION_DAYS: u32 = 365;

/// Themes the review interface knows how to paint.
pub const THEMES: [&str; 3] = ["default", "dark", "light"];

/// Which terminal application hosts the panes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminalKind {
    #[default]
    Iterm2,
    Terminal,
}

impl TerminalKind {
    pub const ALL: [Self; 2] = [Self::Iterm2, Self::Terminal];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Iterm2 => "iterm2",
            Self::Terminal => "terminal",
        }
    }

    /// The other kind. There are only two.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Iterm2 => Self::Terminal,
            Self::Terminal => Self::Iterm2,
        }
    }
}

impl fmt::Display for TerminalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalSettings {
    #[serde(rename = "type")]
    pub kind: TerminalKind,
    pub maximize_on_launch: bool,
    pub max_panes_per_window: usize,
}

impl Default for TerminalSettings {
    fn default() -> Self {
        Self {
            kind: TerminalKind::default(),
            maximize_on_launch: true,
            max_panes_per_window: crate::layout::MAX_PANES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    pub show_status_bar: bool,
    pub theme: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            show_status_bar: true,
            theme: THEMES[0].to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub default_preset: String,
    pub auto_clean_worktrees: bool,
    pub worktree_retention_days: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            default_preset: "default".to_string(),
            auto_clean_worktrees: false,
            worktree_retention_days: 7,
        }
    }
}

/// Everything stored in `dispatch.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub terminal: TerminalSettings,
    pub ui: UiSettings,
    pub session: SessionSettings,
}

impl AppSettings {
    /// Load settings, falling back to defaults when the file is absent.
    /// Out-of-range values are pulled back into range.
    pub fn load(path: &Path) -> Result<Self> {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut settings: Self = serde_yaml::from_str(&data)?;
        settings.normalize();
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let body = serde_yaml::to_string(self)?;
        std::fs::write(path, format!("{HEADER}{body}"))?;
        Ok(())
    }

    pub fn normalize(&mut self) {
        self.session.worktree_retention_days = clamp_retention(i64::from(
            self.session.worktree_retention_days,
        ));
        self.terminal.max_panes_per_window = self.terminal.max_panes_per_window.max(1);
        if !THEMES.contains(&self.ui.theme.as_str()) {
            self.ui.theme = THEMES[0].to_string();
        }
    }

    /// Move the retention window by `delta` days, staying in range.
    pub fn adjust_retention(&mut self, delta: i64) {
        self.session.worktree_retention_days =
            clamp_retention(i64::from(self.session.worktree_retention_days) + delta);
    }

    /// Step to the next (or previous) theme.
    pub fn cycle_theme(&mut self, forward: bool) {
        let idx = THEMES
            .iter()
            .position(|t| *t == self.ui.theme)
            .unwrap_or(0);
        let next = if forward {
            (idx + 1) % THEMES.len()
        } else {
            (idx + THEMES.len() - 1) % THEMES.len()
        };
        self.ui.theme = THEMES[next].to_string();
    }
}

/// Clamp a day count into the allowed retention range.
pub fn clamp_retention(days: i64) -> u32 {
    let clamped = days.clamp(i64::from(MIN_RETENTION_DAYS), i64::from(MAX_RETENTION_DAYS));
    u32::try_from(clamped).unwrap_or(MIN_RETENTION_DAYS)
}

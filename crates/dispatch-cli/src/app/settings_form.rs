//! Settings view: edits a draft of [`AppSettings`] until it is saved.

use crossterm::event::{KeyCode, KeyEvent};
use dispatch_core::config::AppSettings;
use dispatch_core::config::settings::clamp_retention;

use super::KeyResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    TerminalType,
    Maximize,
    Theme,
    DefaultPreset,
    AutoClean,
    RetentionDays,
}

impl SettingsField {
    pub const ALL: [Self; 6] = [
        Self::TerminalType,
        Self::Maximize,
        Self::Theme,
        Self::DefaultPreset,
        Self::AutoClean,
        Self::RetentionDays,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::TerminalType => "Terminal Type",
            Self::Maximize => "Maximize on Launch",
            Self::Theme => "Theme",
            Self::DefaultPreset => "Default Preset",
            Self::AutoClean => "Auto Clean Worktrees",
            Self::RetentionDays => "Worktree Retention (days)",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::TerminalType => "Choose between iTerm2 and regular terminal",
            Self::Maximize => "Maximize terminal windows when launching sessions",
            Self::Theme => "Color theme for the interface",
            Self::DefaultPreset => "Preset to use when none is specified",
            Self::AutoClean => "Allow Ctrl+X to remove old worktrees",
            Self::RetentionDays => "How many days to keep old worktrees (1-365)",
        }
    }
}

#[derive(Debug)]
pub struct SettingsForm {
    pub draft: AppSettings,
    pub presets: Vec<String>,
    pub selected: usize,
    /// Digits typed while the retention field is being edited.
    pub editing: Option<String>,
    pub dirty: bool,
}

impl SettingsForm {
    pub fn new(settings: AppSettings, presets: Vec<String>) -> Self {
        Self {
            draft: settings,
            presets,
            selected: 0,
            editing: None,
            dirty: false,
        }
    }

    pub fn field(&self) -> SettingsField {
        SettingsField::ALL[self.selected.min(SettingsField::ALL.len() - 1)]
    }

    pub const fn at_top(&self) -> bool {
        self.editing.is_none() && self.selected == 0
    }

    /// Current value of `field` as shown in the form.
    pub fn value(&self, field: SettingsField) -> String {
        let on_off = |b: bool| if b { "on" } else { "off" }.to_string();
        match field {
            SettingsField::TerminalType => self.draft.terminal.kind.to_string(),
            SettingsField::Maximize => on_off(self.draft.terminal.maximize_on_launch),
            SettingsField::Theme => self.draft.ui.theme.clone(),
            SettingsField::DefaultPreset => self.draft.session.default_preset.clone(),
            SettingsField::AutoClean => on_off(self.draft.session.auto_clean_worktrees),
            SettingsField::RetentionDays => self
                .editing
                .clone()
                .unwrap_or_else(|| self.draft.session.worktree_retention_days.to_string()),
        }
    }

    fn change(&mut self, forward: bool) {
        let field = self.field();
        let s = &mut self.draft;
        match field {
            SettingsField::TerminalType => s.terminal.kind = s.terminal.kind.toggled(),
            SettingsField::Maximize => {
                s.terminal.maximize_on_launch = !s.terminal.maximize_on_launch;
            }
            SettingsField::Theme => s.cycle_theme(forward),
            SettingsField::DefaultPreset => {
                if self.presets.is_empty() {
                    return;
                }
                let len = self.presets.len();
                let next = match self.presets.iter().position(|p| *p == s.session.default_preset) {
                    Some(i) if forward => (i + 1) % len,
                    Some(i) => (i + len - 1) % len,
                    None => 0,
                };
                s.session.default_preset.clone_from(&self.presets[next]);
            }
            SettingsField::AutoClean => {
                s.session.auto_clean_worktrees = !s.session.auto_clean_worktrees;
            }
            SettingsField::RetentionDays => s.adjust_retention(if forward { 1 } else { -1 }),
        }
        self.dirty = true;
    }

    fn commit_edit(&mut self, buffer: &str) {
        if let Ok(days) = buffer.parse::<i64>() {
            self.draft.session.worktree_retention_days = clamp_retention(days);
            self.dirty = true;
        }
    }

    /// Mark the draft as persisted.
    pub const fn mark_saved(&mut self) {
        self.dirty = false;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult {
        if let Some(buffer) = self.editing.as_mut() {
            match key.code {
                KeyCode::Char(c) if c.is_ascii_digit() && buffer.len() < 3 => buffer.push(c),
                KeyCode::Backspace => {
                    buffer.pop();
                }
                KeyCode::Enter => {
                    let buffer = self.editing.take().unwrap_or_default();
                    self.commit_edit(&buffer);
                }
                KeyCode::Esc => self.editing = None,
                _ => {}
            }
            return KeyResult::Consumed;
        }

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = (self.selected + 1).min(SettingsField::ALL.len() - 1);
            }
            KeyCode::Left | KeyCode::Char('h') => self.change(false),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => self.change(true),
            KeyCode::Enter if self.field() == SettingsField::RetentionDays => {
                self.editing = Some(String::new());
            }
            KeyCode::Enter => self.change(true),
            _ => return KeyResult::Ignored,
        }
        KeyResult::Consumed
    }
}

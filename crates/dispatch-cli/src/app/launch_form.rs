//! Launch view: repository, branch prefix, prompt and preset.

use crossterm::event::{KeyCode, KeyEvent};

use super::KeyResult;
use super::text_input::TextInput;

pub const INCOMPLETE_MESSAGE: &str = "Fill repo, name, and prompt to launch";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchField {
    Repo,
    Name,
    Prompt,
    Preset,
    Launch,
}

impl LaunchField {
    const ORDER: [Self; 5] = [
        Self::Repo,
        Self::Name,
        Self::Prompt,
        Self::Preset,
        Self::Launch,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ORDER[(self.index() + 1).min(Self::ORDER.len() - 1)]
    }

    fn prev(self) -> Self {
        Self::ORDER[self.index().saturating_sub(1)]
    }
}

/// Form contents at the moment of submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchDraft {
    pub repo: String,
    pub name: String,
    pub prompt: String,
    pub preset_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchAction {
    None,
    Submit(LaunchDraft),
    /// Submit attempted with required fields missing.
    Incomplete,
}

#[derive(Debug)]
pub struct LaunchForm {
    pub repo: TextInput,
    pub name: TextInput,
    pub prompt: TextInput,
    pub presets: Vec<String>,
    pub preset_idx: usize,
    pub field: LaunchField,
    /// Preset index under the cursor while the selector is open.
    pub selector: Option<usize>,
}

impl LaunchForm {
    /// `presets` must be non-empty; `initial` picks the starting selection.
    pub fn new(presets: Vec<String>, initial: &str) -> Self {
        let presets = if presets.is_empty() {
            vec!["default".to_string()]
        } else {
            presets
        };
        let preset_idx = presets.iter().position(|p| p == initial).unwrap_or(0);
        Self {
            repo: TextInput::default(),
            name: TextInput::default(),
            prompt: TextInput::default(),
            presets,
            preset_idx,
            field: LaunchField::Repo,
            selector: None,
        }
    }

    pub fn preset_name(&self) -> &str {
        self.presets
            .get(self.preset_idx)
            .map_or("default", String::as_str)
    }

    pub fn at_top(&self) -> bool {
        self.selector.is_none() && self.field == LaunchField::Repo
    }

    fn cycle(&self, idx: usize, forward: bool) -> usize {
        let len = self.presets.len();
        if forward {
            (idx + 1) % len
        } else {
            (idx + len - 1) % len
        }
    }

    fn active_input(&mut self) -> Option<&mut TextInput> {
        match self.field {
            LaunchField::Repo => Some(&mut self.repo),
            LaunchField::Name => Some(&mut self.name),
            LaunchField::Prompt => Some(&mut self.prompt),
            LaunchField::Preset | LaunchField::Launch => None,
        }
    }

    fn submit(&self) -> LaunchAction {
        if self.repo.is_blank() || self.name.is_blank() || self.prompt.is_blank() {
            return LaunchAction::Incomplete;
        }
        LaunchAction::Submit(LaunchDraft {
            repo: self.repo.value().trim().to_string(),
            name: self.name.value().trim().to_string(),
            prompt: self.prompt.value().trim().to_string(),
            preset_name: self.preset_name().to_string(),
        })
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> (KeyResult, LaunchAction) {
        if let Some(idx) = self.selector {
            match key.code {
                KeyCode::Left | KeyCode::Up => self.selector = Some(self.cycle(idx, false)),
                KeyCode::Right | KeyCode::Down => self.selector = Some(self.cycle(idx, true)),
                KeyCode::Enter => {
                    self.preset_idx = idx;
                    self.selector = None;
                }
                KeyCode::Esc => self.selector = None,
                _ => {}
            }
            return (KeyResult::Consumed, LaunchAction::None);
        }

        match key.code {
            KeyCode::Up => {
                self.field = self.field.prev();
                return (KeyResult::Consumed, LaunchAction::None);
            }
            KeyCode::Down => {
                self.field = self.field.next();
                return (KeyResult::Consumed, LaunchAction::None);
            }
            KeyCode::Esc => return (KeyResult::Ignored, LaunchAction::None),
            _ => {}
        }

        match self.field {
            LaunchField::Preset => match key.code {
                KeyCode::Left => self.preset_idx = self.cycle(self.preset_idx, false),
                KeyCode::Right => self.preset_idx = self.cycle(self.preset_idx, true),
                KeyCode::Enter => self.selector = Some(self.preset_idx),
                _ => return (KeyResult::Ignored, LaunchAction::None),
            },
            LaunchField::Launch => {
                if key.code == KeyCode::Enter {
                    return (KeyResult::Consumed, self.submit());
                }
                return (KeyResult::Ignored, LaunchAction::None);
            }
            LaunchField::Repo | LaunchField::Name | LaunchField::Prompt => {
                if key.code == KeyCode::Enter {
                    self.field = self.field.next();
                } else if !self.active_input().is_some_and(|input| input.handle_key(key)) {
                    return (KeyResult::Ignored, LaunchAction::None);
                }
            }
        }
        (KeyResult::Consumed, LaunchAction::None)
    }
}

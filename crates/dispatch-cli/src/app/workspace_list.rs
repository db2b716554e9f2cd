//! Workspaces view: the list of worktrees and its delete confirmation.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use dispatch_core::workspace::WorkspaceInfo;

use super::KeyResult;

/// Requests the view hands back to [`App`](super::App).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListAction {
    None,
    Refresh,
    Prune,
    ToggleDetails,
    /// Re-open with the saved preset (`o`).
    Open(PathBuf),
    /// Focus an existing window, else re-open (Enter).
    FocusOrOpen(PathBuf),
    Delete(PathBuf),
}

#[derive(Debug, Default)]
pub struct WorkspaceList {
    pub items: Vec<WorkspaceInfo>,
    pub selected: usize,
    pub loading: bool,
    /// Set while waiting for y/n on a delete.
    pub confirm_delete: Option<PathBuf>,
    /// Show the full prompt of the selected workspace.
    pub expanded_prompt: bool,
}

impl WorkspaceList {
    pub fn selected_item(&self) -> Option<&WorkspaceInfo> {
        self.items.get(self.selected)
    }

    pub const fn at_top(&self) -> bool {
        self.confirm_delete.is_none() && self.selected == 0
    }

    /// Replace the items, keeping the selection on the same path if possible.
    pub fn set_items(&mut self, items: Vec<WorkspaceInfo>) {
        let previous = self.selected_item().map(|i| i.path.clone());
        self.items = items;
        self.loading = false;
        self.selected = previous
            .and_then(|p| self.items.iter().position(|i| i.path == p))
            .unwrap_or(0)
            .min(self.items.len().saturating_sub(1));
        if let Some(armed) = &self.confirm_delete
            && !self.items.iter().any(|i| &i.path == armed)
        {
            self.confirm_delete = None;
        }
    }

    pub fn remove(&mut self, path: &std::path::Path) {
        self.items.retain(|i| i.path != path);
        self.selected = self.selected.min(self.items.len().saturating_sub(1));
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> (KeyResult, ListAction) {
        if let Some(target) = self.confirm_delete.clone() {
            return match key.code {
                KeyCode::Char('y' | 'Y') => {
                    self.confirm_delete = None;
                    (KeyResult::Consumed, ListAction::Delete(target))
                }
                KeyCode::Char('n' | 'N') | KeyCode::Esc => {
                    self.confirm_delete = None;
                    (KeyResult::Consumed, ListAction::None)
                }
                // Everything else is swallowed until the dialog is answered.
                _ => (KeyResult::Consumed, ListAction::None),
            };
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let selected_path = self.selected_item().map(|i| i.path.clone());
        let action = match key.code {
            KeyCode::Char('r') if ctrl => ListAction::Refresh,
            KeyCode::Char('x') if ctrl => ListAction::Prune,
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                ListAction::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.items.len() {
                    self.selected += 1;
                }
                ListAction::None
            }
            KeyCode::Char('g') | KeyCode::Home => {
                self.selected = 0;
                ListAction::None
            }
            KeyCode::Char('G') | KeyCode::End => {
                self.selected = self.items.len().saturating_sub(1);
                ListAction::None
            }
            KeyCode::Char('e') => {
                self.expanded_prompt = !self.expanded_prompt;
                ListAction::None
            }
            KeyCode::Char('d') if selected_path.is_some() => ListAction::ToggleDetails,
            KeyCode::Char('o') => selected_path.map_or(ListAction::None, ListAction::Open),
            KeyCode::Enter => selected_path.map_or(ListAction::None, ListAction::FocusOrOpen),
            KeyCode::Char('x') | KeyCode::Delete | KeyCode::Backspace => {
                self.confirm_delete = selected_path;
                ListAction::None
            }
            _ => return (KeyResult::Ignored, ListAction::None),
        };
        (KeyResult::Consumed, action)
    }
}

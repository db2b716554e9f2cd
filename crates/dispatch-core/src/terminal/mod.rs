//! Terminal application driver.
//!
//! Backends translate window/pane operations into whatever the host terminal
//! understands. Both shipped backends talk AppleScript through `osascript`.

mod apple_terminal;
pub mod applescript;
mod iterm;

use std::path::Path;
use std::sync::Arc;

pub use apple_terminal::AppleTerminal;
pub use applescript::{Osascript, ScriptRunner};
pub use iterm::Iterm;

use crate::config::TerminalKind;
use crate::error::Result;

/// Side on which a new pane appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitDirection {
    Right,
    Down,
}

/// Backend-specific pane identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PaneHandle(pub String);

impl PaneHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// What to look for when bringing an existing window forward.
#[derive(Debug, Clone, Copy)]
pub struct FocusTarget<'a> {
    /// Working directory of one of the window's panes.
    pub path: &'a Path,
    /// Text contained in one of the window's pane titles (the branch).
    pub title: &'a str,
}

/// Pane operations needed by the launcher.
///
/// Calls for one window are bracketed by [`open_window`](Self::open_window)
/// and [`finish_window`](Self::finish_window).
pub trait TerminalBackend: Send {
    /// Verify the terminal application can be driven at all.
    fn connect(&mut self) -> Result<()>;

    /// Open a fresh window and return its only pane.
    fn open_window(&mut self) -> Result<PaneHandle>;

    fn split(&mut self, parent: &PaneHandle, direction: SplitDirection) -> Result<PaneHandle>;

    /// Type `text` into `pane`. `text` ends in a newline and is executed.
    fn send_text(&mut self, pane: &PaneHandle, text: &str) -> Result<()>;

    /// Flush the current window, optionally resizing it to the screen.
    fn finish_window(&mut self, maximize: bool) -> Result<()>;

    /// Bring forward a window matching `target`. `Ok(false)` when none does.
    fn focus(&mut self, target: &FocusTarget<'_>) -> Result<bool>;
}

/// Backend for the configured terminal kind.
pub fn backend_for(kind: TerminalKind, scripts: Arc<dyn ScriptRunner>) -> Box<dyn TerminalBackend> {
    match kind {
        TerminalKind::Iterm2 => Box::new(Iterm::new(scripts)),
        TerminalKind::Terminal => Box::new(AppleTerminal::new(scripts)),
    }
}

/// AppleScript that resizes the front window of `app` to the desktop bounds.
pub(crate) fn maximize_script(app: &str) -> String {
    format!(
        r#"tell application "{app}"
    tell front window
        tell application "Finder"
            set screenBounds to bounds of window of desktop
        end tell
        set bounds to {{0, 25, (item 3 of screenBounds), (item 4 of screenBounds) - 50}}
    end tell
end tell"#
    )
}

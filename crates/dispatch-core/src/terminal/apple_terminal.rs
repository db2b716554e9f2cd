//! Terminal.app backend.
//!
//! Terminal.app cannot split panes, so every logical pane becomes its own
//! window. The grid still decides the order in which they are opened.

use std::sync::Arc;

use tracing::{debug, warn};

use super::applescript::{self, ScriptRunner};
use super::{FocusTarget, PaneHandle, SplitDirection, TerminalBackend, maximize_script};
use crate::error::{Error, Result};

const APP: &str = "Terminal";

pub struct AppleTerminal {
    scripts: Arc<dyn ScriptRunner>,
    /// Pending command per logical pane, `None` until text is sent.
    panes: Vec<Option<String>>,
    open: bool,
}

impl AppleTerminal {
    pub fn new(scripts: Arc<dyn ScriptRunner>) -> Self {
        Self {
            scripts,
            panes: Vec::new(),
            open: false,
        }
    }

    fn index(&self, pane: &PaneHandle) -> Result<usize> {
        pane.as_str()
            .strip_prefix('w')
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|n| *n < self.panes.len())
            .ok_or_else(|| {
                Error::InvalidConfig(format!("unknown Terminal pane '{}'", pane.as_str()))
            })
    }

    fn add_pane(&mut self) -> PaneHandle {
        self.panes.push(None);
        PaneHandle::new(format!("w{}", self.panes.len() - 1))
    }
}

impl TerminalBackend for AppleTerminal {
    fn connect(&mut self) -> Result<()> {
        self.scripts
            .run(&format!("tell application \"{APP}\" to activate"))?;
        Ok(())
    }

    fn open_window(&mut self) -> Result<PaneHandle> {
        if self.open {
            warn!("Discarding unfinished Terminal window batch");
        }
        self.panes.clear();
        self.open = true;
        Ok(self.add_pane())
    }

    fn split(&mut self, parent: &PaneHandle, direction: SplitDirection) -> Result<PaneHandle> {
        if !self.open {
            return Err(Error::InvalidConfig("no Terminal window is open".into()));
        }
        self.index(parent)?;
        debug!(?direction, "Terminal: split becomes a separate window");
        Ok(self.add_pane())
    }

    fn send_text(&mut self, pane: &PaneHandle, text: &str) -> Result<()> {
        let idx = self.index(pane)?;
        let line = text.strip_suffix('\n').unwrap_or(text);
        self.panes[idx] = Some(line.to_string());
        Ok(())
    }

    fn finish_window(&mut self, maximize: bool) -> Result<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        let mut lines = vec![format!("tell application \"{APP}\""), "activate".to_string()];
        for command in std::mem::take(&mut self.panes) {
            lines.push(format!(
                "do script \"{}\"",
                applescript::escape(command.as_deref().unwrap_or_default())
            ));
        }
        lines.push("end tell".to_string());
        self.scripts.run(&lines.join("\n"))?;
        if maximize && let Err(e) = self.scripts.run(&maximize_script(APP)) {
            warn!(error = %e, "Failed to maximize Terminal window");
        }
        Ok(())
    }

    fn focus(&mut self, target: &FocusTarget<'_>) -> Result<bool> {
        let path = target.path.to_string_lossy();
        let script = format!(
            r#"tell application "{APP}"
    repeat with aWindow in windows
        repeat with aTab in tabs of aWindow
            try
                set tabText to (history of aTab) as text
                set tabTitle to (custom title of aTab) as text
                if ("{path}" is not "" and tabText contains "{path}") or ("{title}" is not "" and tabTitle contains "{title}") then
                    set index of aWindow to 1
                    activate
                    return true
                end if
            end try
        end repeat
    end repeat
    return false
end tell"#,
            path = applescript::escape(&path),
            title = applescript::escape(target.title),
        );
        Ok(applescript::is_true(&self.scripts.run(&script)?))
    }
}

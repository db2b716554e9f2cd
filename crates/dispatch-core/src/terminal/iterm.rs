//! iTerm2 backend.
//!
//! Operations on a window are recorded into one AppleScript program with a
//! variable per pane (`s1`, `s2`, ...) and run when the window is finished.

use std::sync::Arc;

use tracing::{debug, warn};

use super::applescript::{self, ScriptRunner};
use super::{FocusTarget, PaneHandle, SplitDirection, TerminalBackend, maximize_script};
use crate::error::{Error, Result};

const APP: &str = "iTerm2";

pub struct Iterm {
    scripts: Arc<dyn ScriptRunner>,
    lines: Vec<String>,
    panes: usize,
}

impl Iterm {
    pub fn new(scripts: Arc<dyn ScriptRunner>) -> Self {
        Self {
            scripts,
            lines: Vec::new(),
            panes: 0,
        }
    }

    fn pane_var(&self, pane: &PaneHandle) -> Result<String> {
        let valid = pane
            .as_str()
            .strip_prefix('s')
            .and_then(|n| n.parse::<usize>().ok())
            .is_some_and(|n| n >= 1 && n <= self.panes);
        if valid {
            Ok(pane.as_str().to_string())
        } else {
            Err(Error::InvalidConfig(format!(
                "unknown iTerm2 pane '{}'",
                pane.as_str()
            )))
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.lines.is_empty() {
            return Err(Error::InvalidConfig("no iTerm2 window is open".into()));
        }
        Ok(())
    }

    fn find_window(&self, property: &str, needle: &str) -> Result<bool> {
        let script = format!(
            r#"tell application "{APP}"
    set foundWindow to missing value
    repeat with aWindow in windows
        repeat with aTab in tabs of aWindow
            repeat with aSession in sessions of aTab
                try
                    tell aSession to set probe to ({property}) as text
                    if probe contains "{needle}" then
                        set foundWindow to aWindow
                        exit repeat
                    end if
                end try
            end repeat
            if foundWindow is not missing value then exit repeat
        end repeat
        if foundWindow is not missing value then exit repeat
    end repeat
    if foundWindow is not missing value then
        select foundWindow
        activate
        return true
    end if
    return false
end tell"#,
            needle = applescript::escape(needle),
        );
        Ok(applescript::is_true(&self.scripts.run(&script)?))
    }
}

impl TerminalBackend for Iterm {
    fn connect(&mut self) -> Result<()> {
        self.scripts
            .run(&format!("tell application \"{APP}\" to activate"))?;
        Ok(())
    }

    fn open_window(&mut self) -> Result<PaneHandle> {
        if !self.lines.is_empty() {
            warn!("Discarding unfinished iTerm2 window script");
        }
        self.lines = vec![
            format!("tell application \"{APP}\""),
            "set newWindow to (create window with default profile)".to_string(),
            "set s1 to current session of newWindow".to_string(),
        ];
        self.panes = 1;
        Ok(PaneHandle::new("s1"))
    }

    fn split(&mut self, parent: &PaneHandle, direction: SplitDirection) -> Result<PaneHandle> {
        self.ensure_open()?;
        let parent = self.pane_var(parent)?;
        self.panes += 1;
        let child = format!("s{}", self.panes);
        let how = match direction {
            SplitDirection::Right => "vertically",
            SplitDirection::Down => "horizontally",
        };
        self.lines.push(format!(
            "tell {parent} to set {child} to (split {how} with default profile)"
        ));
        Ok(PaneHandle::new(child))
    }

    fn send_text(&mut self, pane: &PaneHandle, text: &str) -> Result<()> {
        self.ensure_open()?;
        let pane = self.pane_var(pane)?;
        // `write text` submits the line itself.
        let line = text.strip_suffix('\n').unwrap_or(text);
        self.lines.push(format!(
            "tell {pane} to write text \"{}\"",
            applescript::escape(line)
        ));
        Ok(())
    }

    fn finish_window(&mut self, maximize: bool) -> Result<()> {
        if self.lines.is_empty() {
            return Ok(());
        }
        self.lines.push("end tell".to_string());
        let script = std::mem::take(&mut self.lines).join("\n");
        debug!(panes = self.panes, "iTerm2: running window script");
        self.panes = 0;
        self.scripts.run(&script)?;
        if maximize && let Err(e) = self.scripts.run(&maximize_script(APP)) {
            warn!(error = %e, "Failed to maximize iTerm2 window");
        }
        Ok(())
    }

    fn focus(&mut self, target: &FocusTarget<'_>) -> Result<bool> {
        let path = target.path.to_string_lossy();
        if !path.is_empty() && self.find_window("variable named \"session.path\"", &path)? {
            return Ok(true);
        }
        if target.title.is_empty() {
            return Ok(false);
        }
        self.find_window("name", target.title)
    }
}

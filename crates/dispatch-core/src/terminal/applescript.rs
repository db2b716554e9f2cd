//! Running AppleScript through `osascript`.

use std::process::Command;

use tracing::debug;

use crate::error::{Error, Result};

/// Executes an AppleScript program and returns its stdout.
pub trait ScriptRunner: Send + Sync {
    fn run(&self, script: &str) -> Result<String>;
}

/// Spawns `osascript -e <script>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Osascript;

impl ScriptRunner for Osascript {
    fn run(&self, script: &str) -> Result<String> {
        debug!(bytes = script.len(), "osascript: running script");
        let output = Command::new("osascript")
            .arg("-e")
            .arg(script)
            .output()
            .map_err(|source| Error::Spawn {
                program: "osascript".into(),
                source,
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!(status = %output.status, stderr = %stderr.trim(), "osascript: failed");
            return Err(Error::external("osascript", &["-e", "<script>"], stderr));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Escape `s` for a double-quoted AppleScript string literal.
pub fn escape(s: &str) -> String {
    s.replace('\\', r"\\")
        .replace('"', "\\\"")
        .replace('\n', r"\n")
}

/// AppleScript boolean result.
pub(crate) fn is_true(output: &str) -> bool {
    output.trim() == "true"
}

//! Thin seam over the `git` binary.

pub mod status;

use std::path::Path;
use std::process::Command;
use std::time::Instant;

use tracing::debug;

use crate::error::{Error, Result};

/// Runs git with an argument list in a directory and returns stdout.
pub trait GitRunner: Send + Sync {
    fn run(&self, dir: &Path, args: &[&str]) -> Result<String>;
}

/// Spawns the real `git` executable.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessGit;

impl GitRunner for ProcessGit {
    fn run(&self, dir: &Path, args: &[&str]) -> Result<String> {
        debug!(dir = %dir.display(), ?args, "git: spawning");
        let start = Instant::now();
        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .map_err(|source| Error::Spawn {
                program: "git".into(),
                source,
            })?;
        let elapsed_ms = start.elapsed().as_millis();

        if !output.status.success() {
            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            debug!(
                elapsed_ms,
                status = %output.status,
                output = %combined.trim(),
                "git: command failed"
            );
            return Err(Error::external("git", args, combined));
        }

        debug!(elapsed_ms, "git: command completed");
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

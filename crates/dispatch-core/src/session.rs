//! Sidecar metadata stored inside each workspace.
//!
//! The file marks a directory as managed and remembers enough to re-open it
//! with the same agents and prompt.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// File name of the sidecar inside a workspace.
pub const METADATA_FILE: &str = ".dispatch-session.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub created_at: DateTime<Utc>,
    /// `owner/name` the workspace was cloned from.
    pub repo: String,
    pub branch: String,
    pub prompt: String,
    pub preset_name: String,
    pub agents: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_opened: Option<DateTime<Utc>>,
}

impl SessionMetadata {
    pub fn new(
        repo: &str,
        branch: &str,
        prompt: &str,
        preset_name: &str,
        agents: Vec<String>,
    ) -> Self {
        Self {
            created_at: Utc::now(),
            repo: repo.to_string(),
            branch: branch.to_string(),
            prompt: prompt.to_string(),
            preset_name: preset_name.to_string(),
            agents,
            last_opened: None,
        }
    }

    pub fn path_in(workspace: &Path) -> PathBuf {
        workspace.join(METADATA_FILE)
    }

    /// Read the sidecar of `workspace`. A missing file is [`Error::NotManaged`].
    pub fn load(workspace: &Path) -> Result<Self> {
        let path = Self::path_in(workspace);
        let data = match std::fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotManaged(workspace.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_yaml::from_str(&data)?)
    }

    /// Write the sidecar into `workspace` with mode 0644.
    pub fn save(&self, workspace: &Path) -> Result<()> {
        let path = Self::path_in(workspace);
        std::fs::write(&path, serde_yaml::to_string(self)?)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644))?;
        }
        Ok(())
    }

    /// Prompt to hand the agents on re-open.
    pub fn resume_prompt(&self) -> String {
        if self.prompt.trim().is_empty() {
            format!("Continue working on {}", self.branch)
        } else {
            self.prompt.clone()
        }
    }
}

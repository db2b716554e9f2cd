//! Work the state machine asks the outside world to do, and the replies.
//!
//! Effects run off the UI loop; each produces exactly one outcome.

use std::path::PathBuf;

use dispatch_core::config::{AppSettings, Preset};
use dispatch_core::launcher::LaunchRequest;
use dispatch_core::session::SessionMetadata;
use dispatch_core::workspace::WorkspaceInfo;

#[derive(Debug, Clone)]
pub enum Effect {
    /// Re-scan the workspaces directory.
    Refresh,
    Delete(PathBuf),
    Launch {
        request: LaunchRequest,
        settings: AppSettings,
    },
    /// Focus an existing window for the workspace, or re-open it.
    Open {
        path: PathBuf,
        branch: String,
        metadata: Option<SessionMetadata>,
        preset: Option<Preset>,
        /// Try to focus an existing window before re-opening.
        focus_first: bool,
        settings: AppSettings,
    },
    SaveSettings(AppSettings),
    Prune { retention_days: u32 },
}

/// How an [`Effect::Open`] was satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenResult {
    Focused,
    Reopened { sessions: usize },
    /// No sidecar, so nothing to re-open with.
    NotManaged,
}

/// Summary of a finished launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSummary {
    pub sessions: usize,
    pub workspaces: usize,
    pub skipped: usize,
}

/// Failures are carried as display strings; the UI only shows them.
#[derive(Debug, Clone)]
pub enum EffectOutcome {
    Refreshed(Result<Vec<WorkspaceInfo>, String>),
    Deleted(Result<PathBuf, String>),
    Launched(Result<LaunchSummary, String>),
    Opened(Result<OpenResult, String>),
    /// Carries the settings that were written.
    SettingsSaved(Result<AppSettings, String>),
    Pruned(Result<usize, String>),
}

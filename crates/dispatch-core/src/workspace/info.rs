//! Live description of a workspace for listings.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::git::GitRunner;
use crate::git::status::{self, FileStat};
use crate::session::SessionMetadata;

/// Commits shown in the details panel.
const RECENT_COMMITS: usize = 3;

/// A workspace plus whatever could be learned about it. Rebuilt on every scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceInfo {
    pub path: PathBuf,
    /// Directory name.
    pub name: String,
    pub branch: String,
    /// `owner/name` for GitHub remotes, full URL otherwise.
    pub remote: String,
    pub repository: Option<PathBuf>,
    pub metadata: Option<SessionMetadata>,
    /// Sidecar timestamp, or directory mtime when unmanaged.
    pub created_at: Option<DateTime<Utc>>,
    pub last_commit: String,
    pub recent_commits: Vec<String>,
    pub added: u64,
    pub deleted: u64,
    pub files: Vec<FileStat>,
}

impl WorkspaceInfo {
    /// Gather everything about `path`. Individual git failures leave the
    /// corresponding field empty.
    pub fn describe(git: &dyn GitRunner, path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let metadata = SessionMetadata::load(path).ok();
        let files = status::file_stats(git, path).unwrap_or_default();
        let (added, deleted) = status::totals(&files);
        let mut remote = status::remote(git, path).unwrap_or_default();
        if remote.is_empty()
            && let Some(meta) = &metadata
        {
            remote.clone_from(&meta.repo);
        }
        let info = Self {
            branch: status::current_branch(git, path)
                .ok()
                .filter(|b| !b.is_empty())
                .or_else(|| metadata.as_ref().map(|m| m.branch.clone()))
                .unwrap_or_default(),
            remote,
            repository: status::backing_repository(git, path).ok().flatten(),
            created_at: super::created_at(path),
            last_commit: status::last_commit(git, path).unwrap_or_default(),
            recent_commits: status::recent_commits(git, path, RECENT_COMMITS).unwrap_or_default(),
            added,
            deleted,
            files,
            metadata,
            name,
            path: path.to_path_buf(),
        };
        debug!(path = %info.path.display(), managed = info.is_managed(), "Described workspace");
        info
    }

    pub const fn is_managed(&self) -> bool {
        self.metadata.is_some()
    }

    pub fn prompt(&self) -> Option<&str> {
        self.metadata.as_ref().map(|m| m.prompt.as_str())
    }

    pub fn preset_name(&self) -> Option<&str> {
        self.metadata.as_ref().map(|m| m.preset_name.as_str())
    }
}

/// Newest first; workspaces without a timestamp sink to the bottom.
pub fn sort_newest_first(items: &mut [WorkspaceInfo]) {
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

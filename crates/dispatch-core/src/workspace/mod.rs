//! Workspace manager: cached repository mirrors, git worktrees, sidecars.

mod info;
mod repo;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::git::GitRunner;
use crate::session::SessionMetadata;

pub use info::{WorkspaceInfo, sort_newest_first};
pub use repo::{RepoSpec, validate_name};

/// Branch every workspace forks from.
pub const BASE_BRANCH: &str = "main";

/// Marker that makes a directory count as a workspace.
const GIT_SENTINEL: &str = ".git";

/// An isolated checkout created by [`WorkspaceManager::create_workspace`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub path: PathBuf,
    pub branch: String,
    pub base_branch: String,
    pub repository: PathBuf,
}

/// Owns every write to workspaces and their metadata.
#[derive(Clone)]
pub struct WorkspaceManager {
    git: Arc<dyn GitRunner>,
}

impl WorkspaceManager {
    pub fn new(git: Arc<dyn GitRunner>) -> Self {
        Self { git }
    }

    pub fn git(&self) -> &dyn GitRunner {
        self.git.as_ref()
    }

    /// Make sure an up-to-date mirror of `spec` exists under `cache_root`.
    ///
    /// A missing mirror is cloned. An existing one is fetched, hard-reset to
    /// `origin/main` and cleaned; the first failing step aborts.
    pub fn ensure_repository(&self, spec: &RepoSpec, cache_root: &Path) -> Result<PathBuf> {
        let repo_path = spec.cache_path(cache_root);
        if repo_path.exists() {
            info!(repo = %spec, path = %repo_path.display(), "Refreshing cached repository");
            let origin_base = format!("origin/{BASE_BRANCH}");
            let steps: [&[&str]; 3] = [
                &["fetch", "origin", BASE_BRANCH],
                &["reset", "--hard", origin_base.as_str()],
                &["clean", "-fd"],
            ];
            for args in steps {
                self.git.run(&repo_path, args)?;
            }
        } else {
            info!(repo = %spec, path = %repo_path.display(), "Cloning repository");
            std::fs::create_dir_all(cache_root)?;
            let url = spec.clone_url();
            let target = repo_path.to_string_lossy();
            self.git.run(cache_root, &["clone", &url, &target])?;
        }
        Ok(repo_path)
    }

    /// Create a worktree at `path` on a new `branch` forked from `base`.
    pub fn create_workspace(
        &self,
        repository: &Path,
        path: &Path,
        branch: &str,
        base: &str,
    ) -> Result<Workspace> {
        if path.exists() {
            return Err(Error::AlreadyExists(path.to_path_buf()));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        debug!(
            repository = %repository.display(),
            path = %path.display(),
            branch,
            base,
            "create_workspace: spawning git worktree add"
        );
        let target = path.to_string_lossy();
        self.git
            .run(repository, &["worktree", "add", "-b", branch, &target, base])?;
        info!(path = %path.display(), branch, "Created workspace");
        Ok(Workspace {
            path: path.to_path_buf(),
            branch: branch.to_string(),
            base_branch: base.to_string(),
            repository: repository.to_path_buf(),
        })
    }

    /// Immediate subdirectories of `root` that contain `.git`, in listing
    /// order. A missing root is an empty list.
    ///
    /// Only paths are returned; [`WorkspaceInfo::describe`] projects each one
    /// into its branch, backing repository and sidecar.
    pub fn list_workspaces(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let entries = match std::fs::read_dir(root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut found = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_dir() && path.join(GIT_SENTINEL).exists() {
                found.push(path);
            }
        }
        Ok(found)
    }

    /// Delete the workspace directory. The backing repository keeps its
    /// worktree record until git prunes it.
    pub fn remove_workspace(&self, path: &Path) -> Result<()> {
        std::fs::remove_dir_all(path)?;
        info!(path = %path.display(), "Removed workspace");
        Ok(())
    }

    pub fn save_metadata(&self, workspace: &Path, meta: &SessionMetadata) -> Result<()> {
        meta.save(workspace)
    }

    pub fn load_metadata(&self, workspace: &Path) -> Result<SessionMetadata> {
        SessionMetadata::load(workspace)
    }

    /// Record that the workspace was just re-opened.
    pub fn touch_last_opened(&self, workspace: &Path, now: DateTime<Utc>) -> Result<()> {
        let mut meta = self.load_metadata(workspace)?;
        meta.last_opened = Some(now);
        meta.save(workspace)
    }

    /// Remove managed workspaces under `root` created more than
    /// `retention_days` ago.
    ///
    /// Age comes from the sidecar; directories without one are never touched.
    /// Returns the removed paths; individual failures are logged and skipped.
    pub fn prune_stale(
        &self,
        root: &Path,
        retention_days: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<PathBuf>> {
        let cutoff = now - Duration::days(i64::from(retention_days));
        let mut removed = Vec::new();
        for path in self.list_workspaces(root)? {
            let created = match self.load_metadata(&path) {
                Ok(meta) => meta.created_at,
                Err(Error::NotManaged(_)) => {
                    debug!(path = %path.display(), "Skipping unmanaged workspace");
                    continue;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Unreadable sidecar, not pruning");
                    continue;
                }
            };
            if created >= cutoff {
                continue;
            }
            match self.remove_workspace(&path) {
                Ok(()) => removed.push(path),
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to prune workspace"),
            }
        }
        Ok(removed)
    }
}

/// Creation time of a workspace: sidecar first, directory mtime second.
pub fn created_at(path: &Path) -> Option<DateTime<Utc>> {
    if let Ok(meta) = SessionMetadata::load(path) {
        return Some(meta.created_at);
    }
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Utc>::from)
}

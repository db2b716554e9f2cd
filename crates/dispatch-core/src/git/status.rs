//! Read-only git queries used to describe a workspace.

use std::path::{Path, PathBuf};

use super::GitRunner;
use crate::error::Result;

/// Uncommitted line counts for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    pub path: String,
    pub added: u64,
    pub deleted: u64,
}

/// One entry of `git worktree list --porcelain`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorktreeEntry {
    pub path: PathBuf,
    pub head: String,
    /// Without the `refs/heads/` prefix. Empty when detached.
    pub branch: String,
    pub bare: bool,
}

/// Parse `git diff --numstat` output. Binary files (`-`) count as zero.
pub fn parse_numstat(output: &str) -> Vec<FileStat> {
    output
        .lines()
        .filter_map(|line| {
            let mut parts = line.splitn(3, '\t');
            let added = parts.next()?;
            let deleted = parts.next()?;
            let path = parts.next()?.trim();
            if path.is_empty() {
                return None;
            }
            Some(FileStat {
                path: path.to_string(),
                added: added.trim().parse().unwrap_or(0),
                deleted: deleted.trim().parse().unwrap_or(0),
            })
        })
        .collect()
}

/// Per-file stats of uncommitted changes against `HEAD`.
pub fn file_stats(git: &dyn GitRunner, dir: &Path) -> Result<Vec<FileStat>> {
    Ok(parse_numstat(&git.run(dir, &["diff", "HEAD", "--numstat"])?))
}

/// Total (added, deleted) lines across `stats`.
pub fn totals(stats: &[FileStat]) -> (u64, u64) {
    stats
        .iter()
        .fold((0, 0), |(a, d), s| (a + s.added, d + s.deleted))
}

/// Relative time of the last commit, e.g. `3 hours ago`.
pub fn last_commit(git: &dyn GitRunner, dir: &Path) -> Result<String> {
    Ok(git.run(dir, &["log", "-1", "--format=%cr"])?.trim().to_string())
}

/// Up to `count` recent commits as `<short sha> <relative time> <subject>`.
pub fn recent_commits(git: &dyn GitRunner, dir: &Path, count: usize) -> Result<Vec<String>> {
    let n = count.to_string();
    let out = git.run(dir, &["log", "-n", &n, "--pretty=format:%h %cr %s"])?;
    Ok(out
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}

pub fn current_branch(git: &dyn GitRunner, dir: &Path) -> Result<String> {
    Ok(git
        .run(dir, &["rev-parse", "--abbrev-ref", "HEAD"])?
        .trim()
        .to_string())
}

pub fn toplevel(git: &dyn GitRunner, dir: &Path) -> Result<PathBuf> {
    Ok(PathBuf::from(
        git.run(dir, &["rev-parse", "--show-toplevel"])?.trim(),
    ))
}

/// `origin` URL, shortened to `owner/name` for GitHub remotes.
pub fn remote(git: &dyn GitRunner, dir: &Path) -> Result<String> {
    Ok(short_remote(&git.run(dir, &["remote", "get-url", "origin"])?))
}

pub fn short_remote(url: &str) -> String {
    let url = url.trim();
    let url = url.strip_suffix(".git").unwrap_or(url);
    url.split_once("github.com").map_or_else(
        || url.to_string(),
        |(_, rest)| rest.trim_start_matches(['/', ':']).to_string(),
    )
}

/// Parse `git worktree list --porcelain`.
pub fn parse_worktree_list(output: &str) -> Vec<WorktreeEntry> {
    let mut entries = Vec::new();
    let mut current: Option<WorktreeEntry> = None;
    for line in output.lines().map(str::trim) {
        if line.is_empty() {
            entries.extend(current.take());
            continue;
        }
        if let Some(path) = line.strip_prefix("worktree ") {
            entries.extend(current.take());
            current = Some(WorktreeEntry {
                path: PathBuf::from(path),
                ..WorktreeEntry::default()
            });
        } else if let Some(entry) = current.as_mut() {
            if let Some(head) = line.strip_prefix("HEAD ") {
                entry.head = head.to_string();
            } else if let Some(branch) = line.strip_prefix("branch ") {
                entry.branch = branch.trim_start_matches("refs/heads/").to_string();
            } else if line == "bare" {
                entry.bare = true;
            }
        }
    }
    entries.extend(current);
    entries
}

pub fn worktree_list(git: &dyn GitRunner, dir: &Path) -> Result<Vec<WorktreeEntry>> {
    Ok(parse_worktree_list(
        &git.run(dir, &["worktree", "list", "--porcelain"])?,
    ))
}

/// The repository a worktree was created from: the first listed entry.
pub fn backing_repository(git: &dyn GitRunner, dir: &Path) -> Result<Option<PathBuf>> {
    Ok(worktree_list(git, dir)?.into_iter().next().map(|e| e.path))
}

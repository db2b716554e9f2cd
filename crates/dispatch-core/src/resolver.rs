//! Expands a preset into concrete launch units.
//!
//! Each replica of a window gets its own workspace (fresh branch, fresh
//! directory). The window's commands run in extra panes that share that
//! replica's workspace.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::agents::Rgb;
use crate::config::{Preset, Window};

/// Agent launched when a preset has no windows at all.
pub const DEFAULT_AGENT: &str = "claude";

/// Where a unit runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceTarget {
    pub path: PathBuf,
    pub branch: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitKind {
    Agent {
        agent: String,
    },
    Command {
        /// Agent of the owning window.
        agent: String,
        command: String,
        title: String,
        color: Option<Rgb>,
    },
}

/// One pane to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchUnit {
    pub workspace: WorkspaceTarget,
    pub kind: UnitKind,
}

impl LaunchUnit {
    pub const fn is_agent(&self) -> bool {
        matches!(self.kind, UnitKind::Agent { .. })
    }

    pub fn agent(&self) -> &str {
        match &self.kind {
            UnitKind::Agent { agent } | UnitKind::Command { agent, .. } => agent,
        }
    }
}

/// Source of branch-suffix entropy.
pub trait RandomSource: Send + Sync {
    fn suffix_bytes(&self) -> [u8; 4];
}

/// Thread-local OS-seeded generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn suffix_bytes(&self) -> [u8; 4] {
        rand::random()
    }
}

/// `{prefix}-{8 hex chars}`.
pub fn branch_name(prefix: &str, rng: &dyn RandomSource) -> String {
    format!("{prefix}-{}", hex::encode(rng.suffix_bytes()))
}

/// Directory for a workspace: `{root}/{repo_dir_name}-{branch}`.
pub fn workspace_path(worktrees_root: &Path, repo_dir_name: &str, branch: &str) -> PathBuf {
    worktrees_root.join(format!("{repo_dir_name}-{branch}"))
}

/// Replicas to launch for `window`. An override only counts when above one.
pub fn effective_replication(window: &Window, override_n: i64) -> usize {
    let n = if override_n > 1 {
        override_n
    } else {
        window.replicate.max(1)
    };
    usize::try_from(n).unwrap_or(1)
}

/// Naming inputs shared by all units of one launch.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub worktrees_root: &'a Path,
    /// Directory name of the cached repository (`owner-name`).
    pub repo_dir_name: &'a str,
    /// Branch prefix chosen by the operator.
    pub name: &'a str,
}

/// Units for one window running in an already-known workspace.
pub fn window_units(window: &Window, target: &WorkspaceTarget) -> Vec<LaunchUnit> {
    let mut units = Vec::with_capacity(1 + window.commands.len());
    units.push(LaunchUnit {
        workspace: target.clone(),
        kind: UnitKind::Agent {
            agent: window.agent.clone(),
        },
    });
    units.extend(window.commands.iter().map(|cmd| LaunchUnit {
        workspace: target.clone(),
        kind: UnitKind::Command {
            agent: window.agent.clone(),
            command: cmd.command.clone(),
            title: cmd.display_title(),
            color: cmd.rgb(),
        },
    }));
    units
}

/// Expand `preset` into launch units in preset → replica → command order.
pub fn resolve(
    preset: &Preset,
    override_n: i64,
    ctx: &ResolveContext<'_>,
    rng: &dyn RandomSource,
) -> Vec<LaunchUnit> {
    let fallback;
    let windows: &[Window] = if preset.is_empty() {
        fallback = [Window {
            agent: DEFAULT_AGENT.to_string(),
            replicate: 1,
            commands: Vec::new(),
        }];
        &fallback
    } else {
        preset
    };

    let mut units = Vec::new();
    for (index, window) in windows.iter().enumerate() {
        if !window.is_valid() {
            warn!(
                index,
                replicate = window.replicate,
                "Skipping preset window without an agent"
            );
            continue;
        }
        for _ in 0..effective_replication(window, override_n) {
            let branch = branch_name(ctx.name, rng);
            let target = WorkspaceTarget {
                path: workspace_path(ctx.worktrees_root, ctx.repo_dir_name, &branch),
                branch,
            };
            units.extend(window_units(window, &target));
        }
    }
    units
}

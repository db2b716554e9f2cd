//! Launch coordinator.
//!
//! Flow of one launch:
//! 1. Validate the request (nothing touches disk before this passes)
//! 2. Clone or refresh the cached repository
//! 3. Resolve the preset into launch units
//! 4. Create one workspace per replica, writing its sidecar
//! 5. Lay the surviving units out over terminal windows

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::agents::AgentPalette;
use crate::command::CommandBuilder;
use crate::config::{AppSettings, Preset};
use crate::error::{Error, Result};
use crate::layout;
use crate::paths::DataPaths;
use crate::resolver::{self, LaunchUnit, RandomSource, ResolveContext, UnitKind, WorkspaceTarget};
use crate::session::SessionMetadata;
use crate::terminal::{FocusTarget, TerminalBackend};
use crate::workspace::{BASE_BRANCH, RepoSpec, WorkspaceManager, validate_name};

/// What to launch.
#[derive(Debug, Clone, Default)]
pub struct LaunchRequest {
    /// `owner/name`.
    pub repo: String,
    /// Branch prefix.
    pub name: String,
    pub prompt: String,
    /// Recorded in each sidecar.
    pub preset_name: String,
    pub preset: Preset,
    /// Replicas per window; zero or one keeps each window's own count.
    pub replicate_override: i64,
}

/// A unit that was not launched, and why.
#[derive(Debug, Clone)]
pub struct SkippedUnit {
    pub unit: LaunchUnit,
    pub reason: String,
}

/// Outcome of a launch or re-open.
#[derive(Debug, Clone, Default)]
pub struct LaunchReport {
    pub launched: Vec<LaunchUnit>,
    pub skipped: Vec<SkippedUnit>,
    pub workspaces: usize,
    pub windows: usize,
}

/// Window behaviour taken from the application settings.
#[derive(Debug, Clone, Copy)]
pub struct WindowOptions {
    pub maximize: bool,
    pub max_panes: usize,
}

impl From<&AppSettings> for WindowOptions {
    fn from(settings: &AppSettings) -> Self {
        Self {
            maximize: settings.terminal.maximize_on_launch,
            max_panes: settings.terminal.max_panes_per_window,
        }
    }
}

pub struct Launcher {
    manager: WorkspaceManager,
    rng: Arc<dyn RandomSource>,
    builder: CommandBuilder,
    terminal: Box<dyn TerminalBackend>,
    paths: DataPaths,
    window: WindowOptions,
}

impl Launcher {
    pub fn new(
        manager: WorkspaceManager,
        rng: Arc<dyn RandomSource>,
        terminal: Box<dyn TerminalBackend>,
        paths: DataPaths,
        window: WindowOptions,
    ) -> Self {
        Self {
            manager,
            rng,
            builder: CommandBuilder::new(AgentPalette::default()),
            terminal,
            paths,
            window,
        }
    }

    pub const fn manager(&self) -> &WorkspaceManager {
        &self.manager
    }

    /// Run a full launch.
    pub fn launch(&mut self, request: &LaunchRequest) -> Result<LaunchReport> {
        let spec: RepoSpec = request.repo.parse()?;
        validate_name(&request.name)?;
        if request.prompt.trim().is_empty() {
            return Err(Error::InvalidConfig("prompt cannot be empty".into()));
        }

        self.paths.ensure()?;
        let repository = self.manager.ensure_repository(&spec, &self.paths.repos())?;

        let worktrees = self.paths.worktrees();
        let repo_dir_name = spec.dir_name();
        let ctx = ResolveContext {
            worktrees_root: &worktrees,
            repo_dir_name: &repo_dir_name,
            name: &request.name,
        };
        let units = resolver::resolve(
            &request.preset,
            request.replicate_override,
            &ctx,
            self.rng.as_ref(),
        );
        info!(
            repo = %spec,
            preset = %request.preset_name,
            units = units.len(),
            "Resolved preset"
        );

        let mut report = LaunchReport::default();
        let mut failed: Option<(WorkspaceTarget, String)> = None;
        for unit in units {
            if let Some((target, reason)) = &failed
                && *target == unit.workspace
            {
                report.skipped.push(SkippedUnit {
                    unit,
                    reason: reason.clone(),
                });
                continue;
            }
            if let UnitKind::Agent { agent } = &unit.kind {
                failed = None;
                if let Err(e) = self.materialize(&repository, &spec, request, &unit.workspace, agent) {
                    warn!(
                        path = %unit.workspace.path.display(),
                        branch = %unit.workspace.branch,
                        error = %e,
                        "Skipping workspace"
                    );
                    failed = Some((unit.workspace.clone(), e.to_string()));
                    report.skipped.push(SkippedUnit {
                        unit,
                        reason: e.to_string(),
                    });
                    continue;
                }
                report.workspaces += 1;
            }
            report.launched.push(unit);
        }

        if report.launched.is_empty() {
            return Err(Error::NothingLaunched);
        }

        report.windows = self.present(&report.launched, &request.prompt)?;
        info!(
            units = report.launched.len(),
            workspaces = report.workspaces,
            windows = report.windows,
            skipped = report.skipped.len(),
            "Launch complete"
        );
        Ok(report)
    }

    fn materialize(
        &self,
        repository: &Path,
        spec: &RepoSpec,
        request: &LaunchRequest,
        target: &WorkspaceTarget,
        agent: &str,
    ) -> Result<()> {
        self.manager
            .create_workspace(repository, &target.path, &target.branch, BASE_BRANCH)?;
        let meta = SessionMetadata::new(
            &spec.to_string(),
            &target.branch,
            &request.prompt,
            &request.preset_name,
            vec![agent.to_string()],
        );
        if let Err(e) = self.manager.save_metadata(&target.path, &meta) {
            warn!(path = %target.path.display(), error = %e, "Failed to write session metadata");
        }
        Ok(())
    }

    /// Re-open a managed workspace with its recorded agents.
    ///
    /// Commands of the recorded preset's windows come along when the preset
    /// still exists and names the same agent.
    pub fn reopen(
        &mut self,
        path: &Path,
        meta: &SessionMetadata,
        preset: Option<&Preset>,
    ) -> Result<LaunchReport> {
        let target = WorkspaceTarget {
            path: path.to_path_buf(),
            branch: meta.branch.clone(),
        };
        let mut units = Vec::new();
        for agent in meta.agents.iter().filter(|a| !a.trim().is_empty()) {
            let window = preset
                .and_then(|p| p.iter().find(|w| w.agent == *agent))
                .cloned()
                .unwrap_or_else(|| crate::config::Window {
                    agent: agent.clone(),
                    ..Default::default()
                });
            units.extend(resolver::window_units(&window, &target));
        }
        if units.is_empty() {
            return Err(Error::NothingLaunched);
        }

        let windows = self.present(&units, &meta.resume_prompt())?;
        if let Err(e) = self.manager.touch_last_opened(path, Utc::now()) {
            warn!(path = %path.display(), error = %e, "Failed to update last_opened");
        }
        info!(path = %path.display(), units = units.len(), "Re-opened workspace");
        Ok(LaunchReport {
            launched: units,
            skipped: Vec::new(),
            workspaces: 1,
            windows,
        })
    }

    /// Bring forward a window already showing `path` (or `branch`).
    pub fn focus(&mut self, path: &Path, branch: &str) -> Result<bool> {
        self.terminal.focus(&FocusTarget {
            path,
            title: branch,
        })
    }

    /// Lay `units` out over as many windows as needed. Returns the window count.
    fn present(&mut self, units: &[LaunchUnit], prompt: &str) -> Result<usize> {
        self.terminal.connect()?;
        let mut windows = 0;
        for batch in layout::batches(units, self.window.max_panes) {
            let root = self.terminal.open_window()?;
            let panes = layout::layout(self.terminal.as_mut(), root, batch.len())?;
            for (pane, unit) in panes.iter().zip(batch) {
                let line = self.builder.build(unit, prompt);
                self.terminal.send_text(pane, &line)?;
            }
            self.terminal.finish_window(self.window.maximize)?;
            windows += 1;
        }
        Ok(windows)
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::{Command, Window};
    use crate::testing::{FakeGit, FixedRandom, RecordingTerminal, TerminalEvent};

    struct Harness {
        _tmp: tempfile::TempDir,
        paths: DataPaths,
        git: Arc<FakeGit>,
        term: RecordingTerminal,
        launcher: Launcher,
    }

    fn harness() -> Harness {
        let tmp = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(tmp.path().join("data"));
        let git = Arc::new(FakeGit::new());
        let term = RecordingTerminal::new();
        let launcher = Launcher::new(
            WorkspaceManager::new(git.clone()),
            Arc::new(FixedRandom::counting()),
            Box::new(term.clone()),
            paths.clone(),
            WindowOptions {
                maximize: false,
                max_panes: 6,
            },
        );
        Harness {
            _tmp: tmp,
            paths,
            git,
            term,
            launcher,
        }
    }

    fn request(preset: Preset) -> LaunchRequest {
        LaunchRequest {
            repo: "acme/widgets".into(),
            name: "task".into(),
            prompt: "Do it".into(),
            preset_name: "p".into(),
            preset,
            replicate_override: 0,
        }
    }

    fn window(agent: &str, n: i64) -> Window {
        Window {
            agent: agent.into(),
            replicate: n,
            commands: Vec::new(),
        }
    }

    #[test]
    fn malformed_repo_fails_before_any_process() {
        let mut h = harness();
        let mut req = request(vec![window("claude", 1)]);
        req.repo = "ownerrepo".into();
        assert!(matches!(h.launcher.launch(&req), Err(Error::InvalidConfig(_))));
        assert!(h.git.calls().is_empty());
        assert!(h.term.events().is_empty());
        assert!(!h.paths.root.exists());
    }

    #[test]
    fn bad_name_and_empty_prompt_are_rejected() {
        let mut h = harness();
        let mut req = request(vec![window("claude", 1)]);
        req.name = "has space".into();
        assert!(matches!(h.launcher.launch(&req), Err(Error::InvalidConfig(_))));
        let mut req = request(vec![window("claude", 1)]);
        req.prompt = "  ".into();
        assert!(matches!(h.launcher.launch(&req), Err(Error::InvalidConfig(_))));
        assert!(h.git.calls().is_empty());
    }

    #[test]
    fn launches_each_replica_in_its_own_workspace() {
        let mut h = harness();
        let report = h.launcher.launch(&request(vec![window("droid", 3)])).unwrap();
        assert_eq!(report.launched.len(), 3);
        assert_eq!(report.workspaces, 3);
        assert_eq!(report.windows, 1);
        assert_eq!(h.git.calls_of("worktree").len(), 3);
        for unit in &report.launched {
            let meta = SessionMetadata::load(&unit.workspace.path).unwrap();
            assert_eq!(meta.repo, "acme/widgets");
            assert_eq!(meta.agents, ["droid"]);
            assert_eq!(meta.preset_name, "p");
            assert_eq!(meta.branch, unit.workspace.branch);
        }
        let sent = h.term.sent_text();
        assert_eq!(sent.len(), 3);
        assert!(sent.iter().all(|line| line.ends_with("droid 'Do it'\n")));
    }

    #[test]
    fn seven_units_span_two_windows() {
        let mut h = harness();
        let report = h.launcher.launch(&request(vec![window("claude", 7)])).unwrap();
        assert_eq!(report.windows, 2);
        assert_eq!(h.term.windows_opened(), 2);
        // First window: 5 splits for 6 panes; second window: a single pane.
        assert_eq!(h.term.splits().len(), 5);
    }

    #[test]
    fn failed_workspace_skips_its_commands_only() {
        let mut h = harness();
        let mut w = window("claude", 2);
        w.commands = vec![Command {
            command: "npm test".into(),
            ..Default::default()
        }];
        // The first replica's directory already exists.
        let first = h.paths.worktrees().join("acme-widgets-task-00000001");
        std::fs::create_dir_all(&first).unwrap();

        let report = h.launcher.launch(&request(vec![w])).unwrap();
        assert_eq!(report.skipped.len(), 2);
        assert!(report.skipped.iter().all(|s| s.unit.workspace.path == first));
        assert!(report.skipped[0].reason.contains("already exists"));
        assert_eq!(report.launched.len(), 2);
        assert_eq!(report.workspaces, 1);
        assert!(report.launched.iter().all(|u| u.workspace.path != first));
    }

    #[test]
    fn nothing_launched_when_every_workspace_fails() {
        let mut h = harness();
        let worktrees = h.paths.worktrees();
        std::fs::create_dir_all(worktrees.join("acme-widgets-task-00000001")).unwrap();
        let err = h.launcher.launch(&request(vec![window("codex", 1)])).unwrap_err();
        assert!(matches!(err, Error::NothingLaunched));
        assert!(h.term.events().is_empty());
    }

    #[test]
    fn repository_failure_aborts() {
        let mut h = harness();
        std::fs::create_dir_all(h.paths.repos().join("acme-widgets")).unwrap();
        h.git.fail(&["fetch", "origin", "main"], "fatal: offline");
        let err = h.launcher.launch(&request(vec![window("codex", 1)])).unwrap_err();
        assert!(matches!(err, Error::ExternalTool { .. }));
        assert!(h.git.calls_of("worktree").is_empty());
    }

    #[test]
    fn terminal_failure_is_fatal_but_keeps_workspaces() {
        let mut h = harness();
        h.term.fail_connect();
        let err = h.launcher.launch(&request(vec![window("claude", 1)])).unwrap_err();
        assert!(matches!(err, Error::ExternalTool { .. }));
        let ws = h.paths.worktrees().join("acme-widgets-task-00000001");
        assert!(ws.exists());
        assert_eq!(h.term.events(), [TerminalEvent::Connect]);
    }

    #[test]
    fn reopen_uses_recorded_agents_and_preset_commands() {
        let mut h = harness();
        let ws = h.paths.worktrees().join("acme-widgets-task-00000009");
        std::fs::create_dir_all(&ws).unwrap();
        let mut meta = SessionMetadata::new("acme/widgets", "task-00000009", "", "p", vec!["claude".into()]);
        meta.save(&ws).unwrap();
        meta = SessionMetadata::load(&ws).unwrap();

        let mut w = window("claude", 2);
        w.commands = vec![Command {
            command: "make watch".into(),
            ..Default::default()
        }];
        let preset = vec![window("codex", 1), w];

        let report = h.launcher.reopen(&ws, &meta, Some(&preset)).unwrap();
        assert_eq!(report.launched.len(), 2);
        let sent = h.term.sent_text();
        assert!(sent[0].ends_with("claude 'Continue working on task-00000009'\n"));
        assert!(sent[1].ends_with("make watch\n"));
        assert!(SessionMetadata::load(&ws).unwrap().last_opened.is_some());
    }

    #[test]
    fn reopen_without_agents_launches_nothing() {
        let mut h = harness();
        let meta = SessionMetadata::new("acme/widgets", "b", "p", "p", Vec::new());
        let err = h.launcher.reopen(Path::new("/nowhere"), &meta, None).unwrap_err();
        assert!(matches!(err, Error::NothingLaunched));
    }

    #[test]
    fn focus_delegates_to_terminal() {
        let mut h = harness();
        h.term.push_focus_result(true);
        assert!(h.launcher.focus(Path::new("/wt/a"), "a").unwrap());
        assert!(!h.launcher.focus(Path::new("/wt/b"), "b").unwrap());
    }
}

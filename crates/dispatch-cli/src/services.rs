//! Blocking side of the review interface: turns each [`Effect`] into calls on
//! the core crate and reports a single [`EffectOutcome`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use dispatch_core::config::{AppSettings, Preset};
use dispatch_core::git::{GitRunner, ProcessGit};
use dispatch_core::launcher::{LaunchRequest, WindowOptions};
use dispatch_core::paths::DataPaths;
use dispatch_core::resolver::{OsRandom, RandomSource};
use dispatch_core::session::SessionMetadata;
use dispatch_core::terminal::{Osascript, ScriptRunner, backend_for};
use dispatch_core::workspace::{WorkspaceInfo, WorkspaceManager, sort_newest_first};
use dispatch_core::{Launcher, Result};
use tracing::{info, warn};

use crate::app::{Effect, EffectOutcome, LaunchSummary, OpenResult};

/// Collaborators shared by every effect. Cheap to clone into worker threads.
#[derive(Clone)]
pub struct Services {
    paths: DataPaths,
    git: Arc<dyn GitRunner>,
    scripts: Arc<dyn ScriptRunner>,
    rng: Arc<dyn RandomSource>,
}

impl Services {
    pub fn new(
        paths: DataPaths,
        git: Arc<dyn GitRunner>,
        scripts: Arc<dyn ScriptRunner>,
        rng: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            paths,
            git,
            scripts,
            rng,
        }
    }

    /// Real `git`, `osascript` and OS randomness.
    pub fn system(paths: DataPaths) -> Self {
        Self::new(
            paths,
            Arc::new(ProcessGit),
            Arc::new(Osascript),
            Arc::new(OsRandom),
        )
    }

    pub const fn paths(&self) -> &DataPaths {
        &self.paths
    }

    fn manager(&self) -> WorkspaceManager {
        WorkspaceManager::new(Arc::clone(&self.git))
    }

    pub fn launcher(&self, settings: &AppSettings) -> Launcher {
        Launcher::new(
            self.manager(),
            Arc::clone(&self.rng),
            backend_for(settings.terminal.kind, Arc::clone(&self.scripts)),
            self.paths.clone(),
            WindowOptions::from(settings),
        )
    }

    /// Run one effect to completion. Blocks.
    pub fn run(&self, effect: Effect) -> EffectOutcome {
        match effect {
            Effect::Refresh => EffectOutcome::Refreshed(self.refresh().map_err(|e| e.to_string())),
            Effect::Delete(path) => {
                EffectOutcome::Deleted(self.delete(path).map_err(|e| e.to_string()))
            }
            Effect::Launch { request, settings } => {
                EffectOutcome::Launched(self.launch(&request, &settings).map_err(|e| e.to_string()))
            }
            Effect::Open {
                path,
                branch,
                metadata,
                preset,
                focus_first,
                settings,
            } => EffectOutcome::Opened(
                self.open(
                    &path,
                    &branch,
                    metadata.as_ref(),
                    preset.as_ref(),
                    focus_first,
                    &settings,
                )
                .map_err(|e| e.to_string()),
            ),
            Effect::SaveSettings(settings) => EffectOutcome::SettingsSaved(
                settings
                    .save(&self.paths.settings_file())
                    .map(|()| settings)
                    .map_err(|e| e.to_string()),
            ),
            Effect::Prune { retention_days } => {
                EffectOutcome::Pruned(self.prune(retention_days).map_err(|e| e.to_string()))
            }
        }
    }

    /// Describe every workspace, newest first.
    pub fn refresh(&self) -> Result<Vec<WorkspaceInfo>> {
        let paths = self.manager().list_workspaces(&self.paths.worktrees())?;
        let mut items: Vec<WorkspaceInfo> = paths
            .iter()
            .map(|p| WorkspaceInfo::describe(self.git.as_ref(), p))
            .collect();
        sort_newest_first(&mut items);
        Ok(items)
    }

    fn delete(&self, path: PathBuf) -> Result<PathBuf> {
        self.manager().remove_workspace(&path)?;
        info!(path = %path.display(), "Deleted workspace");
        Ok(path)
    }

    fn launch(&self, request: &LaunchRequest, settings: &AppSettings) -> Result<LaunchSummary> {
        let report = self.launcher(settings).launch(request)?;
        Ok(LaunchSummary {
            sessions: report.launched.len(),
            workspaces: report.workspaces,
            skipped: report.skipped.len(),
        })
    }

    fn open(
        &self,
        path: &Path,
        branch: &str,
        metadata: Option<&SessionMetadata>,
        preset: Option<&Preset>,
        focus_first: bool,
        settings: &AppSettings,
    ) -> Result<OpenResult> {
        let mut launcher = self.launcher(settings);
        if focus_first {
            match launcher.focus(path, branch) {
                Ok(true) => return Ok(OpenResult::Focused),
                Ok(false) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Focus lookup failed"),
            }
        }
        let Some(meta) = metadata else {
            return Ok(OpenResult::NotManaged);
        };
        let report = launcher.reopen(path, meta, preset)?;
        Ok(OpenResult::Reopened {
            sessions: report.launched.len(),
        })
    }

    fn prune(&self, retention_days: u32) -> Result<usize> {
        let removed =
            self.manager()
                .prune_stale(&self.paths.worktrees(), retention_days, Utc::now())?;
        info!(count = removed.len(), retention_days, "Pruned stale workspaces");
        Ok(removed.len())
    }
}

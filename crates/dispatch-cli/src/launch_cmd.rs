//! Direct (non-interactive) launch.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};

use anyhow::Context;
use dispatch_core::config::{AppSettings, Config, Preset};
use dispatch_core::paths::{DataPaths, display_path};
use dispatch_core::{LaunchReport, LaunchRequest};
use tracing::warn;

use crate::services::Services;

/// Flags of a direct launch, already checked for presence.
#[derive(Debug, Clone)]
pub struct LaunchArgs {
    pub repo: String,
    pub name: String,
    pub prompt: String,
    pub preset: Option<String>,
    pub replicate_override: i64,
}

/// Pick the preset to launch: the requested name, else the settings'
/// default when it exists, else the preset file's `default`.
///
/// An unknown name falls back to an empty preset, which launches a single
/// default agent.
pub fn select_preset(
    config: &Config,
    requested: Option<&str>,
    settings: &AppSettings,
) -> (String, Preset) {
    let name = requested.map_or_else(
        || {
            if config.presets.contains_key(&settings.session.default_preset) {
                settings.session.default_preset.clone()
            } else {
                config.default.clone()
            }
        },
        str::to_string,
    );
    let preset = config.preset(&name).cloned().unwrap_or_else(|| {
        warn!(preset = %name, "Preset not found, launching the default agent");
        Vec::new()
    });
    (name, preset)
}

pub fn run(services: &Services, args: LaunchArgs) -> anyhow::Result<()> {
    let paths: &DataPaths = services.paths();
    let presets_file = paths.presets_file();
    let config = Config::load(&presets_file)
        .with_context(|| format!("failed to read {}", display_path(&presets_file)))?
        .with_context(|| format!("preset file not found at {}", display_path(&presets_file)))?;
    let settings = AppSettings::load(&paths.settings_file())
        .with_context(|| format!("failed to read {}", display_path(&paths.settings_file())))?;

    let (preset_name, preset) = select_preset(&config, args.preset.as_deref(), &settings);
    let request = LaunchRequest {
        repo: args.repo,
        name: args.name,
        prompt: args.prompt,
        preset_name,
        preset,
        replicate_override: args.replicate_override,
    };

    let report = services.launcher(&settings).launch(&request)?;
    write_report(&mut io::stdout(), &request, &report)?;
    Ok(())
}

/// Human-readable launch summary.
pub fn write_report(
    out: &mut impl Write,
    request: &LaunchRequest,
    report: &LaunchReport,
) -> io::Result<()> {
    writeln!(
        out,
        "Launched {} session(s) in {} worktree(s) across {} window(s) [{} / preset {}]",
        report.launched.len(),
        report.workspaces,
        report.windows,
        request.repo,
        request.preset_name
    )?;
    let mut seen = Vec::new();
    for unit in &report.launched {
        if !seen.contains(&&unit.workspace.path) {
            seen.push(&unit.workspace.path);
            writeln!(
                out,
                "  {}  {}",
                unit.workspace.branch,
                display_path(&unit.workspace.path)
            )?;
        }
    }
    for skipped in &report.skipped {
        writeln!(
            out,
            "  skipped {} ({}): {}",
            skipped.unit.workspace.branch,
            skipped.unit.agent(),
            skipped.reason
        )?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use dispatch_core::config::Window;
    use dispatch_core::launcher::SkippedUnit;
    use dispatch_core::resolver::{LaunchUnit, UnitKind, WorkspaceTarget};
    use dispatch_core::testing::{FakeGit, FixedRandom, RecordingScripts};

    use super::*;

    fn config() -> Config {
        let mut config = Config {
            default: "solo".into(),
            ..Default::default()
        };
        for (name, agent) in [("solo", "codex"), ("pair", "claude")] {
            config.presets.insert(
                name.into(),
                vec![Window {
                    agent: agent.into(),
                    replicate: 1,
                    commands: Vec::new(),
                }],
            );
        }
        config
    }

    #[test]
    fn preset_selection_order() {
        let config = config();
        let mut settings = AppSettings::default();
        assert_eq!(select_preset(&config, None, &settings).0, "solo");
        settings.session.default_preset = "pair".into();
        assert_eq!(select_preset(&config, None, &settings).0, "pair");
        assert_eq!(select_preset(&config, Some("solo"), &settings).0, "solo");

        let (name, preset) = select_preset(&config, Some("ghost"), &settings);
        assert_eq!(name, "ghost");
        assert!(preset.is_empty());
    }

    fn unit(branch: &str, agent: &str) -> LaunchUnit {
        LaunchUnit {
            workspace: WorkspaceTarget {
                path: PathBuf::from(format!("/wt/{branch}")),
                branch: branch.into(),
            },
            kind: UnitKind::Agent {
                agent: agent.into(),
            },
        }
    }

    #[test]
    fn report_lists_workspaces_once() {
        let request = LaunchRequest {
            repo: "acme/widgets".into(),
            preset_name: "pair".into(),
            ..Default::default()
        };
        let mut command = unit("a-1", "claude");
        command.kind = UnitKind::Command {
            agent: "claude".into(),
            command: "make".into(),
            title: "make".into(),
            color: None,
        };
        let report = LaunchReport {
            launched: vec![unit("a-1", "claude"), command],
            skipped: vec![SkippedUnit {
                unit: unit("a-2", "claude"),
                reason: "already exists".into(),
            }],
            workspaces: 1,
            windows: 1,
        };
        let mut out = Vec::new();
        write_report(&mut out, &request, &report).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Launched 2 session(s) in 1 worktree(s) across 1 window(s)"));
        assert_eq!(text.matches("/wt/a-1").count(), 1);
        assert!(text.contains("skipped a-2 (claude): already exists"));
    }

    #[test]
    fn missing_preset_file_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let services = Services::new(
            DataPaths::new(tmp.path()),
            Arc::new(FakeGit::new()),
            Arc::new(RecordingScripts::new()),
            Arc::new(FixedRandom::counting()),
        );
        let err = run(
            &services,
            LaunchArgs {
                repo: "acme/widgets".into(),
                name: "x".into(),
                prompt: "p".into(),
                preset: None,
                replicate_override: 0,
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("preset file not found"));
    }
}

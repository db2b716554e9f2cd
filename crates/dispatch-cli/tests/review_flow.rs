//! Drives the review interface state machine against real services backed by
//! fake git and a recording terminal.

#![allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use dispatch_cli::app::{App, Effect, StatusKind, View};
use dispatch_cli::services::Services;
use dispatch_core::config::{AppSettings, Config};
use dispatch_core::paths::DataPaths;
use dispatch_core::testing::{FakeGit, FixedRandom, RecordingScripts};

const PRESETS: &str = r"
default: pair
presets:
  pair:
    - agent: claude
      n: 2
  solo:
    - agent: codex
";

struct Harness {
    _tmp: tempfile::TempDir,
    app: App,
    services: Services,
    git: Arc<FakeGit>,
    scripts: Arc<RecordingScripts>,
}

impl Harness {
    fn new() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(tmp.path());
        std::fs::write(paths.presets_file(), PRESETS).unwrap();
        let config = Config::load(&paths.presets_file()).unwrap().unwrap();
        let git = Arc::new(FakeGit::new());
        let scripts = Arc::new(RecordingScripts::new());
        let services = Services::new(
            paths.clone(),
            git.clone(),
            scripts.clone(),
            Arc::new(FixedRandom::counting()),
        );
        let app = App::new(config, AppSettings::default(), paths.presets_file());
        Self {
            _tmp: tmp,
            app,
            services,
            git,
            scripts,
        }
    }

    /// Run effects until none are left, feeding every outcome back.
    fn drain(&mut self, effects: Vec<Effect>) {
        let mut queue: VecDeque<Effect> = effects.into();
        while let Some(effect) = queue.pop_front() {
            let outcome = self.services.run(effect);
            queue.extend(self.app.apply(outcome));
        }
    }

    fn key(&mut self, code: KeyCode) {
        let effects = self.app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
        self.drain(effects);
    }

    fn type_str(&mut self, s: &str) {
        for c in s.chars() {
            self.key(KeyCode::Char(c));
        }
    }

    fn status(&self) -> String {
        self.app
            .status
            .as_ref()
            .map(|s| s.text.clone())
            .unwrap_or_default()
    }
}

#[test]
fn launch_review_reopen_delete() {
    let mut h = Harness::new();
    let start = h.app.start();
    h.drain(start);
    assert!(h.app.workspaces.items.is_empty());

    // Launch two replicas from the form.
    h.key(KeyCode::Tab);
    assert_eq!(h.app.view, View::Launch);
    h.type_str("acme/widgets");
    h.key(KeyCode::Enter);
    h.type_str("review");
    h.key(KeyCode::Enter);
    h.type_str("Review the auth module");
    h.key(KeyCode::Down);
    h.key(KeyCode::Down);
    h.key(KeyCode::Enter);

    assert_eq!(h.status(), "Launched 2 session(s) in 2 worktree(s)!");
    assert_eq!(h.app.view, View::Workspaces);
    assert_eq!(h.app.workspaces.items.len(), 2);
    assert!(h.app.workspaces.items.iter().all(|i| i.is_managed()));
    assert_eq!(h.git.calls_of("clone").len(), 1);

    // Enter: no existing window, so the workspace is re-opened.
    let before = h.scripts.scripts().len();
    h.key(KeyCode::Enter);
    assert_eq!(h.status(), "Opened 1 session(s)");
    let scripts = h.scripts.scripts();
    assert!(scripts[before..].iter().any(|s| s.contains("Review the auth module")));

    // Delete with confirmation.
    h.key(KeyCode::Char('x'));
    h.key(KeyCode::Char('y'));
    assert_eq!(h.status(), "Worktree deleted successfully");
    assert_eq!(h.app.workspaces.items.len(), 1);
}

#[test]
fn failed_launch_reports_error() {
    let mut h = Harness::new();
    h.key(KeyCode::Tab);
    h.type_str("not-a-repo");
    h.key(KeyCode::Enter);
    h.type_str("x");
    h.key(KeyCode::Enter);
    h.type_str("p");
    h.key(KeyCode::Down);
    h.key(KeyCode::Down);
    h.key(KeyCode::Enter);

    assert!(h.status().starts_with("Launch failed:"));
    assert_eq!(h.app.status.as_ref().unwrap().kind, StatusKind::Error);
    assert_eq!(h.app.view, View::Launch);
    assert!(h.git.calls().is_empty());
}

#[test]
fn settings_round_trip_through_disk() {
    let mut h = Harness::new();
    h.key(KeyCode::BackTab);
    h.key(KeyCode::BackTab);
    assert_eq!(h.app.view, View::Settings);
    // Theme row.
    h.key(KeyCode::Down);
    h.key(KeyCode::Down);
    h.key(KeyCode::Right);
    let effects = h
        .app
        .handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
    h.drain(effects);

    assert_eq!(h.status(), "Settings saved");
    assert_eq!(h.app.settings.ui.theme, "dark");
    let on_disk = AppSettings::load(&h.services.paths().settings_file()).unwrap();
    assert_eq!(on_disk.ui.theme, "dark");
}

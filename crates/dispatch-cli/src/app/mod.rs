//! Review interface state machine.
//!
//! [`App`] never performs I/O. Keys and effect outcomes go in, [`Effect`]s
//! come out; the TUI loop runs them and feeds the outcomes back.

mod effects;
mod launch_form;
mod settings_form;
mod text_input;
mod workspace_list;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use dispatch_core::config::{AppSettings, Config};
use dispatch_core::launcher::LaunchRequest;
use tracing::debug;

use crate::launch_cmd::select_preset;

pub use effects::{Effect, EffectOutcome, LaunchSummary, OpenResult};
pub use launch_form::{INCOMPLETE_MESSAGE, LaunchAction, LaunchDraft, LaunchField, LaunchForm};
pub use settings_form::{SettingsField, SettingsForm};
pub use text_input::TextInput;
pub use workspace_list::{ListAction, WorkspaceList};

/// How long a status message stays on screen.
pub const STATUS_TTL: Duration = Duration::from_secs(5);
/// Workspace re-scan period while the list is visible.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(5);

pub const NOT_MANAGED_MESSAGE: &str = "No preset info available for this worktree";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Workspaces,
    Launch,
    Settings,
    PresetInfo,
}

impl View {
    pub const ALL: [Self; 4] = [
        Self::Workspaces,
        Self::Launch,
        Self::Settings,
        Self::PresetInfo,
    ];

    pub const fn title(self) -> &'static str {
        match self {
            Self::Workspaces => "Worktrees",
            Self::Launch => "Launch",
            Self::Settings => "Settings",
            Self::PresetInfo => "Presets",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|v| *v == self).unwrap_or(0)
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    #[must_use]
    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Header,
    Content,
}

/// Whether a view handled a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResult {
    Consumed,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Status {
    pub text: String,
    pub kind: StatusKind,
    pub set_at: Instant,
}

pub struct App {
    pub view: View,
    pub focus: Focus,
    pub config: Config,
    pub settings: AppSettings,
    /// Where the preset file lives, for the presets page.
    pub presets_path: PathBuf,
    pub workspaces: WorkspaceList,
    pub launch: LaunchForm,
    pub settings_form: SettingsForm,
    pub status: Option<Status>,
    pub show_help: bool,
    pub show_sidebar: bool,
    pub should_quit: bool,
    last_refresh: Instant,
}

impl App {
    pub fn new(config: Config, settings: AppSettings, presets_path: PathBuf) -> Self {
        let names = config.preset_names();
        let (initial, _) = select_preset(&config, None, &settings);
        Self {
            view: View::Workspaces,
            focus: Focus::Content,
            launch: LaunchForm::new(names.clone(), &initial),
            settings_form: SettingsForm::new(settings.clone(), names),
            config,
            settings,
            presets_path,
            workspaces: WorkspaceList::default(),
            status: None,
            show_help: false,
            show_sidebar: true,
            should_quit: false,
            last_refresh: Instant::now(),
        }
    }

    /// Effects to run as soon as the loop starts.
    pub fn start(&mut self) -> Vec<Effect> {
        self.request_refresh(Instant::now())
    }

    pub fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            kind,
            set_at: Instant::now(),
        });
    }

    fn set_view(&mut self, view: View) {
        self.view = view;
        self.status = None;
        self.workspaces.confirm_delete = None;
        if view == View::Settings && !self.settings_form.dirty {
            self.settings_form.draft = self.settings.clone();
        }
    }

    fn view_at_top(&self) -> bool {
        match self.view {
            View::Workspaces => self.workspaces.at_top(),
            View::Launch => self.launch.at_top(),
            View::Settings => self.settings_form.at_top(),
            View::PresetInfo => true,
        }
    }

    fn request_refresh(&mut self, now: Instant) -> Vec<Effect> {
        self.last_refresh = now;
        self.workspaces.loading = true;
        vec![Effect::Refresh]
    }

    /// Ordered key dispatch: globals, help overlay, view cycling, header,
    /// the active view, then the Esc fallback.
    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => {
                self.should_quit = true;
                return Vec::new();
            }
            KeyCode::F(1) => {
                self.show_help = !self.show_help;
                return Vec::new();
            }
            KeyCode::Char('p') if ctrl => {
                self.show_sidebar = !self.show_sidebar;
                return Vec::new();
            }
            KeyCode::Char('s') if ctrl => return self.save_settings(),
            _ => {}
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return Vec::new();
        }

        match key.code {
            KeyCode::Tab => {
                self.set_view(self.view.next());
                return Vec::new();
            }
            KeyCode::BackTab => {
                self.set_view(self.view.prev());
                return Vec::new();
            }
            _ => {}
        }

        if self.focus == Focus::Header {
            match key.code {
                KeyCode::Left => self.set_view(self.view.prev()),
                KeyCode::Right => self.set_view(self.view.next()),
                KeyCode::Down | KeyCode::Enter => self.focus = Focus::Content,
                KeyCode::Esc if self.view != View::Workspaces => self.set_view(View::Workspaces),
                _ => {}
            }
            return Vec::new();
        }

        if key.code == KeyCode::Up && self.view_at_top() {
            self.focus = Focus::Header;
            return Vec::new();
        }

        let (result, effects) = match self.view {
            View::Workspaces => {
                let (result, action) = self.workspaces.handle_key(key);
                (result, self.on_list_action(action))
            }
            View::Launch => {
                let (result, action) = self.launch.handle_key(key);
                (result, self.on_launch_action(action))
            }
            View::Settings => (self.settings_form.handle_key(key), Vec::new()),
            View::PresetInfo => (KeyResult::Ignored, Vec::new()),
        };

        if result == KeyResult::Ignored && key.code == KeyCode::Esc && self.view != View::Workspaces {
            self.set_view(View::Workspaces);
        }
        effects
    }

    fn on_list_action(&mut self, action: ListAction) -> Vec<Effect> {
        match action {
            ListAction::None => Vec::new(),
            ListAction::Refresh => self.request_refresh(Instant::now()),
            ListAction::ToggleDetails => {
                self.show_sidebar = !self.show_sidebar;
                Vec::new()
            }
            ListAction::Prune => {
                if !self.settings.session.auto_clean_worktrees {
                    self.set_status(
                        StatusKind::Info,
                        "Auto clean is off; enable it in Settings to prune old worktrees",
                    );
                    return Vec::new();
                }
                let retention_days = self.settings.session.worktree_retention_days;
                self.set_status(
                    StatusKind::Info,
                    format!("Pruning worktrees older than {retention_days} day(s)..."),
                );
                vec![Effect::Prune { retention_days }]
            }
            ListAction::Open(path) => self.open(&path, false),
            ListAction::FocusOrOpen(path) => self.open(&path, true),
            ListAction::Delete(path) => {
                self.set_status(StatusKind::Info, "Deleting worktree...");
                vec![Effect::Delete(path)]
            }
        }
    }

    fn open(&mut self, path: &Path, focus_first: bool) -> Vec<Effect> {
        let Some(item) = self.workspaces.items.iter().find(|i| i.path == path) else {
            return Vec::new();
        };
        let metadata = item.metadata.clone();
        let preset = metadata
            .as_ref()
            .and_then(|m| self.config.preset(&m.preset_name))
            .cloned();
        let effect = Effect::Open {
            path: item.path.clone(),
            branch: item.branch.clone(),
            metadata,
            preset,
            focus_first,
            settings: self.settings.clone(),
        };
        let name = item.name.clone();
        self.set_status(StatusKind::Info, format!("Opening {name}..."));
        vec![effect]
    }

    fn on_launch_action(&mut self, action: LaunchAction) -> Vec<Effect> {
        match action {
            LaunchAction::None => Vec::new(),
            LaunchAction::Incomplete => {
                self.set_status(StatusKind::Error, INCOMPLETE_MESSAGE);
                Vec::new()
            }
            LaunchAction::Submit(draft) => {
                let (preset_name, preset) =
                    select_preset(&self.config, Some(&draft.preset_name), &self.settings);
                let request = LaunchRequest {
                    repo: draft.repo,
                    name: draft.name,
                    prompt: draft.prompt,
                    preset_name,
                    preset,
                    replicate_override: 0,
                };
                self.set_status(StatusKind::Info, format!("Launching {}...", request.repo));
                vec![Effect::Launch {
                    request,
                    settings: self.settings.clone(),
                }]
            }
        }
    }

    fn save_settings(&mut self) -> Vec<Effect> {
        if self.view != View::Settings {
            return Vec::new();
        }
        self.settings_form.draft.normalize();
        self.set_status(StatusKind::Info, "Saving settings...");
        vec![Effect::SaveSettings(self.settings_form.draft.clone())]
    }

    /// Fold an effect outcome into the state. Stale outcomes are applied to
    /// whatever state exists now.
    pub fn apply(&mut self, outcome: EffectOutcome) -> Vec<Effect> {
        debug!(?outcome, "Effect finished");
        match outcome {
            EffectOutcome::Refreshed(Ok(items)) => {
                self.workspaces.set_items(items);
                Vec::new()
            }
            EffectOutcome::Refreshed(Err(e)) => {
                self.workspaces.loading = false;
                self.set_status(StatusKind::Error, format!("Refresh failed: {e}"));
                Vec::new()
            }
            EffectOutcome::Deleted(Ok(path)) => {
                self.workspaces.remove(&path);
                self.set_status(StatusKind::Success, "Worktree deleted successfully");
                self.request_refresh(Instant::now())
            }
            EffectOutcome::Deleted(Err(e)) => {
                self.set_status(StatusKind::Error, format!("Delete failed: {e}"));
                Vec::new()
            }
            EffectOutcome::Launched(Ok(summary)) => {
                let mut text = format!(
                    "Launched {} session(s) in {} worktree(s)!",
                    summary.sessions, summary.workspaces
                );
                if summary.skipped > 0 {
                    text.push_str(&format!(" ({} skipped)", summary.skipped));
                }
                self.view = View::Workspaces;
                self.focus = Focus::Content;
                self.set_status(StatusKind::Success, text);
                self.request_refresh(Instant::now())
            }
            EffectOutcome::Launched(Err(e)) => {
                self.set_status(StatusKind::Error, format!("Launch failed: {e}"));
                Vec::new()
            }
            EffectOutcome::Opened(Ok(OpenResult::Focused)) => {
                self.set_status(StatusKind::Success, "Focused existing window");
                Vec::new()
            }
            EffectOutcome::Opened(Ok(OpenResult::Reopened { sessions })) => {
                self.set_status(StatusKind::Success, format!("Opened {sessions} session(s)"));
                Vec::new()
            }
            EffectOutcome::Opened(Ok(OpenResult::NotManaged)) => {
                self.set_status(StatusKind::Error, NOT_MANAGED_MESSAGE);
                Vec::new()
            }
            EffectOutcome::Opened(Err(e)) => {
                self.set_status(StatusKind::Error, format!("Open failed: {e}"));
                Vec::new()
            }
            EffectOutcome::SettingsSaved(Ok(saved)) => {
                if self.settings_form.draft == saved {
                    self.settings_form.mark_saved();
                }
                self.settings = saved;
                self.set_status(StatusKind::Success, "Settings saved");
                Vec::new()
            }
            EffectOutcome::SettingsSaved(Err(e)) => {
                self.set_status(StatusKind::Error, format!("Save failed: {e}"));
                Vec::new()
            }
            EffectOutcome::Pruned(Ok(count)) => {
                self.set_status(StatusKind::Success, format!("Pruned {count} stale worktree(s)"));
                self.request_refresh(Instant::now())
            }
            EffectOutcome::Pruned(Err(e)) => {
                self.set_status(StatusKind::Error, format!("Prune failed: {e}"));
                Vec::new()
            }
        }
    }

    /// Expire the status line and schedule the periodic re-scan.
    pub fn tick(&mut self, now: Instant) -> Vec<Effect> {
        if self
            .status
            .as_ref()
            .is_some_and(|s| now.saturating_duration_since(s.set_at) >= STATUS_TTL)
        {
            self.status = None;
        }
        if self.view == View::Workspaces
            && !self.workspaces.loading
            && now.saturating_duration_since(self.last_refresh) >= REFRESH_INTERVAL
        {
            return self.request_refresh(now);
        }
        Vec::new()
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use dispatch_core::config::Window;
    use dispatch_core::session::SessionMetadata;
    use dispatch_core::workspace::WorkspaceInfo;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn config() -> Config {
        let mut config = Config {
            default: "pair".into(),
            ..Default::default()
        };
        config.presets.insert(
            "pair".into(),
            vec![Window {
                agent: "claude".into(),
                replicate: 2,
                commands: Vec::new(),
            }],
        );
        config.presets.insert("solo".into(), Vec::new());
        config
    }

    fn app() -> App {
        App::new(config(), AppSettings::default(), PathBuf::from("/data/settings.yaml"))
    }

    fn item(name: &str, managed: bool) -> WorkspaceInfo {
        WorkspaceInfo {
            path: PathBuf::from(format!("/wt/{name}")),
            name: name.into(),
            branch: name.into(),
            metadata: managed.then(|| {
                SessionMetadata::new("acme/widgets", name, "do it", "pair", vec!["claude".into()])
            }),
            ..Default::default()
        }
    }

    #[test]
    fn initial_state() {
        let mut a = app();
        assert_eq!(a.view, View::Workspaces);
        assert_eq!(a.focus, Focus::Content);
        assert!(matches!(a.start().as_slice(), [Effect::Refresh]));
        assert!(a.workspaces.loading);
        // No configured default in the settings, so the preset file's default is used.
        assert_eq!(a.launch.preset_name(), "pair");
    }

    #[test]
    fn tab_cycles_views_and_clears_status() {
        let mut a = app();
        a.set_status(StatusKind::Info, "hello");
        a.handle_key(key(KeyCode::Tab));
        assert_eq!(a.view, View::Launch);
        assert!(a.status.is_none());
        a.handle_key(key(KeyCode::BackTab));
        a.handle_key(key(KeyCode::BackTab));
        assert_eq!(a.view, View::PresetInfo);
    }

    #[test]
    fn leaving_the_list_disarms_delete() {
        let mut a = app();
        a.apply(EffectOutcome::Refreshed(Ok(vec![item("a", true)])));
        a.handle_key(key(KeyCode::Char('x')));
        assert!(a.workspaces.confirm_delete.is_some());
        a.handle_key(key(KeyCode::Tab));
        a.handle_key(key(KeyCode::BackTab));
        assert_eq!(a.view, View::Workspaces);
        assert!(a.workspaces.confirm_delete.is_none());
        assert!(a.handle_key(key(KeyCode::Char('y'))).is_empty());
    }

    #[test]
    fn up_at_top_moves_to_header_and_back() {
        let mut a = app();
        a.handle_key(key(KeyCode::Up));
        assert_eq!(a.focus, Focus::Header);
        a.handle_key(key(KeyCode::Right));
        assert_eq!(a.view, View::Launch);
        a.handle_key(key(KeyCode::Left));
        a.handle_key(key(KeyCode::Left));
        assert_eq!(a.view, View::PresetInfo);
        a.handle_key(key(KeyCode::Down));
        assert_eq!(a.focus, Focus::Content);
    }

    #[test]
    fn up_inside_list_stays_in_content() {
        let mut a = app();
        a.apply(EffectOutcome::Refreshed(Ok(vec![item("a", true), item("b", true)])));
        a.handle_key(key(KeyCode::Down));
        a.handle_key(key(KeyCode::Up));
        assert_eq!(a.focus, Focus::Content);
        assert_eq!(a.workspaces.selected, 0);
    }

    #[test]
    fn esc_returns_to_workspaces_unless_consumed() {
        let mut a = app();
        a.handle_key(key(KeyCode::Tab));
        a.handle_key(key(KeyCode::Tab));
        assert_eq!(a.view, View::Settings);
        a.settings_form.selected = SettingsField::ALL.len() - 1;
        a.handle_key(key(KeyCode::Enter));
        assert!(a.settings_form.editing.is_some());
        a.handle_key(key(KeyCode::Esc));
        assert_eq!(a.view, View::Settings);
        a.handle_key(key(KeyCode::Esc));
        assert_eq!(a.view, View::Workspaces);
    }

    #[test]
    fn globals_are_never_shadowed() {
        let mut a = app();
        a.handle_key(key(KeyCode::Tab));
        a.handle_key(key(KeyCode::Down));
        a.handle_key(key(KeyCode::Down));
        a.handle_key(key(KeyCode::Down));
        a.handle_key(key(KeyCode::Enter));
        assert!(a.launch.selector.is_some());

        a.handle_key(ctrl('p'));
        assert!(!a.show_sidebar);
        a.handle_key(key(KeyCode::F(1)));
        assert!(a.show_help);
        a.handle_key(key(KeyCode::Char('x')));
        assert!(a.show_help);
        a.handle_key(key(KeyCode::Esc));
        assert!(!a.show_help);
        a.handle_key(ctrl('c'));
        assert!(a.should_quit);
    }

    #[test]
    fn save_only_acts_in_settings() {
        let mut a = app();
        assert!(a.handle_key(ctrl('s')).is_empty());
        a.handle_key(key(KeyCode::BackTab));
        a.handle_key(key(KeyCode::BackTab));
        assert_eq!(a.view, View::Settings);
        a.handle_key(key(KeyCode::Right));
        let effects = a.handle_key(ctrl('s'));
        let [Effect::SaveSettings(saved)] = effects.as_slice() else {
            panic!("expected a save, got {effects:?}");
        };
        a.apply(EffectOutcome::SettingsSaved(Ok(saved.clone())));
        assert_eq!(a.settings, *saved);
        assert!(!a.settings_form.dirty);
    }

    #[test]
    fn launch_submission_builds_request() {
        let mut a = app();
        a.handle_key(key(KeyCode::Tab));
        for c in "acme/widgets".chars() {
            a.handle_key(key(KeyCode::Char(c)));
        }
        a.handle_key(key(KeyCode::Enter));
        for c in "task".chars() {
            a.handle_key(key(KeyCode::Char(c)));
        }
        a.handle_key(key(KeyCode::Enter));
        for c in "Do it".chars() {
            a.handle_key(key(KeyCode::Char(c)));
        }
        a.launch.field = LaunchField::Launch;
        let effects = a.handle_key(key(KeyCode::Enter));
        let [Effect::Launch { request, .. }] = effects.as_slice() else {
            panic!("expected a launch, got {effects:?}");
        };
        assert_eq!(request.repo, "acme/widgets");
        assert_eq!(request.name, "task");
        assert_eq!(request.prompt, "Do it");
        assert_eq!(request.preset_name, "pair");
        assert_eq!(request.preset.len(), 1);
        assert_eq!(request.replicate_override, 0);
    }

    #[test]
    fn incomplete_launch_reports_status() {
        let mut a = app();
        a.handle_key(key(KeyCode::Tab));
        a.launch.field = LaunchField::Launch;
        assert!(a.handle_key(key(KeyCode::Enter)).is_empty());
        assert_eq!(a.status.as_ref().unwrap().text, INCOMPLETE_MESSAGE);
        assert_eq!(a.status.as_ref().unwrap().kind, StatusKind::Error);
    }

    #[test]
    fn launch_outcome_returns_to_list() {
        let mut a = app();
        a.handle_key(key(KeyCode::Tab));
        let effects = a.apply(EffectOutcome::Launched(Ok(LaunchSummary {
            sessions: 3,
            workspaces: 2,
            skipped: 0,
        })));
        assert!(matches!(effects.as_slice(), [Effect::Refresh]));
        assert_eq!(a.view, View::Workspaces);
        assert_eq!(
            a.status.as_ref().unwrap().text,
            "Launched 3 session(s) in 2 worktree(s)!"
        );
    }

    #[test]
    fn enter_focuses_or_opens_selected() {
        let mut a = app();
        a.apply(EffectOutcome::Refreshed(Ok(vec![item("a", true), item("b", false)])));
        let effects = a.handle_key(key(KeyCode::Enter));
        let [Effect::Open {
            path,
            preset,
            focus_first,
            metadata,
            ..
        }] = effects.as_slice()
        else {
            panic!("expected an open, got {effects:?}");
        };
        assert_eq!(path, &PathBuf::from("/wt/a"));
        assert!(*focus_first);
        assert!(metadata.is_some());
        assert_eq!(preset.as_ref().map(Vec::len), Some(1));

        a.handle_key(key(KeyCode::Down));
        let effects = a.handle_key(key(KeyCode::Char('o')));
        assert!(matches!(
            effects.as_slice(),
            [Effect::Open { focus_first: false, metadata: None, preset: None, .. }]
        ));
        a.apply(EffectOutcome::Opened(Ok(OpenResult::NotManaged)));
        assert_eq!(a.status.as_ref().unwrap().text, NOT_MANAGED_MESSAGE);
    }

    #[test]
    fn delete_flow() {
        let mut a = app();
        a.apply(EffectOutcome::Refreshed(Ok(vec![item("a", true)])));
        assert!(a.handle_key(key(KeyCode::Char('x'))).is_empty());
        let effects = a.handle_key(key(KeyCode::Char('y')));
        assert!(matches!(effects.as_slice(), [Effect::Delete(p)] if p == Path::new("/wt/a")));
        let effects = a.apply(EffectOutcome::Deleted(Ok(PathBuf::from("/wt/a"))));
        assert!(a.workspaces.items.is_empty());
        assert!(matches!(effects.as_slice(), [Effect::Refresh]));
        assert_eq!(a.status.as_ref().unwrap().text, "Worktree deleted successfully");

        a.apply(EffectOutcome::Deleted(Err("permission denied".into())));
        assert_eq!(a.status.as_ref().unwrap().text, "Delete failed: permission denied");
    }

    #[test]
    fn prune_respects_auto_clean() {
        let mut a = app();
        assert!(a.handle_key(ctrl('x')).is_empty());
        assert_eq!(a.status.as_ref().unwrap().kind, StatusKind::Info);

        a.settings.session.auto_clean_worktrees = true;
        a.settings.session.worktree_retention_days = 3;
        let effects = a.handle_key(ctrl('x'));
        assert!(matches!(effects.as_slice(), [Effect::Prune { retention_days: 3 }]));
    }

    #[test]
    fn tick_expires_status_and_refreshes() {
        let mut a = app();
        a.start();
        a.apply(EffectOutcome::Refreshed(Ok(Vec::new())));
        a.set_status(StatusKind::Info, "hi");
        let now = Instant::now();
        assert!(a.tick(now).is_empty());
        assert!(a.status.is_some());

        let later = now + STATUS_TTL + Duration::from_millis(1);
        let effects = a.tick(later);
        assert!(a.status.is_none());
        assert!(matches!(effects.as_slice(), [Effect::Refresh]));
        // A scan is already in flight.
        assert!(a.tick(later + REFRESH_INTERVAL).is_empty());
    }

    #[test]
    fn no_periodic_refresh_off_the_list() {
        let mut a = app();
        a.handle_key(key(KeyCode::Tab));
        let later = Instant::now() + REFRESH_INTERVAL * 2;
        assert!(a.tick(later).is_empty());
    }
}

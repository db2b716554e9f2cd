//! Tests for TUI rendering.

#[cfg(test)]
#[allow(
    clippy::panic,
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::cast_possible_truncation
)]
mod tests {
    use std::path::PathBuf;

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use dispatch_core::config::{AppSettings, Config, Window};
    use dispatch_core::git::status::FileStat;
    use dispatch_core::session::SessionMetadata;
    use dispatch_core::workspace::WorkspaceInfo;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use crate::app::{App, EffectOutcome, StatusKind, View};
    use crate::ui::draw;

    /// Create a `TestBackend` + `Terminal` of the given size and draw the app once.
    fn draw_app(width: u16, height: u16, app: &App) -> Terminal<TestBackend> {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        terminal
    }

    /// Whole screen as text, one row per line.
    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buf = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn app() -> App {
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
        App::new(
            config,
            AppSettings::default(),
            PathBuf::from("/data/settings.yaml"),
        )
    }

    fn items() -> Vec<WorkspaceInfo> {
        vec![
            WorkspaceInfo {
                path: PathBuf::from("/wt/acme-widgets-fix-1a2b3c4d"),
                name: "acme-widgets-fix-1a2b3c4d".into(),
                branch: "fix-1a2b3c4d".into(),
                remote: "acme/widgets".into(),
                metadata: Some(SessionMetadata::new(
                    "acme/widgets",
                    "fix-1a2b3c4d",
                    "Fix the flaky login test",
                    "pair",
                    vec!["claude".into()],
                )),
                added: 12,
                deleted: 3,
                files: vec![FileStat {
                    path: "src/login.rs".into(),
                    added: 12,
                    deleted: 3,
                }],
                recent_commits: vec!["abc1234 2 hours ago Fix login".into()],
                ..Default::default()
            },
            WorkspaceInfo {
                path: PathBuf::from("/wt/scratch"),
                name: "scratch".into(),
                ..Default::default()
            },
        ]
    }

    #[test]
    fn render_empty_app() {
        let terminal = draw_app(80, 24, &app());
        let text = screen(&terminal);
        assert!(text.contains("Worktrees (0)"));
        assert!(text.contains("No worktrees yet"));
    }

    #[test]
    fn render_list_with_details() {
        let mut app = app();
        app.apply(EffectOutcome::Refreshed(Ok(items())));
        let text = screen(&draw_app(120, 30, &app));
        assert!(text.contains("acme-widgets-fix-1a2b3c4d"));
        assert!(text.contains("(unmanaged)"));
        assert!(text.contains("+12 -3"));
        assert!(text.contains("Fix the flaky login test"));
        assert!(text.contains("src/login.rs"));
        assert!(text.contains("abc1234"));
    }

    #[test]
    fn sidebar_can_be_hidden() {
        let mut app = app();
        app.apply(EffectOutcome::Refreshed(Ok(items())));
        app.handle_key(KeyEvent::new(KeyCode::Char('p'), KeyModifiers::CONTROL));
        let text = screen(&draw_app(120, 30, &app));
        assert!(!text.contains("Details"));
    }

    #[test]
    fn render_delete_confirmation() {
        let mut app = app();
        app.apply(EffectOutcome::Refreshed(Ok(items())));
        press(&mut app, KeyCode::Char('x'));
        let text = screen(&draw_app(100, 30, &app));
        assert!(text.contains("Delete worktree?"));
    }

    #[test]
    fn launch_cursor_follows_input() {
        let mut app = app();
        press(&mut app, KeyCode::Tab);
        for c in "abc".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        let mut terminal = draw_app(80, 30, &app);
        let pos = terminal.get_cursor_position().unwrap();
        // border (1) + marker (2) + "abc" (3)
        assert_eq!(pos.x, 6);
        // header row, border, subtitle, blank, label, then the value
        assert_eq!(pos.y, 5);
        assert!(screen(&terminal).contains("pair"));
    }

    #[test]
    fn render_preset_selector() {
        let mut app = app();
        press(&mut app, KeyCode::Tab);
        app.launch.field = crate::app::LaunchField::Preset;
        press(&mut app, KeyCode::Enter);
        let text = screen(&draw_app(80, 30, &app));
        assert!(text.contains("Select Preset"));
    }

    #[test]
    fn render_settings() {
        let mut app = app();
        app.view = View::Settings;
        let text = screen(&draw_app(100, 30, &app));
        assert!(text.contains("Terminal Type"));
        assert!(text.contains("iterm2"));
        assert!(text.contains("Worktree Retention (days)"));
    }

    #[test]
    fn render_preset_info() {
        let mut app = app();
        app.view = View::PresetInfo;
        let text = screen(&draw_app(100, 40, &app));
        assert!(text.contains("/data/settings.yaml"));
        assert!(text.contains("pair"));
        assert!(text.contains("claude x2"));
    }

    #[test]
    fn status_bar_shows_message_and_can_be_hidden() {
        let mut app = app();
        app.set_status(StatusKind::Error, "Launch failed: boom");
        assert!(screen(&draw_app(80, 24, &app)).contains("Launch failed: boom"));
        app.settings.ui.show_status_bar = false;
        assert!(!screen(&draw_app(80, 24, &app)).contains("Launch failed: boom"));
    }

    #[test]
    fn render_help_overlay() {
        let mut app = app();
        press(&mut app, KeyCode::F(1));
        let text = screen(&draw_app(80, 30, &app));
        assert!(text.contains("Toggle help"));
    }

    #[test]
    fn every_theme_and_view_renders() {
        for theme in ["default", "dark", "light"] {
            let mut app = app();
            app.settings.ui.theme = theme.into();
            app.apply(EffectOutcome::Refreshed(Ok(items())));
            for _ in 0..4 {
                draw_app(80, 24, &app);
                press(&mut app, KeyCode::Tab);
            }
        }
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let mut app = app();
        app.apply(EffectOutcome::Refreshed(Ok(items())));
        press(&mut app, KeyCode::Char('x'));
        draw_app(10, 4, &app);
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::F(1));
        draw_app(10, 4, &app);
        app.view = View::Launch;
        draw_app(3, 3, &app);
    }
}

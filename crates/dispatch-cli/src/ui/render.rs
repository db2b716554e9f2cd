//! TUI rendering functions.

use chrono::{DateTime, Utc};
use dispatch_core::config::Preset;
use dispatch_core::paths::display_path;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::panels;
use super::theme::Theme;
use crate::app::{App, Focus, LaunchField, SettingsField, TextInput, View};

/// Width of the "▸ " / "  " field marker.
const MARKER_WIDTH: u16 = 2;

/// Draw the full UI.
pub fn draw(frame: &mut Frame<'_>, app: &App) {
    let theme = Theme::named(&app.settings.ui.theme);
    let status_height = u16::from(app.settings.ui.show_status_bar);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),             // Header
            Constraint::Min(3),                // Active view
            Constraint::Length(status_height), // Status bar
        ])
        .split(frame.area());

    draw_header(frame, app, &theme, chunks[0]);
    match app.view {
        View::Workspaces => draw_workspaces(frame, app, &theme, chunks[1]),
        View::Launch => draw_launch(frame, app, &theme, chunks[1]),
        View::Settings => draw_settings(frame, app, &theme, chunks[1]),
        View::PresetInfo => draw_preset_info(frame, app, &theme, chunks[1]),
    }
    if status_height > 0 {
        draw_status_bar(frame, app, &theme, chunks[2]);
    }

    if app.view == View::Workspaces && app.workspaces.confirm_delete.is_some() {
        panels::draw_confirm_delete(frame, app, &theme);
    }
    if app.view == View::Launch && app.launch.selector.is_some() {
        panels::draw_preset_selector(frame, app, &theme);
    }
    if app.show_help {
        panels::draw_help(frame, &theme);
    }
}

fn draw_header(frame: &mut Frame<'_>, app: &App, theme: &Theme, area: Rect) {
    let mut spans = vec![Span::styled(" dispatch ", theme.title()), Span::raw(" ")];
    for view in View::ALL {
        let label = format!(" {} ", view.title());
        let style = if view == app.view && app.focus == Focus::Header {
            theme.selected()
        } else if view == app.view {
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            theme.faint()
        };
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_workspaces(frame: &mut Frame<'_>, app: &App, theme: &Theme, area: Rect) {
    let (list_area, sidebar_area) = if app.show_sidebar && area.width >= 60 {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);
        (cols[0], Some(cols[1]))
    } else {
        (area, None)
    };

    let list = &app.workspaces;
    let title = if list.loading {
        format!(" Worktrees ({}) refreshing... ", list.items.len())
    } else {
        format!(" Worktrees ({}) ", list.items.len())
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(theme.border));
    let inner = block.inner(list_area);
    frame.render_widget(block, list_area);

    if list.items.is_empty() {
        let text = if list.loading {
            "Loading worktrees..."
        } else {
            "No worktrees yet. Press Tab to launch a session."
        };
        frame.render_widget(Paragraph::new(Span::styled(text, theme.faint())), inner);
    } else {
        let height = usize::from(inner.height.max(1));
        let offset = list.selected.saturating_sub(height - 1);
        let now = Utc::now();
        let width = usize::from(inner.width);
        let lines: Vec<Line<'_>> = list
            .items
            .iter()
            .enumerate()
            .skip(offset)
            .take(height)
            .map(|(i, item)| {
                let age = item
                    .created_at
                    .map(|t| format_age(t, now))
                    .unwrap_or_default();
                let tag = if item.is_managed() { "" } else { " (unmanaged)" };
                let changes = format!("+{} -{}", item.added, item.deleted);
                let name_width = width.saturating_sub(changes.len() + age.len() + tag.len() + 6);
                let name = truncate_to_width(&item.name, name_width);
                let pad = " ".repeat(name_width.saturating_sub(name.width()));
                if i == list.selected {
                    let style = if app.focus == Focus::Content {
                        theme.selected()
                    } else {
                        Style::default().add_modifier(Modifier::BOLD)
                    };
                    Line::styled(format!("▸ {name}{pad}{tag}  {changes}  {age}"), style)
                } else {
                    Line::from(vec![
                        Span::raw(format!("  {name}{pad}")),
                        Span::styled(tag, theme.faint()),
                        Span::raw("  "),
                        Span::styled(format!("+{}", item.added), Style::default().fg(theme.added)),
                        Span::raw(" "),
                        Span::styled(
                            format!("-{}", item.deleted),
                            Style::default().fg(theme.deleted),
                        ),
                        Span::raw("  "),
                        Span::styled(age, theme.faint()),
                    ])
                }
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    if let Some(sidebar) = sidebar_area {
        panels::draw_details(frame, app, theme, sidebar);
    }
}

/// Two-line form field: marker + label + hint, then the value.
fn field_lines<'a>(
    theme: &Theme,
    active: bool,
    label: &'a str,
    hint: &'a str,
    value: Span<'a>,
) -> [Line<'a>; 2] {
    let marker = if active {
        Span::styled("▸ ", Style::default().fg(theme.accent))
    } else {
        Span::raw("  ")
    };
    let label_style = if active {
        theme.title()
    } else {
        Style::default().fg(theme.text)
    };
    [
        Line::from(vec![
            marker,
            Span::styled(label, label_style),
            Span::raw(" "),
            Span::styled(hint, theme.faint()),
        ]),
        Line::from(vec![Span::raw("  "), value]),
    ]
}

fn input_value<'a>(theme: &Theme, input: &'a TextInput, placeholder: &'a str) -> Span<'a> {
    if input.value().is_empty() {
        Span::styled(placeholder, theme.faint())
    } else {
        Span::raw(input.value())
    }
}

fn draw_launch(frame: &mut Frame<'_>, app: &App, theme: &Theme, area: Rect) {
    let form = &app.launch;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Launch New Session ")
        .border_style(Style::default().fg(theme.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let preset_value = format!(
        "◀ {} ▶  ({}/{})",
        form.preset_name(),
        form.preset_idx + 1,
        form.presets.len()
    );
    let mut lines = vec![
        Line::styled("Create worktrees and start coding agents", theme.faint()),
        Line::from(""),
    ];
    let text_fields = [
        (LaunchField::Repo, "Repository", "e.g. acme/widgets", &form.repo, "owner/repo"),
        (LaunchField::Name, "Branch", "e.g. fix-login", &form.name, "feature-name"),
        (
            LaunchField::Prompt,
            "Prompt",
            "Instructions for the agents",
            &form.prompt,
            "What should the agents do?",
        ),
    ];
    let mut cursor_row = None;
    for (field, label, hint, input, placeholder) in text_fields {
        let active = form.field == field;
        if active {
            cursor_row = Some((lines.len() + 1, input));
        }
        lines.extend(field_lines(theme, active, label, hint, input_value(theme, input, placeholder)));
        lines.push(Line::from(""));
    }
    lines.extend(field_lines(
        theme,
        form.field == LaunchField::Preset,
        "Preset",
        "Left/Right to cycle, Enter to pick",
        Span::raw(preset_value),
    ));
    lines.push(Line::from(""));

    let button_style = if form.field == LaunchField::Launch {
        theme.selected()
    } else {
        Style::default().add_modifier(Modifier::REVERSED)
    };
    let marker = if form.field == LaunchField::Launch { "▸ " } else { "  " };
    lines.push(Line::from(vec![
        Span::styled(marker, Style::default().fg(theme.accent)),
        Span::styled(" Launch ", button_style),
    ]));
    lines.push(Line::from(""));
    lines.push(Line::styled(
        "  Up/Down navigate  Enter select/launch  Esc back",
        theme.faint(),
    ));

    frame.render_widget(Paragraph::new(lines), inner);

    if app.focus == Focus::Content
        && form.selector.is_none()
        && let Some((row, input)) = cursor_row
    {
        let before: String = input.value().chars().take(input.cursor()).collect();
        let x = inner
            .x
            .saturating_add(MARKER_WIDTH)
            .saturating_add(u16::try_from(before.width()).unwrap_or(u16::MAX))
            .min(inner.right().saturating_sub(1));
        let y = inner.y.saturating_add(u16::try_from(row).unwrap_or(u16::MAX));
        if y < inner.bottom() {
            frame.set_cursor_position(Position::new(x, y));
        }
    }
}

fn draw_settings(frame: &mut Frame<'_>, app: &App, theme: &Theme, area: Rect) {
    let form = &app.settings_form;
    let title = if form.dirty {
        " Settings (unsaved) "
    } else {
        " Settings "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(theme.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![
        Line::styled(
            "Use Left/Right to change, Enter to edit, Ctrl+S to save",
            theme.faint(),
        ),
        Line::from(""),
    ];
    let categories: [(&str, &[SettingsField]); 3] = [
        ("Terminal", &[SettingsField::TerminalType, SettingsField::Maximize]),
        ("User Interface", &[SettingsField::Theme]),
        (
            "Session",
            &[
                SettingsField::DefaultPreset,
                SettingsField::AutoClean,
                SettingsField::RetentionDays,
            ],
        ),
    ];
    for (name, fields) in categories {
        lines.push(Line::styled(
            format!("--- {name} ---"),
            Style::default().fg(theme.accent),
        ));
        for &field in fields {
            let active = form.field() == field && app.focus == Focus::Content;
            let marker = if active { "▸ " } else { "  " };
            let hint = match (active, form.editing.is_some()) {
                (true, true) => "  (Enter/Esc to finish)",
                (true, false) => "  (Arrows to change, Enter to edit)",
                _ => "",
            };
            let value_style = if active {
                theme.selected()
            } else {
                Style::default().fg(theme.text)
            };
            lines.push(Line::from(vec![
                Span::styled(marker, Style::default().fg(theme.accent)),
                Span::raw(format!("{}: ", field.label())),
                Span::styled(format!(" {} ", form.value(field)), value_style),
                Span::styled(hint, theme.faint()),
            ]));
            if active {
                lines.push(Line::styled(format!("    {}", field.description()), theme.faint()));
            }
        }
        lines.push(Line::from(""));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

/// One line per window: `agent xN` plus its command titles.
pub fn describe_preset(preset: &Preset) -> Vec<String> {
    if preset.is_empty() {
        return vec!["(empty: launches a single claude)".to_string()];
    }
    preset
        .iter()
        .map(|w| {
            let agent = if w.agent.trim().is_empty() {
                "(no agent, skipped)"
            } else {
                w.agent.as_str()
            };
            let mut line = format!("{agent} x{}", w.replicate.max(1));
            if !w.commands.is_empty() {
                let titles: Vec<String> = w.commands.iter().map(|c| c.display_title()).collect();
                line.push_str(" + ");
                line.push_str(&titles.join(", "));
            }
            line
        })
        .collect()
}

fn draw_preset_info(frame: &mut Frame<'_>, app: &App, theme: &Theme, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Manage Presets ")
        .border_style(Style::default().fg(theme.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![
        Line::from("Presets are managed in your preset file."),
        Line::from(""),
        Line::styled("File location:", theme.faint()),
        Line::styled(
            format!("  {}", display_path(&app.presets_path)),
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ),
        Line::from(""),
        Line::styled("How it works:", Style::default().fg(theme.accent)),
        Line::from("- Each preset is a list of agent windows to create."),
        Line::from("- Each window names an 'agent' and an optional 'n' replica count."),
        Line::from("- 'commands' add extra panes in every replica's worktree."),
        Line::from("- Changes are picked up on the next launch."),
        Line::from(""),
        Line::styled("Configured presets:", Style::default().fg(theme.accent)),
    ];
    if app.config.presets.is_empty() {
        lines.push(Line::styled("  (none)", theme.faint()));
    }
    for (name, preset) in &app.config.presets {
        let marker = if *name == app.config.default {
            " (default)"
        } else {
            ""
        };
        lines.push(Line::from(vec![
            Span::styled(format!("  {name}"), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(marker, theme.faint()),
        ]));
        for window in describe_preset(preset) {
            lines.push(Line::from(format!("    {window}")));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::styled("Example:", Style::default().fg(theme.accent)));
    for example in [
        "default: dev",
        "presets:",
        "  dev:",
        "    - agent: claude",
        "      commands:",
        "        - command: npm run dev",
        "          title: App",
        "    - agent: codex",
        "      n: 2",
    ] {
        lines.push(Line::styled(format!("  {example}"), theme.faint()));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_status_bar(frame: &mut Frame<'_>, app: &App, theme: &Theme, area: Rect) {
    let line = if let Some(status) = &app.status {
        Line::styled(format!(" {}", status.text), theme.status(status.kind))
    } else {
        let hints = match (app.focus, app.view) {
            (Focus::Header, _) => "Left/Right switch view  Down enter  F1 help  Ctrl+C quit",
            (_, View::Workspaces) => {
                "Enter focus/open  o open  d details  x delete  Ctrl+R refresh  F1 help"
            }
            (_, View::Launch) => "Up/Down fields  Enter next/launch  Esc back  F1 help",
            (_, View::Settings) => "Left/Right change  Enter edit  Ctrl+S save  Esc back",
            (_, View::PresetInfo) => "Tab next view  Esc back  F1 help",
        };
        Line::styled(format!(" {hints}"), theme.faint())
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// Compact relative age: `just now`, `5m ago`, `3h ago`, `2d ago`.
pub fn format_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0);
    match secs {
        0..60 => "just now".to_string(),
        60..3_600 => format!("{}m ago", secs / 60),
        3_600..86_400 => format!("{}h ago", secs / 3_600),
        _ => format!("{}d ago", secs / 86_400),
    }
}

/// Cut `s` to at most `max` display columns, ending in `…` when shortened.
pub fn truncate_to_width(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// A `width` x `height` rectangle centred in `area`, clipped to it.
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(2)).max(1);
    let height = height.min(area.height.saturating_sub(2)).max(1);
    Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    )
}

//! Sidebar and overlay rendering: workspace details, delete confirmation,
//! preset selector and the help screen.

use chrono::Utc;
use dispatch_core::paths::display_path;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use super::render::{centered_rect, format_age, truncate_to_width};
use super::theme::Theme;
use crate::app::App;

/// Files listed in the details panel before "and N more".
const MAX_FILES: usize = 8;
/// Prompt characters shown when the prompt is collapsed.
const PROMPT_PREVIEW_CHARS: usize = 120;

/// Render a bordered panel with the given title, border color, and lines of content.
fn render_bordered_panel(
    frame: &mut Frame<'_>,
    area: Rect,
    title: &str,
    border_color: Color,
    lines: Vec<Line<'_>>,
) {
    let panel = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(border_color)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(panel, area);
}

fn labelled<'a>(theme: &Theme, label: &'a str, value: String) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{label:<10}"), theme.faint()),
        Span::raw(value),
    ])
}

/// Details of the selected workspace.
pub fn draw_details(frame: &mut Frame<'_>, app: &App, theme: &Theme, area: Rect) {
    let Some(item) = app.workspaces.selected_item() else {
        render_bordered_panel(
            frame,
            area,
            " Details ",
            theme.border,
            vec![Line::styled("Nothing selected", theme.faint())],
        );
        return;
    };

    let now = Utc::now();
    let mut lines = vec![
        Line::styled(item.name.clone(), theme.title()),
        Line::from(""),
        labelled(theme, "Path", display_path(&item.path)),
        labelled(theme, "Branch", item.branch.clone()),
    ];
    if !item.remote.is_empty() {
        lines.push(labelled(theme, "Remote", item.remote.clone()));
    }
    if let Some(repo) = &item.repository {
        lines.push(labelled(theme, "Repo", display_path(repo)));
    }
    if let Some(created) = item.created_at {
        lines.push(labelled(theme, "Created", format_age(created, now)));
    }

    match &item.metadata {
        Some(meta) => {
            lines.push(labelled(theme, "Preset", meta.preset_name.clone()));
            lines.push(labelled(theme, "Agents", meta.agents.join(", ")));
            if let Some(opened) = meta.last_opened {
                lines.push(labelled(theme, "Opened", format_age(opened, now)));
            }
            lines.push(Line::from(""));
            lines.push(Line::styled("Prompt", Style::default().fg(theme.accent)));
            let prompt = if app.workspaces.expanded_prompt
                || meta.prompt.chars().count() <= PROMPT_PREVIEW_CHARS
            {
                meta.prompt.clone()
            } else {
                let cut: String = meta.prompt.chars().take(PROMPT_PREVIEW_CHARS).collect();
                format!("{cut}... (e to expand)")
            };
            lines.push(Line::from(prompt));
        }
        None => {
            lines.push(Line::from(""));
            lines.push(Line::styled(
                "Not created by dispatch; re-open is unavailable.",
                theme.faint(),
            ));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Changes ", Style::default().fg(theme.accent)),
        Span::styled(format!("+{}", item.added), Style::default().fg(theme.added)),
        Span::raw(" "),
        Span::styled(format!("-{}", item.deleted), Style::default().fg(theme.deleted)),
    ]));
    let path_width = usize::from(area.width.saturating_sub(16));
    for file in item.files.iter().take(MAX_FILES) {
        lines.push(Line::from(vec![
            Span::raw(format!("  {:<w$} ", truncate_to_width(&file.path, path_width), w = path_width)),
            Span::styled(format!("+{}", file.added), Style::default().fg(theme.added)),
            Span::raw(" "),
            Span::styled(format!("-{}", file.deleted), Style::default().fg(theme.deleted)),
        ]));
    }
    if item.files.len() > MAX_FILES {
        lines.push(Line::styled(
            format!("  and {} more", item.files.len() - MAX_FILES),
            theme.faint(),
        ));
    }

    if !item.recent_commits.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::styled("Recent commits", Style::default().fg(theme.accent)));
        for commit in &item.recent_commits {
            lines.push(Line::from(format!("  {commit}")));
        }
    } else if !item.last_commit.is_empty() {
        lines.push(labelled(theme, "Commit", item.last_commit.clone()));
    }

    render_bordered_panel(frame, area, " Details ", theme.border, lines);
}

pub fn draw_confirm_delete(frame: &mut Frame<'_>, app: &App, theme: &Theme) {
    let Some(path) = &app.workspaces.confirm_delete else {
        return;
    };
    let area = centered_rect(frame.area(), 60, 7);
    frame.render_widget(Clear, area);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let lines = vec![
        Line::styled("Delete worktree?", theme.title()),
        Line::from(""),
        Line::from(name),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                "[y]",
                Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Delete  "),
            Span::styled("[n/Esc]", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" Cancel"),
        ]),
    ];
    render_bordered_panel(frame, area, " Confirm ", theme.error, lines);
}

pub fn draw_preset_selector(frame: &mut Frame<'_>, app: &App, theme: &Theme) {
    let Some(highlight) = app.launch.selector else {
        return;
    };
    let height = u16::try_from(app.launch.presets.len())
        .unwrap_or(u16::MAX)
        .saturating_add(2);
    let area = centered_rect(frame.area(), 40, height);
    frame.render_widget(Clear, area);
    let lines = app
        .launch
        .presets
        .iter()
        .enumerate()
        .map(|(i, name)| {
            if i == highlight {
                Line::styled(format!("▸ {name}"), theme.selected())
            } else {
                Line::from(format!("  {name}"))
            }
        })
        .collect();
    render_bordered_panel(frame, area, " Select Preset ", theme.accent, lines);
}

const HELP: &[(&str, &str)] = &[
    ("Tab / Shift+Tab", "Next / previous view"),
    ("Up at top", "Focus the header"),
    ("Left / Right", "Switch view (header)"),
    ("Esc", "Back to worktrees"),
    ("Enter", "Focus window or re-open worktree"),
    ("o", "Re-open worktree with its preset"),
    ("d / Ctrl+P", "Toggle details"),
    ("e", "Expand prompt"),
    ("x / Delete", "Delete worktree"),
    ("Ctrl+R", "Refresh"),
    ("Ctrl+X", "Prune old worktrees"),
    ("Ctrl+S", "Save settings"),
    ("F1", "Toggle help"),
    ("Ctrl+C", "Quit"),
];

pub fn draw_help(frame: &mut Frame<'_>, theme: &Theme) {
    let height = u16::try_from(HELP.len()).unwrap_or(u16::MAX).saturating_add(4);
    let area = centered_rect(frame.area(), 56, height);
    frame.render_widget(Clear, area);
    let mut lines: Vec<Line<'_>> = HELP
        .iter()
        .map(|(keys, action)| {
            Line::from(vec![
                Span::styled(
                    format!("{keys:<18}"),
                    Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
                ),
                Span::raw(*action),
            ])
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::styled("Esc or F1 to close", theme.faint()));
    render_bordered_panel(frame, area, " Help ", theme.accent, lines);
}

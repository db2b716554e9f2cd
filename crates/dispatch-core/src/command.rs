//! Bootstrap line typed into each pane.
//!
//! A line is a chain of `&&`-joined segments: set the title, tint the pane,
//! enter the workspace, announce the branch, then run the payload.

use std::fmt::Write as _;

use crate::agents::{AgentPalette, Rgb};
use crate::resolver::{LaunchUnit, UnitKind};

const SEPARATOR: &str = " && ";

/// Escape `s` for use inside a single-quoted POSIX shell string.
pub fn escape(s: &str) -> String {
    s.replace('\'', r"'\''")
}

/// Wrap `s` in single quotes, escaping embedded quotes.
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", escape(s))
}

/// Replace line breaks with spaces.
fn fold_lines(s: &str) -> String {
    s.chars()
        .map(|c| if matches!(c, '\n' | '\r') { ' ' } else { c })
        .collect()
}

fn title_segment(title: &str) -> String {
    format!(r"echo -ne '\033]0;{}\007'", escape(&fold_lines(title)))
}

fn color_segment((r, g, b): Rgb) -> String {
    let mut seg = String::from("echo -ne '");
    for (channel, value) in [("red", r), ("green", g), ("blue", b)] {
        let _ = write!(seg, r"\033]6;1;bg;{channel};brightness;{value}\007");
    }
    seg.push('\'');
    seg
}

/// Prompt as a single shell word on a single line.
fn prompt_argument(prompt: &str) -> String {
    shell_quote(&fold_lines(prompt))
}

/// Multi-line command text chained into one line, one `&&` step per
/// non-empty line.
fn command_payload(command: &str) -> Option<String> {
    let payload = command.trim();
    if payload.is_empty() || payload == r"\n" {
        return None;
    }
    let steps: Vec<&str> = payload
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    Some(steps.join(SEPARATOR))
}

/// Builds pane bootstrap lines. Pure; performs no I/O.
#[derive(Debug, Clone, Default)]
pub struct CommandBuilder {
    palette: AgentPalette,
}

impl CommandBuilder {
    pub const fn new(palette: AgentPalette) -> Self {
        Self { palette }
    }

    /// The full line for `unit`, terminated by a newline.
    pub fn build(&self, unit: &LaunchUnit, prompt: &str) -> String {
        let branch = unit.workspace.branch.as_str();
        let dir = unit.workspace.path.to_string_lossy();
        let mut segments = Vec::with_capacity(5);

        match &unit.kind {
            UnitKind::Agent { agent } => {
                segments.push(title_segment(&format!("{agent}: {branch}")));
                if let Some(rgb) = self.palette.color(agent) {
                    segments.push(color_segment(rgb));
                }
                if !dir.is_empty() {
                    segments.push(format!("cd {}", shell_quote(&dir)));
                }
                segments.push(format!("{agent} {}", prompt_argument(prompt)));
            }
            UnitKind::Command {
                command,
                title,
                color,
                ..
            } => {
                let title = if title.is_empty() { "terminal" } else { title };
                let title = if branch.is_empty() {
                    title.to_string()
                } else {
                    format!("[{branch}] {title}")
                };
                segments.push(title_segment(&title));
                if let Some(rgb @ (r, g, b)) = *color
                    && (r > 0 || g > 0 || b > 0)
                {
                    segments.push(color_segment(rgb));
                }
                if !dir.is_empty() {
                    segments.push(format!("cd {}", shell_quote(&dir)));
                }
                if !branch.is_empty() {
                    segments.push(format!("echo {}", shell_quote(&format!("Branch: {branch}"))));
                }
                if let Some(payload) = command_payload(command) {
                    segments.push(payload);
                }
            }
        }

        let mut line = segments.join(SEPARATOR);
        line.push('\n');
        line
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::resolver::WorkspaceTarget;

    /// Undo POSIX single quoting of a whole word.
    fn unquote(word: &str) -> String {
        let mut out = String::new();
        let mut in_quotes = false;
        let mut chars = word.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\'' => in_quotes = !in_quotes,
                '\\' if !in_quotes => {
                    if let Some(next) = chars.next() {
                        out.push(next);
                    }
                }
                _ => out.push(c),
            }
        }
        out
    }

    fn target(path: &str, branch: &str) -> WorkspaceTarget {
        WorkspaceTarget {
            path: PathBuf::from(path),
            branch: branch.into(),
        }
    }

    fn agent_unit(agent: &str) -> LaunchUnit {
        LaunchUnit {
            workspace: target("/wt/acme-widgets-fix-0a1b2c3d", "fix-0a1b2c3d"),
            kind: UnitKind::Agent {
                agent: agent.into(),
            },
        }
    }

    fn command_unit(command: &str, title: &str, color: Option<Rgb>, branch: &str) -> LaunchUnit {
        LaunchUnit {
            workspace: target(if branch.is_empty() { "" } else { "/wt/x" }, branch),
            kind: UnitKind::Command {
                agent: "claude".into(),
                command: command.into(),
                title: title.into(),
                color,
            },
        }
    }

    #[test]
    fn escape_round_trips() {
        for s in ["", "it's", "''", "plain", "a 'quoted' word", "trailing'"] {
            assert_eq!(unquote(&shell_quote(s)), s, "round trip of {s:?}");
        }
    }

    #[test]
    fn agent_line_for_known_agent() {
        let line = CommandBuilder::default().build(&agent_unit("claude"), "Fix the bug");
        assert_eq!(
            line,
            "echo -ne '\\033]0;claude: fix-0a1b2c3d\\007' && \
             echo -ne '\\033]6;1;bg;red;brightness;210\\007\\033]6;1;bg;green;brightness;180\\007\\033]6;1;bg;blue;brightness;140\\007' && \
             cd '/wt/acme-widgets-fix-0a1b2c3d' && \
             claude 'Fix the bug'\n"
        );
    }

    #[test]
    fn unknown_agent_has_no_color_segment() {
        let line = CommandBuilder::default().build(&agent_unit("aider"), "x");
        assert!(!line.contains("brightness"));
        assert!(line.ends_with("aider 'x'\n"));
    }

    #[test]
    fn prompt_quotes_are_escaped() {
        let line = CommandBuilder::default().build(&agent_unit("codex"), "don't stop");
        assert!(line.ends_with("codex 'don'\\''t stop'\n"));
    }

    #[test]
    fn multiline_prompt_stays_on_one_line() {
        let line = CommandBuilder::default().build(&agent_unit("codex"), "one\ntwo\r\nthree");
        assert_eq!(line.matches('\n').count(), 1);
        assert!(line.ends_with("codex 'one two  three'\n"));
    }

    #[test]
    fn multiline_command_and_title_stay_on_one_line() {
        let unit = command_unit("npm install\nnpm run dev\n", "Dev\nServer", None, "x");
        let line = CommandBuilder::default().build(&unit, "");
        assert_eq!(line.matches('\n').count(), 1);
        assert_eq!(
            line,
            "echo -ne '\\033]0;[x] Dev Server\\007' && cd '/wt/x' && echo 'Branch: x' && \
             npm install && npm run dev\n"
        );
    }

    #[test]
    fn crlf_command_lines_are_chained() {
        let unit = command_unit("make\r\n\r\n  make test  \r\n", "", None, "");
        let line = CommandBuilder::default().build(&unit, "");
        assert!(line.ends_with(" && make && make test\n"));
    }

    #[test]
    fn empty_command_ends_after_branch_announcement() {
        let unit = command_unit("", "Extra Terminal", None, "x");
        let line = CommandBuilder::default().build(&unit, "ignored");
        assert_eq!(
            line,
            "echo -ne '\\033]0;[x] Extra Terminal\\007' && cd '/wt/x' && echo 'Branch: x'\n"
        );
        assert!(!line.trim_end().ends_with("&&"));
    }

    #[test]
    fn literal_newline_command_runs_nothing() {
        let unit = command_unit("\\n", "t", None, "x");
        let line = CommandBuilder::default().build(&unit, "");
        assert!(line.ends_with("echo 'Branch: x'\n"));
    }

    #[test]
    fn command_payload_is_trimmed() {
        let unit = command_unit("  npm run dev  ", "Dev", Some((46, 139, 87)), "b");
        let line = CommandBuilder::default().build(&unit, "");
        assert!(line.contains("brightness;46"));
        assert!(line.ends_with(" && npm run dev\n"));
    }

    #[test]
    fn zero_color_is_omitted() {
        let unit = command_unit("ls", "List", Some((0, 0, 0)), "b");
        let line = CommandBuilder::default().build(&unit, "");
        assert!(!line.contains("brightness"));
    }

    #[test]
    fn command_without_workspace_skips_cd_and_branch() {
        let unit = command_unit("htop", "", None, "");
        let line = CommandBuilder::default().build(&unit, "");
        assert_eq!(line, "echo -ne '\\033]0;terminal\\007' && htop\n");
    }

    #[test]
    fn path_with_spaces_and_quotes_is_quoted() {
        let mut unit = agent_unit("droid");
        unit.workspace.path = PathBuf::from("/tmp/it's here");
        let line = CommandBuilder::default().build(&unit, "p");
        assert!(line.contains("cd '/tmp/it'\\''s here'"));
    }
}

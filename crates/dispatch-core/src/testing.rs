//! In-memory collaborators for tests.
//!
//! Enabled for this crate's unit tests and, through the `test-utils` feature,
//! for dependent crates.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{Error, Result};
use crate::git::GitRunner;
use crate::resolver::RandomSource;
use crate::terminal::{FocusTarget, PaneHandle, ScriptRunner, SplitDirection, TerminalBackend};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One recorded git invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCall {
    pub dir: PathBuf,
    pub args: Vec<String>,
}

/// Scripted git. Unknown invocations succeed with empty output.
///
/// Successful `clone` and `worktree add` calls create their target
/// directory (with a `.git` marker) so later filesystem steps behave.
#[derive(Debug, Default)]
pub struct FakeGit {
    calls: Mutex<Vec<GitCall>>,
    responses: Mutex<HashMap<Vec<String>, std::result::Result<String, String>>>,
}

impl FakeGit {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    /// Make `args` succeed with `stdout`.
    pub fn respond(&self, args: &[&str], stdout: &str) {
        lock(&self.responses).insert(Self::key(args), Ok(stdout.to_string()));
    }

    /// Make `args` fail with `output`.
    pub fn fail(&self, args: &[&str], output: &str) {
        lock(&self.responses).insert(Self::key(args), Err(output.to_string()));
    }

    pub fn calls(&self) -> Vec<GitCall> {
        lock(&self.calls).clone()
    }

    /// Calls whose first argument is `subcommand`.
    pub fn calls_of(&self, subcommand: &str) -> Vec<GitCall> {
        lock(&self.calls)
            .iter()
            .filter(|c| c.args.first().is_some_and(|a| a == subcommand))
            .cloned()
            .collect()
    }

    fn materialize(args: &[&str]) {
        let target = match args {
            ["clone", _, target] | ["worktree", "add", "-b", _, target, _] => Path::new(target),
            _ => return,
        };
        if target.is_absolute() {
            let _ = std::fs::create_dir_all(target.join(".git"));
        }
    }
}

impl GitRunner for FakeGit {
    fn run(&self, dir: &Path, args: &[&str]) -> Result<String> {
        lock(&self.calls).push(GitCall {
            dir: dir.to_path_buf(),
            args: Self::key(args),
        });
        let response = lock(&self.responses).get(&Self::key(args)).cloned();
        match response {
            Some(Err(output)) => Err(Error::external("git", args, output)),
            Some(Ok(stdout)) => {
                Self::materialize(args);
                Ok(stdout)
            }
            None => {
                Self::materialize(args);
                Ok(String::new())
            }
        }
    }
}

/// Deterministic branch suffixes.
#[derive(Debug)]
pub struct FixedRandom {
    fixed: Option<[u8; 4]>,
    counter: AtomicU32,
}

impl FixedRandom {
    /// Always the same bytes.
    pub const fn new(bytes: [u8; 4]) -> Self {
        Self {
            fixed: Some(bytes),
            counter: AtomicU32::new(0),
        }
    }

    /// `00000001`, `00000002`, ...
    pub const fn counting() -> Self {
        Self {
            fixed: None,
            counter: AtomicU32::new(0),
        }
    }
}

impl RandomSource for FixedRandom {
    fn suffix_bytes(&self) -> [u8; 4] {
        self.fixed
            .unwrap_or_else(|| (self.counter.fetch_add(1, Ordering::SeqCst) + 1).to_be_bytes())
    }
}

/// Everything a [`RecordingTerminal`] was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalEvent {
    Connect,
    OpenWindow(PaneHandle),
    Split {
        parent: PaneHandle,
        direction: SplitDirection,
        child: PaneHandle,
    },
    SendText {
        pane: PaneHandle,
        text: String,
    },
    FinishWindow {
        maximize: bool,
    },
    Focus {
        path: PathBuf,
        title: String,
    },
}

#[derive(Debug, Default)]
struct TerminalState {
    events: Vec<TerminalEvent>,
    next_pane: usize,
    fail_connect: bool,
    focus_results: VecDeque<bool>,
}

/// Terminal backend that records calls. Clones share one log.
#[derive(Debug, Clone, Default)]
pub struct RecordingTerminal {
    state: Arc<Mutex<TerminalState>>,
}

impl RecordingTerminal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make [`TerminalBackend::connect`] fail.
    pub fn fail_connect(&self) {
        lock(&self.state).fail_connect = true;
    }

    /// Queue the answer of the next [`TerminalBackend::focus`] call.
    pub fn push_focus_result(&self, found: bool) {
        lock(&self.state).focus_results.push_back(found);
    }

    pub fn events(&self) -> Vec<TerminalEvent> {
        lock(&self.state).events.clone()
    }

    pub fn windows_opened(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, TerminalEvent::OpenWindow(_)))
            .count()
    }

    /// `(parent, direction, child)` for every split, pane ids as strings.
    pub fn splits(&self) -> Vec<(String, SplitDirection, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                TerminalEvent::Split {
                    parent,
                    direction,
                    child,
                } => Some((parent.0, direction, child.0)),
                _ => None,
            })
            .collect()
    }

    /// Text sent to panes, in order.
    pub fn sent_text(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                TerminalEvent::SendText { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    fn new_pane(state: &mut TerminalState) -> PaneHandle {
        let pane = PaneHandle::new(format!("p{}", state.next_pane));
        state.next_pane += 1;
        pane
    }
}

impl TerminalBackend for RecordingTerminal {
    fn connect(&mut self) -> Result<()> {
        let mut state = lock(&self.state);
        state.events.push(TerminalEvent::Connect);
        if state.fail_connect {
            return Err(Error::external("osascript", &["-e", "<script>"], "not authorized"));
        }
        Ok(())
    }

    fn open_window(&mut self) -> Result<PaneHandle> {
        let mut state = lock(&self.state);
        let pane = Self::new_pane(&mut state);
        state.events.push(TerminalEvent::OpenWindow(pane.clone()));
        Ok(pane)
    }

    fn split(&mut self, parent: &PaneHandle, direction: SplitDirection) -> Result<PaneHandle> {
        let mut state = lock(&self.state);
        let child = Self::new_pane(&mut state);
        state.events.push(TerminalEvent::Split {
            parent: parent.clone(),
            direction,
            child: child.clone(),
        });
        Ok(child)
    }

    fn send_text(&mut self, pane: &PaneHandle, text: &str) -> Result<()> {
        lock(&self.state).events.push(TerminalEvent::SendText {
            pane: pane.clone(),
            text: text.to_string(),
        });
        Ok(())
    }

    fn finish_window(&mut self, maximize: bool) -> Result<()> {
        lock(&self.state)
            .events
            .push(TerminalEvent::FinishWindow { maximize });
        Ok(())
    }

    fn focus(&mut self, target: &FocusTarget<'_>) -> Result<bool> {
        let mut state = lock(&self.state);
        state.events.push(TerminalEvent::Focus {
            path: target.path.to_path_buf(),
            title: target.title.to_string(),
        });
        Ok(state.focus_results.pop_front().unwrap_or(false))
    }
}

/// Script runner that records scripts and replays queued outputs.
#[derive(Debug, Default)]
pub struct RecordingScripts {
    scripts: Mutex<Vec<String>>,
    outputs: Mutex<VecDeque<String>>,
}

impl RecordingScripts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_output(&self, output: &str) {
        lock(&self.outputs).push_back(output.to_string());
    }

    pub fn scripts(&self) -> Vec<String> {
        lock(&self.scripts).clone()
    }
}

impl ScriptRunner for RecordingScripts {
    fn run(&self, script: &str) -> Result<String> {
        lock(&self.scripts).push(script.to_string());
        Ok(lock(&self.outputs).pop_front().unwrap_or_default())
    }
}

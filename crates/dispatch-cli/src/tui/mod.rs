//! Two-thread TUI orchestration.
//!
//! Terminal input is read on a dedicated OS thread; effects run on tokio's
//! blocking pool. Both report back over `tokio::sync::mpsc` channels to one
//! `select!` loop that owns the [`App`].

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::app::{App, Effect, EffectOutcome};
use crate::services::Services;
use crate::ui;

/// Terminal events forwarded from the reader thread.
pub enum TermEvent {
    Key(KeyEvent),
    Resize(u16, u16),
}

/// Run one effect on the blocking pool and post its outcome to `tx`.
pub fn spawn_effect(
    services: &Services,
    tx: &mpsc::Sender<EffectOutcome>,
    effect: Effect,
) -> JoinHandle<()> {
    let services = services.clone();
    let tx = tx.clone();
    tokio::task::spawn_blocking(move || {
        let outcome = services.run(effect);
        if tx.blocking_send(outcome).is_err() {
            debug!("UI loop has exited, dropping effect outcome");
        }
    })
}

fn spawn_all(services: &Services, tx: &mpsc::Sender<EffectOutcome>, effects: Vec<Effect>) {
    for effect in effects {
        // Never awaited; the outcome comes back over the channel.
        drop(spawn_effect(services, tx, effect));
    }
}

/// Run the interactive review interface until the user quits.
pub async fn run(mut app: App, services: Services) -> anyhow::Result<()> {
    // 1. Enter raw mode, create terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // 2. Channels + cancellation token
    let cancel = CancellationToken::new();
    let (term_tx, mut term_rx) = mpsc::channel::<TermEvent>(64);
    let (outcome_tx, mut outcome_rx) = mpsc::channel::<EffectOutcome>(64);

    // 3. Dedicated OS thread for crossterm::event::read()
    let cancel_clone = cancel.clone();
    let ui_thread = std::thread::spawn(move || {
        loop {
            if cancel_clone.is_cancelled() {
                break;
            }
            // Poll with 50ms timeout so we can check cancellation
            if event::poll(Duration::from_millis(50)).unwrap_or(false) {
                match event::read() {
                    Ok(Event::Key(key)) => {
                        // Filter out Release events (Windows emits Press + Release per keystroke)
                        if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                            continue;
                        }
                        if term_tx.blocking_send(TermEvent::Key(key)).is_err() {
                            break;
                        }
                    }
                    Ok(Event::Resize(w, h)) => {
                        if term_tx.blocking_send(TermEvent::Resize(w, h)).is_err() {
                            break;
                        }
                    }
                    _ => {}
                }
            }
        }
    });

    info!(data_dir = %services.paths().root.display(), "Review interface started");
    spawn_all(&services, &outcome_tx, app.start());
    let mut tick = tokio::time::interval(Duration::from_millis(50));

    let result: anyhow::Result<()> = loop {
        tokio::select! {
            _ = tick.tick() => {
                let effects = app.tick(Instant::now());
                spawn_all(&services, &outcome_tx, effects);
                if let Err(e) = terminal.draw(|f| ui::draw(f, &app)) {
                    break Err(e.into());
                }
            }
            Some(term_event) = term_rx.recv() => {
                match term_event {
                    TermEvent::Key(key) => {
                        let effects = app.handle_key(key);
                        spawn_all(&services, &outcome_tx, effects);
                    }
                    // Next tick redraws at the new size.
                    TermEvent::Resize(..) => {}
                }
            }
            Some(outcome) = outcome_rx.recv() => {
                let effects = app.apply(outcome);
                spawn_all(&services, &outcome_tx, effects);
            }
        }
        if app.should_quit {
            break Ok(());
        }
    };

    // 4. Shutdown: signal the reader thread to stop
    cancel.cancel();
    let _ = ui_thread.join(); // fast, <50ms due to poll timeout

    // 5. Restore terminal
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();

    info!("Review interface stopped");
    result
}

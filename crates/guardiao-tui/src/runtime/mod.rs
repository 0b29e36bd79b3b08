//! TUI runtime - owns the terminal, runs the event loop, executes effects.
//!
//! This is the "Elm runtime" boundary: all side effects happen here. The
//! reducer stays pure and produces effects; this module executes them.
//!
//! Events come from three places each frame:
//! - the session subscription (store notifications, in publish order)
//! - the inbox (results of store calls spawned by `spawn_effect`)
//! - the terminal
//!
//! Structure:
//! - `mod.rs`: Core runtime (TuiRuntime, event loop, effect dispatch)
//! - `inbox.rs`: Inbox channel types
//! - `handlers.rs`: Effect handler implementations

mod handlers;
mod inbox;

use std::future::Future;
use std::io::Stdout;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use guardiao_core::config::{Config, paths};
use guardiao_core::session::{SessionStore, Subscription};
use inbox::{UiEventReceiver, UiEventSender};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;
use crate::{render, terminal, update};

/// Interval between Tick events (spinner animation, render cadence).
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Full-screen TUI runtime.
///
/// Owns the terminal, the state, the store handle and the gate's
/// subscription. Dropping the runtime restores the terminal, cancels pending
/// store calls and unsubscribes from the store.
pub struct TuiRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pub state: AppState,
    store: Arc<dyn SessionStore>,
    subscription: Subscription,
    /// Upper bound for each store call.
    auth_timeout: Duration,
    /// Where persona changes are written.
    config_path: PathBuf,
    /// Inbox sender - handlers send events here.
    inbox_tx: UiEventSender,
    /// Inbox receiver - runtime drains this each frame.
    inbox_rx: UiEventReceiver,
    /// Cancelled on teardown so late results are dropped, not delivered.
    shutdown: CancellationToken,
    last_tick: Instant,
}

impl TuiRuntime {
    /// Creates the runtime and subscribes to the store.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be set up.
    pub fn new(config: &Config, store: Arc<dyn SessionStore>) -> Result<Self> {
        // Set up panic hook BEFORE entering alternate screen
        terminal::install_panic_hook();

        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        let subscription = store.subscribe();
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();

        Ok(Self {
            terminal,
            state: AppState::new(config.default_persona),
            store,
            subscription,
            auth_timeout: config.auth_timeout(),
            config_path: paths::config_path(),
            inbox_tx,
            inbox_rx,
            shutdown: CancellationToken::new(),
            last_tick: Instant::now(),
        })
    }

    /// Runs the main event loop until the user quits.
    ///
    /// # Errors
    /// Returns an error if the terminal fails to poll, read or draw.
    pub fn run(&mut self) -> Result<()> {
        info!("gate: started");
        let mut dirty = true;

        while !self.state.should_quit {
            let events = self.collect_events()?;

            for event in events {
                dirty = true;
                let effects = update::update(&mut self.state, event);
                self.execute_effects(effects);
            }

            if dirty {
                self.terminal.draw(|frame| {
                    render::render(&self.state, frame);
                })?;
                dirty = false;
            }
        }

        info!("gate: quit");
        Ok(())
    }

    // ========================================================================
    // Event Collection
    // ========================================================================

    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        // Session notifications first so a result and the transition it
        // caused are applied in the same frame.
        while let Some(change) = self.subscription.try_recv() {
            events.push(UiEvent::SessionChanged(change));
        }

        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }

        // Block for terminal input only when there is nothing else to do,
        // and never past the next tick.
        let poll_duration = if events.is_empty() {
            TICK_INTERVAL.saturating_sub(self.last_tick.elapsed())
        } else {
            Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= TICK_INTERVAL {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }

    // ========================================================================
    // Effect Dispatch
    // ========================================================================

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// Spawns an async handler and sends its event to the inbox, unless the
    /// runtime shuts down first.
    fn spawn_effect<F, Fut>(&self, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = shutdown.cancelled() => {}
                event = f() => {
                    let _ = tx.send(event);
                }
            }
        });
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.should_quit = true;
            }
            UiEffect::Session(gate_effect) => {
                debug!(effect = ?gate_effect, "gate: store call");
                let store = Arc::clone(&self.store);
                let timeout = self.auth_timeout;
                self.spawn_effect(move || handlers::session_call(store, gate_effect, timeout));
            }
            UiEffect::PersistPersona { persona } => {
                handlers::persist_persona(&self.config_path, persona);
            }
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        self.shutdown.cancel();
        let _ = terminal::restore_terminal();
    }
}

//! Full-screen TUI for the Guardião Digital session gate.

pub mod effects;
pub mod events;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, Write, stderr, stdout};
use std::sync::Arc;

use anyhow::Result;
use guardiao_core::config::Config;
use guardiao_core::session::SessionStore;
pub use runtime::TuiRuntime;

/// Runs the gate until the user quits.
///
/// The store should already be restoring its initial state; the gate shows
/// the loading screen until the first session notification arrives.
pub async fn run_gate(config: &Config, store: Arc<dyn SessionStore>) -> Result<()> {
    if !stdout().is_terminal() {
        anyhow::bail!(
            "The interactive gate requires a terminal.\n\
             Use `guardiao login --email <EMAIL>` for non-interactive sign-in."
        );
    }

    let mut runtime = TuiRuntime::new(config, store)?;
    runtime.run()?;
    drop(runtime);

    writeln!(stderr(), "Até logo!")?;
    Ok(())
}

//! Interactive gate command handler.

use std::sync::Arc;

use anyhow::Result;
use guardiao_core::config::{Config, paths};
use guardiao_core::session::{IdentityToolkitStore, MemorySessionStore, SessionStore};

pub async fn run(config: &Config, offline: bool) -> Result<()> {
    let store: Arc<dyn SessionStore> = if offline {
        tracing::info!("offline mode: accounts are kept in memory");
        let store = MemorySessionStore::new();
        store.restore();
        Arc::new(store)
    } else {
        let store = IdentityToolkitStore::from_config(config, paths::session_path())?;
        store.restore();
        Arc::new(store)
    };

    guardiao_tui::run_gate(config, store).await
}

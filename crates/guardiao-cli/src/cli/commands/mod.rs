//! CLI command handlers.

pub mod config;
pub mod gate;
pub mod session;

//! Core library for Guardião Digital.
//!
//! Owns the session gate state machine, the session store contract and its
//! implementations, configuration, logging setup and the static screen content.

pub mod config;
pub mod content;
pub mod gate;
pub mod logging;
pub mod session;

//! Inbox channel types.

use tokio::sync::mpsc;

use crate::events::UiEvent;

/// Handlers send their results here.
pub type UiEventSender = mpsc::UnboundedSender<UiEvent>;

/// Drained by the runtime once per frame.
pub type UiEventReceiver = mpsc::UnboundedReceiver<UiEvent>;

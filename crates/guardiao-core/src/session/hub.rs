//! Session change broadcaster shared by the store implementations.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::mpsc;
use tracing::debug;

use super::SessionChange;

#[derive(Default)]
struct HubInner {
    /// `None` until the store has published its initial state.
    current: Option<SessionChange>,
    subscribers: Vec<(u64, mpsc::UnboundedSender<SessionChange>)>,
    next_id: u64,
}

/// Holds the latest session and fans every change out to subscribers.
#[derive(Clone, Default)]
pub struct SessionHub {
    inner: Arc<Mutex<HubInner>>,
}

impl SessionHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HubInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a subscriber, replaying the current state if it is known.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id = inner.next_id.wrapping_add(1);
        if let Some(current) = &inner.current {
            let _ = tx.send(current.clone());
        }
        inner.subscribers.push((id, tx));
        debug!(id, "session hub: subscribed");

        Subscription {
            id,
            rx,
            hub: Arc::downgrade(&self.inner),
        }
    }

    /// Records a transition and delivers it to every live subscriber.
    pub fn publish(&self, change: SessionChange) {
        let mut inner = self.lock();
        inner.current = Some(change.clone());
        inner
            .subscribers
            .retain(|(_, tx)| tx.send(change.clone()).is_ok());
    }

    /// Latest published state, if any.
    pub fn current(&self) -> Option<SessionChange> {
        self.lock().current.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }
}

/// Receiving end of a session subscription.
///
/// Dropping it removes the subscriber from the hub, so no notification is
/// ever delivered to a host that has shut down.
pub struct Subscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<SessionChange>,
    hub: Weak<Mutex<HubInner>>,
}

impl Subscription {
    /// Waits for the next change. Returns `None` once the store is gone.
    pub async fn recv(&mut self) -> Option<SessionChange> {
        self.rx.recv().await
    }

    /// Returns the next queued change without waiting.
    pub fn try_recv(&mut self) -> Option<SessionChange> {
        self.rx.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.hub.upgrade() {
            let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
            inner.subscribers.retain(|(id, _)| *id != self.id);
            debug!(id = self.id, "session hub: unsubscribed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;

    fn session(email: &str) -> Session {
        Session {
            user_id: format!("uid-{email}"),
            email: email.to_string(),
        }
    }

    #[test]
    fn test_nothing_delivered_before_initial_publish() {
        let hub = SessionHub::new();
        let mut sub = hub.subscribe();
        assert_eq!(sub.try_recv(), None);
        assert_eq!(hub.current(), None);
    }

    #[test]
    fn test_transitions_arrive_once_and_in_order() {
        let hub = SessionHub::new();
        let mut sub = hub.subscribe();

        hub.publish(None);
        hub.publish(Some(session("a@b.com")));
        hub.publish(None);

        assert_eq!(sub.try_recv(), Some(None));
        assert_eq!(sub.try_recv(), Some(Some(session("a@b.com"))));
        assert_eq!(sub.try_recv(), Some(None));
        assert_eq!(sub.try_recv(), None);
    }

    #[test]
    fn test_late_subscriber_gets_current_state_first() {
        let hub = SessionHub::new();
        hub.publish(Some(session("a@b.com")));

        let mut sub = hub.subscribe();
        assert_eq!(sub.try_recv(), Some(Some(session("a@b.com"))));
        assert_eq!(sub.try_recv(), None);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let hub = SessionHub::new();
        let first = hub.subscribe();
        let _second = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 2);

        drop(first);
        assert_eq!(hub.subscriber_count(), 1);

        hub.publish(None);
        assert_eq!(hub.subscriber_count(), 1);
    }

    #[test]
    fn test_subscription_outliving_hub_is_harmless() {
        let hub = SessionHub::new();
        let mut sub = hub.subscribe();
        hub.publish(None);
        drop(hub);

        assert_eq!(sub.try_recv(), Some(None));
        drop(sub);
    }

    #[tokio::test]
    async fn test_recv_ends_when_store_is_gone() {
        let hub = SessionHub::new();
        let mut sub = hub.subscribe();
        hub.publish(None);
        drop(hub);

        assert_eq!(sub.recv().await, Some(None));
        assert_eq!(sub.recv().await, None);
    }
}

//! Gate notifications for external subscribers.

use crate::types::{Invocation, Session};
use tokio::sync::broadcast;
use tracing::trace;

/// Default broadcast buffer size
const DEFAULT_CAPACITY: usize = 256;

/// Notification emitted by the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateEvent {
    /// A command is about to be checked. Emitted for every invocation.
    Before { invocation: Invocation },
    /// A dialogue recorded a decision.
    Update { session: Session, accepted: bool },
}

impl GateEvent {
    /// Stable event name.
    pub fn name(&self) -> &'static str {
        match self {
            GateEvent::Before { .. } => "eula/before",
            GateEvent::Update { .. } => "eula/update",
        }
    }
}

/// Broadcast channel for [`GateEvent`]s.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<GateEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish to current subscribers. Having none is not an error.
    pub fn emit(&self, event: GateEvent) {
        let name = event.name();
        match self.tx.send(event) {
            Ok(receivers) => trace!(event = name, receivers, "Event emitted"),
            Err(_) => trace!(event = name, "Event dropped, no subscribers"),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GateEvent> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CommandRef, UserId};
    use std::time::Duration;

    #[tokio::test]
    async fn test_subscriber_receives_event() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let session = Session::new(UserId(1), "c", "test", "bot");

        bus.emit(GateEvent::Update {
            session: session.clone(),
            accepted: true,
        });

        let event = tokio::time::timeout(Duration::from_millis(100), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.name(), "eula/update");
        assert_eq!(
            event,
            GateEvent::Update {
                session,
                accepted: true
            }
        );
    }

    #[test]
    fn test_emit_without_subscribers() {
        let bus = EventBus::default();
        let invocation = Invocation::new(
            Session::new(UserId(1), "c", "test", "bot"),
            CommandRef::new("echo", 1),
        );
        bus.emit(GateEvent::Before { invocation });
    }
}

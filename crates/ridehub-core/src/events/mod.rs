//! Domain availability events.
//!
//! Every seat lock / booking transition publishes an [`AvailabilityEvent`]
//! onto the [`EventBus`]. The availability broadcaster consumes the bus to
//! push fresh seat maps to watching clients; downstream collaborators
//! (ticket issuance, notifications) subscribe to react to confirmations
//! without being in the reservation path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// What happened to the affected seats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityAction {
    /// Seats were locked by a new hold.
    Held,
    /// An existing hold was extended.
    Extended,
    /// A hold was released by its holder.
    Released,
    /// A hold lapsed and was reconciled by the sweeper.
    Expired,
    /// Seats were permanently booked by a confirmation.
    Booked,
    /// A confirmed booking was cancelled and its seats freed.
    Cancelled,
}

/// A change to a trip's seat availability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityEvent {
    /// The trip whose availability changed.
    pub trip_id: Uuid,
    /// The booking behind the change, if any.
    pub booking_id: Option<Uuid>,
    /// The affected seat labels.
    pub seats: Vec<String>,
    /// What happened.
    pub action: AvailabilityAction,
    /// When the transition committed.
    pub occurred_at: DateTime<Utc>,
}

impl AvailabilityEvent {
    /// Build an event stamped with the current time.
    pub fn now(
        trip_id: Uuid,
        booking_id: Option<Uuid>,
        seats: Vec<String>,
        action: AvailabilityAction,
    ) -> Self {
        Self {
            trip_id,
            booking_id,
            seats,
            action,
            occurred_at: Utc::now(),
        }
    }
}

/// Broadcast bus for availability events.
///
/// Publishing never blocks the publishing transition; with no subscribers
/// the event is simply dropped.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AvailabilityEvent>,
}

impl EventBus {
    /// Create a bus with the given buffered capacity per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: AvailabilityEvent) {
        // Err means no live subscribers, which is fine.
        let _ = self.tx.send(event);
    }

    /// Subscribe to the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<AvailabilityEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_reaches_subscriber() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        let trip_id = Uuid::new_v4();
        bus.publish(AvailabilityEvent::now(
            trip_id,
            None,
            vec!["A1".to_string()],
            AvailabilityAction::Held,
        ));

        let event = rx.recv().await.expect("event delivered");
        assert_eq!(event.trip_id, trip_id);
        assert_eq!(event.action, AvailabilityAction::Held);
        assert_eq!(event.seats, vec!["A1".to_string()]);
    }

    #[test]
    fn publish_without_subscribers_does_not_panic() {
        let bus = EventBus::new(8);
        bus.publish(AvailabilityEvent::now(
            Uuid::new_v4(),
            None,
            vec![],
            AvailabilityAction::Released,
        ));
    }
}

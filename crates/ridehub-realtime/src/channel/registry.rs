//! Channel registry — trip subscriptions and their reverse index.

use std::collections::HashSet;

use dashmap::DashMap;
use uuid::Uuid;

use crate::connection::handle::ConnectionId;

/// Registry of which connections watch which trips.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    /// Trip id → subscriber connection ids.
    channels: DashMap<Uuid, HashSet<ConnectionId>>,
    /// Connection id → subscribed trip ids (reverse index).
    subscriptions: DashMap<ConnectionId, HashSet<Uuid>>,
}

impl ChannelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a connection to a trip.
    pub fn subscribe(&self, trip_id: Uuid, conn_id: ConnectionId) {
        self.channels.entry(trip_id).or_default().insert(conn_id);
        self.subscriptions
            .entry(conn_id)
            .or_default()
            .insert(trip_id);
    }

    /// Unsubscribe a connection from a trip.
    pub fn unsubscribe(&self, trip_id: Uuid, conn_id: ConnectionId) {
        if let Some(mut subscribers) = self.channels.get_mut(&trip_id) {
            subscribers.remove(&conn_id);
            if subscribers.is_empty() {
                drop(subscribers);
                self.channels.remove(&trip_id);
            }
        }
        if let Some(mut trips) = self.subscriptions.get_mut(&conn_id) {
            trips.remove(&trip_id);
        }
    }

    /// Remove a connection from every trip it watches.
    pub fn unsubscribe_all(&self, conn_id: ConnectionId) {
        let trips: Vec<Uuid> = self
            .subscriptions
            .remove(&conn_id)
            .map(|(_, trips)| trips.into_iter().collect())
            .unwrap_or_default();

        for trip_id in trips {
            if let Some(mut subscribers) = self.channels.get_mut(&trip_id) {
                subscribers.remove(&conn_id);
                if subscribers.is_empty() {
                    drop(subscribers);
                    self.channels.remove(&trip_id);
                }
            }
        }
    }

    /// All subscriber connection ids for a trip.
    pub fn subscribers(&self, trip_id: Uuid) -> Vec<ConnectionId> {
        self.channels
            .get(&trip_id)
            .map(|subscribers| subscribers.iter().copied().collect())
            .unwrap_or_default()
    }

    /// How many trips a connection watches.
    pub fn subscription_count(&self, conn_id: ConnectionId) -> usize {
        self.subscriptions
            .get(&conn_id)
            .map(|trips| trips.len())
            .unwrap_or(0)
    }

    /// Number of trips with at least one watcher.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_unsubscribe_round_trip() {
        let registry = ChannelRegistry::new();
        let trip = Uuid::new_v4();
        let conn = ConnectionId::new();

        registry.subscribe(trip, conn);
        assert_eq!(registry.subscribers(trip), vec![conn]);
        assert_eq!(registry.subscription_count(conn), 1);

        registry.unsubscribe(trip, conn);
        assert!(registry.subscribers(trip).is_empty());
        assert_eq!(registry.channel_count(), 0);
    }

    #[test]
    fn unsubscribe_all_clears_every_trip() {
        let registry = ChannelRegistry::new();
        let trip_a = Uuid::new_v4();
        let trip_b = Uuid::new_v4();
        let conn = ConnectionId::new();
        let other = ConnectionId::new();

        registry.subscribe(trip_a, conn);
        registry.subscribe(trip_b, conn);
        registry.subscribe(trip_a, other);

        registry.unsubscribe_all(conn);

        assert_eq!(registry.subscribers(trip_a), vec![other]);
        assert!(registry.subscribers(trip_b).is_empty());
        assert_eq!(registry.subscription_count(conn), 0);
    }
}

//! The availability broadcaster.
//!
//! Consumes availability events from the [`EventBus`] and pushes a freshly
//! computed seat map to every connection watching the affected trip.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use ridehub_core::config::realtime::RealtimeConfig;
use ridehub_core::events::EventBus;
use ridehub_core::result::AppResult;
use ridehub_service::TripService;

use crate::channel::registry::ChannelRegistry;
use crate::connection::handle::{ConnectionHandle, ConnectionId};
use crate::connection::pool::ConnectionPool;
use crate::message::types::{InboundMessage, OutboundMessage};

/// Per-trip publish state: a serializing mutex around the version counter.
///
/// Holding the mutex across recompute-and-send means frames for one trip
/// leave in version order, so the latest state always wins at the client.
#[derive(Debug, Default)]
struct TripPublishState {
    version: Mutex<u64>,
}

/// Pushes seat-map updates to all connections watching a trip.
#[derive(Debug)]
pub struct AvailabilityBroadcaster {
    /// Live connections.
    pool: ConnectionPool,
    /// Trip subscriptions.
    channels: ChannelRegistry,
    /// Seat-map computation and cache invalidation.
    trip_service: Arc<TripService>,
    /// Realtime tunables.
    config: RealtimeConfig,
    /// Per-trip publish state.
    trips: DashMap<Uuid, Arc<TripPublishState>>,
}

impl AvailabilityBroadcaster {
    /// Create a new broadcaster.
    pub fn new(trip_service: Arc<TripService>, config: RealtimeConfig) -> Self {
        Self {
            pool: ConnectionPool::new(),
            channels: ChannelRegistry::new(),
            trip_service,
            config,
            trips: DashMap::new(),
        }
    }

    /// Consume the event bus until it closes.
    ///
    /// Spawned once at startup; the reservation path only ever touches the
    /// bus, so a slow fan-out can never block a booking transition.
    pub fn attach(self: Arc<Self>, bus: &EventBus) -> tokio::task::JoinHandle<()> {
        let mut rx = bus.subscribe();
        let broadcaster = self;

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        debug!(
                            trip_id = %event.trip_id,
                            action = ?event.action,
                            seats = ?event.seats,
                            "Availability event received"
                        );
                        broadcaster.publish(event.trip_id).await;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        // Fine: the next publish recomputes the full map
                        // anyway, so skipped events cost nothing.
                        warn!(skipped = skipped, "Availability bus lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            info!("Availability broadcaster detached");
        })
    }

    /// Register a new connection.
    ///
    /// Returns the handle and the receiver feeding the WebSocket sink.
    pub fn register(&self) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);
        let handle = Arc::new(ConnectionHandle::new(tx));
        self.pool.add(Arc::clone(&handle));

        info!(conn_id = %handle.id, "WebSocket connection registered");
        (handle, rx)
    }

    /// Unregister a connection and clean up its subscriptions.
    pub fn unregister(&self, conn_id: &ConnectionId) {
        if let Some(handle) = self.pool.remove(conn_id) {
            handle.mark_closed();
            self.channels.unsubscribe_all(*conn_id);
            info!(conn_id = %conn_id, "WebSocket connection unregistered");
        }
    }

    /// Process one inbound client frame.
    pub async fn handle_inbound(&self, conn_id: &ConnectionId, raw_message: &str) {
        let Some(handle) = self.pool.get(conn_id) else {
            warn!(conn_id = %conn_id, "Message from unknown connection");
            return;
        };

        let msg: InboundMessage = match serde_json::from_str(raw_message) {
            Ok(m) => m,
            Err(e) => {
                self.send_to(
                    &handle,
                    &OutboundMessage::Error {
                        code: "INVALID_MESSAGE".to_string(),
                        message: format!("Failed to parse message: {e}"),
                    },
                );
                return;
            }
        };

        match msg {
            InboundMessage::Subscribe { trip_id } => {
                self.handle_subscribe(&handle, trip_id).await;
            }
            InboundMessage::Unsubscribe { trip_id } => {
                self.channels.unsubscribe(trip_id, handle.id);
                debug!(conn_id = %conn_id, trip_id = %trip_id, "Unsubscribed from trip");
            }
            InboundMessage::Pong { .. } => {}
        }
    }

    /// Subscribe a connection and immediately send the current seat map.
    async fn handle_subscribe(&self, handle: &Arc<ConnectionHandle>, trip_id: Uuid) {
        let current = self.channels.subscription_count(handle.id);
        if current >= self.config.max_subscriptions_per_connection {
            self.send_to(
                handle,
                &OutboundMessage::Error {
                    code: "MAX_SUBSCRIPTIONS".to_string(),
                    message: format!(
                        "Maximum subscriptions ({}) reached",
                        self.config.max_subscriptions_per_connection
                    ),
                },
            );
            return;
        }

        match self.current_seat_map(trip_id).await {
            Ok(map) => {
                self.channels.subscribe(trip_id, handle.id);
                self.send_to(handle, &OutboundMessage::Subscribed { trip_id });
                self.send_to(handle, &OutboundMessage::SeatMap { map });
                debug!(conn_id = %handle.id, trip_id = %trip_id, "Subscribed to trip");
            }
            Err(e) => {
                self.send_to(
                    handle,
                    &OutboundMessage::Error {
                        code: e.kind.to_string(),
                        message: e.message,
                    },
                );
            }
        }
    }

    /// Recompute the seat map for a trip and push it to every watcher.
    pub async fn publish(&self, trip_id: Uuid) {
        // Invalidate the read cache first so REST queries also see the
        // change immediately.
        if let Err(e) = self.trip_service.invalidate_seat_map(trip_id).await {
            warn!(trip_id = %trip_id, error = %e, "Seat map cache invalidation failed");
        }

        let state = self.publish_state(trip_id);
        let mut version = state.version.lock().await;
        *version += 1;

        let map = match self.trip_service.compute_seat_map(trip_id).await {
            Ok(mut map) => {
                map.version = *version;
                map.generated_at = Utc::now();
                map
            }
            Err(e) => {
                warn!(trip_id = %trip_id, error = %e, "Seat map recompute failed");
                return;
            }
        };

        let subscribers = self.channels.subscribers(trip_id);
        if subscribers.is_empty() {
            return;
        }

        let message = OutboundMessage::SeatMap { map };
        let payload = match serde_json::to_string(&message) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "Failed to serialize seat map");
                return;
            }
        };

        let mut sent = 0usize;
        for conn_id in &subscribers {
            if let Some(handle) = self.pool.get(conn_id) {
                if handle.send(payload.clone()) {
                    sent += 1;
                } else {
                    debug!(conn_id = %conn_id, "Dropped seat map frame (slow consumer)");
                }
            }
        }

        debug!(
            trip_id = %trip_id,
            version = *version,
            subscribers = subscribers.len(),
            sent = sent,
            "Seat map published"
        );
    }

    /// The current seat map without bumping the version.
    async fn current_seat_map(
        &self,
        trip_id: Uuid,
    ) -> AppResult<ridehub_entity::SeatMap> {
        let state = self.publish_state(trip_id);
        let version = *state.version.lock().await;
        let mut map = self.trip_service.compute_seat_map(trip_id).await?;
        map.version = version;
        Ok(map)
    }

    fn publish_state(&self, trip_id: Uuid) -> Arc<TripPublishState> {
        self.trips
            .entry(trip_id)
            .or_insert_with(|| Arc::new(TripPublishState::default()))
            .clone()
    }

    fn send_to(&self, handle: &Arc<ConnectionHandle>, message: &OutboundMessage) {
        match serde_json::to_string(message) {
            Ok(payload) => {
                if !handle.send(payload) {
                    debug!(conn_id = %handle.id, "Dropped frame (slow consumer)");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize outbound message"),
        }
    }

    /// Total registered connections.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }
}

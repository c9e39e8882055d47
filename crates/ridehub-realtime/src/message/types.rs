//! Inbound and outbound WebSocket message type definitions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ridehub_entity::SeatMap;

/// Messages sent by the client to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Start watching a trip's availability.
    Subscribe {
        /// The trip to watch.
        trip_id: Uuid,
    },
    /// Stop watching a trip.
    Unsubscribe {
        /// The trip to stop watching.
        trip_id: Uuid,
    },
    /// Pong response to a server ping.
    Pong {
        /// Echoed timestamp.
        timestamp: i64,
    },
}

/// Messages sent by the server to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Subscription confirmed.
    Subscribed {
        /// The watched trip.
        trip_id: Uuid,
    },
    /// A full seat map for one watched trip.
    SeatMap {
        /// The seat map payload.
        #[serde(flatten)]
        map: SeatMap,
    },
    /// Ping (server keepalive).
    Ping {
        /// Server timestamp.
        timestamp: i64,
    },
    /// Error message.
    Error {
        /// Error code.
        code: String,
        /// Error description.
        message: String,
    },
}

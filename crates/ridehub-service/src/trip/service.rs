//! Trip availability queries.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use uuid::Uuid;

use ridehub_cache::keys;
use ridehub_core::config::cache::CacheConfig;
use ridehub_core::error::AppError;
use ridehub_core::result::AppResult;
use ridehub_core::traits::cache::CacheProvider;
use ridehub_database::TripStore;
use ridehub_entity::{SeatMap, Trip};
use ridehub_lock::SeatLockManager;

/// Read-side trip service: seat-status queries with a short-TTL cache.
#[derive(Debug, Clone)]
pub struct TripService {
    /// Trip inventory store.
    trips: Arc<dyn TripStore>,
    /// Seat lock manager (for held seats).
    locks: Arc<dyn SeatLockManager>,
    /// Read cache.
    cache: Arc<dyn CacheProvider>,
    /// Seat map cache TTL.
    seat_map_ttl: Duration,
}

impl TripService {
    /// Create a new trip service.
    pub fn new(
        trips: Arc<dyn TripStore>,
        locks: Arc<dyn SeatLockManager>,
        cache: Arc<dyn CacheProvider>,
        config: &CacheConfig,
    ) -> Self {
        Self {
            trips,
            locks,
            cache,
            seat_map_ttl: Duration::from_secs(config.seat_map_ttl_seconds.max(1)),
        }
    }

    /// Fetch a trip by id.
    pub async fn find(&self, trip_id: Uuid) -> AppResult<Trip> {
        self.trips
            .find_by_id(trip_id)
            .await?
            .ok_or_else(|| AppError::not_found("Trip not found"))
    }

    /// Current per-seat availability for a trip.
    ///
    /// Served from the read cache when fresh; recomputed from the
    /// inventory row plus the live locks otherwise. REST responses carry
    /// version 0 — versions order frames within one push-channel
    /// subscription, not across transports.
    pub async fn seat_status(&self, trip_id: Uuid) -> AppResult<SeatMap> {
        let key = keys::seat_map(trip_id);
        if let Some(cached) = self.cache.get(&key).await? {
            if let Ok(map) = serde_json::from_str::<SeatMap>(&cached) {
                debug!(trip_id = %trip_id, "Seat map served from cache");
                return Ok(map);
            }
        }

        let map = self.compute_seat_map(trip_id).await?;

        let serialized = serde_json::to_string(&map)?;
        self.cache.set(&key, &serialized, self.seat_map_ttl).await?;

        Ok(map)
    }

    /// Recompute the seat map, bypassing the cache.
    pub async fn compute_seat_map(&self, trip_id: Uuid) -> AppResult<SeatMap> {
        let trip = self.find(trip_id).await?;
        let held = self.locks.held_seats(trip_id).await?;
        Ok(SeatMap::compute(&trip, &held, 0))
    }

    /// Drop the cached seat map after an availability change.
    pub async fn invalidate_seat_map(&self, trip_id: Uuid) -> AppResult<()> {
        self.cache.delete(&keys::seat_map(trip_id)).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration as StdDuration;

    use chrono::Duration;

    use ridehub_core::types::Holder;
    use ridehub_entity::SeatState;
    use ridehub_lock::{MemorySeatLockManager, SeatLockManager as _};

    use crate::testing::{InMemoryTripStore, scheduled_trip};

    use super::*;

    /// Minimal in-memory cache for these tests.
    #[derive(Debug, Default)]
    struct MapCache {
        entries: std::sync::Mutex<std::collections::HashMap<String, String>>,
    }

    #[async_trait::async_trait]
    impl CacheProvider for MapCache {
        async fn get(&self, key: &str) -> AppResult<Option<String>> {
            Ok(self
                .entries
                .lock()
                .expect("lock poisoned")
                .get(key)
                .cloned())
        }

        async fn set(&self, key: &str, value: &str, _ttl: StdDuration) -> AppResult<()> {
            self.entries
                .lock()
                .expect("lock poisoned")
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn delete(&self, key: &str) -> AppResult<()> {
            self.entries.lock().expect("lock poisoned").remove(key);
            Ok(())
        }

        async fn exists(&self, key: &str) -> AppResult<bool> {
            Ok(self
                .entries
                .lock()
                .expect("lock poisoned")
                .contains_key(key))
        }

        async fn health_check(&self) -> AppResult<bool> {
            Ok(true)
        }
    }

    fn service_with(
        trip: ridehub_entity::Trip,
    ) -> (TripService, Arc<MemorySeatLockManager>, Uuid) {
        let trip_id = trip.id;
        let locks = Arc::new(MemorySeatLockManager::new());
        let service = TripService::new(
            Arc::new(InMemoryTripStore::with_trip(trip)),
            locks.clone(),
            Arc::new(MapCache::default()),
            &CacheConfig::default(),
        );
        (service, locks, trip_id)
    }

    #[tokio::test]
    async fn seat_status_reflects_locks_and_inventory() {
        let mut trip = scheduled_trip(&["A1", "A2", "A3"], Duration::hours(4));
        trip.booked_seats = vec!["A3".to_string()];
        trip.available_seats = 2;
        let (service, locks, trip_id) = service_with(trip);

        locks
            .acquire(
                trip_id,
                &["A1".to_string()],
                &Holder::guest("x@example.com").key(),
                StdDuration::from_secs(900),
            )
            .await
            .expect("acquire");

        let map = service.seat_status(trip_id).await.expect("seat map");
        assert_eq!(map.state_of("A1"), Some(SeatState::Held));
        assert_eq!(map.state_of("A2"), Some(SeatState::Available));
        assert_eq!(map.state_of("A3"), Some(SeatState::Booked));
        assert_eq!(map.available_seats, 1);
    }

    #[tokio::test]
    async fn seat_status_uses_cache_until_invalidated() {
        let trip = scheduled_trip(&["A1", "A2"], Duration::hours(4));
        let (service, locks, trip_id) = service_with(trip);

        let first = service.seat_status(trip_id).await.expect("seat map");
        assert_eq!(first.state_of("A1"), Some(SeatState::Available));

        // A new lock does not show through the still-fresh cache entry.
        locks
            .acquire(
                trip_id,
                &["A1".to_string()],
                "guest:y@example.com",
                StdDuration::from_secs(900),
            )
            .await
            .expect("acquire");
        let cached = service.seat_status(trip_id).await.expect("seat map");
        assert_eq!(cached.state_of("A1"), Some(SeatState::Available));

        // Invalidation (as the broadcaster does on publish) exposes it.
        service
            .invalidate_seat_map(trip_id)
            .await
            .expect("invalidate");
        let fresh = service.seat_status(trip_id).await.expect("seat map");
        assert_eq!(fresh.state_of("A1"), Some(SeatState::Held));
    }
}

/// Atomic publication of station snapshots.
///
/// A refresh builds a complete new `StationSet` and swaps it in under a
/// write lock held only for the pointer swap. Readers clone the `Arc`, so a
/// computation that started on one set keeps using it even if a newer set
/// is published meanwhile. Nothing is ever mutated in place.
///
/// # Clock injection
/// `is_stale_at` takes `now` as a parameter rather than calling
/// `Utc::now()`, which keeps staleness deterministic in tests.

use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};

use crate::logging::{self, Component};
use crate::model::StationSnapshot;
use crate::repository::{RepositoryError, StationRepository};

/// One immutable, consistent view of the station network.
#[derive(Debug)]
pub struct StationSet {
    pub stations: Vec<StationSnapshot>,
    pub generation: u64,
    pub published_at: Option<DateTime<Utc>>,
}

impl StationSet {
    fn empty() -> Self {
        Self {
            stations: Vec::new(),
            generation: 0,
            published_at: None,
        }
    }
}

pub struct SnapshotStore {
    current: RwLock<Arc<StationSet>>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    /// An empty store. Its set is generation 0 and has never been published.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(StationSet::empty())),
        }
    }

    /// The set in effect right now.
    pub fn current(&self) -> Arc<StationSet> {
        let guard = self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&*guard)
    }

    /// Replaces the current set and returns its generation.
    pub fn publish_at(&self, stations: Vec<StationSnapshot>, now: DateTime<Utc>) -> u64 {
        let mut guard = self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        let generation = guard.generation + 1;
        *guard = Arc::new(StationSet {
            stations,
            generation,
            published_at: Some(now),
        });
        generation
    }

    pub fn publish(&self, stations: Vec<StationSnapshot>) -> u64 {
        self.publish_at(stations, Utc::now())
    }

    /// Fetches from `repo` and publishes the result.
    ///
    /// On failure the previous set stays in effect and the error is returned
    /// after being logged.
    pub fn refresh(&self, repo: &mut dyn StationRepository) -> Result<u64, RepositoryError> {
        match repo.stations() {
            Ok(stations) => {
                let count = stations.len();
                let generation = self.publish(stations);
                logging::debug(
                    Component::Snapshot,
                    None,
                    &format!("Published generation {} with {} stations", generation, count),
                );
                Ok(generation)
            }
            Err(e) => {
                logging::log_repository_failure(None, "Snapshot refresh", &e);
                Err(e)
            }
        }
    }

    /// True when the current set is older than `max_age_minutes`, or has
    /// never been published.
    ///
    /// Staleness is strictly greater than the threshold:
    ///   age > max_age_minutes  →  stale
    ///   age == max_age_minutes →  not stale
    pub fn is_stale_at(&self, max_age_minutes: u64, now: DateTime<Utc>) -> bool {
        match self.current().published_at {
            None => true,
            Some(published) => {
                let age_minutes = (now - published).num_minutes().max(0) as u64;
                age_minutes > max_age_minutes
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

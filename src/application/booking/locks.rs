//! Per-room async locks
//!
//! Serializes check-then-insert on the same room within one process. Locks
//! are taken in ascending room-id order so two multi-room bookings cannot
//! deadlock each other.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Default)]
pub struct RoomLocks {
    locks: DashMap<i32, Arc<Mutex<()>>>,
}

/// Held locks; released on drop
pub struct RoomGuards {
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl RoomLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn get_or_create(&self, room_id: i32) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.get(&room_id) {
            return lock.value().clone();
        }
        self.locks
            .entry(room_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone()
    }

    /// Lock every listed room. Duplicates are locked once.
    pub async fn acquire(&self, room_ids: &[i32]) -> RoomGuards {
        let mut ids = room_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let mut guards = Vec::with_capacity(ids.len());
        for id in ids {
            guards.push(self.get_or_create(id).lock_owned().await);
        }
        RoomGuards { _guards: guards }
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

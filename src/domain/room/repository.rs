//! Room repository interface

use async_trait::async_trait;

use super::model::{NewRoom, Room, RoomSearch, RoomUpdate};
use crate::domain::DomainResult;

#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn create(&self, room: NewRoom) -> DomainResult<Room>;

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Room>>;

    /// Rooms for the given ids, in ascending id order. Missing ids are skipped.
    async fn find_by_ids(&self, ids: &[i32]) -> DomainResult<Vec<Room>>;

    async fn find_all(&self) -> DomainResult<Vec<Room>>;

    async fn search(&self, criteria: RoomSearch) -> DomainResult<Vec<Room>>;

    /// Apply the given changes. `None` when the room does not exist.
    async fn update(&self, id: i32, changes: RoomUpdate) -> DomainResult<Option<Room>>;

    /// Distinct, non-empty categories in alphabetical order
    async fn categories(&self) -> DomainResult<Vec<String>>;
}

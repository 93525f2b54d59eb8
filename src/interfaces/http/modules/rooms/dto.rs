//! Room DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::room::{NewRoom, RoomUpdate};
use crate::domain::{DomainError, Room, RoomStatus};

#[derive(Debug, Serialize, ToSchema)]
pub struct RoomDto {
    pub id: i32,
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    /// Nightly price in minor units
    pub price: i64,
    /// `available` or `unavailable`
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Room> for RoomDto {
    fn from(r: Room) -> Self {
        Self {
            id: r.id,
            name: r.name,
            category: r.category,
            description: r.description,
            price: r.price,
            status: r.status.to_string(),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRoomRequest {
    #[validate(length(min = 1, max = 50, message = "name is required"))]
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "price must not be negative"))]
    pub price: i64,
    /// Defaults to `available`
    pub status: Option<String>,
}

impl CreateRoomRequest {
    pub fn into_new_room(self) -> Result<NewRoom, DomainError> {
        let status = match self.status.as_deref() {
            Some(s) => RoomStatus::parse(s)?,
            None => RoomStatus::Available,
        };
        Ok(NewRoom {
            name: self.name,
            category: self.category,
            description: self.description,
            price: self.price,
            status,
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateRoomRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "price must not be negative"))]
    pub price: Option<i64>,
    pub status: Option<String>,
}

impl UpdateRoomRequest {
    pub fn into_update(self) -> Result<RoomUpdate, DomainError> {
        Ok(RoomUpdate {
            name: self.name,
            category: self.category,
            description: self.description,
            price: self.price,
            status: self.status.as_deref().map(RoomStatus::parse).transpose()?,
        })
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RoomSearchQuery {
    /// One of `name`, `category`, `status`
    pub filter: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookedDatesResponse {
    pub room_id: i32,
    /// Held nights, ascending
    pub dates: Vec<NaiveDate>,
}

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation: {0}")]
    Validation(String),

    #[error("room {room_name} (id {room_id}) is booked on {date}")]
    RoomUnavailable {
        room_id: i32,
        room_name: String,
        date: NaiveDate,
    },

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Persistence(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        DomainError::NotFound {
            entity,
            field: "id",
            value: id.to_string(),
        }
    }

    /// Whether the operation may succeed if retried (store hiccup).
    pub fn is_transient(&self) -> bool {
        matches!(self, DomainError::Persistence(_))
    }
}

/// Failures of the receipt side channel. Logged, never returned to API callers.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("mail delivery failed: {0}")]
    Mail(String),

    #[error("printer failed: {0}")]
    Print(String),

    #[error("receipt data unavailable: {0}")]
    MissingData(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

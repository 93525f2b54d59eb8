//! Room domain entity

use chrono::{DateTime, Utc};

use crate::shared::errors::DomainError;

/// Coarse availability flag shown to the front desk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomStatus {
    Available,
    Unavailable,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Unavailable => "unavailable",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "available" => Ok(Self::Available),
            "unavailable" => Ok(Self::Unavailable),
            other => Err(DomainError::Validation(format!(
                "unknown room status '{other}'"
            ))),
        }
    }

    /// A room is unavailable exactly while some stay on it is checked in.
    pub fn derived(has_checked_in_stay: bool) -> Self {
        if has_checked_in_stay {
            Self::Unavailable
        } else {
            Self::Available
        }
    }
}

impl std::fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Room {
    pub id: i32,
    /// Room number or label shown on receipts
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    /// Nightly price in minor currency units
    pub price: i64,
    pub status: RoomStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRoom {
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: i64,
    pub status: RoomStatus,
}

#[derive(Debug, Clone, Default)]
pub struct RoomUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub status: Option<RoomStatus>,
}

/// Room lookup by one whitelisted column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomSearch {
    All,
    Name(String),
    Category(String),
    Status(RoomStatus),
}

impl RoomSearch {
    /// Build from the `filter` / `value` query pair. Unknown filters are rejected.
    pub fn from_query(filter: Option<&str>, value: Option<&str>) -> Result<Self, DomainError> {
        let (Some(filter), Some(value)) = (filter, value) else {
            return Ok(Self::All);
        };
        if filter.is_empty() || value.is_empty() {
            return Ok(Self::All);
        }
        match filter {
            "name" => Ok(Self::Name(value.to_string())),
            "category" => Ok(Self::Category(value.to_string())),
            "status" => RoomStatus::parse(value).map(Self::Status),
            other => Err(DomainError::Validation(format!(
                "cannot filter rooms by '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_status_follows_checked_in_stays() {
        assert_eq!(RoomStatus::derived(true), RoomStatus::Unavailable);
        assert_eq!(RoomStatus::derived(false), RoomStatus::Available);
    }

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(RoomStatus::parse("Unavailable").unwrap(), RoomStatus::Unavailable);
        assert!(RoomStatus::parse("maybe").is_err());
    }

    #[test]
    fn search_rejects_arbitrary_columns() {
        let err = RoomSearch::from_query(Some("price; DROP TABLE rooms"), Some("1"));
        assert!(matches!(err, Err(DomainError::Validation(_))));
    }

    #[test]
    fn search_without_value_lists_everything() {
        assert_eq!(RoomSearch::from_query(Some("name"), None).unwrap(), RoomSearch::All);
        assert_eq!(
            RoomSearch::from_query(Some("category"), Some("suite")).unwrap(),
            RoomSearch::Category("suite".into())
        );
    }
}

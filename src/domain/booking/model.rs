//! Booking and room-booking (stay) domain entities

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::errors::DomainError;

/// How a booking was (or will be) settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    /// Card / POS terminal
    Card,
    Transfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Transfer => "transfer",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(Self::Cash),
            "card" | "credit card" | "pos" => Ok(Self::Card),
            "transfer" => Ok(Self::Transfer),
            other => Err(DomainError::Validation(format!(
                "unknown payment method '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Occupancy state of one stay.
///
/// `Reserved -> CheckedIn -> CheckedOut`. A reservation may also be
/// checked out directly to release a no-show. `CheckedOut` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StayStatus {
    Reserved,
    CheckedIn,
    CheckedOut,
}

impl StayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reserved => "reserved",
            Self::CheckedIn => "checked_in",
            Self::CheckedOut => "checked_out",
        }
    }

    pub fn is_checked_in(&self) -> bool {
        *self == Self::CheckedIn
    }

    pub fn is_checked_out(&self) -> bool {
        *self == Self::CheckedOut
    }

    /// Reserved and checked-in stays both hold their nights.
    pub fn holds_nights(&self) -> bool {
        !self.is_checked_out()
    }

    pub fn check_in(self) -> Result<Self, DomainError> {
        match self {
            Self::Reserved => Ok(Self::CheckedIn),
            Self::CheckedIn => Err(DomainError::Validation(
                "room booking is already checked in".into(),
            )),
            Self::CheckedOut => Err(DomainError::Validation(
                "room booking has already been checked out".into(),
            )),
        }
    }

    pub fn check_out(self) -> Result<Self, DomainError> {
        match self {
            Self::Reserved | Self::CheckedIn => Ok(Self::CheckedOut),
            Self::CheckedOut => Err(DomainError::Validation(
                "room booking has already been checked out".into(),
            )),
        }
    }
}

impl std::fmt::Display for StayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One room's stay segment within a booking
#[derive(Debug, Clone)]
pub struct RoomBooking {
    pub id: i32,
    pub booking_id: i32,
    pub room_id: i32,
    pub number_of_nights: u32,
    /// Check-in instant (noon of the arrival date, UTC)
    pub start_date: DateTime<Utc>,
    /// `start_date + number_of_nights` days
    pub end_date: DateTime<Utc>,
    /// Total for the stay in minor units
    pub amount: i64,
    pub status: StayStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A customer transaction spanning one or more rooms
#[derive(Debug, Clone)]
pub struct Booking {
    pub id: i32,
    pub customer_id: Option<i32>,
    /// Employee who took the booking
    pub receptionist: Option<i32>,
    /// Sum of all stay amounts
    pub amount: i64,
    pub is_paid: bool,
    pub payment_method: PaymentMethod,
    pub is_complementary: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub room_bookings: Vec<RoomBooking>,
}

/// Fully priced booking ready to be persisted
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub customer_id: i32,
    pub receptionist: Option<i32>,
    pub amount: i64,
    pub is_paid: bool,
    pub payment_method: PaymentMethod,
    pub is_complementary: bool,
    pub created_at: DateTime<Utc>,
    pub room_bookings: Vec<NewRoomBooking>,
}

#[derive(Debug, Clone)]
pub struct NewRoomBooking {
    pub room_id: i32,
    pub number_of_nights: u32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub amount: i64,
}

/// Booking-level fields written by an update.
///
/// The booking amount is not among them: it is always the sum of the stays.
#[derive(Debug, Clone)]
pub struct BookingChanges {
    pub payment_method: Option<PaymentMethod>,
    pub is_paid: Option<bool>,
    pub is_complementary: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

/// Stay-level fields written by an update
#[derive(Debug, Clone)]
pub struct RoomBookingChanges {
    pub number_of_nights: u32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub amount: i64,
    pub updated_at: DateTime<Utc>,
}

/// Booking list filter; dates compare against `created_at`.
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub start: Option<NaiveDate>,
    /// Inclusive: bookings created any time on this day match
    pub end: Option<NaiveDate>,
    pub employee_id: Option<i32>,
    pub customer_id: Option<i32>,
}

/// One row of the front-desk ledger export
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LedgerRow {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub address: Option<String>,
    pub email_address: String,
    pub payment_method: PaymentMethod,
    pub amount: i64,
    pub checkin_date: DateTime<Utc>,
    pub checkout_date: DateTime<Utc>,
    pub number_of_nights: u32,
    pub receptionist: Option<i32>,
    pub room_number: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_in_only_from_reserved() {
        assert_eq!(StayStatus::Reserved.check_in().unwrap(), StayStatus::CheckedIn);
        assert!(StayStatus::CheckedIn.check_in().is_err());
        assert!(StayStatus::CheckedOut.check_in().is_err());
    }

    #[test]
    fn check_out_releases_reserved_and_checked_in() {
        assert_eq!(StayStatus::Reserved.check_out().unwrap(), StayStatus::CheckedOut);
        assert_eq!(StayStatus::CheckedIn.check_out().unwrap(), StayStatus::CheckedOut);
        assert!(StayStatus::CheckedOut.check_out().is_err());
    }

    #[test]
    fn flags_are_mutually_exclusive() {
        for status in [StayStatus::Reserved, StayStatus::CheckedIn, StayStatus::CheckedOut] {
            assert!(!(status.is_checked_in() && status.is_checked_out()));
        }
        assert!(StayStatus::Reserved.holds_nights());
        assert!(StayStatus::CheckedIn.holds_nights());
        assert!(!StayStatus::CheckedOut.holds_nights());
    }

    #[test]
    fn payment_method_accepts_legacy_labels() {
        assert_eq!("Credit Card".parse::<PaymentMethod>().unwrap(), PaymentMethod::Card);
        assert_eq!("Transfer".parse::<PaymentMethod>().unwrap(), PaymentMethod::Transfer);
        assert!("cheque".parse::<PaymentMethod>().is_err());
    }
}

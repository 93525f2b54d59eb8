//! Booking DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::{
    CreateBookingRequest as CreateBookingCommand, StayRequest, UpdateBookingRequest,
};
use crate::domain::booking::BookingFilter;
use crate::domain::{Booking, DomainError, PaymentMethod, RoomBooking, StayStatus};
use crate::interfaces::http::modules::rooms::RoomDto;

#[derive(Debug, Serialize, ToSchema)]
pub struct RoomBookingDto {
    pub id: i32,
    pub booking_id: i32,
    pub room_id: i32,
    pub number_of_nights: u32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub amount: i64,
    pub status: StayStatus,
    pub is_checked_in: bool,
    pub is_checked_out: bool,
}

impl From<RoomBooking> for RoomBookingDto {
    fn from(s: RoomBooking) -> Self {
        Self {
            id: s.id,
            booking_id: s.booking_id,
            room_id: s.room_id,
            number_of_nights: s.number_of_nights,
            start_date: s.start_date,
            end_date: s.end_date,
            amount: s.amount,
            is_checked_in: s.status.is_checked_in(),
            is_checked_out: s.status.is_checked_out(),
            status: s.status,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingDto {
    pub id: i32,
    pub customer_id: Option<i32>,
    pub receptionist: Option<i32>,
    pub amount: i64,
    pub is_paid: bool,
    pub payment_method: PaymentMethod,
    pub is_complementary: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub room_bookings: Vec<RoomBookingDto>,
}

impl From<Booking> for BookingDto {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            customer_id: b.customer_id,
            receptionist: b.receptionist,
            amount: b.amount,
            is_paid: b.is_paid,
            payment_method: b.payment_method,
            is_complementary: b.is_complementary,
            created_at: b.created_at,
            updated_at: b.updated_at,
            room_bookings: b.room_bookings.into_iter().map(RoomBookingDto::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct StayRequestDto {
    pub room_id: i32,
    /// Arrival date; today when omitted
    pub start_date: Option<NaiveDate>,
    #[validate(range(min = 1, max = 365, message = "number_of_nights must be between 1 and 365"))]
    pub number_of_nights: u32,
    /// Nightly rate override in minor units
    pub amount: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookingRequest {
    pub customer_id: i32,
    /// Defaults to the signed-in employee
    pub receptionist: Option<i32>,
    /// `cash`, `card` or `transfer`
    pub payment_method: String,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub is_complementary: bool,
    #[validate(
        length(min = 1, message = "at least one room booking is required"),
        nested
    )]
    pub room_bookings: Vec<StayRequestDto>,
}

impl CreateBookingRequest {
    pub fn into_command(self, signed_in: i32) -> Result<CreateBookingCommand, DomainError> {
        Ok(CreateBookingCommand {
            customer_id: self.customer_id,
            receptionist: Some(self.receptionist.unwrap_or(signed_in)),
            payment_method: self.payment_method.parse()?,
            is_paid: self.is_paid,
            is_complementary: self.is_complementary,
            room_bookings: self
                .room_bookings
                .into_iter()
                .map(|s| StayRequest {
                    room_id: s.room_id,
                    start_date: s.start_date,
                    number_of_nights: s.number_of_nights,
                    amount: s.amount,
                })
                .collect(),
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateRoomBookingRequest {
    pub start_date: Option<NaiveDate>,
    #[validate(range(min = 1, max = 365, message = "number_of_nights must be between 1 and 365"))]
    pub number_of_nights: Option<u32>,
    #[validate(range(min = 0, message = "amount must not be negative"))]
    pub amount: Option<i64>,
    pub payment_method: Option<String>,
    pub is_paid: Option<bool>,
    pub is_complementary: Option<bool>,
}

impl UpdateRoomBookingRequest {
    pub fn into_command(self) -> Result<UpdateBookingRequest, DomainError> {
        Ok(UpdateBookingRequest {
            start_date: self.start_date,
            number_of_nights: self.number_of_nights,
            amount: self.amount,
            payment_method: self
                .payment_method
                .as_deref()
                .map(str::parse::<PaymentMethod>)
                .transpose()?,
            is_paid: self.is_paid,
            is_complementary: self.is_complementary,
        })
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PayBookingRequest {
    #[validate(range(min = 1, message = "booking_id must be positive"))]
    pub booking_id: i32,
    pub payment_method: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct BookingListQuery {
    /// Created on or after this day
    pub start: Option<NaiveDate>,
    /// Created on or before this day
    pub end: Option<NaiveDate>,
    /// Receptionist (employee id)
    pub employee_id: Option<i32>,
    pub customer_id: Option<i32>,
}

impl From<BookingListQuery> for BookingFilter {
    fn from(q: BookingListQuery) -> Self {
        Self {
            start: q.start,
            end: q.end,
            employee_id: q.employee_id,
            customer_id: q.customer_id,
        }
    }
}

/// Stay and its room after a check-in or check-out
#[derive(Debug, Serialize, ToSchema)]
pub struct StayTransitionResponse {
    pub room_booking: RoomBookingDto,
    pub room: RoomDto,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_body(nights: u64) -> CreateBookingRequest {
        serde_json::from_value(serde_json::json!({
            "customer_id": 1,
            "payment_method": "cash",
            "room_bookings": [{ "room_id": 1, "number_of_nights": nights }]
        }))
        .unwrap()
    }

    #[test]
    fn stay_length_is_bounded_on_create() {
        assert!(create_body(1).validate().is_ok());
        assert!(create_body(365).validate().is_ok());
        assert!(create_body(0).validate().is_err());
        assert!(create_body(366).validate().is_err());
        assert!(create_body(200_000_000).validate().is_err());
    }

    #[test]
    fn stay_length_is_bounded_on_update() {
        let update = |nights: Option<u32>| UpdateRoomBookingRequest {
            number_of_nights: nights,
            ..Default::default()
        };
        assert!(update(None).validate().is_ok());
        assert!(update(Some(365)).validate().is_ok());
        assert!(update(Some(366)).validate().is_err());
        assert!(update(Some(u32::MAX)).validate().is_err());
    }
}

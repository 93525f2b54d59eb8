//! Booking summary aggregation

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Booking, PaymentMethod, Room, RoomBooking};

/// Revenue and occupancy figures for a reporting window
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct BookingSummary {
    /// Sum of booking amounts, minor units
    pub total_amount: i64,
    pub total_bookings: u64,
    pub cash_amount: i64,
    pub card_amount: i64,
    pub transfer_amount: i64,
    /// Stays currently checked in, among bookings in the window
    pub checked_in: u64,
    /// Stays checked out, among bookings in the window
    pub checked_out: u64,
    /// Rooms with no checked-in stay covering `now`
    pub available_rooms: u64,
}

/// Aggregate `bookings` (already filtered to the window, stays attached).
///
/// `checked_in` holds every checked-in stay regardless of window; it decides
/// which of `rooms` are occupied at `now`.
pub fn summarize(
    bookings: &[Booking],
    rooms: &[Room],
    checked_in: &[RoomBooking],
    now: DateTime<Utc>,
) -> BookingSummary {
    let mut summary = BookingSummary {
        total_bookings: bookings.len() as u64,
        ..Default::default()
    };

    for booking in bookings {
        summary.total_amount = summary.total_amount.saturating_add(booking.amount);
        let bucket = match booking.payment_method {
            PaymentMethod::Cash => &mut summary.cash_amount,
            PaymentMethod::Card => &mut summary.card_amount,
            PaymentMethod::Transfer => &mut summary.transfer_amount,
        };
        *bucket = bucket.saturating_add(booking.amount);

        for stay in &booking.room_bookings {
            if stay.status.is_checked_in() {
                summary.checked_in += 1;
            } else if stay.status.is_checked_out() {
                summary.checked_out += 1;
            }
        }
    }

    summary.available_rooms = rooms
        .iter()
        .filter(|room| {
            !checked_in.iter().any(|s| {
                s.room_id == room.id
                    && s.status.is_checked_in()
                    && s.start_date <= now
                    && now <= s.end_date
            })
        })
        .count() as u64;

    summary
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::domain::{RoomStatus, StayStatus};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 2, 9, 0, 0).unwrap()
    }

    fn room(id: i32) -> Room {
        Room {
            id,
            name: format!("{id}"),
            category: None,
            description: None,
            price: 100,
            status: RoomStatus::Available,
            created_at: now(),
            updated_at: now(),
        }
    }

    fn stay(id: i32, room_id: i32, status: StayStatus, start: DateTime<Utc>) -> RoomBooking {
        RoomBooking {
            id,
            booking_id: 1,
            room_id,
            number_of_nights: 2,
            start_date: start,
            end_date: start + Duration::days(2),
            amount: 200,
            status,
            created_at: start,
            updated_at: start,
        }
    }

    fn booking(amount: i64, method: PaymentMethod, stays: Vec<RoomBooking>) -> Booking {
        Booking {
            id: 1,
            customer_id: Some(1),
            receptionist: None,
            amount,
            is_paid: true,
            payment_method: method,
            is_complementary: false,
            created_at: now(),
            updated_at: now(),
            deleted_at: None,
            room_bookings: stays,
        }
    }

    #[test]
    fn empty_window_counts_every_room_available() {
        let summary = summarize(&[], &[room(1), room(2)], &[], now());
        assert_eq!(summary.total_bookings, 0);
        assert_eq!(summary.total_amount, 0);
        assert_eq!(summary.available_rooms, 2);
    }

    #[test]
    fn revenue_is_split_by_payment_method() {
        let yesterday = now() - Duration::days(1);
        let bookings = [
            booking(300, PaymentMethod::Cash, vec![stay(1, 1, StayStatus::CheckedIn, yesterday)]),
            booking(200, PaymentMethod::Card, vec![stay(2, 2, StayStatus::CheckedOut, yesterday)]),
            booking(50, PaymentMethod::Transfer, vec![stay(3, 3, StayStatus::Reserved, yesterday)]),
            booking(25, PaymentMethod::Cash, vec![]),
        ];
        let summary = summarize(&bookings, &[], &[], now());

        assert_eq!(summary.total_amount, 575);
        assert_eq!(summary.total_bookings, 4);
        assert_eq!(summary.cash_amount, 325);
        assert_eq!(summary.card_amount, 200);
        assert_eq!(summary.transfer_amount, 50);
        assert_eq!(summary.checked_in, 1);
        assert_eq!(summary.checked_out, 1);
    }

    #[test]
    fn only_stays_covering_now_occupy_a_room() {
        let current = stay(1, 1, StayStatus::CheckedIn, now() - Duration::days(1));
        let overstayed = stay(2, 2, StayStatus::CheckedIn, now() - Duration::days(10));
        let summary = summarize(
            &[],
            &[room(1), room(2), room(3)],
            &[current, overstayed],
            now(),
        );
        assert_eq!(summary.available_rooms, 2);
    }
}

//! Booked-dates resolution
//!
//! Stays begin and end at the noon anchor of their calendar dates, so a guest
//! leaving on a date never collides with a guest arriving on it.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use crate::domain::{DomainError, DomainResult, RoomBooking};

/// Hour of day (UTC) at which every stay starts and ends
pub const CHECK_IN_HOUR: i64 = 12;

/// Longest stay a single room booking may cover
pub const MAX_NIGHTS: u32 = 365;

/// Noon of `date`, UTC
pub fn anchor(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc() + Duration::hours(CHECK_IN_HOUR)
}

/// Anchored `(start, end)` instants of a stay of `nights` nights from `date`.
///
/// Fails when the end falls outside the representable calendar.
pub fn stay_bounds(date: NaiveDate, nights: u32) -> DomainResult<(DateTime<Utc>, DateTime<Utc>)> {
    let start = anchor(date);
    let end = start
        .checked_add_signed(Duration::days(i64::from(nights)))
        .ok_or_else(|| {
            DomainError::Validation(format!("a stay of {nights} nights from {date} is out of range"))
        })?;
    Ok((start, end))
}

/// Every calendar night held by the given stays.
///
/// Reserved and checked-in stays hold `[date(start), date(end))`; checked-out
/// stays hold nothing. Past stays that were never checked out keep their nights.
pub fn resolve_occupied_nights(stays: &[RoomBooking]) -> BTreeSet<NaiveDate> {
    stays
        .iter()
        .filter(|s| s.status.holds_nights())
        .flat_map(|s| {
            let last = s.end_date.date_naive();
            s.start_date
                .date_naive()
                .iter_days()
                .take_while(move |d| *d < last)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StayStatus;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn stay(start: NaiveDate, nights: u32, status: StayStatus) -> RoomBooking {
        let (start_date, end_date) = stay_bounds(start, nights).unwrap();
        RoomBooking {
            id: 1,
            booking_id: 1,
            room_id: 1,
            number_of_nights: nights,
            start_date,
            end_date,
            amount: 0,
            status,
            created_at: start_date,
            updated_at: start_date,
        }
    }

    #[test]
    fn anchor_is_noon_utc() {
        assert_eq!(anchor(date(2024, 6, 1)).to_rfc3339(), "2024-06-01T12:00:00+00:00");
    }

    #[test]
    fn stay_end_past_calendar_is_rejected() {
        assert!(matches!(
            stay_bounds(NaiveDate::MAX, 1),
            Err(DomainError::Validation(_))
        ));
        assert!(stay_bounds(date(2024, 6, 1), u32::MAX).is_ok());
    }

    #[test]
    fn no_stays_no_nights() {
        assert!(resolve_occupied_nights(&[]).is_empty());
    }

    #[test]
    fn stay_holds_each_night_but_not_departure_day() {
        let nights = resolve_occupied_nights(&[stay(date(2024, 6, 1), 2, StayStatus::Reserved)]);
        assert_eq!(
            nights.into_iter().collect::<Vec<_>>(),
            vec![date(2024, 6, 1), date(2024, 6, 2)]
        );
    }

    #[test]
    fn checked_out_stays_release_their_nights() {
        let stays = [
            stay(date(2024, 6, 1), 1, StayStatus::CheckedOut),
            stay(date(2024, 6, 5), 1, StayStatus::CheckedIn),
        ];
        let nights = resolve_occupied_nights(&stays);
        assert_eq!(nights.len(), 1);
        assert!(nights.contains(&date(2024, 6, 5)));
    }

    #[test]
    fn stays_spanning_month_end_are_expanded() {
        let nights = resolve_occupied_nights(&[stay(date(2024, 2, 28), 3, StayStatus::Reserved)]);
        assert!(nights.contains(&date(2024, 2, 29)));
        assert!(nights.contains(&date(2024, 3, 1)));
        assert_eq!(nights.len(), 3);
    }
}

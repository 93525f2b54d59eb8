//! Stay and booking amounts, in minor currency units

use crate::domain::{DomainError, DomainResult};

/// Total for one stay: the per-night override when given, otherwise the
/// room's nightly price, times the number of nights.
pub fn compute_room_booking_amount(
    per_night_override: Option<i64>,
    nightly_price: i64,
    nights: u32,
) -> DomainResult<i64> {
    let per_night = per_night_override.unwrap_or(nightly_price);
    if per_night < 0 {
        return Err(DomainError::Validation(format!(
            "nightly amount must not be negative, got {per_night}"
        )));
    }
    per_night
        .checked_mul(i64::from(nights))
        .ok_or_else(|| DomainError::Validation("stay amount overflows".into()))
}

/// Sum of stay amounts
pub fn booking_total(amounts: impl IntoIterator<Item = i64>) -> DomainResult<i64> {
    amounts.into_iter().try_fold(0i64, |acc, amount| {
        acc.checked_add(amount)
            .ok_or_else(|| DomainError::Validation("booking amount overflows".into()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_price_times_nights() {
        assert_eq!(compute_room_booking_amount(None, 100, 3).unwrap(), 300);
    }

    #[test]
    fn override_replaces_room_price() {
        assert_eq!(compute_room_booking_amount(Some(80), 100, 3).unwrap(), 240);
        assert_eq!(compute_room_booking_amount(Some(0), 100, 3).unwrap(), 0);
    }

    #[test]
    fn negative_override_and_overflow_are_rejected() {
        assert!(compute_room_booking_amount(Some(-1), 100, 1).is_err());
        assert!(compute_room_booking_amount(None, i64::MAX, 2).is_err());
        assert!(booking_total([i64::MAX, 1]).is_err());
    }

    #[test]
    fn total_sums_stays() {
        assert_eq!(booking_total([100, 250, 0]).unwrap(), 350);
        assert_eq!(booking_total([]).unwrap(), 0);
    }
}

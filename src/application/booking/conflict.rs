//! Conflict detection for a proposed stay against a room's occupied nights

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};

use super::occupancy::{anchor, stay_bounds};
use crate::domain::DomainResult;

/// First occupied night (ascending) that overlaps a stay of `nights` nights
/// from `start`, or `None` if the stay fits. Fails when the stay's end is not
/// a representable date.
///
/// Both sides are anchored to noon: night `d` spans `[d 12:00, d+1 12:00)` and
/// overlaps the proposal iff `start < d + 1 day` and `end > d`.
pub fn check_conflict(
    occupied: &BTreeSet<NaiveDate>,
    start: NaiveDate,
    nights: u32,
) -> DomainResult<Option<NaiveDate>> {
    let (proposed_start, proposed_end) = stay_bounds(start, nights)?;
    Ok(occupied.iter().copied().find(|night| {
        let night_start = anchor(*night);
        proposed_start < night_start + Duration::days(1) && proposed_end > night_start
    }))
}

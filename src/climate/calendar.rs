//! Calendar arithmetic for the 365-slot annual profile.
//!
//! Slots are indexed by the day of a fixed non-leap reference year, so the
//! profile has no Feb 29 slot and observations from that day are discarded.
//! Window membership wraps across the Dec 31 → Jan 1 boundary and is computed
//! by date arithmetic on the reference year, not raw index arithmetic, so the
//! window edges near Feb 28 / Mar 1 never pick up a leap day.

use chrono::{Datelike, Duration, NaiveDate};

/// Non-leap year anchoring the day-of-year indexing.
pub const REFERENCE_YEAR: i32 = 2001;

/// Slot index for a calendar date, `None` for Feb 29.
pub fn day_index_for(date: NaiveDate) -> Option<usize> {
    day_index(date.month(), date.day())
}

/// Slot index for a month/day pair, `None` for Feb 29 (or invalid pairs).
pub fn day_index(month: u32, day: u32) -> Option<usize> {
    let anchored = NaiveDate::from_ymd_opt(REFERENCE_YEAR, month, day)?;
    Some(anchored.ordinal0() as usize)
}

/// The date a slot index represents in the reference year.
pub fn date_for_index(index: usize) -> Option<NaiveDate> {
    NaiveDate::from_yo_opt(REFERENCE_YEAR, index as u32 + 1)
}

/// Slot indices of the symmetric ±`half_width`-day window around `center`,
/// wrapping across the year boundary. The center itself is included.
pub fn window_indices(center: usize, half_width: usize) -> Vec<usize> {
    let mut indices = Vec::with_capacity(2 * half_width + 1);
    let base = match date_for_index(center) {
        Some(date) => date,
        None => return indices,
    };
    for delta in -(half_width as i64)..=(half_width as i64) {
        let mut date = base + Duration::days(delta);
        if date.year() != REFERENCE_YEAR {
            // Wrap the overhang back into the reference year by month/day.
            // The overhang never lands on Feb 29 for any realistic window.
            date = match NaiveDate::from_ymd_opt(REFERENCE_YEAR, date.month(), date.day()) {
                Some(wrapped) => wrapped,
                None => continue,
            };
        }
        indices.push(date.ordinal0() as usize);
    }
    indices
}

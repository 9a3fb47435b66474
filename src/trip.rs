//! Projects a trip along the trail and finds its hottest and coldest days
//! from the normals profiles.

use crate::climate::calendar::day_index_for;
use crate::index::PointIndex;
use crate::store::normals_store::NormalsStore;
use bon::bon;
use chrono::{Duration, NaiveDate};
use log::warn;

/// Traversal direction along the mile coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Ascending mile, starting at the trail's lowest mile.
    Forward,
    /// Descending mile, starting at the trail's highest mile.
    Reverse,
}

/// One projected trip day's temperature reading.
#[derive(Debug, Clone, PartialEq)]
pub struct DayReading {
    pub date: NaiveDate,
    pub mile: f64,
    pub point_id: String,
    pub temperature: f64,
}

/// Hottest and coldest days found across a trip. Both are `None` when no
/// trip day had resolvable data; that is not an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripExtremes {
    pub hottest: Option<DayReading>,
    pub coldest: Option<DayReading>,
}

/// Evaluates trip extremes against a point index and its normals.
pub struct ExtremesEvaluator<'a> {
    index: &'a PointIndex,
    normals: &'a NormalsStore,
}

#[bon]
impl<'a> ExtremesEvaluator<'a> {
    pub fn new(index: &'a PointIndex, normals: &'a NormalsStore) -> Self {
        Self { index, normals }
    }

    /// Walks the trip day by day: project the cumulative mile (clamped to
    /// the trail bounds), resolve the nearest point, and read that point's
    /// normals slot for the calendar date. Days without a record or with a
    /// null slot are skipped.
    #[builder]
    pub fn evaluate(
        &self,
        start_date: NaiveDate,
        #[builder(default = Direction::Forward)] direction: Direction,
        miles_per_day: f64,
        days: u32,
    ) -> TripExtremes {
        let mut extremes = TripExtremes::default();
        let Some((min_mile, max_mile)) = self.index.mile_bounds() else {
            return extremes;
        };
        let start_mile = match direction {
            Direction::Forward => min_mile,
            Direction::Reverse => max_mile,
        };

        for day in 0..days {
            let date = start_date + Duration::days(day as i64);
            // A real-world Feb 29 has no slot in the 365-day profile.
            let Some(slot) = day_index_for(date) else {
                continue;
            };
            let traveled = miles_per_day * day as f64;
            let mile = match direction {
                Direction::Forward => start_mile + traveled,
                Direction::Reverse => start_mile - traveled,
            }
            .clamp(min_mile, max_mile);

            let Some(nearest) = self.index.nearest(mile) else {
                continue;
            };
            let Some(record) = self.normals.get(&nearest.id) else {
                warn!("No normals record for '{}' on {date}", nearest.id);
                continue;
            };

            if let Some(hi) = record.hi.get(slot).copied().flatten() {
                if extremes
                    .hottest
                    .as_ref()
                    .map_or(true, |h| hi > h.temperature)
                {
                    extremes.hottest = Some(DayReading {
                        date,
                        mile,
                        point_id: nearest.id.clone(),
                        temperature: hi,
                    });
                }
            }
            if let Some(lo) = record.lo.get(slot).copied().flatten() {
                if extremes
                    .coldest
                    .as_ref()
                    .map_or(true, |c| lo < c.temperature)
                {
                    extremes.coldest = Some(DayReading {
                        date,
                        mile,
                        point_id: nearest.id.clone(),
                        temperature: lo,
                    });
                }
            }
        }
        extremes
    }
}

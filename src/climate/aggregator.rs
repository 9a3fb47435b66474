//! Fills normals coverage gaps, one point at a time.
//!
//! The missing set is recomputed from scratch each run by diffing point ids
//! against existing normals ids, and the store is persisted after every
//! completed record, so an interrupted run resumes exactly where it stopped
//! and no record is ever half-written. Requests are sequential and throttled
//! to respect the archive's rate limit.

use crate::climate::archive::{ArchiveClient, DailySeries};
use crate::climate::calendar::{day_index_for, window_indices};
use crate::climate::error::AggregateError;
use crate::climate::retry::Sleep;
use crate::store::normals_store::NormalsStore;
use crate::store::point_store::PointStore;
use crate::types::normals::{NormalsRecord, DAYS_PER_YEAR};
use crate::types::point::Point;
use bon::bon;
use chrono::{Datelike, NaiveDate, Utc};
use log::{info, warn};
use std::time::Duration;

/// Advisory `meta.source` value stamped on aggregated stores.
pub const SOURCE_NAME: &str = "open-meteo-archive";

/// Years of daily observations pooled per point.
pub const DEFAULT_YEARS: u32 = 7;

/// Default half-width of the planning smoothing window (±3 days).
pub const DEFAULT_WINDOW: usize = 3;

const DEFAULT_THROTTLE: Duration = Duration::from_millis(1100);

/// Below this slot coverage a record is logged as sparse, but still written.
const COVERAGE_WARN_THRESHOLD: f64 = 0.9;

/// How same-calendar-day observations are folded into a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Smoothing {
    /// Average only observations from the slot's own calendar day.
    Annual,
    /// Pool a symmetric ±N-day window around the slot, wrapping across the
    /// year boundary. This is the planning mode.
    Window(usize),
}

impl Default for Smoothing {
    fn default() -> Self {
        Smoothing::Window(DEFAULT_WINDOW)
    }
}

/// What an aggregation run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateReport {
    pub written: usize,
    pub skipped_invalid: usize,
    pub sparse: usize,
}

pub struct Aggregator {
    client: ArchiveClient,
    years: u32,
    smoothing: Smoothing,
    throttle: Duration,
}

#[bon]
impl Aggregator {
    #[builder]
    pub fn new(
        #[builder(default)] client: ArchiveClient,
        #[builder(default = DEFAULT_YEARS)] years: u32,
        #[builder(default)] smoothing: Smoothing,
        #[builder(default = DEFAULT_THROTTLE)] throttle: Duration,
    ) -> Self {
        Self {
            client,
            years,
            smoothing,
            throttle,
        }
    }

    /// Points with no normals record yet, in ascending mile order so an
    /// interrupted run resumes deterministically.
    pub fn missing_points<'a>(points: &'a PointStore, normals: &NormalsStore) -> Vec<&'a Point> {
        let mut missing: Vec<&Point> = points
            .points()
            .iter()
            .filter(|p| !normals.contains_id(&p.id))
            .collect();
        missing.sort_by(|a, b| {
            let a = a.authoritative_mile().unwrap_or(f64::INFINITY);
            let b = b.authoritative_mile().unwrap_or(f64::INFINITY);
            a.total_cmp(&b)
        });
        missing
    }

    /// Synthesizes and persists a record for every point that lacks one.
    ///
    /// The store is saved (backup, then atomic replace) after each record.
    /// A fatal archive failure aborts the run with the store on disk exactly
    /// as of the last completed record.
    pub async fn fill_missing<S: Sleep>(
        &self,
        sleeper: &S,
        points: &PointStore,
        normals: &mut NormalsStore,
    ) -> Result<AggregateReport, AggregateError> {
        let (start, end) = self.observation_range(Utc::now().date_naive());
        let missing = Self::missing_points(points, normals);
        info!(
            "{} of {} points lack normals; pooling {} .. {}",
            missing.len(),
            points.len(),
            start,
            end
        );

        let window = match self.smoothing {
            Smoothing::Window(w) => Some(w),
            Smoothing::Annual => None,
        };

        let mut report = AggregateReport::default();
        let mut first = true;
        for point in missing {
            if !point.has_finite_location() {
                warn!(
                    "Skipping point '{}': coordinates ({}, {}) are not finite",
                    point.id, point.lat, point.lon
                );
                report.skipped_invalid += 1;
                continue;
            }
            if !first {
                sleeper.sleep(self.throttle).await;
            }
            first = false;

            let series = self
                .client
                .daily_series(sleeper, point.lat, point.lon, start, end)
                .await?;
            let record = build_record(&point.id, point.legacy_id.clone(), &series, self.smoothing);

            if record.coverage() < COVERAGE_WARN_THRESHOLD {
                warn!(
                    "Sparse coverage for '{}': {} of {} slots filled",
                    record.id,
                    record.filled_slots(),
                    DAYS_PER_YEAR
                );
                report.sparse += 1;
            }

            normals.push(record);
            normals.set_provenance(SOURCE_NAME, start.year(), end.year(), window);
            normals.save().await?;
            report.written += 1;
        }

        info!(
            "Aggregation wrote {} records ({} sparse, {} skipped)",
            report.written, report.sparse, report.skipped_invalid
        );
        Ok(report)
    }

    /// Inclusive observation range: the last `years` full calendar years
    /// before the current one.
    fn observation_range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let end_year = today.year() - 1;
        let start_year = end_year - self.years as i32 + 1;
        let start = NaiveDate::from_ymd_opt(start_year, 1, 1).unwrap_or(today);
        let end = NaiveDate::from_ymd_opt(end_year, 12, 31).unwrap_or(today);
        (start, end)
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Buckets a multi-year daily series by calendar day and averages it into a
/// 365-slot profile. Feb 29 observations are discarded; a slot with no
/// contributing observation stays `None`.
fn build_record(
    id: &str,
    legacy_id: Option<String>,
    series: &DailySeries,
    smoothing: Smoothing,
) -> NormalsRecord {
    let mut hi_buckets: Vec<Vec<f64>> = vec![Vec::new(); DAYS_PER_YEAR];
    let mut lo_buckets: Vec<Vec<f64>> = vec![Vec::new(); DAYS_PER_YEAR];

    for (date, hi, lo) in series.days() {
        let Some(slot) = day_index_for(date) else {
            continue;
        };
        if let Some(value) = hi {
            hi_buckets[slot].push(value);
        }
        if let Some(value) = lo {
            lo_buckets[slot].push(value);
        }
    }

    let average = |buckets: &[Vec<f64>]| -> Vec<Option<f64>> {
        (0..DAYS_PER_YEAR)
            .map(|slot| {
                let pooled: Vec<f64> = match smoothing {
                    Smoothing::Annual => buckets[slot].clone(),
                    Smoothing::Window(half_width) => window_indices(slot, half_width)
                        .into_iter()
                        .flat_map(|i| buckets[i].iter().copied())
                        .collect(),
                };
                if pooled.is_empty() {
                    None
                } else {
                    Some(pooled.iter().sum::<f64>() / pooled.len() as f64)
                }
            })
            .collect()
    };

    NormalsRecord {
        id: id.to_string(),
        legacy_id,
        hi: average(&hi_buckets),
        lo: average(&lo_buckets),
    }
}

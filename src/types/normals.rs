//! Derived annual temperature profiles keyed by point id.

use serde::{Deserialize, Serialize};

/// Slots in an annual profile. The profile is indexed by the day of a fixed
/// non-leap reference year, so there is no slot for Feb 29.
pub const DAYS_PER_YEAR: usize = 365;

/// A smoothed annual high/low profile for one point.
///
/// `hi[i]` / `lo[i]` are the long-range daily max/min temperatures for the
/// i-th calendar day (day 0 = Jan 1). A slot is `None` when no observation
/// contributed to it, never zero or an interpolated value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalsRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_id: Option<String>,
    pub hi: Vec<Option<f64>>,
    pub lo: Vec<Option<f64>>,
}

impl NormalsRecord {
    /// Number of day slots with a high or low value.
    pub fn filled_slots(&self) -> usize {
        self.hi
            .iter()
            .zip(&self.lo)
            .filter(|(hi, lo)| hi.is_some() || lo.is_some())
            .count()
    }

    /// Fraction of the 365 slots carrying a value, in `[0, 1]`.
    pub fn coverage(&self) -> f64 {
        self.filled_slots() as f64 / DAYS_PER_YEAR as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coverage_counts_filled_slots() {
        let mut record = NormalsRecord {
            id: "at-main-mi0000000".to_string(),
            legacy_id: None,
            hi: vec![None; DAYS_PER_YEAR],
            lo: vec![None; DAYS_PER_YEAR],
        };
        assert_eq!(record.filled_slots(), 0);
        for i in 0..73 {
            record.hi[i] = Some(60.0);
        }
        assert_eq!(record.filled_slots(), 73);
        assert!((record.coverage() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn slot_with_only_a_low_value_counts_as_filled() {
        let mut record = NormalsRecord {
            id: "at-main-mi0000000".to_string(),
            legacy_id: None,
            hi: vec![None; DAYS_PER_YEAR],
            lo: vec![None; DAYS_PER_YEAR],
        };
        record.lo[5] = Some(28.0);
        record.hi[5] = None;
        record.hi[6] = Some(55.0);
        assert_eq!(record.filled_slots(), 2);
    }
}

//! A single trail point as stored in the point document.

use serde::{Deserialize, Serialize};

/// One point along the trail's mile coordinate.
///
/// `mile` is the authoritative along-trail coordinate; older data-entry
/// passes only recorded a `mile_est` estimate, which migration falls back to.
/// Points are created by external data entry and rewritten in place by the
/// migration engine (identity only, never coordinates); the core never
/// deletes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: String,
    /// Pre-migration identifier, kept for traceability. Never overwritten
    /// once set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mile: Option<f64>,
    /// Mile estimate from the legacy data-entry scheme.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mile_est: Option<f64>,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub state: String,
}

impl Point {
    /// The mile used for identity derivation: an explicit finite `mile`,
    /// otherwise a finite legacy estimate.
    pub fn authoritative_mile(&self) -> Option<f64> {
        self.mile
            .filter(|m| m.is_finite())
            .or(self.mile_est.filter(|m| m.is_finite()))
    }

    /// Whether the point can be located on the map at all. Points failing
    /// this are skipped by the aggregator, not treated as fatal.
    pub fn has_finite_location(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(mile: Option<f64>, mile_est: Option<f64>) -> Point {
        Point {
            id: "p".to_string(),
            legacy_id: None,
            mile,
            mile_est,
            lat: 34.6266,
            lon: -84.1936,
            state: "GA".to_string(),
        }
    }

    #[test]
    fn explicit_mile_wins_over_estimate() {
        assert_eq!(point(Some(12.5), Some(99.0)).authoritative_mile(), Some(12.5));
    }

    #[test]
    fn falls_back_to_estimate() {
        assert_eq!(point(None, Some(99.0)).authoritative_mile(), Some(99.0));
        assert_eq!(point(Some(f64::NAN), Some(99.0)).authoritative_mile(), Some(99.0));
    }

    #[test]
    fn no_finite_mile_yields_none() {
        assert_eq!(point(None, None).authoritative_mile(), None);
        assert_eq!(point(Some(f64::NAN), Some(f64::INFINITY)).authoritative_mile(), None);
    }

    #[test]
    fn deserializes_without_optional_fields() {
        let p: Point = serde_json::from_str(
            r#"{"id":"SpringerMtn","mile_est":0.0,"lat":34.6266,"lon":-84.1936,"state":"GA"}"#,
        )
        .unwrap();
        assert_eq!(p.id, "SpringerMtn");
        assert_eq!(p.legacy_id, None);
        assert_eq!(p.mile, None);
        assert_eq!(p.mile_est, Some(0.0));
    }
}

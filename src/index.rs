//! Nearest-point-by-mile lookup over the point store.

use crate::types::point::Point;

/// One indexed point: its mile coordinate and canonical id.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedPoint {
    pub mile: f64,
    pub id: String,
}

/// Points sorted once by ascending mile, queried by binary search.
#[derive(Debug, Clone)]
pub struct PointIndex {
    entries: Vec<IndexedPoint>,
}

impl PointIndex {
    /// Builds the index from the store's points. Points without a finite
    /// authoritative mile are not indexed.
    pub fn build(points: &[Point]) -> Self {
        let mut entries: Vec<IndexedPoint> = points
            .iter()
            .filter_map(|p| {
                p.authoritative_mile().map(|mile| IndexedPoint {
                    mile,
                    id: p.id.clone(),
                })
            })
            .collect();
        entries.sort_by(|a, b| a.mile.total_cmp(&b.mile));
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lowest and highest indexed mile.
    pub fn mile_bounds(&self) -> Option<(f64, f64)> {
        match (self.entries.first(), self.entries.last()) {
            (Some(first), Some(last)) => Some((first.mile, last.mile)),
            _ => None,
        }
    }

    /// The point closest to `mile` by absolute distance, ties broken toward
    /// the lower-mile candidate. `None` only when the index is empty.
    pub fn nearest(&self, mile: f64) -> Option<&IndexedPoint> {
        if self.entries.is_empty() {
            return None;
        }
        let pos = self.entries.partition_point(|e| e.mile < mile);
        if pos == 0 {
            return self.entries.first();
        }
        if pos == self.entries.len() {
            return self.entries.last();
        }
        let left = &self.entries[pos - 1];
        let right = &self.entries[pos];
        if (mile - left.mile) <= (right.mile - mile) {
            Some(left)
        } else {
            Some(right)
        }
    }
}

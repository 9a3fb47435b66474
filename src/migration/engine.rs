//! Rewrites point and normals identities to the canonical mile-derived
//! scheme.
//!
//! The two stores live in independent JSON files with no transaction between
//! them, so the engine validates everything in memory first and only then
//! persists, and every save is preceded by a timestamped backup. Re-running
//! the engine on its own output changes nothing: canonical ids re-encode to
//! themselves and `legacy_id`, once set, is never overwritten.

use crate::identity::{IdCodec, TOKEN_WIDTH};
use crate::migration::error::MigrationError;
use crate::migration::id_map::IdMap;
use crate::store::normals_store::NormalsStore;
use crate::store::point_store::PointStore;
use crate::types::doc::SCHEMA_VERSION;
use log::{info, warn};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// What a migration run changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub points_rekeyed: usize,
    pub normals_rekeyed: usize,
    pub legacy_backfilled: usize,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

pub struct MigrationEngine {
    codec: IdCodec,
}

impl MigrationEngine {
    pub fn new(codec: IdCodec) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &IdCodec {
        &self.codec
    }

    /// Versioned capability check consulted before dispatching a run,
    /// instead of failing unconditionally on old data.
    pub fn needs_migration(&self, points: &PointStore) -> bool {
        points.meta().schema_version() < SCHEMA_VERSION
            || points
                .points()
                .iter()
                .any(|p| !self.codec.is_canonical(&p.id))
    }

    /// Runs the full migration over both in-memory stores.
    ///
    /// Nothing is persisted here; on error the caller must discard the
    /// stores, since points may have been partially rekeyed.
    pub fn run(
        &self,
        points: &mut PointStore,
        normals: &mut NormalsStore,
    ) -> Result<MigrationReport, MigrationError> {
        let mut map = IdMap::default();
        let mut report = MigrationReport::default();

        self.rekey_points(points, &mut map, &mut report)?;
        Self::validate_point_uniqueness(points)?;
        self.rekey_normals(points, normals, &map, &mut report)?;
        Self::validate_normals_uniqueness(normals)?;

        if normals.len() != points.len() {
            warn!(
                "Normals store has {} records for {} points; the aggregator fills coverage gaps",
                normals.len(),
                points.len()
            );
        }

        let id_format = format!(
            "{}<{TOKEN_WIDTH}-digit zero-padded round(mile*1000)>",
            self.codec.prefix()
        );
        points.meta_mut().schema = Some(SCHEMA_VERSION);
        points.meta_mut().id_format = Some(id_format.clone());
        normals.meta_mut().schema = Some(SCHEMA_VERSION);
        normals.meta_mut().id_format = Some(id_format);

        info!(
            "Migration rekeyed {} points and {} normals records ({} legacy ids backfilled)",
            report.points_rekeyed, report.normals_rekeyed, report.legacy_backfilled
        );
        Ok(report)
    }

    /// Loads both stores, migrates, and saves both only when every
    /// validation passed. On error the files on disk are untouched.
    pub async fn migrate_files(
        &self,
        points_path: impl Into<PathBuf>,
        normals_path: impl Into<PathBuf>,
    ) -> Result<MigrationReport, MigrationError> {
        let mut points = PointStore::load(points_path).await?;
        let mut normals = NormalsStore::load_or_default(normals_path).await?;
        let report = self.run(&mut points, &mut normals)?;
        points.save().await?;
        normals.save().await?;
        Ok(report)
    }

    fn rekey_points(
        &self,
        points: &mut PointStore,
        map: &mut IdMap,
        report: &mut MigrationReport,
    ) -> Result<(), MigrationError> {
        for point in points.points_mut() {
            let mile = point
                .authoritative_mile()
                .ok_or_else(|| MigrationError::UnresolvedMile {
                    id: point.id.clone(),
                })?;
            let canonical = self.codec.encode(mile)?;
            let old_id = point.id.clone();
            let changed = old_id != canonical;

            if changed && point.legacy_id.is_none() {
                point.legacy_id = Some(old_id.clone());
            }
            // Original lineage registers first so it wins the reverse slot.
            if let Some(legacy) = point.legacy_id.clone() {
                map.insert(&legacy, &canonical)?;
            }
            if changed && point.legacy_id.as_deref() != Some(old_id.as_str()) {
                map.insert(&old_id, &canonical)?;
            }

            point.id = canonical;
            if changed {
                report.points_rekeyed += 1;
            }
        }
        Ok(())
    }

    fn validate_point_uniqueness(points: &PointStore) -> Result<(), MigrationError> {
        let mut seen: HashMap<&str, f64> = HashMap::new();
        for point in points.points() {
            let mile = point.authoritative_mile().unwrap_or(f64::NAN);
            if let Some(first) = seen.insert(point.id.as_str(), mile) {
                return Err(MigrationError::DuplicatePointId {
                    id: point.id.clone(),
                    first,
                    second: mile,
                });
            }
        }
        Ok(())
    }

    fn rekey_normals(
        &self,
        points: &PointStore,
        normals: &mut NormalsStore,
        map: &IdMap,
        report: &mut MigrationReport,
    ) -> Result<(), MigrationError> {
        let point_ids: HashSet<&str> = points.points().iter().map(|p| p.id.as_str()).collect();

        for record in normals.records_mut() {
            if self.codec.is_canonical(&record.id) {
                if !point_ids.contains(record.id.as_str()) {
                    return Err(MigrationError::UnresolvedNormalsRecord(record.id.clone()));
                }
                if record.legacy_id.is_none() {
                    if let Some(legacy) = map.legacy_for(&record.id) {
                        record.legacy_id = Some(legacy.to_string());
                        report.legacy_backfilled += 1;
                    }
                }
            } else {
                let canonical = map
                    .canonical_for(&record.id)
                    .ok_or_else(|| MigrationError::UnresolvedNormalsRecord(record.id.clone()))?
                    .to_string();
                if record.legacy_id.is_none() {
                    record.legacy_id = Some(record.id.clone());
                }
                record.id = canonical;
                report.normals_rekeyed += 1;
            }
        }
        Ok(())
    }

    fn validate_normals_uniqueness(normals: &NormalsStore) -> Result<(), MigrationError> {
        let mut seen = HashSet::new();
        for record in normals.records() {
            if !seen.insert(record.id.as_str()) {
                return Err(MigrationError::DuplicateNormalsId(record.id.clone()));
            }
        }
        Ok(())
    }
}

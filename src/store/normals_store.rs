//! The derived normals collection, keyed by canonical point id.

use crate::store::error::StoreError;
use crate::types::doc::{DocShape, Meta, StoreDoc, WrappedDocRef, SCHEMA_VERSION};
use crate::types::normals::NormalsRecord;
use crate::utils::{backup_file, write_atomic};
use log::info;
use std::path::{Path, PathBuf};
use tokio::fs;

/// In-memory view of the normals store file.
///
/// One record per point id; 1:1 coverage of the point store is expected but
/// not enforced here. Same persistence discipline as the point store:
/// backup, then atomic replace, preserving the loaded root shape.
#[derive(Debug, Clone)]
pub struct NormalsStore {
    path: PathBuf,
    shape: DocShape,
    meta: Meta,
    records: Vec<NormalsRecord>,
}

impl NormalsStore {
    /// Creates a fresh wrapped-shape store that has not been persisted yet.
    pub fn new(path: impl Into<PathBuf>, records: Vec<NormalsRecord>) -> Self {
        Self {
            path: path.into(),
            shape: DocShape::Wrapped,
            meta: Meta::default(),
            records,
        }
    }

    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let bytes = fs::read(&path)
            .await
            .map_err(|e| StoreError::Read(path.clone(), e))?;
        let doc: StoreDoc<NormalsRecord> =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::Parse(path.clone(), e))?;
        let (shape, meta, records) = doc.into_parts();
        info!(
            "Loaded {} normals records from {}",
            records.len(),
            path.display()
        );
        Ok(Self {
            path,
            shape,
            meta,
            records,
        })
    }

    /// Loads the store, or starts an empty wrapped store when the file does
    /// not exist yet. A first aggregation run has nothing to load.
    pub async fn load_or_default(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        match fs::metadata(&path).await {
            Ok(_) => Self::load(path).await,
            Err(_) => Ok(Self::new(path, Vec::new())),
        }
    }

    pub async fn save(&self) -> Result<(), StoreError> {
        let bytes = match self.shape {
            DocShape::Bare => serde_json::to_vec_pretty(&self.records),
            DocShape::Wrapped => serde_json::to_vec_pretty(&WrappedDocRef {
                meta: &self.meta,
                points: &self.records,
            }),
        }
        .map_err(|e| StoreError::Serialize(self.path.clone(), e))?;

        if let Some(backup) = backup_file(&self.path)
            .await
            .map_err(|e| StoreError::Backup(self.path.clone(), e))?
        {
            info!("Backed up {} to {}", self.path.display(), backup.display());
        }
        write_atomic(&self.path, bytes)
            .await
            .map_err(|e| StoreError::Write(self.path.clone(), e))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[NormalsRecord] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [NormalsRecord] {
        &mut self.records
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.records.iter().any(|r| r.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&NormalsRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn push(&mut self, record: NormalsRecord) {
        self.records.push(record);
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    /// Stamps advisory provenance for an aggregation run.
    pub fn set_provenance(
        &mut self,
        source: &str,
        start_year: i32,
        end_year: i32,
        smoothing_window: Option<usize>,
    ) {
        self.meta.schema = Some(SCHEMA_VERSION);
        self.meta.source = Some(source.to_string());
        self.meta.start_year = Some(start_year);
        self.meta.end_year = Some(end_year);
        self.meta.smoothing_window = smoothing_window;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::normals::DAYS_PER_YEAR;

    fn record(id: &str) -> NormalsRecord {
        NormalsRecord {
            id: id.to_string(),
            legacy_id: None,
            hi: vec![Some(70.0); DAYS_PER_YEAR],
            lo: vec![Some(45.0); DAYS_PER_YEAR],
        }
    }

    #[tokio::test]
    async fn missing_file_defaults_to_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = NormalsStore::load_or_default(dir.path().join("normals.json"))
            .await
            .unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn round_trips_records_and_provenance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("normals.json");
        let mut store = NormalsStore::new(&path, vec![record("at-main-mi0000000")]);
        store.set_provenance("archive", 2018, 2024, Some(3));
        store.save().await.unwrap();

        let reloaded = NormalsStore::load(&path).await.unwrap();
        assert_eq!(reloaded.len(), 1);
        assert!(reloaded.contains_id("at-main-mi0000000"));
        assert_eq!(reloaded.meta().source.as_deref(), Some("archive"));
        assert_eq!(reloaded.meta().smoothing_window, Some(3));
        assert_eq!(reloaded.meta().schema_version(), SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn bare_array_is_accepted_for_backward_compatibility() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("normals.json");
        let json = serde_json::to_string(&vec![record("old-id")]).unwrap();
        fs::write(&path, json).await.unwrap();

        let store = NormalsStore::load(&path).await.unwrap();
        assert!(store.contains_id("old-id"));
    }
}

//! The canonical ordered collection of trail points, backed by a flat JSON
//! document.

use crate::store::error::StoreError;
use crate::types::doc::{DocShape, Meta, StoreDoc, WrappedDocRef};
use crate::types::point::Point;
use crate::utils::{backup_file, write_atomic};
use log::info;
use std::path::{Path, PathBuf};
use tokio::fs;

/// In-memory view of the point store file.
///
/// The on-disk root shape (bare array vs `{ meta, points }`) is resolved at
/// load time and reused on save. Saving always copies the previous file to a
/// timestamped backup sibling first; the store assumes single-writer access.
#[derive(Debug, Clone)]
pub struct PointStore {
    path: PathBuf,
    shape: DocShape,
    meta: Meta,
    points: Vec<Point>,
}

impl PointStore {
    /// Creates a fresh wrapped-shape store that has not been persisted yet.
    pub fn new(path: impl Into<PathBuf>, points: Vec<Point>) -> Self {
        Self {
            path: path.into(),
            shape: DocShape::Wrapped,
            meta: Meta::default(),
            points,
        }
    }

    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let bytes = fs::read(&path)
            .await
            .map_err(|e| StoreError::Read(path.clone(), e))?;
        let doc: StoreDoc<Point> =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::Parse(path.clone(), e))?;
        let (shape, meta, points) = doc.into_parts();
        info!("Loaded {} points from {}", points.len(), path.display());
        Ok(Self {
            path,
            shape,
            meta,
            points,
        })
    }

    /// Backs up the previous file, then atomically replaces it with the
    /// current contents in the shape the file was loaded with.
    pub async fn save(&self) -> Result<(), StoreError> {
        let bytes = match self.shape {
            DocShape::Bare => serde_json::to_vec_pretty(&self.points),
            DocShape::Wrapped => serde_json::to_vec_pretty(&WrappedDocRef {
                meta: &self.meta,
                points: &self.points,
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
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Mutable access for in-place identity rewrites. The core never adds or
    /// removes points.
    pub fn points_mut(&mut self) -> &mut [Point] {
        &mut self.points
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_point(id: &str, mile: f64) -> Point {
        Point {
            id: id.to_string(),
            legacy_id: None,
            mile: Some(mile),
            mile_est: None,
            lat: 35.0,
            lon: -83.5,
            state: "NC".to_string(),
        }
    }

    #[tokio::test]
    async fn bare_array_round_trips_as_bare() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.json");
        fs::write(
            &path,
            r#"[{"id":"a","mile":1.0,"lat":35.0,"lon":-83.5,"state":"NC"}]"#,
        )
        .await
        .unwrap();

        let store = PointStore::load(&path).await.unwrap();
        assert_eq!(store.len(), 1);
        store.save().await.unwrap();

        let written: serde_json::Value =
            serde_json::from_slice(&fs::read(&path).await.unwrap()).unwrap();
        assert!(written.is_array(), "bare stores must stay bare on save");
    }

    #[tokio::test]
    async fn wrapped_store_keeps_meta() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.json");
        fs::write(
            &path,
            r#"{"meta":{"schema":2,"note":"hand-entered"},"points":[]}"#,
        )
        .await
        .unwrap();

        let store = PointStore::load(&path).await.unwrap();
        store.save().await.unwrap();

        let written: serde_json::Value =
            serde_json::from_slice(&fs::read(&path).await.unwrap()).unwrap();
        assert_eq!(written["meta"]["schema"], 2);
        assert_eq!(written["meta"]["note"], "hand-entered");
    }

    #[tokio::test]
    async fn save_backs_up_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.json");
        let store = PointStore::new(&path, vec![sample_point("a", 1.0)]);
        store.save().await.unwrap();
        store.save().await.unwrap();

        let backups: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".bak"))
            .collect();
        assert_eq!(backups.len(), 1, "second save should back up the first");
    }

    #[tokio::test]
    async fn malformed_root_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.json");
        fs::write(&path, r#"{"rows":[]}"#).await.unwrap();
        assert!(matches!(
            PointStore::load(&path).await,
            Err(StoreError::Parse(_, _))
        ));
    }
}

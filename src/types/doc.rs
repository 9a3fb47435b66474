//! On-disk document shape shared by the point and normals stores.
//!
//! Older store files are a bare JSON array of records; newer ones wrap the
//! records in `{ meta, points }`. The shape is resolved once at load time,
//! all in-memory code works on the flat record list, and the original shape
//! is remembered only to choose the write-back form.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Schema generation written by the current migration engine. Files without
/// a `meta.schema` field predate the canonical id scheme.
pub const SCHEMA_VERSION: u32 = 2;

/// Root shape of a store document as found on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoreDoc<T> {
    Wrapped {
        #[serde(default)]
        meta: Meta,
        points: Vec<T>,
    },
    Bare(Vec<T>),
}

impl<T> StoreDoc<T> {
    /// Splits the document into its shape tag, meta and records.
    pub fn into_parts(self) -> (DocShape, Meta, Vec<T>) {
        match self {
            StoreDoc::Wrapped { meta, points } => (DocShape::Wrapped, meta, points),
            StoreDoc::Bare(points) => (DocShape::Bare, Meta::default(), points),
        }
    }

    pub fn from_parts(shape: DocShape, meta: Meta, points: Vec<T>) -> Self {
        match shape {
            DocShape::Wrapped => StoreDoc::Wrapped { meta, points },
            DocShape::Bare => StoreDoc::Bare(points),
        }
    }
}

/// Borrowed wrapped form, used when writing a store back without cloning
/// its records.
#[derive(Serialize)]
pub(crate) struct WrappedDocRef<'a, T> {
    pub meta: &'a Meta,
    pub points: &'a [T],
}

/// Which root form a store file used when it was loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocShape {
    Bare,
    Wrapped,
}

/// Advisory provenance attached to a wrapped store document.
///
/// Nothing here is validated by the core; unknown fields are preserved
/// verbatim across a load/save round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<u32>,
    /// Name of the archive the normals were derived from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smoothing_window: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_format: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Meta {
    /// Effective schema generation; files written before versioning count
    /// as generation 1.
    pub fn schema_version(&self) -> u32 {
        self.schema.unwrap_or(1)
    }
}

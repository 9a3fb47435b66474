//! Long-range temperature normals for points along a linear trail.
//!
//! The crate keeps two flat JSON documents consistent: the point store (trail
//! points on a mile coordinate) and the normals store (a smoothed 365-slot
//! annual high/low profile per point). Identity is derived from the mile
//! coordinate, migration rekeys both documents while preserving legacy ids,
//! and the aggregator fills normals gaps from a historical climate archive,
//! throttled and resumable. A sorted mile index and a trip evaluator answer
//! "what are the hottest and coldest days of this hike".

mod climate;
mod error;
mod identity;
mod index;
mod migration;
mod store;
mod trip;
mod types;
mod utils;

pub use error::TrailNormalsError;

pub use identity::{IdCodec, IdentityError, MILE_SCALE, TOKEN_WIDTH};

pub use types::doc::{DocShape, Meta, SCHEMA_VERSION};
pub use types::normals::{NormalsRecord, DAYS_PER_YEAR};
pub use types::point::Point;

pub use store::error::StoreError;
pub use store::normals_store::NormalsStore;
pub use store::point_store::PointStore;

pub use migration::engine::{MigrationEngine, MigrationReport};
pub use migration::error::MigrationError;
pub use migration::id_map::IdMap;

pub use climate::aggregator::{
    AggregateReport, Aggregator, Smoothing, DEFAULT_WINDOW, DEFAULT_YEARS, SOURCE_NAME,
};
pub use climate::archive::{ArchiveClient, DailySeries, DEFAULT_BASE_URL};
pub use climate::calendar::{day_index, day_index_for, window_indices, REFERENCE_YEAR};
pub use climate::error::{AggregateError, ArchiveError};
pub use climate::retry::{RetryPolicy, Sleep, TokioSleep};

pub use index::{IndexedPoint, PointIndex};
pub use trip::{DayReading, Direction, ExtremesEvaluator, TripExtremes};

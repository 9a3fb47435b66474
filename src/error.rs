use crate::climate::error::{AggregateError, ArchiveError};
use crate::identity::IdentityError;
use crate::migration::error::MigrationError;
use crate::store::error::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrailNormalsError {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Migration(#[from] MigrationError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

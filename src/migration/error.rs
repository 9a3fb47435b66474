use crate::identity::IdentityError;
use crate::store::error::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Point '{id}' has no finite mile to derive an identity from")]
    UnresolvedMile { id: String },

    #[error("Duplicate canonical point id '{id}': miles {first} and {second} collide at codec resolution")]
    DuplicatePointId { id: String, first: f64, second: f64 },

    #[error("Duplicate canonical normals id '{0}'")]
    DuplicateNormalsId(String),

    #[error("Normals record '{0}' does not resolve to any point")]
    UnresolvedNormalsRecord(String),

    #[error("Legacy id '{legacy}' maps to both '{first}' and '{second}'")]
    LegacyCollision {
        legacy: String,
        first: String,
        second: String,
    },
}

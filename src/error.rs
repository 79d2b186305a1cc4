use axum::http::StatusCode;
use thiserror::Error;

use crate::images::AssetError;
use crate::meals::repo::RepoError;
use crate::meals::repo_types::MealId;
use crate::storage::StorageError;

/// Failures surfaced by meal lifecycle operations.
#[derive(Debug, Error)]
pub enum MealError {
    /// Malformed or undecodable photo payload. Raised before any side effect.
    #[error("invalid photo: {0}")]
    InvalidAsset(#[source] AssetError),

    #[error("meal {0} not found")]
    NotFound(MealId),

    /// File write failed before the database was touched.
    #[error("file store failure: {0}")]
    Io(#[from] StorageError),

    #[error("persistence failure: {0}")]
    Persistence(#[source] sqlx::Error),

    /// A recipe would be created from a patch that lacks this field.
    #[error("recipe does not exist yet and `{0}` is missing")]
    IncompleteRecipe(&'static str),

    #[error("internal failure: {0}")]
    Internal(String),
}

impl MealError {
    pub fn status(&self) -> StatusCode {
        match self {
            MealError::InvalidAsset(_) | MealError::IncompleteRecipe(_) => StatusCode::BAD_REQUEST,
            MealError::NotFound(_) => StatusCode::NOT_FOUND,
            MealError::Io(_) | MealError::Persistence(_) | MealError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<AssetError> for MealError {
    fn from(e: AssetError) -> Self {
        match e {
            AssetError::Encode(_) | AssetError::Worker(_) => MealError::Internal(e.to_string()),
            _ => MealError::InvalidAsset(e),
        }
    }
}

impl From<RepoError> for MealError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound(id) => MealError::NotFound(id),
            RepoError::Database(e) => MealError::Persistence(e),
        }
    }
}

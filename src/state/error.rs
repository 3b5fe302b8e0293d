use thiserror::Error;

/// Errors raised while writing to the photo store
///
/// Reads never surface these: an unreadable collection loads as empty.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("could not prepare storage directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not serialize photos: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("photos were changed elsewhere, gave up after {attempts} attempts")]
    Conflict { attempts: usize },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// State management module
///
/// This module handles all persisted application state:
/// - SQLite key-value slots (storage.rs)
/// - The photo collection stored in one of those slots (store.rs)
/// - Shared data structures (data.rs)

pub mod data;
pub mod error;
pub mod storage;
pub mod store;

pub use data::{PhotoCollection, PhotoId, PhotoRecord};
pub use error::StoreError;
pub use store::PhotoStore;

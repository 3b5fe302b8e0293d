use std::path::Path;
use tracing::{debug, info, warn};

use super::data::{PhotoCollection, PhotoId, PhotoRecord};
use super::error::{StoreError, StoreResult};
use super::storage::{Revision, Storage};

/// Key under which the whole collection is stored
pub const STORAGE_KEY: &str = "localPhotos";

/// How many times a read-modify-write is retried after a revision conflict
const MAX_ATTEMPTS: usize = 3;

/// The PhotoStore persists the gallery as one serialized blob.
/// Every mutation reads and rewrites the whole collection.
#[derive(Debug)]
pub struct PhotoStore {
    storage: Storage,
}

impl PhotoStore {
    /// Open the store backed by the database file at `db_path`.
    pub fn open(db_path: &Path) -> StoreResult<Self> {
        Self::with_storage(Storage::open(db_path)?)
    }

    /// Wrap an already opened storage, assigning ids to legacy records.
    pub fn with_storage(storage: Storage) -> StoreResult<Self> {
        let store = PhotoStore { storage };
        store.migrate_ids()?;

        info!(
            photos = store.load().len(),
            db = ?store.storage.path(),
            "photo store ready"
        );
        Ok(store)
    }

    /// Blobs written before records had ids get them assigned once and
    /// written back, so later loads see the same ids. Only the raw JSON is
    /// touched; records that do not parse are carried over as they are.
    fn migrate_ids(&self) -> StoreResult<()> {
        let Some(entry) = self.storage.get(STORAGE_KEY).ok().flatten() else {
            return Ok(());
        };
        let Ok(mut raw) = serde_json::from_str::<Vec<serde_json::Value>>(&entry.value) else {
            return Ok(());
        };

        let mut migrated = 0;
        for record in raw.iter_mut() {
            let Some(fields) = record.as_object_mut() else {
                continue;
            };
            if !fields.contains_key("id") {
                fields.insert("id".to_string(), serde_json::to_value(PhotoId::new())?);
                migrated += 1;
            }
        }
        if migrated == 0 {
            return Ok(());
        }

        let json = serde_json::to_string(&raw)?;
        if self
            .storage
            .compare_and_set(STORAGE_KEY, &json, entry.revision)?
            .is_none()
        {
            warn!("stored photos changed during id migration, retrying on next open");
            return Ok(());
        }
        info!(migrated, "assigned ids to stored photos");
        Ok(())
    }

    /// Read the collection. Absent, unreadable or corrupt data loads as empty;
    /// single records that do not parse are skipped.
    pub fn load(&self) -> PhotoCollection {
        self.load_versioned().1
    }

    fn load_versioned(&self) -> (Revision, PhotoCollection) {
        let entry = match self.storage.get(STORAGE_KEY) {
            Ok(Some(entry)) => entry,
            Ok(None) => return (0, PhotoCollection::new()),
            Err(e) => {
                warn!(error = %e, "could not read stored photos, treating as empty");
                return (0, PhotoCollection::new());
            }
        };

        match PhotoCollection::from_json_lenient(&entry.value) {
            Ok((photos, skipped)) => {
                if skipped > 0 {
                    warn!(skipped, "ignoring stored photos that could not be read");
                }
                (entry.revision, photos)
            }
            Err(e) => {
                warn!(error = %e, "stored photos are corrupt, treating as empty");
                (entry.revision, PhotoCollection::new())
            }
        }
    }

    /// Overwrite the stored collection unconditionally.
    pub fn save(&self, photos: &PhotoCollection) -> StoreResult<()> {
        let json = photos.to_json()?;
        let revision = self.storage.set(STORAGE_KEY, &json)?;
        debug!(photos = photos.len(), revision, "photos saved");
        Ok(())
    }

    /// Put `record` at the head, keeping only the most recent photos.
    pub fn insert(&self, record: PhotoRecord) -> StoreResult<PhotoCollection> {
        let id = record.id;
        let photos = self.modify(|photos| photos.prepend(record.clone()))?;
        info!(%id, photos = photos.len(), "photo stored");
        Ok(photos)
    }

    /// Drop every record with `id`. A miss rewrites an identical collection.
    pub fn remove(&self, id: PhotoId) -> StoreResult<PhotoCollection> {
        let mut removed = 0;
        let photos = self.modify(|photos| removed = photos.remove(id))?;
        info!(%id, removed, "photo removed");
        Ok(photos)
    }

    /// Delete the storage key entirely.
    pub fn clear(&self) -> StoreResult<()> {
        let existed = self.storage.remove(STORAGE_KEY)?;
        info!(existed, "photo store cleared");
        Ok(())
    }

    /// Read-modify-write guarded by the key's revision. On conflict the
    /// change is re-applied to a fresh load.
    fn modify<F>(&self, mut change: F) -> StoreResult<PhotoCollection>
    where
        F: FnMut(&mut PhotoCollection),
    {
        for attempt in 1..=MAX_ATTEMPTS {
            let (revision, mut photos) = self.load_versioned();
            change(&mut photos);

            let json = photos.to_json()?;
            if self
                .storage
                .compare_and_set(STORAGE_KEY, &json, revision)?
                .is_some()
            {
                return Ok(photos);
            }
            warn!(attempt, revision, "stored photos changed underneath, retrying");
        }

        Err(StoreError::Conflict {
            attempts: MAX_ATTEMPTS,
        })
    }

    #[cfg(test)]
    pub(crate) fn storage(&self) -> &Storage {
        &self.storage
    }
}

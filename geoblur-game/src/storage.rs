//! Persistence seam. The core only ever hands the platform opaque JSON blobs.
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::Infallible;
use std::rc::Rc;

use crate::error::PersistenceCorruption;
use crate::round::RoundState;
use crate::stats::PlayerStats;

/// Key/value blob store supplied by the platform.
pub trait GameStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the blob stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Store `blob` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn save(&self, key: &str, blob: &str) -> Result<(), Self::Error>;
}

impl<S: GameStorage + ?Sized> GameStorage for &S {
    type Error = S::Error;

    fn load(&self, key: &str) -> Result<Option<String>, Self::Error> {
        (**self).load(key)
    }

    fn save(&self, key: &str, blob: &str) -> Result<(), Self::Error> {
        (**self).save(key, blob)
    }
}

/// In-process store; clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blobs: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.blobs.borrow().get(key).cloned()
    }

    pub fn insert(&self, key: &str, blob: &str) {
        self.blobs
            .borrow_mut()
            .insert(key.to_string(), blob.to_string());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.blobs.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blobs.borrow().is_empty()
    }
}

impl GameStorage for MemoryStorage {
    type Error = Infallible;

    fn load(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.get(key))
    }

    fn save(&self, key: &str, blob: &str) -> Result<(), Self::Error> {
        self.insert(key, blob);
        Ok(())
    }
}

/// # Errors
///
/// Returns [`PersistenceCorruption`] if the blob is not a valid round.
pub fn decode_round(blob: &str) -> Result<RoundState, PersistenceCorruption> {
    decode(blob, "round state")
}

/// # Errors
///
/// Returns [`PersistenceCorruption`] if the blob is not valid statistics.
pub fn decode_stats(blob: &str) -> Result<PlayerStats, PersistenceCorruption> {
    decode(blob, "player stats")
}

fn decode<T: DeserializeOwned>(blob: &str, what: &'static str) -> Result<T, PersistenceCorruption> {
    serde_json::from_str(blob).map_err(|source| PersistenceCorruption { what, source })
}

/// Read and decode `key`. Missing, unreadable and corrupted blobs all read as
/// "nothing saved"; only the latter two are logged.
pub fn load_value<S, T>(storage: &S, key: &str, what: &'static str) -> Option<T>
where
    S: GameStorage + ?Sized,
    T: DeserializeOwned,
{
    let blob = match storage.load(key) {
        Ok(Some(blob)) => blob,
        Ok(None) => return None,
        Err(err) => {
            log::warn!("failed to read {what} from '{key}': {err}");
            return None;
        }
    };
    match decode(&blob, what) {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("discarding '{key}': {err}");
            None
        }
    }
}

/// Fire-and-forget write; failures are logged and swallowed.
pub fn save_value<S, T>(storage: &S, key: &str, value: &T)
where
    S: GameStorage + ?Sized,
    T: Serialize,
{
    let blob = match serde_json::to_string(value) {
        Ok(blob) => blob,
        Err(err) => {
            log::warn!("failed to encode '{key}': {err}");
            return;
        }
    };
    if let Err(err) = storage.save(key, &blob) {
        log::warn!("failed to persist '{key}': {err}");
    }
}

//! Store trait and typed load/save helpers
//!
//! Documents are written inside a small versioned [`Envelope`]. Reads accept
//! both enveloped documents and bare JSON values so data written by older or
//! newer builds still decodes; unknown fields are ignored by the caller's
//! serde types.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, StoreError};

/// Envelope version written by this build
pub const CURRENT_VERSION: u32 = 1;

/// Raw keyed storage backend
///
/// Implementations move opaque strings; encoding lives in [`StoreExt`].
pub trait LocalStore: Send + Sync {
    /// Read the raw document for `key`, `None` if the key was never written
    fn read_raw(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite the document for `key`
    fn write_raw(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;

    /// All keys currently stored, sorted
    fn keys(&self) -> Result<Vec<String>>;
}

/// Versioned wrapper around every stored document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub version: u32,
    /// Unix milliseconds of the write
    #[serde(rename = "savedAt")]
    pub saved_at: i64,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(data: T) -> Self {
        Self {
            version: CURRENT_VERSION,
            saved_at: chrono::Utc::now().timestamp_millis(),
            data,
        }
    }
}

/// Check that a key maps cleanly onto a file name
pub fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key.len() <= 128
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

/// Typed access on top of any [`LocalStore`]
pub trait StoreExt: LocalStore {
    /// Load and decode `key`, propagating backend and decode errors
    fn try_load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        debug!(%key, "try_load: called");
        let Some(raw) = self.read_raw(key)? else {
            debug!(%key, "try_load: key not present");
            return Ok(None);
        };
        decode(key, &raw).map(Some)
    }

    /// Load and decode `key`; any failure reads as "no saved data"
    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.try_load(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(%key, error = %e, "load: treating unreadable key as empty");
                None
            }
        }
    }

    /// Encode `value` in an envelope and write it under `key`
    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        debug!(%key, "save: called");
        let encoded = serde_json::to_string(&Envelope::new(value))?;
        self.write_raw(key, &encoded)
    }

    /// Whether `key` holds a readable document
    fn contains(&self, key: &str) -> bool {
        matches!(self.read_raw(key), Ok(Some(_)))
    }
}

impl<S: LocalStore + ?Sized> StoreExt for S {}

fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T> {
    let value: serde_json::Value = serde_json::from_str(raw)?;

    let is_envelope = value
        .as_object()
        .is_some_and(|obj| obj.contains_key("version") && obj.contains_key("data"));

    if is_envelope {
        let envelope: Envelope<serde_json::Value> = serde_json::from_value(value)?;
        if envelope.version > CURRENT_VERSION {
            warn!(%key, version = envelope.version, "decode: document written by a newer version");
        }
        Ok(serde_json::from_value(envelope.data)?)
    } else {
        debug!(%key, "decode: bare document without envelope");
        Ok(serde_json::from_value(value)?)
    }
}

//! Snapshot: the persisted form of a [`crate::ContextStore`].
//!
//! Written as pretty-printed JSON:
//!
//! ```json
//! {
//!   "version": 1,
//!   "created_at": "2026-01-01T00:00:00Z",
//!   "saved_at": "2026-01-01T00:05:00Z",
//!   "entries": [ { "role": "user", "content": "...", "timestamp": "...", "metadata": {} } ]
//! }
//! ```
//!
//! A bare JSON array of entries is also accepted on read. Read errors name
//! the offending field (`created_at`, `entries[3]`, ...).

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

use crate::entry::ContextEntry;
use crate::error::StoreError;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default = "default_version")]
    pub version: u32,

    /// When the store this snapshot came from was created
    pub created_at: DateTime<Utc>,

    /// When the snapshot was written
    pub saved_at: DateTime<Utc>,

    /// Ordered entries
    pub entries: Vec<ContextEntry>,
}

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

impl Snapshot {
    pub fn new(created_at: DateTime<Utc>, entries: Vec<ContextEntry>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            created_at,
            saved_at: Utc::now(),
            entries,
        }
    }

    /// Write this snapshot to `path`, creating parent directories.
    pub fn write(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Io {
                path: parent.to_path_buf(),
                reason: e.to_string(),
            })?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| StoreError::Snapshot {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        std::fs::write(path, json).map_err(|e| StoreError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        debug!(path = %path.display(), entries = self.entries.len(), "Snapshot written");
        Ok(())
    }

    /// Read a snapshot from `path`.
    pub fn read(path: &Path) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path).map_err(|e| StoreError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let invalid = |reason: String| StoreError::Snapshot {
            path: path.to_path_buf(),
            reason,
        };

        let value: Value = serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?;
        let snapshot = match value {
            Value::Object(map) => Self::from_object(map).map_err(invalid)?,
            Value::Array(items) => {
                debug!(path = %path.display(), "Reading bare entry array");
                Snapshot::new(Utc::now(), entries_from(items).map_err(invalid)?)
            }
            other => {
                return Err(invalid(format!(
                    "expected a snapshot object or an array of entries, found {}",
                    json_type(&other)
                )));
            }
        };

        if snapshot.version > SNAPSHOT_VERSION {
            return Err(StoreError::Snapshot {
                path: path.to_path_buf(),
                reason: format!(
                    "snapshot version {} is newer than supported version {SNAPSHOT_VERSION}",
                    snapshot.version
                ),
            });
        }

        Ok(snapshot)
    }

    /// Decode the full layout field by field so errors carry the field name.
    fn from_object(mut map: Map<String, Value>) -> Result<Self, String> {
        let version = match map.remove("version") {
            Some(value) => field(value, "version")?,
            None => SNAPSHOT_VERSION,
        };
        let created_at = field(required(&mut map, "created_at")?, "created_at")?;
        let saved_at = field(required(&mut map, "saved_at")?, "saved_at")?;
        let entries = match required(&mut map, "entries")? {
            Value::Array(items) => entries_from(items)?,
            other => {
                return Err(format!("entries: expected an array, found {}", json_type(&other)));
            }
        };

        Ok(Self {
            version,
            created_at,
            saved_at,
            entries,
        })
    }
}

fn required(map: &mut Map<String, Value>, name: &str) -> Result<Value, String> {
    map.remove(name).ok_or_else(|| format!("missing field `{name}`"))
}

fn field<T: DeserializeOwned>(value: Value, name: &str) -> Result<T, String> {
    serde_json::from_value(value).map_err(|e| format!("{name}: {e}"))
}

fn entries_from(items: Vec<Value>) -> Result<Vec<ContextEntry>, String> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| field(item, &format!("entries[{i}]")))
        .collect()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

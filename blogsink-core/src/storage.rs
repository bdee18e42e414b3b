//! The pluggable persistence collaborator.
//!
//! The store itself never performs I/O; persistence is a named-collection
//! contract the caller wires in, the way the original system swapped between
//! browser storage and static JSON documents.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde_json::Value;
use tracing::debug;

use crate::domain::error::DomainError;

pub trait Persistence {
    fn load(&self, collection: &str) -> Result<Vec<Value>, DomainError>;
    fn save(&self, collection: &str, records: &[Value]) -> Result<(), DomainError>;
}

/// One pretty-printed JSON document per collection under a data directory.
/// A missing document loads as an empty collection.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{collection}.json"))
    }
}

impl Persistence for JsonFileStorage {
    fn load(&self, collection: &str) -> Result<Vec<Value>, DomainError> {
        let path = self.path_for(collection);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(DomainError::Storage(format!(
                    "failed to read {}: {err}",
                    path.display()
                )));
            }
        };
        serde_json::from_str(&raw).map_err(|err| {
            DomainError::Storage(format!("failed to parse {}: {err}", path.display()))
        })
    }

    fn save(&self, collection: &str, records: &[Value]) -> Result<(), DomainError> {
        fs::create_dir_all(&self.dir).map_err(|err| {
            DomainError::Storage(format!("failed to create {}: {err}", self.dir.display()))
        })?;
        let path = self.path_for(collection);
        let raw = serde_json::to_string_pretty(records)
            .map_err(|err| DomainError::Storage(format!("failed to serialize records: {err}")))?;
        fs::write(&path, raw).map_err(|err| {
            DomainError::Storage(format!("failed to write {}: {err}", path.display()))
        })?;
        debug!(collection, records = records.len(), "saved collection");
        Ok(())
    }
}

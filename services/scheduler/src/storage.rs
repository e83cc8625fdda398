//! Durable store — serialized CRUD over one JSON-array file per collection
//!
//! Each collection (providers, appointments, audit log) lives in a single
//! human-readable JSON file that is rewritten in full on every mutation.
//! One mutex per collection is the sole gate to its file: every operation,
//! reads included, runs its whole load-modify-persist sequence inside that
//! critical section, so a concurrent reader can never observe a half-written
//! file and two writers can never interleave.
//!
//! Read-side corruption (truncated or hand-edited file) is treated as an
//! empty collection and logged; write-side I/O failures always propagate.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::io;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use types::records::Record;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A mutex-guarded, file-backed record collection.
pub struct JsonStore<T> {
    path: PathBuf,
    lock: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonStore<T>
where
    T: Record + Clone + Serialize + DeserializeOwned,
{
    /// Open a collection file, creating the file and its parent directory if
    /// absent.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        if !path.exists() {
            fs::write(&path, "[]")?;
        }
        Ok(Self {
            path,
            lock: Mutex::new(()),
            _marker: PhantomData,
        })
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load the collection. Caller must hold the collection mutex.
    fn load(&self) -> Result<Vec<T>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str(&raw) {
            Ok(items) => Ok(items),
            Err(e) => {
                // Corruption masks data loss, so it is worth a warning even
                // though the caller just sees an empty collection.
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "collection file failed to parse, treating as empty"
                );
                Ok(Vec::new())
            }
        }
    }

    /// Rewrite the whole collection file. Caller must hold the collection mutex.
    fn persist(&self, items: &[T]) -> Result<(), StoreError> {
        let body = serde_json::to_string_pretty(items)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        fs::write(&self.path, body)?;
        Ok(())
    }

    /// Next record id: one past the highest id ever assigned, so ids stay
    /// monotonic and are never reused after a deletion.
    fn next_id(items: &[T]) -> u64 {
        items.iter().filter_map(Record::id).max().unwrap_or(0) + 1
    }

    /// Read all records in insertion order.
    pub fn read(&self) -> Result<Vec<T>, StoreError> {
        let _guard = self.guard();
        self.load()
    }

    /// Append a record, assigning an id if the caller did not supply one.
    /// Returns the record as stored.
    pub fn add(&self, mut item: T) -> Result<T, StoreError> {
        let _guard = self.guard();
        let mut items = self.load()?;
        if item.id().is_none() {
            item.set_id(Self::next_id(&items));
        }
        items.push(item.clone());
        self.persist(&items)?;
        Ok(item)
    }

    /// Append a record unless an existing record conflicts with it.
    ///
    /// The conflict scan and the append run inside one critical section, so
    /// two concurrent calls for the same slot can never both pass the check.
    /// Returns `Ok(None)` when a conflicting record already exists.
    pub fn add_if_absent(
        &self,
        mut item: T,
        conflicts_with: impl Fn(&T) -> bool,
    ) -> Result<Option<T>, StoreError> {
        let _guard = self.guard();
        let mut items = self.load()?;
        if items.iter().any(conflicts_with) {
            return Ok(None);
        }
        if item.id().is_none() {
            item.set_id(Self::next_id(&items));
        }
        items.push(item.clone());
        self.persist(&items)?;
        Ok(Some(item))
    }

    /// Merge the given JSON object into the first record with a matching id.
    /// Returns whether a record was found (the file is rewritten only then).
    pub fn update(&self, id: u64, changes: &Value) -> Result<bool, StoreError> {
        let _guard = self.guard();
        let mut items = self.load()?;
        let Some(index) = items.iter().position(|item| item.id() == Some(id)) else {
            return Ok(false);
        };
        let mut merged = serde_json::to_value(&items[index])
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        if let (Value::Object(target), Value::Object(fields)) = (&mut merged, changes) {
            for (k, v) in fields {
                target.insert(k.clone(), v.clone());
            }
        }
        items[index] =
            serde_json::from_value(merged).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.persist(&items)?;
        Ok(true)
    }

    /// Remove the record with the given id. Returns whether a deletion
    /// occurred (the file is rewritten only then).
    pub fn delete(&self, id: u64) -> Result<bool, StoreError> {
        let _guard = self.guard();
        let mut items = self.load()?;
        let before = items.len();
        items.retain(|item| item.id() != Some(id));
        if items.len() == before {
            return Ok(false);
        }
        self.persist(&items)?;
        Ok(true)
    }

    /// Remove every record matching the predicate in one filter-and-rewrite
    /// pass. Returns the removed records.
    pub fn delete_where(&self, matches: impl Fn(&T) -> bool) -> Result<Vec<T>, StoreError> {
        let _guard = self.guard();
        let mut items = self.load()?;
        let mut removed = Vec::new();
        items.retain(|item| {
            if matches(item) {
                removed.push(item.clone());
                false
            } else {
                true
            }
        });
        if !removed.is_empty() {
            self.persist(&items)?;
        }
        Ok(removed)
    }
}

//! Storage layer for roster.
//!
//! This module provides the record store: the authoritative in-memory list of
//! people and its mirror in a single JSON file.
//!
//! Every mutation serializes the whole list and overwrites the file in place.
//! That is O(records) per write and not crash-safe: a crash mid-write can
//! leave a truncated file. Both are accepted limits for small rosters.
//!
//! The write is a blocking `std::fs::write`. The server calls it from an async
//! handler while holding the store's write lock, so one slow disk write stalls
//! a runtime worker and queues every other request behind it. For files of a
//! few thousand records that is well under a millisecond.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::person::{NewPerson, Person};

/// Record store for people.
///
/// Provides persistent storage with support for:
/// - Lookup by id
/// - Appending with store-assigned ids
/// - Replacement and removal by id
/// - Whole-file persistence after every mutation
#[derive(Debug)]
pub struct PersonStore {
    /// Path to the backing file.
    path: PathBuf,
    /// Records in insertion order.
    people: Vec<Person>,
    /// Pretty-print the backing file.
    pretty: bool,
}

impl PersonStore {
    /// Load the store from an existing backing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, or not a JSON
    /// array of people.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        debug!("Loading people from {}", path.display());
        let bytes = std::fs::read(&path).map_err(|source| Error::StoreRead {
            path: path.clone(),
            source,
        })?;
        let people: Vec<Person> =
            serde_json::from_slice(&bytes).map_err(|source| Error::StoreParse {
                path: path.clone(),
                source,
            })?;

        warn_on_duplicate_ids(&people);

        info!("Loaded {} people from {}", people.len(), path.display());
        Ok(Self {
            path,
            people,
            pretty: true,
        })
    }

    /// Create a new backing file holding `people` and return the store.
    ///
    /// Creates the parent directories if they don't exist. An existing file
    /// at `path` is overwritten.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories or the file cannot be written.
    pub fn create(path: impl AsRef<Path>, people: Vec<Person>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let store = Self {
            path,
            people,
            pretty: true,
        };
        store.persist()?;
        info!(
            "Created people file at {} with {} people",
            store.path.display(),
            store.people.len()
        );
        Ok(store)
    }

    /// Choose between pretty-printed and compact JSON for future writes.
    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Get the path to the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records in store order.
    #[must_use]
    pub fn people(&self) -> &[Person] {
        &self.people
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.people.len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    /// Find a person by id.
    ///
    /// If ids were ever duplicated, the first match in store order wins.
    #[must_use]
    pub fn find_by_id(&self, id: i64) -> Option<&Person> {
        self.people.iter().find(|p| p.id == id)
    }

    /// The id the next added person will receive: one past the largest id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyStore`] when there is no id to continue from.
    pub fn next_id(&self) -> Result<i64> {
        let max = self
            .people
            .iter()
            .map(|p| p.id)
            .max()
            .ok_or(Error::EmptyStore)?;
        max.checked_add(1)
            .ok_or_else(|| Error::internal(format!("person id space exhausted after {max}")))
    }

    /// Add a person, assigning the next id, and persist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyStore`] if the store is empty, or an error if
    /// the backing file cannot be written. On error the store is unchanged.
    pub fn add(&mut self, candidate: NewPerson) -> Result<Person> {
        let person = candidate.with_id(self.next_id()?);

        let mut next = self.people.clone();
        next.push(person.clone());
        self.commit(next)?;

        debug!("Added person with id {}", person.id);
        Ok(person)
    }

    /// Replace the person with `id`, and persist.
    ///
    /// The old record is removed and the new one appended, so the replaced
    /// person moves to the end of the store order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no person has `id`, or an error if the
    /// backing file cannot be written. On error the store is unchanged.
    pub fn replace(&mut self, id: i64, candidate: NewPerson) -> Result<Person> {
        let index = self.position(id)?;
        let person = candidate.with_id(id);

        let mut next = self.people.clone();
        next.remove(index);
        next.push(person.clone());
        self.commit(next)?;

        debug!("Replaced person with id {}", id);
        Ok(person)
    }

    /// Remove the person with `id`, and persist. Returns the removed record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no person has `id`, or an error if the
    /// backing file cannot be written. On error the store is unchanged.
    pub fn remove(&mut self, id: i64) -> Result<Person> {
        let index = self.position(id)?;

        let mut next = self.people.clone();
        let removed = next.remove(index);
        self.commit(next)?;

        debug!("Removed person with id {}", id);
        Ok(removed)
    }

    /// Overwrite the backing file with the current records.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn persist(&self) -> Result<()> {
        write_people(&self.path, &self.people, self.pretty)
    }

    /// Get store statistics.
    #[must_use]
    pub fn stats(&self) -> StoreStats {
        let file_size_bytes = std::fs::metadata(&self.path).map_or(0, |m| m.len());

        StoreStats {
            total_people: self.people.len(),
            next_id: self.next_id().ok(),
            file_size_bytes,
        }
    }

    fn position(&self, id: i64) -> Result<usize> {
        self.people
            .iter()
            .position(|p| p.id == id)
            .ok_or(Error::NotFound { id })
    }

    /// Write `next` to disk, then install it. A failed write leaves memory
    /// untouched so memory and file never disagree after a returned call.
    fn commit(&mut self, next: Vec<Person>) -> Result<()> {
        write_people(&self.path, &next, self.pretty)?;
        self.people = next;
        Ok(())
    }
}

/// Statistics about the store.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StoreStats {
    /// Total number of people stored.
    pub total_people: usize,
    /// Id the next added person would receive.
    pub next_id: Option<i64>,
    /// Size of the backing file in bytes.
    pub file_size_bytes: u64,
}

fn write_people(path: &Path, people: &[Person], pretty: bool) -> Result<()> {
    let bytes = if pretty {
        serde_json::to_vec_pretty(people)?
    } else {
        serde_json::to_vec(people)?
    };

    std::fs::write(path, bytes).map_err(|source| Error::StoreWrite {
        path: path.to_path_buf(),
        source,
    })?;

    debug!("Wrote {} people to {}", people.len(), path.display());
    Ok(())
}

fn warn_on_duplicate_ids(people: &[Person]) {
    let mut seen = HashSet::with_capacity(people.len());
    for person in people {
        if !seen.insert(person.id) {
            warn!(
                id = person.id,
                "Duplicate person id in people file; lookups return the first"
            );
        }
    }
}

//! Core person types for roster.
//!
//! This module defines the record kept in the backing file and the candidate
//! a caller supplies when adding or replacing a record.

use serde::{Deserialize, Deserializer, Serialize};

/// A person record.
///
/// Identity is `id`; the store assigns it and keeps it unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Identifier assigned by the store.
    pub id: i64,

    /// Display name, matched fuzzily by search.
    pub name: String,

    /// Age in years.
    #[serde(deserialize_with = "deserialize_age")]
    pub age: u32,

    /// Free-form gender label.
    pub gender: String,
}

/// The caller-supplied fields of a person, without an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPerson {
    /// Display name.
    pub name: String,

    /// Age in years.
    #[serde(deserialize_with = "deserialize_age")]
    pub age: u32,

    /// Free-form gender label.
    pub gender: String,
}

impl NewPerson {
    /// Create a new candidate.
    #[must_use]
    pub fn new(name: impl Into<String>, age: u32, gender: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            age,
            gender: gender.into(),
        }
    }

    /// Turn this candidate into a full record with the given id.
    #[must_use]
    pub fn with_id(self, id: i64) -> Person {
        Person {
            id,
            name: self.name,
            age: self.age,
            gender: self.gender,
        }
    }
}

/// Body of a replace request.
///
/// The id is optional here so the HTTP layer can decide whether it is
/// required (`/changeperson`) or must agree with the path (`/person/{id}`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PersonUpdate {
    /// Id of the record to replace, if given in the body.
    #[serde(default)]
    pub id: Option<i64>,

    /// Replacement fields.
    #[serde(flatten)]
    pub person: NewPerson,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AgeRepr {
    Number(u32),
    Text(String),
}

/// Accept `age` as either a JSON number or a numeric string.
///
/// Older files store age as text (`"30"`); it is normalized to an integer so
/// that age filters compare like with like.
fn deserialize_age<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match AgeRepr::deserialize(deserializer)? {
        AgeRepr::Number(age) => Ok(age),
        AgeRepr::Text(text) => text.trim().parse().map_err(|_| {
            serde::de::Error::custom(format!("age must be a non-negative integer, got {text:?}"))
        }),
    }
}

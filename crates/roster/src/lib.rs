//! `roster` - person records over HTTP with fuzzy search
//!
//! This library provides a file-backed record store for people, a query
//! engine that filters by exact age and fuzzy name, and the axum router that
//! exposes both.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod person;
pub mod query;
pub mod server;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use person::{NewPerson, Person, PersonUpdate};
pub use query::{search, SearchFilter, SearchOutcome};
pub use server::{router, AppState};
pub use storage::{PersonStore, StoreStats};

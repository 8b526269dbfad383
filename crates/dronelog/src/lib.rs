//! `dronelog` - A local journal for drone-flight observations
//!
//! This library provides the observation log store (a single JSON blob in a
//! key-value store), the record model, the camera and location capability
//! contracts, and the view models the `dronelog` binary drives.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod capability;
pub mod cli;
pub mod config;
pub mod draft;
pub mod error;
pub mod journal;
pub mod kv;
pub mod log_store;
pub mod logging;
pub mod record;

pub use capability::{Camera, FixedLocation, LocationProvider, Permission, PhotoImportCamera};
pub use config::Config;
pub use draft::NewObservation;
pub use error::{Capability, Error, Result};
pub use journal::JournalView;
pub use kv::{KeyValueStore, MemoryStore, SqliteStore};
pub use log_store::{ObservationLog, DEFAULT_LOG_KEY};
pub use logging::init_logging;
pub use record::{Location, ObservationRecord};

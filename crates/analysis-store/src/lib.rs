//! Persistence for saved analyses and the risk-disclosure acknowledgement.
//!
//! Everything sits on top of a [`KeyValueStore`](valuation_core::KeyValueStore):
//! an in-memory map for tests and ephemeral sessions, or one JSON file per key
//! in a data directory.

pub mod disclaimer;
pub mod file;
pub mod memory;
pub mod saved;

pub use disclaimer::{DisclaimerGate, DisclaimerStatus, DISCLAIMER_KEY};
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use saved::{SavedAnalyses, DEFAULT_CAPACITY, SAVED_ANALYSES_KEY};

//! # sv-store
//!
//! RocksDB-backed implementation of the agent's [`sv_agent::ValidatorStore`]
//! port.
//!
//! ## Layout
//!
//! Two column families:
//! - `validators` - bincode-encoded [`shared_types::ValidatorRecord`], keyed
//!   by the 32-byte chain public key
//! - `rand_pairs` - bincode-encoded [`shared_types::SchnorrRandPair`], keyed
//!   by chain public key followed by the big-endian height
//!
//! The store is driven by a single writer (the agent's event loop), so it
//! needs no locking of its own; it only guarantees read-your-writes for
//! that writer and the exactly-once semantics for randomness pairs.

mod rocks;

pub use rocks::{RocksDbConfig, RocksDbStore, CF_RAND_PAIRS, CF_VALIDATORS};

//! # Shared Types Crate
//!
//! This crate contains all domain entities shared between the agent crates.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type that crosses a crate boundary
//!   (validator records, randomness pairs, block info, transaction handles)
//!   is defined here.
//! - **Durable Encoding**: all entities derive `Serialize`/`Deserialize` so
//!   the store can persist them with `bincode` without bespoke codecs.

pub mod entities;

pub use entities::*;

//! # StakeVigil Test Suite
//!
//! Unified test crate containing cross-crate integration scenarios:
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── lifecycle.rs   # create → register → commit → vote flows
//!     └── reactors.rs    # jury and validator reactor behavior
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p sv-tests
//! cargo test -p sv-tests integration::lifecycle
//! ```

pub mod integration;

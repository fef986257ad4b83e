//! # sv-agent
//!
//! Core of the StakeVigil validator agent: the central event loop, the
//! chain-submission serializer, and the periodic reactors that drive them.
//!
//! ## Overview
//!
//! The agent manages validator identities for a Bitcoin-anchored
//! proof-of-stake protocol:
//! - **Finality votes**: one EOTS signature per managed validator per
//!   observed consensus block
//! - **Randomness commitments**: ranges of one-time public randomness kept
//!   ahead of the chain tip
//! - **Jury countersignatures**: pending Bitcoin staking delegations are
//!   countersigned on a fixed interval
//!
//! ## Architecture
//!
//! ```text
//! callers ──AppRequest──→ Event Loop ──────┐
//!    │                        ↑            │ (registration intents)
//!    │                 CompletionEvent     ▼
//!    └──SubmissionRequest──→ Submission Serializer ──→ Chain Client
//!
//! Jury Reactor (interval)      ──┐
//! Validator Reactor (blocks +    ├──→ same request paths as callers
//!                    interval) ──┘
//! ```
//!
//! The event loop is the sole owner of the validator store; the serializer
//! guarantees a total FIFO order over every transaction leaving the
//! process; each request carries exactly one single-use reply slot.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sv_agent::{AgentConfig, ValidatorApp, ValidatorApi};
//!
//! let app = ValidatorApp::start(AgentConfig::default(), store, signer, chain, dels, block_rx);
//! let handle = app.handle();
//!
//! handle.create_validator(chain_pk, btc_pk, pop).await?;
//! let tx = handle.register_validator(chain_pk).await?;
//! ```

pub mod config;
pub mod error;
pub mod events;
mod event_loop;
pub mod handle;
pub mod ports;
mod reactors;
pub mod service;
mod submission;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::AgentConfig;
pub use error::{AgentError, AgentResult, ChainClientError, StoreError};
pub use events::CreateValidatorResponse;
pub use handle::AppHandle;
pub use ports::inbound::ValidatorApi;
pub use ports::outbound::{ChainClient, DelegationProvider, EotsSigner, ValidatorStore};
pub use service::ValidatorApp;

/// Randomness pairs generated per commit transaction.
pub const DEFAULT_NUM_PUB_RAND: u64 = 100;

/// Commit fresh randomness once committed headroom over the chain tip drops
/// below this many heights.
pub const DEFAULT_MIN_RAND_HEIGHT_GAP: u64 = 20;

/// Submission queue capacity before senders apply backpressure.
pub const DEFAULT_SUBMISSION_QUEUE_CAPACITY: usize = 1000;

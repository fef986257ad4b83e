//! Ports (hexagonal boundaries) of the agent.
//!
//! - `inbound`: the caller-facing API fulfilled by the event loop.
//! - `outbound`: the external collaborators the agent drives (store, EOTS
//!   signer, chain clients, delegation source).

pub mod inbound;
pub mod outbound;

pub use inbound::ValidatorApi;
pub use outbound::{ChainClient, DelegationProvider, EotsSigner, ValidatorStore};

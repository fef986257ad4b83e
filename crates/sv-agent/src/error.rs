//! Error types for the validator agent

use shared_types::ChainPublicKey;
use thiserror::Error;

/// Errors surfaced by the validator store.
///
/// `Backend` and `Codec` always escalate to a process-fatal fault at the
/// event loop; `RandPairConflict` signals an attempted overwrite of one-time
/// randomness with different material, which is equally fatal.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A randomness pair already exists for this height with different material
    #[error("randomness pair for height {height} already committed with different material")]
    RandPairConflict { height: u64 },

    /// Underlying key/value backend failure
    #[error("storage backend failure: {reason}")]
    Backend { reason: String },

    /// Record could not be encoded or decoded
    #[error("storage codec failure: {reason}")]
    Codec { reason: String },
}

/// Chain client errors, classified per the submission contract.
#[derive(Debug, Error)]
pub enum ChainClientError {
    /// Transient remote failure; the caller may resubmit
    #[error("transient chain error: {0}")]
    Transient(String),

    /// The chain rejected the transaction; resubmitting the same payload will fail again
    #[error("chain rejected transaction: {0}")]
    Rejected(String),
}

/// Validator agent errors
#[derive(Debug, Error)]
pub enum AgentError {
    /// A validator with this identity already exists
    #[error("validator {chain_pk} already exists")]
    DuplicateValidator { chain_pk: ChainPublicKey },

    /// No validator with this identity is managed by the agent
    #[error("validator {chain_pk} not found")]
    ValidatorNotFound { chain_pk: ChainPublicKey },

    /// The validator is in the wrong lifecycle status for this operation
    #[error("validator {chain_pk} has status {actual}, expected {expected}")]
    InvalidStatus {
        chain_pk: ChainPublicKey,
        expected: String,
        actual: String,
    },

    /// No committed randomness covers the requested height
    #[error("validator {chain_pk} has no committed randomness for height {height}")]
    NoCommittedRandomness { chain_pk: ChainPublicKey, height: u64 },

    /// A chain submission or query failed
    #[error("chain submission failed: {0}")]
    ChainSubmission(#[from] ChainClientError),

    /// The current chain tip could not be determined; voting without knowing
    /// the chain height is unsafe
    #[error("cannot determine chain tip: {0}")]
    TipQuery(ChainClientError),

    /// The EOTS signer failed to produce randomness or a signature
    #[error("eots signer failure: {reason}")]
    Signer { reason: String },

    /// Durable storage failed; in-memory and persisted state may have diverged
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),

    /// In-memory and durable validator state have diverged
    #[error("consistency fault: {reason}")]
    ConsistencyFault { reason: String },

    /// The agent is shutting down; the request was abandoned
    #[error("agent is shutting down")]
    Shutdown,
}

impl AgentError {
    /// Whether this error must terminate the process.
    ///
    /// Storage and consistency faults mean validator state is no longer
    /// trustworthy; a failed tip query means the agent cannot know which
    /// heights are safe to sign. Continuing in either case risks signing
    /// with, or reporting success for, state that cannot be relied on.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Storage(_) | Self::ConsistencyFault { .. } | Self::TipQuery(_)
        )
    }
}

/// Result type for agent operations
pub type AgentResult<T> = Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(AgentError::ConsistencyFault {
            reason: "x".into()
        }
        .is_fatal());
        assert!(AgentError::Storage(StoreError::Backend {
            reason: "io".into()
        })
        .is_fatal());
        assert!(AgentError::TipQuery(ChainClientError::Transient("down".into())).is_fatal());
        assert!(!AgentError::Shutdown.is_fatal());
        assert!(!AgentError::ChainSubmission(ChainClientError::Transient("seq".into())).is_fatal());
        assert!(!AgentError::DuplicateValidator {
            chain_pk: ChainPublicKey([1; 32])
        }
        .is_fatal());
    }
}

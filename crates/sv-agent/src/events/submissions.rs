//! Requests drained one at a time by the submission serializer.
//!
//! Strict FIFO across all variants; the serializer performs the chain call
//! and either writes a failure straight to the reply slot or emits the
//! matching [`super::CompletionEvent`] into the event loop.

use super::TxReply;
use shared_types::{
    BtcPublicKey, ChainPublicKey, Hash, ProofOfPossession, SchnorrRandPair, SchnorrSignature,
};

/// An outbound consensus-chain transaction awaiting serialization.
#[derive(Debug)]
pub enum SubmissionRequest {
    /// Register a created validator on the consensus chain.
    RegisterValidator {
        chain_pk: ChainPublicKey,
        btc_pk: BtcPublicKey,
        pop: ProofOfPossession,
        reply: TxReply,
    },

    /// Submit a finality signature for one block.
    SubmitFinalitySig {
        chain_pk: ChainPublicKey,
        btc_pk: BtcPublicKey,
        height: u64,
        last_commit_hash: Hash,
        sig: SchnorrSignature,
        reply: TxReply,
    },

    /// Commit a contiguous range of public randomness.
    ///
    /// Carries the full secret/public pairs: only the public halves go to
    /// the chain, the pairs travel on to the event loop for persistence.
    CommitPubRand {
        chain_pk: ChainPublicKey,
        btc_pk: BtcPublicKey,
        start_height: u64,
        pairs: Vec<SchnorrRandPair>,
        sig: SchnorrSignature,
        reply: TxReply,
    },

    /// Countersign a pending Bitcoin delegation on behalf of a validator.
    SubmitJurySig {
        validator_btc_pk: BtcPublicKey,
        del_btc_pk: BtcPublicKey,
        sig: SchnorrSignature,
        reply: TxReply,
    },
}

impl SubmissionRequest {
    /// Short operation name for log context.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RegisterValidator { .. } => "register_validator",
            Self::SubmitFinalitySig { .. } => "submit_finality_sig",
            Self::CommitPubRand { .. } => "commit_pub_rand",
            Self::SubmitJurySig { .. } => "submit_jury_sig",
        }
    }
}

//! Completion events emitted by the submission serializer.
//!
//! Exactly one completion is emitted per successful chain call, carrying
//! the payload the event loop needs to update durable state, the accepted
//! transaction handle, and the original caller's reply slot.

use super::TxReply;
use shared_types::{ChainPublicKey, SchnorrRandPair, TxHandle};

/// A chain call finished; the event loop owns the rest of the request.
#[derive(Debug)]
pub enum CompletionEvent {
    /// The registration transaction was accepted.
    ValidatorRegistered {
        chain_pk: ChainPublicKey,
        tx: TxHandle,
        reply: TxReply,
    },

    /// A finality signature was accepted for `height`.
    FinalitySigAdded {
        chain_pk: ChainPublicKey,
        height: u64,
        tx: TxHandle,
        reply: TxReply,
    },

    /// A public-randomness commitment was accepted for
    /// `[start_height, start_height + pairs.len())`.
    PubRandCommitted {
        chain_pk: ChainPublicKey,
        start_height: u64,
        pairs: Vec<SchnorrRandPair>,
        tx: TxHandle,
        reply: TxReply,
    },

    /// A jury countersignature was accepted.
    ///
    /// Deliberately carries no validator identity to mutate: jury signing is
    /// performed on behalf of a Bitcoin delegation, not the validator's own
    /// vote history.
    JurySigAdded { tx: TxHandle, reply: TxReply },
}

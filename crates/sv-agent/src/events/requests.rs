//! Requests handled directly by the event loop.
//!
//! These are the operations that read or mutate validator state without a
//! chain round-trip first: creation, registration intents, and state reads.
//! Everything that must touch the chain goes through
//! [`super::submissions::SubmissionRequest`] instead.

use super::TxReply;
use crate::error::AgentError;
use shared_types::{BtcPublicKey, ChainPublicKey, ProofOfPossession, ValidatorRecord};
use tokio::sync::oneshot;

/// Request to create a new managed validator identity.
#[derive(Debug)]
pub struct CreateValidatorRequest {
    pub chain_pk: ChainPublicKey,
    pub btc_pk: BtcPublicKey,
    pub pop: ProofOfPossession,
    pub reply: oneshot::Sender<Result<CreateValidatorResponse, AgentError>>,
}

/// Reply payload for a successful create.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateValidatorResponse {
    pub chain_pk: ChainPublicKey,
}

/// Intent to register an already-created validator on the consensus chain.
///
/// The event loop validates the record and forwards a registration
/// submission carrying this same reply slot; the caller is answered only
/// after the chain call completes and the status change is durable.
#[derive(Debug)]
pub struct RegisterValidatorRequest {
    pub chain_pk: ChainPublicKey,
    pub reply: TxReply,
}

/// All requests accepted by the event loop.
#[derive(Debug)]
pub enum AppRequest {
    CreateValidator(CreateValidatorRequest),
    RegisterValidator(RegisterValidatorRequest),
    /// Read all managed validator records.
    ListValidators {
        reply: oneshot::Sender<Result<Vec<ValidatorRecord>, AgentError>>,
    },
    /// Read a single validator record by identity.
    GetValidator {
        chain_pk: ChainPublicKey,
        reply: oneshot::Sender<Result<ValidatorRecord, AgentError>>,
    },
}

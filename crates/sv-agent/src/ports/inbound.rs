//! Driving Port (caller-facing API)

use crate::error::AgentResult;
use crate::events::CreateValidatorResponse;
use async_trait::async_trait;
use shared_types::{
    BlockInfo, BtcDelegation, BtcPublicKey, ChainPublicKey, ProofOfPossession, TxHandle,
    ValidatorRecord,
};

/// The only synchronous boundary visible to users.
///
/// Each operation sends one request with a dedicated reply slot into the
/// agent loops and resolves once that slot is written: either a transaction
/// handle (or created identity) or a typed error. Exactly one reply per
/// request, except when the process dies on a fatal fault first - callers
/// apply their own timeouts to detect that.
#[async_trait]
pub trait ValidatorApi: Send + Sync {
    /// Create a validator identity in `Created` status. No chain interaction.
    async fn create_validator(
        &self,
        chain_pk: ChainPublicKey,
        btc_pk: BtcPublicKey,
        pop: ProofOfPossession,
    ) -> AgentResult<CreateValidatorResponse>;

    /// Register a created validator on the consensus chain.
    async fn register_validator(&self, chain_pk: ChainPublicKey) -> AgentResult<TxHandle>;

    /// Commit fresh public randomness for a validator.
    ///
    /// Returns `Ok(None)` when committed headroom over the chain tip is
    /// already sufficient and nothing was submitted.
    async fn commit_randomness(&self, chain_pk: ChainPublicKey) -> AgentResult<Option<TxHandle>>;

    /// Sign and submit a finality vote for one block.
    async fn submit_finality_signature(
        &self,
        chain_pk: ChainPublicKey,
        block: BlockInfo,
    ) -> AgentResult<TxHandle>;

    /// Countersign one pending Bitcoin delegation.
    async fn submit_jury_signature(&self, delegation: BtcDelegation) -> AgentResult<TxHandle>;

    /// All managed validator records.
    async fn list_validators(&self) -> AgentResult<Vec<ValidatorRecord>>;

    /// One managed validator record.
    async fn get_validator(&self, chain_pk: ChainPublicKey) -> AgentResult<ValidatorRecord>;
}

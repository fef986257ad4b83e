//! Driven Ports (outbound dependencies)

use crate::error::{ChainClientError, StoreError};
use async_trait::async_trait;
use shared_types::{
    BlockInfo, BtcDelegation, BtcPublicKey, ChainPublicKey, Hash, ProofOfPossession,
    SchnorrRandPair, SchnorrSignature, TxHandle, ValidatorRecord,
};

/// Durable keyed storage for validator identities and committed randomness.
///
/// Accessed exclusively from the event loop task; implementations therefore
/// need no locking discipline of their own, only read-your-writes
/// consistency for that single writer.
pub trait ValidatorStore: Send {
    /// Fetch a validator record by identity.
    fn get_validator(&self, chain_pk: &ChainPublicKey)
        -> Result<Option<ValidatorRecord>, StoreError>;

    /// Persist (insert or update) a validator record.
    fn save_validator(&mut self, record: &ValidatorRecord) -> Result<(), StoreError>;

    /// All managed validator records.
    fn list_validators(&self) -> Result<Vec<ValidatorRecord>, StoreError>;

    /// Persist one randomness pair for `(chain_pk, height)`.
    ///
    /// Exactly-once semantics: saving an identical pair again is a no-op;
    /// saving different material for an existing height must fail with
    /// [`StoreError::RandPairConflict`], never overwrite.
    fn save_rand_pair(
        &mut self,
        chain_pk: &ChainPublicKey,
        height: u64,
        pair: &SchnorrRandPair,
    ) -> Result<(), StoreError>;

    /// Fetch the randomness pair committed for `(chain_pk, height)`.
    fn get_rand_pair(
        &self,
        chain_pk: &ChainPublicKey,
        height: u64,
    ) -> Result<Option<SchnorrRandPair>, StoreError>;
}

/// Extractable one-time-signature manager.
///
/// No retry built in; callers handle failure.
#[async_trait]
pub trait EotsSigner: Send + Sync {
    /// Generate one secret/public randomness pair per height in
    /// `[start_height, start_height + count)`.
    async fn generate_rand_range(
        &self,
        chain_pk: &ChainPublicKey,
        start_height: u64,
        count: u64,
    ) -> Result<Vec<SchnorrRandPair>, String>;

    /// Produce a finality signature over `(height, last_commit_hash)`,
    /// consuming the one-time randomness for that height.
    async fn sign_finality(
        &self,
        chain_pk: &ChainPublicKey,
        height: u64,
        last_commit_hash: &Hash,
    ) -> Result<SchnorrSignature, String>;

    /// Sign a public-randomness commitment for the chain transaction.
    async fn sign_pub_rand_commit(
        &self,
        chain_pk: &ChainPublicKey,
        start_height: u64,
        pub_rands: &[[u8; 32]],
    ) -> Result<SchnorrSignature, String>;

    /// Countersign a pending Bitcoin delegation with the jury key.
    async fn sign_jury(
        &self,
        validator_btc_pk: &BtcPublicKey,
        delegation: &BtcDelegation,
    ) -> Result<SchnorrSignature, String>;
}

/// Consensus-chain client.
///
/// All calls are synchronous from the serializer's perspective; failures are
/// classified transient or rejected by [`ChainClientError`].
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Submit the registration transaction for a validator.
    async fn register_validator(
        &self,
        chain_pk: &ChainPublicKey,
        btc_pk: &BtcPublicKey,
        pop: &ProofOfPossession,
    ) -> Result<TxHandle, ChainClientError>;

    /// Submit a finality signature for one block.
    async fn submit_finality_sig(
        &self,
        btc_pk: &BtcPublicKey,
        height: u64,
        last_commit_hash: &Hash,
        sig: &SchnorrSignature,
    ) -> Result<TxHandle, ChainClientError>;

    /// Commit a list of public randomness values starting at `start_height`.
    async fn commit_pub_rand_list(
        &self,
        btc_pk: &BtcPublicKey,
        start_height: u64,
        pub_rands: &[[u8; 32]],
        sig: &SchnorrSignature,
    ) -> Result<TxHandle, ChainClientError>;

    /// Submit a jury countersignature over a Bitcoin delegation.
    async fn submit_jury_sig(
        &self,
        validator_btc_pk: &BtcPublicKey,
        del_btc_pk: &BtcPublicKey,
        sig: &SchnorrSignature,
    ) -> Result<TxHandle, ChainClientError>;

    /// Best (tip) block currently known to the chain.
    async fn best_block(&self) -> Result<BlockInfo, ChainClientError>;
}

/// Source of pending Bitcoin delegations awaiting jury countersignature.
#[async_trait]
pub trait DelegationProvider: Send + Sync {
    /// Pending delegations across all managed validators.
    async fn pending_delegations(&self) -> Result<Vec<BtcDelegation>, ChainClientError>;
}

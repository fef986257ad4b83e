//! Mock ports and fixtures shared by the unit tests and the workspace test
//! suite (enabled with the `test-utils` feature).

use crate::error::{ChainClientError, StoreError};
use crate::ports::outbound::{ChainClient, DelegationProvider, EotsSigner, ValidatorStore};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{
    BlockInfo, BtcDelegation, BtcPublicKey, ChainPublicKey, Hash, ProofOfPossession,
    SchnorrRandPair, SchnorrSignature, TxHandle, ValidatorRecord,
};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

pub fn new_chain_pk(tag: u8) -> ChainPublicKey {
    ChainPublicKey([tag; 32])
}

fn digest32(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// HashMap-backed store with the exactly-once randomness semantics.
#[derive(Default)]
pub struct InMemoryStore {
    validators: HashMap<ChainPublicKey, ValidatorRecord>,
    rand_pairs: HashMap<(ChainPublicKey, u64), SchnorrRandPair>,
}

impl ValidatorStore for InMemoryStore {
    fn get_validator(
        &self,
        chain_pk: &ChainPublicKey,
    ) -> Result<Option<ValidatorRecord>, StoreError> {
        Ok(self.validators.get(chain_pk).cloned())
    }

    fn save_validator(&mut self, record: &ValidatorRecord) -> Result<(), StoreError> {
        self.validators.insert(record.chain_pk, record.clone());
        Ok(())
    }

    fn list_validators(&self) -> Result<Vec<ValidatorRecord>, StoreError> {
        Ok(self.validators.values().cloned().collect())
    }

    fn save_rand_pair(
        &mut self,
        chain_pk: &ChainPublicKey,
        height: u64,
        pair: &SchnorrRandPair,
    ) -> Result<(), StoreError> {
        match self.rand_pairs.get(&(*chain_pk, height)) {
            Some(existing) if existing == pair => Ok(()),
            Some(_) => Err(StoreError::RandPairConflict { height }),
            None => {
                self.rand_pairs.insert((*chain_pk, height), *pair);
                Ok(())
            }
        }
    }

    fn get_rand_pair(
        &self,
        chain_pk: &ChainPublicKey,
        height: u64,
    ) -> Result<Option<SchnorrRandPair>, StoreError> {
        Ok(self.rand_pairs.get(&(*chain_pk, height)).copied())
    }
}

/// Chain client that records every call in arrival order.
pub struct RecordingChainClient {
    /// (operation name, height or 0) per call, in the order observed.
    calls: Mutex<Vec<(&'static str, u64)>>,
    fail_next: Mutex<Option<ChainClientError>>,
    fail_jury: AtomicBool,
    fail_best_block: AtomicBool,
    tip: Mutex<BlockInfo>,
    committed: Mutex<Vec<[u8; 32]>>,
    tx_counter: AtomicU64,
}

impl Default for RecordingChainClient {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_next: Mutex::new(None),
            fail_jury: AtomicBool::new(false),
            fail_best_block: AtomicBool::new(false),
            tip: Mutex::new(BlockInfo {
                height: 0,
                last_commit_hash: [0; 32],
            }),
            committed: Mutex::new(Vec::new()),
            tx_counter: AtomicU64::new(0),
        }
    }
}

impl RecordingChainClient {
    pub fn calls(&self) -> Vec<(&'static str, u64)> {
        self.calls.lock().clone()
    }

    /// Fail the next submission with `err`, whatever its type.
    pub fn fail_next(&self, err: ChainClientError) {
        *self.fail_next.lock() = Some(err);
    }

    /// Fail every jury submission while set.
    pub fn set_fail_jury(&self, fail: bool) {
        self.fail_jury.store(fail, Ordering::SeqCst);
    }

    /// Fail tip queries while set.
    pub fn set_fail_best_block(&self, fail: bool) {
        self.fail_best_block.store(fail, Ordering::SeqCst);
    }

    pub fn set_tip(&self, tip: BlockInfo) {
        *self.tip.lock() = tip;
    }

    /// Public randomness received across all commit calls, in order.
    pub fn committed_pub_rands(&self) -> Vec<[u8; 32]> {
        self.committed.lock().clone()
    }

    fn record(&self, op: &'static str, height: u64) -> Result<TxHandle, ChainClientError> {
        self.calls.lock().push((op, height));
        if let Some(err) = self.fail_next.lock().take() {
            return Err(err);
        }
        let n = self.tx_counter.fetch_add(1, Ordering::SeqCst);
        Ok(TxHandle(digest32(&[op.as_bytes(), &n.to_be_bytes()]).to_vec()))
    }
}

#[async_trait]
impl ChainClient for RecordingChainClient {
    async fn register_validator(
        &self,
        _chain_pk: &ChainPublicKey,
        _btc_pk: &BtcPublicKey,
        _pop: &ProofOfPossession,
    ) -> Result<TxHandle, ChainClientError> {
        self.record("register_validator", 0)
    }

    async fn submit_finality_sig(
        &self,
        _btc_pk: &BtcPublicKey,
        height: u64,
        _last_commit_hash: &Hash,
        _sig: &SchnorrSignature,
    ) -> Result<TxHandle, ChainClientError> {
        self.record("submit_finality_sig", height)
    }

    async fn commit_pub_rand_list(
        &self,
        _btc_pk: &BtcPublicKey,
        start_height: u64,
        pub_rands: &[[u8; 32]],
        _sig: &SchnorrSignature,
    ) -> Result<TxHandle, ChainClientError> {
        let tx = self.record("commit_pub_rand_list", start_height)?;
        self.committed.lock().extend_from_slice(pub_rands);
        Ok(tx)
    }

    async fn submit_jury_sig(
        &self,
        _validator_btc_pk: &BtcPublicKey,
        _del_btc_pk: &BtcPublicKey,
        _sig: &SchnorrSignature,
    ) -> Result<TxHandle, ChainClientError> {
        if self.fail_jury.load(Ordering::SeqCst) {
            self.calls.lock().push(("submit_jury_sig", 0));
            return Err(ChainClientError::Transient("jury endpoint down".into()));
        }
        self.record("submit_jury_sig", 0)
    }

    async fn best_block(&self) -> Result<BlockInfo, ChainClientError> {
        if self.fail_best_block.load(Ordering::SeqCst) {
            return Err(ChainClientError::Transient("tip query failed".into()));
        }
        Ok(*self.tip.lock())
    }
}

/// Deterministic signer: all material is derived by hashing the inputs, so
/// repeated runs produce identical randomness and signatures.
#[derive(Default)]
pub struct TestSigner {
    fail: AtomicBool,
}

impl TestSigner {
    /// Fail every signing operation while set.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), String> {
        if self.fail.load(Ordering::SeqCst) {
            Err("signer unavailable".into())
        } else {
            Ok(())
        }
    }

    fn sign64(parts: &[&[u8]]) -> SchnorrSignature {
        let a = digest32(parts);
        let b = digest32(&[b"second-half", &a]);
        let mut sig = [0u8; 64];
        sig[..32].copy_from_slice(&a);
        sig[32..].copy_from_slice(&b);
        SchnorrSignature(sig)
    }
}

#[async_trait]
impl EotsSigner for TestSigner {
    async fn generate_rand_range(
        &self,
        chain_pk: &ChainPublicKey,
        start_height: u64,
        count: u64,
    ) -> Result<Vec<SchnorrRandPair>, String> {
        self.check()?;
        Ok((start_height..start_height + count)
            .map(|h| {
                let sec_rand = digest32(&[b"sec", chain_pk.as_bytes(), &h.to_be_bytes()]);
                let pub_rand = digest32(&[b"pub", &sec_rand]);
                SchnorrRandPair { sec_rand, pub_rand }
            })
            .collect())
    }

    async fn sign_finality(
        &self,
        chain_pk: &ChainPublicKey,
        height: u64,
        last_commit_hash: &Hash,
    ) -> Result<SchnorrSignature, String> {
        self.check()?;
        Ok(Self::sign64(&[
            b"finality",
            chain_pk.as_bytes(),
            &height.to_be_bytes(),
            last_commit_hash,
        ]))
    }

    async fn sign_pub_rand_commit(
        &self,
        chain_pk: &ChainPublicKey,
        start_height: u64,
        pub_rands: &[[u8; 32]],
    ) -> Result<SchnorrSignature, String> {
        self.check()?;
        let mut parts: Vec<&[u8]> = vec![b"commit", chain_pk.as_bytes()];
        let start = start_height.to_be_bytes();
        parts.push(&start);
        for pr in pub_rands {
            parts.push(pr);
        }
        Ok(Self::sign64(&parts))
    }

    async fn sign_jury(
        &self,
        validator_btc_pk: &BtcPublicKey,
        delegation: &BtcDelegation,
    ) -> Result<SchnorrSignature, String> {
        self.check()?;
        Ok(Self::sign64(&[
            b"jury",
            &validator_btc_pk.0,
            &delegation.btc_pk.0,
            &delegation.staking_tx_hash,
        ]))
    }
}

/// Delegation source with nothing pending.
pub struct NoDelegations;

#[async_trait]
impl DelegationProvider for NoDelegations {
    async fn pending_delegations(&self) -> Result<Vec<BtcDelegation>, ChainClientError> {
        Ok(vec![])
    }
}

/// Delegation source serving a settable pending list.
#[derive(Default)]
pub struct StaticDelegations {
    pending: Mutex<Vec<BtcDelegation>>,
}

impl StaticDelegations {
    pub fn set_pending(&self, dels: Vec<BtcDelegation>) {
        *self.pending.lock() = dels;
    }
}

#[async_trait]
impl DelegationProvider for StaticDelegations {
    async fn pending_delegations(&self) -> Result<Vec<BtcDelegation>, ChainClientError> {
        Ok(self.pending.lock().clone())
    }
}

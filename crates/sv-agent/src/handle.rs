//! Cloneable handle fulfilling the caller-facing API.
//!
//! The handle owns no state: every operation is one request with a dedicated
//! reply slot, sent into the event loop (creation, intents, reads) or the
//! submission serializer (chain transactions), plus the signer calls needed
//! to build the payload. The periodic reactors drive the same code paths.

use crate::config::AgentConfig;
use crate::error::{AgentError, AgentResult};
use crate::events::{
    AppRequest, CreateValidatorRequest, CreateValidatorResponse, RegisterValidatorRequest,
    SubmissionRequest,
};
use crate::ports::inbound::ValidatorApi;
use crate::ports::outbound::{ChainClient, EotsSigner};
use async_trait::async_trait;
use shared_types::{
    BlockInfo, BtcDelegation, BtcPublicKey, ChainPublicKey, ProofOfPossession, TxHandle,
    ValidatorRecord, ValidatorStatus,
};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

#[derive(Clone)]
pub struct AppHandle {
    request_tx: mpsc::Sender<AppRequest>,
    submission_tx: mpsc::Sender<SubmissionRequest>,
    signer: Arc<dyn EotsSigner>,
    chain: Arc<dyn ChainClient>,
    num_pub_rand: u64,
    min_rand_height_gap: u64,
}

impl AppHandle {
    pub(crate) fn new(
        config: &AgentConfig,
        request_tx: mpsc::Sender<AppRequest>,
        submission_tx: mpsc::Sender<SubmissionRequest>,
        signer: Arc<dyn EotsSigner>,
        chain: Arc<dyn ChainClient>,
    ) -> Self {
        Self {
            request_tx,
            submission_tx,
            signer,
            chain,
            num_pub_rand: config.num_pub_rand,
            min_rand_height_gap: config.min_rand_height_gap,
        }
    }

    async fn request<T>(
        &self,
        req: AppRequest,
        rx: oneshot::Receiver<AgentResult<T>>,
    ) -> AgentResult<T> {
        self.request_tx
            .send(req)
            .await
            .map_err(|_| AgentError::Shutdown)?;
        rx.await.map_err(|_| AgentError::Shutdown)?
    }

    async fn submit(
        &self,
        req: SubmissionRequest,
        rx: oneshot::Receiver<AgentResult<TxHandle>>,
    ) -> AgentResult<TxHandle> {
        self.submission_tx
            .send(req)
            .await
            .map_err(|_| AgentError::Shutdown)?;
        rx.await.map_err(|_| AgentError::Shutdown)?
    }

    /// Sign and submit a finality vote for a record the caller already holds.
    ///
    /// The record must be registered with randomness committed at
    /// `block.height`; the event loop keeps `last_voted_height` monotonic
    /// regardless of what is submitted here.
    pub(crate) async fn submit_finality_for(
        &self,
        record: &ValidatorRecord,
        block: &BlockInfo,
    ) -> AgentResult<TxHandle> {
        if record.status != ValidatorStatus::Registered {
            return Err(AgentError::InvalidStatus {
                chain_pk: record.chain_pk,
                expected: ValidatorStatus::Registered.to_string(),
                actual: record.status.to_string(),
            });
        }
        if record.last_committed_height < block.height {
            return Err(AgentError::NoCommittedRandomness {
                chain_pk: record.chain_pk,
                height: block.height,
            });
        }
        let sig = self
            .signer
            .sign_finality(&record.chain_pk, block.height, &block.last_commit_hash)
            .await
            .map_err(|reason| AgentError::Signer { reason })?;

        let (reply, rx) = oneshot::channel();
        self.submit(
            SubmissionRequest::SubmitFinalitySig {
                chain_pk: record.chain_pk,
                btc_pk: record.btc_pk,
                height: block.height,
                last_commit_hash: block.last_commit_hash,
                sig,
                reply,
            },
            rx,
        )
        .await
    }

    /// Commit fresh randomness for a record against a known chain tip.
    ///
    /// No-op (`Ok(None)`) while committed headroom over the tip is at least
    /// `min_rand_height_gap`. The committed range starts past both the tip
    /// and anything committed before, so heights are never re-derived.
    pub(crate) async fn commit_randomness_for(
        &self,
        record: &ValidatorRecord,
        tip: &BlockInfo,
    ) -> AgentResult<Option<TxHandle>> {
        if record.last_committed_height >= tip.height + self.min_rand_height_gap {
            return Ok(None);
        }
        let start_height = (record.last_committed_height + 1).max(tip.height + 1);
        let pairs = self
            .signer
            .generate_rand_range(&record.chain_pk, start_height, self.num_pub_rand)
            .await
            .map_err(|reason| AgentError::Signer { reason })?;
        let pub_rands: Vec<[u8; 32]> = pairs.iter().map(|p| p.pub_rand).collect();
        let sig = self
            .signer
            .sign_pub_rand_commit(&record.chain_pk, start_height, &pub_rands)
            .await
            .map_err(|reason| AgentError::Signer { reason })?;

        let (reply, rx) = oneshot::channel();
        let tx = self
            .submit(
                SubmissionRequest::CommitPubRand {
                    chain_pk: record.chain_pk,
                    btc_pk: record.btc_pk,
                    start_height,
                    pairs,
                    sig,
                    reply,
                },
                rx,
            )
            .await?;
        Ok(Some(tx))
    }
}

#[async_trait]
impl ValidatorApi for AppHandle {
    async fn create_validator(
        &self,
        chain_pk: ChainPublicKey,
        btc_pk: BtcPublicKey,
        pop: ProofOfPossession,
    ) -> AgentResult<CreateValidatorResponse> {
        let (reply, rx) = oneshot::channel();
        self.request(
            AppRequest::CreateValidator(CreateValidatorRequest {
                chain_pk,
                btc_pk,
                pop,
                reply,
            }),
            rx,
        )
        .await
    }

    async fn register_validator(&self, chain_pk: ChainPublicKey) -> AgentResult<TxHandle> {
        let (reply, rx) = oneshot::channel();
        self.request(
            AppRequest::RegisterValidator(RegisterValidatorRequest { chain_pk, reply }),
            rx,
        )
        .await
    }

    async fn commit_randomness(&self, chain_pk: ChainPublicKey) -> AgentResult<Option<TxHandle>> {
        let tip = self
            .chain
            .best_block()
            .await
            .map_err(AgentError::ChainSubmission)?;
        let record = self.get_validator(chain_pk).await?;
        self.commit_randomness_for(&record, &tip).await
    }

    async fn submit_finality_signature(
        &self,
        chain_pk: ChainPublicKey,
        block: BlockInfo,
    ) -> AgentResult<TxHandle> {
        let record = self.get_validator(chain_pk).await?;
        self.submit_finality_for(&record, &block).await
    }

    async fn submit_jury_signature(&self, delegation: BtcDelegation) -> AgentResult<TxHandle> {
        let sig = self
            .signer
            .sign_jury(&delegation.validator_btc_pk, &delegation)
            .await
            .map_err(|reason| AgentError::Signer { reason })?;

        let (reply, rx) = oneshot::channel();
        self.submit(
            SubmissionRequest::SubmitJurySig {
                validator_btc_pk: delegation.validator_btc_pk,
                del_btc_pk: delegation.btc_pk,
                sig,
                reply,
            },
            rx,
        )
        .await
    }

    async fn list_validators(&self) -> AgentResult<Vec<ValidatorRecord>> {
        let (reply, rx) = oneshot::channel();
        self.request(AppRequest::ListValidators { reply }, rx).await
    }

    async fn get_validator(&self, chain_pk: ChainPublicKey) -> AgentResult<ValidatorRecord> {
        let (reply, rx) = oneshot::channel();
        self.request(AppRequest::GetValidator { chain_pk, reply }, rx)
            .await
    }
}

//! The central event loop: single-writer state machine over all validator
//! records.
//!
//! This task is the sole owner of the [`ValidatorStore`] and the only
//! component permitted to read-then-write a validator's status, heights, or
//! randomness records. It consumes caller requests and serializer completion
//! events, persists the resulting state transition, and only then fulfills
//! the caller's reply slot.
//!
//! Failure semantics: validation errors are delivered on the reply slot and
//! the loop continues. Storage failures and completion events referencing an
//! identity absent from the store mean the in-memory and durable views have
//! diverged; the loop returns the fault and the process must stop rather
//! than keep signing over untrustworthy state.

use crate::error::{AgentError, AgentResult};
use crate::events::{AppRequest, CompletionEvent, CreateValidatorResponse, SubmissionRequest};
use crate::ports::ValidatorStore;
use shared_types::{ValidatorRecord, ValidatorStatus};
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

pub(crate) struct EventLoop<S: ValidatorStore> {
    store: S,
    request_rx: mpsc::Receiver<AppRequest>,
    completion_rx: mpsc::UnboundedReceiver<CompletionEvent>,
    submission_tx: mpsc::Sender<SubmissionRequest>,
    shutdown: watch::Receiver<bool>,
}

impl<S: ValidatorStore> EventLoop<S> {
    pub(crate) fn new(
        store: S,
        request_rx: mpsc::Receiver<AppRequest>,
        completion_rx: mpsc::UnboundedReceiver<CompletionEvent>,
        submission_tx: mpsc::Sender<SubmissionRequest>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            store,
            request_rx,
            completion_rx,
            submission_tx,
            shutdown,
        }
    }

    /// Run until shutdown or a fatal consistency fault.
    pub(crate) async fn run(mut self) -> AgentResult<()> {
        loop {
            tokio::select! {
                req = self.request_rx.recv() => match req {
                    Some(req) => self.handle_request(req).await?,
                    None => return Ok(()),
                },
                ev = self.completion_rx.recv() => match ev {
                    Some(ev) => self.handle_completion(ev)?,
                    None => return Ok(()),
                },
                _ = self.shutdown.changed() => {
                    info!("event loop received shutdown signal");
                    return Ok(());
                }
            }
        }
    }

    async fn handle_request(&mut self, req: AppRequest) -> AgentResult<()> {
        match req {
            AppRequest::CreateValidator(req) => {
                let result = self.create_validator(req.chain_pk, req.btc_pk, req.pop);
                match result {
                    Ok(resp) => {
                        info!(chain_pk = %resp.chain_pk, "created validator");
                        let _ = req.reply.send(Ok(resp));
                    }
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        let _ = req.reply.send(Err(e));
                    }
                }
            }
            AppRequest::RegisterValidator(req) => {
                let record = match self.store.get_validator(&req.chain_pk)? {
                    Some(record) => record,
                    None => {
                        let _ = req.reply.send(Err(AgentError::ValidatorNotFound {
                            chain_pk: req.chain_pk,
                        }));
                        return Ok(());
                    }
                };
                if record.status != ValidatorStatus::Created {
                    let _ = req.reply.send(Err(AgentError::InvalidStatus {
                        chain_pk: req.chain_pk,
                        expected: ValidatorStatus::Created.to_string(),
                        actual: record.status.to_string(),
                    }));
                    return Ok(());
                }
                // Forward to the serializer, propagating the reply slot. The
                // caller is answered once the registration completion lands.
                let submission = SubmissionRequest::RegisterValidator {
                    chain_pk: record.chain_pk,
                    btc_pk: record.btc_pk,
                    pop: record.pop,
                    reply: req.reply,
                };
                if let Err(mpsc::error::SendError(submission)) =
                    self.submission_tx.send(submission).await
                {
                    warn!(kind = submission.kind(), "submission queue closed, dropping request");
                    if let SubmissionRequest::RegisterValidator { reply, .. } = submission {
                        let _ = reply.send(Err(AgentError::Shutdown));
                    }
                }
            }
            AppRequest::ListValidators { reply } => {
                let records = self.store.list_validators()?;
                let _ = reply.send(Ok(records));
            }
            AppRequest::GetValidator { chain_pk, reply } => {
                let result = match self.store.get_validator(&chain_pk)? {
                    Some(record) => Ok(record),
                    None => Err(AgentError::ValidatorNotFound { chain_pk }),
                };
                let _ = reply.send(result);
            }
        }
        Ok(())
    }

    fn create_validator(
        &mut self,
        chain_pk: shared_types::ChainPublicKey,
        btc_pk: shared_types::BtcPublicKey,
        pop: shared_types::ProofOfPossession,
    ) -> AgentResult<CreateValidatorResponse> {
        if self.store.get_validator(&chain_pk)?.is_some() {
            return Err(AgentError::DuplicateValidator { chain_pk });
        }
        let record = ValidatorRecord::new(chain_pk, btc_pk, pop);
        self.store.save_validator(&record)?;
        Ok(CreateValidatorResponse { chain_pk })
    }

    fn handle_completion(&mut self, ev: CompletionEvent) -> AgentResult<()> {
        match ev {
            CompletionEvent::ValidatorRegistered {
                chain_pk,
                tx,
                reply,
            } => {
                // The record was persisted before the registration request was
                // ever issued; absence here is a consistency fault.
                let mut record = self.must_get(&chain_pk, "registration completion")?;
                record.status = ValidatorStatus::Registered;
                self.store.save_validator(&record)?;
                info!(chain_pk = %chain_pk, tx = %tx, "validator registered on chain");
                let _ = reply.send(Ok(tx));
            }
            CompletionEvent::FinalitySigAdded {
                chain_pk,
                height,
                tx,
                reply,
            } => {
                let mut record = self.must_get(&chain_pk, "finality completion")?;
                // Monotonic: a stale or duplicate height never moves it back.
                if height > record.last_voted_height {
                    record.last_voted_height = height;
                    self.store.save_validator(&record)?;
                } else {
                    warn!(
                        chain_pk = %chain_pk,
                        height,
                        last_voted_height = record.last_voted_height,
                        "stale finality completion, keeping last voted height"
                    );
                }
                let _ = reply.send(Ok(tx));
            }
            CompletionEvent::PubRandCommitted {
                chain_pk,
                start_height,
                pairs,
                tx,
                reply,
            } => {
                let mut record = self.must_get(&chain_pk, "pub rand completion")?;
                if !pairs.is_empty() {
                    record.last_committed_height = start_height + pairs.len() as u64 - 1;
                    self.store.save_validator(&record)?;
                    // A failure mid-range leaves secret randomness state
                    // ambiguous; it propagates as fatal rather than being
                    // skipped.
                    for (i, pair) in pairs.iter().enumerate() {
                        self.store
                            .save_rand_pair(&chain_pk, start_height + i as u64, pair)?;
                    }
                }
                info!(
                    chain_pk = %chain_pk,
                    start_height,
                    count = pairs.len(),
                    tx = %tx,
                    "committed public randomness"
                );
                let _ = reply.send(Ok(tx));
            }
            CompletionEvent::JurySigAdded { tx, reply } => {
                // No validator-state transition for jury countersignatures.
                let _ = reply.send(Ok(tx));
            }
        }
        Ok(())
    }

    fn must_get(
        &self,
        chain_pk: &shared_types::ChainPublicKey,
        context: &str,
    ) -> AgentResult<ValidatorRecord> {
        match self.store.get_validator(chain_pk)? {
            Some(record) => Ok(record),
            None => {
                error!(chain_pk = %chain_pk, context, "validator missing from store");
                Err(AgentError::ConsistencyFault {
                    reason: format!("{context}: validator {chain_pk} missing from store"),
                })
            }
        }
    }
}

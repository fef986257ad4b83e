//! The chain-submission serializer.
//!
//! All transactions leaving this process go through one sequential worker so
//! they reach the consensus chain in a total order and never trip
//! sequence-number mismatches between concurrently issued requests. A send
//! loop was chosen over a lock around the chain client because it also gives
//! every request a natural completion point to hang its reply slot on.
//!
//! Strict FIFO, no priorities, no retries: a failed chain call is written
//! straight to that caller's reply slot (no state changed, so the event loop
//! is bypassed) and the next request is drained immediately. A successful
//! call emits exactly one completion event into the event loop before the
//! next dequeue.

use crate::error::AgentError;
use crate::events::{CompletionEvent, SubmissionRequest};
use crate::ports::ChainClient;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{error, info};

pub(crate) struct SubmissionLoop {
    chain: Arc<dyn ChainClient>,
    submission_rx: mpsc::Receiver<SubmissionRequest>,
    completion_tx: mpsc::UnboundedSender<CompletionEvent>,
    shutdown: watch::Receiver<bool>,
}

impl SubmissionLoop {
    pub(crate) fn new(
        chain: Arc<dyn ChainClient>,
        submission_rx: mpsc::Receiver<SubmissionRequest>,
        completion_tx: mpsc::UnboundedSender<CompletionEvent>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            chain,
            submission_rx,
            completion_tx,
            shutdown,
        }
    }

    /// Drain requests one at a time until shutdown.
    pub(crate) async fn run(mut self) -> Result<(), AgentError> {
        loop {
            tokio::select! {
                req = self.submission_rx.recv() => match req {
                    Some(req) => self.submit(req).await,
                    None => return Ok(()),
                },
                _ = self.shutdown.changed() => {
                    info!("submission loop received shutdown signal");
                    return Ok(());
                }
            }
        }
    }

    async fn submit(&mut self, req: SubmissionRequest) {
        match req {
            SubmissionRequest::RegisterValidator {
                chain_pk,
                btc_pk,
                pop,
                reply,
            } => {
                match self.chain.register_validator(&chain_pk, &btc_pk, &pop).await {
                    Ok(tx) => {
                        info!(chain_pk = %chain_pk, tx = %tx, "registration transaction accepted");
                        self.complete(CompletionEvent::ValidatorRegistered {
                            chain_pk,
                            tx,
                            reply,
                        });
                    }
                    Err(e) => {
                        error!(chain_pk = %chain_pk, err = %e, "failed to register validator");
                        let _ = reply.send(Err(AgentError::ChainSubmission(e)));
                    }
                }
            }
            SubmissionRequest::SubmitFinalitySig {
                chain_pk,
                btc_pk,
                height,
                last_commit_hash,
                sig,
                reply,
            } => {
                match self
                    .chain
                    .submit_finality_sig(&btc_pk, height, &last_commit_hash, &sig)
                    .await
                {
                    Ok(tx) => {
                        info!(btc_pk = %btc_pk, height, tx = %tx, "finality signature accepted");
                        self.complete(CompletionEvent::FinalitySigAdded {
                            chain_pk,
                            height,
                            tx,
                            reply,
                        });
                    }
                    Err(e) => {
                        error!(btc_pk = %btc_pk, height, err = %e, "failed to submit finality signature");
                        let _ = reply.send(Err(AgentError::ChainSubmission(e)));
                    }
                }
            }
            SubmissionRequest::CommitPubRand {
                chain_pk,
                btc_pk,
                start_height,
                pairs,
                sig,
                reply,
            } => {
                let pub_rands: Vec<[u8; 32]> = pairs.iter().map(|p| p.pub_rand).collect();
                match self
                    .chain
                    .commit_pub_rand_list(&btc_pk, start_height, &pub_rands, &sig)
                    .await
                {
                    Ok(tx) => {
                        info!(
                            btc_pk = %btc_pk,
                            start_height,
                            count = pairs.len(),
                            tx = %tx,
                            "public randomness commitment accepted"
                        );
                        self.complete(CompletionEvent::PubRandCommitted {
                            chain_pk,
                            start_height,
                            pairs,
                            tx,
                            reply,
                        });
                    }
                    Err(e) => {
                        error!(btc_pk = %btc_pk, start_height, err = %e, "failed to commit public randomness");
                        let _ = reply.send(Err(AgentError::ChainSubmission(e)));
                    }
                }
            }
            SubmissionRequest::SubmitJurySig {
                validator_btc_pk,
                del_btc_pk,
                sig,
                reply,
            } => {
                match self
                    .chain
                    .submit_jury_sig(&validator_btc_pk, &del_btc_pk, &sig)
                    .await
                {
                    Ok(tx) => {
                        info!(
                            validator_btc_pk = %validator_btc_pk,
                            del_btc_pk = %del_btc_pk,
                            tx = %tx,
                            "jury countersignature accepted"
                        );
                        self.complete(CompletionEvent::JurySigAdded { tx, reply });
                    }
                    Err(e) => {
                        error!(
                            validator_btc_pk = %validator_btc_pk,
                            del_btc_pk = %del_btc_pk,
                            err = %e,
                            "failed to submit jury countersignature"
                        );
                        let _ = reply.send(Err(AgentError::ChainSubmission(e)));
                    }
                }
            }
        }
    }

    fn complete(&self, ev: CompletionEvent) {
        // The completion channel is unbounded; a send fails only when the
        // event loop is already gone during shutdown.
        if self.completion_tx.send(ev).is_err() {
            error!("event loop closed before completion could be delivered");
        }
    }
}

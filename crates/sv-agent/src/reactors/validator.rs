//! Validator reactor: votes on every newly observed block and keeps
//! committed randomness ahead of the chain tip.

use crate::error::{AgentError, AgentResult};
use crate::handle::AppHandle;
use crate::ports::inbound::ValidatorApi;
use crate::ports::outbound::ChainClient;
use shared_types::{BlockInfo, ValidatorStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

pub(crate) struct ValidatorReactor {
    handle: AppHandle,
    chain: Arc<dyn ChainClient>,
    block_rx: mpsc::Receiver<BlockInfo>,
    commit_interval: Duration,
    shutdown: watch::Receiver<bool>,
}

impl ValidatorReactor {
    pub(crate) fn new(
        handle: AppHandle,
        chain: Arc<dyn ChainClient>,
        block_rx: mpsc::Receiver<BlockInfo>,
        commit_interval: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            handle,
            chain,
            block_rx,
            commit_interval,
            shutdown,
        }
    }

    pub(crate) async fn run(mut self) -> AgentResult<()> {
        let mut ticker = tokio::time::interval(self.commit_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                block = self.block_rx.recv() => match block {
                    Some(block) => self.vote_on_block(&block).await,
                    None => {
                        info!("block stream closed, stopping validator reactor");
                        return Ok(());
                    }
                },
                _ = ticker.tick() => self.commit_randomness_sweep().await?,
                _ = self.shutdown.changed() => {
                    info!("validator reactor received shutdown signal");
                    return Ok(());
                }
            }
        }
    }

    /// Submit a finality signature for every managed validator able to vote
    /// at this height. Per-validator failures never block the others.
    async fn vote_on_block(&self, block: &BlockInfo) {
        let records = match self.handle.list_validators().await {
            Ok(records) => records,
            Err(e) => {
                error!(height = block.height, err = %e, "failed to list validators for voting");
                return;
            }
        };
        for record in records {
            if record.last_voted_height >= block.height || !record.can_vote_at(block.height) {
                continue;
            }
            match self.handle.submit_finality_for(&record, block).await {
                Ok(tx) => {
                    info!(
                        chain_pk = %record.chain_pk,
                        height = block.height,
                        tx = %tx,
                        "submitted finality signature"
                    );
                }
                Err(e) => {
                    error!(
                        chain_pk = %record.chain_pk,
                        height = block.height,
                        err = %e,
                        "failed to submit finality signature"
                    );
                }
            }
        }
    }

    /// Top up committed randomness for validators running low.
    ///
    /// Voting without knowing the current chain height is unsafe, so a
    /// failed tip query is fatal for the whole process.
    async fn commit_randomness_sweep(&self) -> AgentResult<()> {
        let tip = match self.chain.best_block().await {
            Ok(tip) => tip,
            Err(e) => {
                error!(err = %e, "failed to get the current chain tip");
                return Err(AgentError::TipQuery(e));
            }
        };
        let records = match self.handle.list_validators().await {
            Ok(records) => records,
            Err(e) => {
                error!(err = %e, "failed to list validators for randomness commit");
                return Ok(());
            }
        };
        for record in records {
            if record.status != ValidatorStatus::Registered {
                continue;
            }
            match self.handle.commit_randomness_for(&record, &tip).await {
                Ok(Some(tx)) => {
                    info!(chain_pk = %record.chain_pk, tip_height = tip.height, tx = %tx, "committed randomness");
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(
                        chain_pk = %record.chain_pk,
                        tip_height = tip.height,
                        err = %e,
                        "failed to commit randomness"
                    );
                }
            }
        }
        Ok(())
    }
}

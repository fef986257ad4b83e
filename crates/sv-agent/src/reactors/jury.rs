//! Jury reactor: sweeps pending Bitcoin delegations on a fixed interval and
//! submits a countersignature for each.

use crate::error::AgentResult;
use crate::handle::AppHandle;
use crate::ports::inbound::ValidatorApi;
use crate::ports::outbound::DelegationProvider;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

pub(crate) struct JuryReactor {
    handle: AppHandle,
    delegations: Arc<dyn DelegationProvider>,
    interval: Duration,
    shutdown: watch::Receiver<bool>,
}

impl JuryReactor {
    pub(crate) fn new(
        handle: AppHandle,
        delegations: Arc<dyn DelegationProvider>,
        interval: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            handle,
            delegations,
            interval,
            shutdown,
        }
    }

    pub(crate) async fn run(mut self) -> AgentResult<()> {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = ticker.tick() => self.sweep().await,
                _ = self.shutdown.changed() => {
                    info!("jury reactor received shutdown signal");
                    return Ok(());
                }
            }
        }
    }

    /// One sweep over the pending delegations.
    ///
    /// A failed fetch skips the tick; a failed countersignature is logged
    /// and must not block the other delegations in the same tick.
    async fn sweep(&self) {
        let dels = match self.delegations.pending_delegations().await {
            Ok(dels) => dels,
            Err(e) => {
                error!(err = %e, "failed to get pending delegations");
                return;
            }
        };
        if dels.is_empty() {
            return;
        }
        debug!(count = dels.len(), "countersigning pending delegations");
        for del in dels {
            if let Err(e) = self.handle.submit_jury_signature(del.clone()).await {
                error!(
                    del_btc_pk = %del.btc_pk,
                    err = %e,
                    "failed to submit jury signature for delegation"
                );
            }
        }
    }
}

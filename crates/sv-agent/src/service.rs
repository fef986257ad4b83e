//! Agent service: wires the event loop, the submission serializer, and the
//! periodic reactors into one running app.
//!
//! One long-lived task per component; all cross-task communication is
//! message passing. A `watch` channel broadcasts shutdown to every task. Any
//! task returning an error is a fatal fault for the whole process: `join`
//! broadcasts shutdown and surfaces the first fault.

use crate::config::AgentConfig;
use crate::error::{AgentError, AgentResult};
use crate::event_loop::EventLoop;
use crate::handle::AppHandle;
use crate::ports::outbound::{ChainClient, DelegationProvider, EotsSigner, ValidatorStore};
use crate::reactors::{JuryReactor, ValidatorReactor};
use crate::submission::SubmissionLoop;
use shared_types::BlockInfo;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{error, info};

/// A running validator agent.
pub struct ValidatorApp {
    handle: AppHandle,
    shutdown_tx: watch::Sender<bool>,
    tasks: JoinSet<AgentResult<()>>,
}

impl ValidatorApp {
    /// Spawn all agent loops and return the running app.
    ///
    /// `block_rx` is the stream of newly observed consensus-chain blocks
    /// (fed by whatever poller the embedding process runs).
    pub fn start<S>(
        config: AgentConfig,
        store: S,
        signer: Arc<dyn EotsSigner>,
        chain: Arc<dyn ChainClient>,
        delegations: Arc<dyn DelegationProvider>,
        block_rx: mpsc::Receiver<BlockInfo>,
    ) -> Self
    where
        S: ValidatorStore + 'static,
    {
        let (request_tx, request_rx) = mpsc::channel(config.submission_queue_capacity);
        let (submission_tx, submission_rx) = mpsc::channel(config.submission_queue_capacity);
        // Unbounded so the serializer can never deadlock against a busy
        // event loop.
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = AppHandle::new(
            &config,
            request_tx,
            submission_tx.clone(),
            signer,
            Arc::clone(&chain),
        );

        let mut tasks = JoinSet::new();
        tasks.spawn(
            EventLoop::new(
                store,
                request_rx,
                completion_rx,
                submission_tx,
                shutdown_rx.clone(),
            )
            .run(),
        );
        tasks.spawn(
            SubmissionLoop::new(
                Arc::clone(&chain),
                submission_rx,
                completion_tx,
                shutdown_rx.clone(),
            )
            .run(),
        );
        tasks.spawn(
            JuryReactor::new(
                handle.clone(),
                delegations,
                config.jury_query_interval(),
                shutdown_rx.clone(),
            )
            .run(),
        );
        tasks.spawn(
            ValidatorReactor::new(
                handle.clone(),
                chain,
                block_rx,
                config.rand_commit_interval(),
                shutdown_rx,
            )
            .run(),
        );

        info!("validator agent started");
        Self {
            handle,
            shutdown_tx,
            tasks,
        }
    }

    /// Cloneable caller-facing handle.
    #[must_use]
    pub fn handle(&self) -> AppHandle {
        self.handle.clone()
    }

    /// Broadcast the shutdown signal to every task.
    pub fn shutdown(&self) {
        info!("shutting down validator agent");
        let _ = self.shutdown_tx.send(true);
    }

    /// Wait for all tasks to finish, returning the first fatal fault if any.
    pub async fn join(mut self) -> AgentResult<()> {
        let mut first_fault: Option<AgentError> = None;
        while let Some(joined) = self.tasks.join_next().await {
            let fault = match joined {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e,
                Err(e) => AgentError::ConsistencyFault {
                    reason: format!("agent task panicked: {e}"),
                },
            };
            error!(err = %fault, "agent task failed, stopping all loops");
            let _ = self.shutdown_tx.send(true);
            if first_fault.is_none() {
                first_fault = Some(fault);
            }
        }
        match first_fault {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }

    /// Shut down and wait for all tasks.
    pub async fn stop(self) -> AgentResult<()> {
        self.shutdown();
        self.join().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::ports::inbound::ValidatorApi;
    use crate::test_utils::{
        new_chain_pk, InMemoryStore, NoDelegations, RecordingChainClient, TestSigner,
    };
    use shared_types::{
        BtcPublicKey, ChainPublicKey, ProofOfPossession, SchnorrRandPair, ValidatorRecord,
    };

    fn start_app(store: impl ValidatorStore + 'static) -> (ValidatorApp, mpsc::Sender<BlockInfo>) {
        let (block_tx, block_rx) = mpsc::channel(16);
        let app = ValidatorApp::start(
            AgentConfig::default(),
            store,
            Arc::new(TestSigner::default()),
            Arc::new(RecordingChainClient::default()),
            Arc::new(NoDelegations),
            block_rx,
        );
        (app, block_tx)
    }

    #[tokio::test]
    async fn test_create_and_register_through_running_app() {
        let (app, _block_tx) = start_app(InMemoryStore::default());
        let handle = app.handle();
        let pk = new_chain_pk(1);

        let resp = handle
            .create_validator(pk, BtcPublicKey([1; 33]), ProofOfPossession::default())
            .await
            .unwrap();
        assert_eq!(resp.chain_pk, pk);

        let tx = handle.register_validator(pk).await.unwrap();
        assert!(!tx.0.is_empty());
        let record = handle.get_validator(pk).await.unwrap();
        assert_eq!(record.status, shared_types::ValidatorStatus::Registered);

        app.stop().await.unwrap();
    }

    /// Store that fails every write, to force a fatal fault.
    #[derive(Default)]
    struct BrokenStore;

    impl ValidatorStore for BrokenStore {
        fn get_validator(
            &self,
            _chain_pk: &ChainPublicKey,
        ) -> Result<Option<ValidatorRecord>, StoreError> {
            Ok(None)
        }
        fn save_validator(&mut self, _record: &ValidatorRecord) -> Result<(), StoreError> {
            Err(StoreError::Backend {
                reason: "disk gone".into(),
            })
        }
        fn list_validators(&self) -> Result<Vec<ValidatorRecord>, StoreError> {
            Ok(vec![])
        }
        fn save_rand_pair(
            &mut self,
            _chain_pk: &ChainPublicKey,
            _height: u64,
            _pair: &SchnorrRandPair,
        ) -> Result<(), StoreError> {
            Err(StoreError::Backend {
                reason: "disk gone".into(),
            })
        }
        fn get_rand_pair(
            &self,
            _chain_pk: &ChainPublicKey,
            _height: u64,
        ) -> Result<Option<SchnorrRandPair>, StoreError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_persist_failure_is_fatal_and_caller_sees_no_reply() {
        let (app, _block_tx) = start_app(BrokenStore);
        let handle = app.handle();

        // The event loop dies before replying; the dropped reply slot
        // surfaces as a shutdown error to the caller.
        let err = handle
            .create_validator(
                new_chain_pk(1),
                BtcPublicKey([1; 33]),
                ProofOfPossession::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Shutdown));

        let fault = app.join().await.unwrap_err();
        assert!(fault.is_fatal());
    }

    #[tokio::test]
    async fn test_stop_is_clean_with_idle_loops() {
        let (app, _block_tx) = start_app(InMemoryStore::default());
        app.stop().await.unwrap();
    }
}

//! Cross-crate integration scenarios driving a full running agent.

pub mod lifecycle;
pub mod reactors;

#[cfg(test)]
pub(crate) mod support {
    use shared_types::{BlockInfo, BtcPublicKey, ChainPublicKey, ProofOfPossession};
    use std::sync::Arc;
    use sv_agent::test_utils::{NoDelegations, RecordingChainClient, TestSigner};
    use sv_agent::{AgentConfig, DelegationProvider, ValidatorApp, ValidatorStore};
    use tokio::sync::mpsc;
    use tracing_subscriber::EnvFilter;

    /// Install the test log subscriber once per process. Quiet by default;
    /// `RUST_LOG=sv_agent=debug cargo test` shows what the loops are doing.
    fn init_logging() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    pub struct Harness {
        pub app: ValidatorApp,
        pub chain: Arc<RecordingChainClient>,
        pub block_tx: mpsc::Sender<BlockInfo>,
    }

    /// Config with reactors effectively parked, so tests can drive every
    /// submission by hand without a background tick interfering.
    pub fn quiet_config() -> AgentConfig {
        AgentConfig {
            jury_query_interval_secs: 3600,
            rand_commit_interval_secs: 3600,
            num_pub_rand: 5,
            min_rand_height_gap: 5,
            ..AgentConfig::default()
        }
    }

    /// Config with one-second reactor intervals. The randomness budget and
    /// the height gap are both 5, so one commit per validator settles the
    /// headroom and the reactor goes idle again.
    pub fn fast_config() -> AgentConfig {
        AgentConfig {
            jury_query_interval_secs: 1,
            rand_commit_interval_secs: 1,
            ..quiet_config()
        }
    }

    /// Start an agent with parked reactors over the given store.
    pub fn start_agent(
        store: impl ValidatorStore + 'static,
        delegations: Option<Arc<dyn DelegationProvider>>,
    ) -> Harness {
        start_agent_with(quiet_config(), store, delegations)
    }

    /// Start an agent with an explicit config.
    pub fn start_agent_with(
        config: AgentConfig,
        store: impl ValidatorStore + 'static,
        delegations: Option<Arc<dyn DelegationProvider>>,
    ) -> Harness {
        init_logging();
        let chain = Arc::new(RecordingChainClient::default());
        let (block_tx, block_rx) = mpsc::channel(16);
        let app = ValidatorApp::start(
            config,
            store,
            Arc::new(TestSigner::default()),
            chain.clone(),
            delegations.unwrap_or_else(|| Arc::new(NoDelegations)),
            block_rx,
        );
        Harness {
            app,
            chain,
            block_tx,
        }
    }

    pub fn chain_pk(tag: u8) -> ChainPublicKey {
        ChainPublicKey([tag; 32])
    }

    pub fn btc_pk(tag: u8) -> BtcPublicKey {
        BtcPublicKey([tag; 33])
    }

    pub fn pop() -> ProofOfPossession {
        ProofOfPossession {
            chain_sig: vec![1, 2, 3],
            btc_sig: vec![4, 5, 6],
        }
    }

    pub fn block(height: u64) -> BlockInfo {
        BlockInfo {
            height,
            last_commit_hash: [height as u8; 32],
        }
    }
}

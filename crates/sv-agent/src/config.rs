//! Configuration types for the validator agent

use serde::Deserialize;
use std::time::Duration;

/// Runtime configuration for the agent's loops.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Interval between jury-signature sweeps over pending delegations (seconds)
    pub jury_query_interval_secs: u64,

    /// Interval between randomness-headroom checks (seconds)
    pub rand_commit_interval_secs: u64,

    /// Number of randomness pairs generated per commit transaction
    pub num_pub_rand: u64,

    /// Commit fresh randomness once committed headroom over the chain tip
    /// drops below this many heights
    pub min_rand_height_gap: u64,

    /// Capacity of the chain-submission queue before senders apply backpressure
    pub submission_queue_capacity: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            jury_query_interval_secs: 30,
            rand_commit_interval_secs: 30,
            num_pub_rand: crate::DEFAULT_NUM_PUB_RAND,
            min_rand_height_gap: crate::DEFAULT_MIN_RAND_HEIGHT_GAP,
            submission_queue_capacity: crate::DEFAULT_SUBMISSION_QUEUE_CAPACITY,
        }
    }
}

impl AgentConfig {
    #[must_use]
    pub fn jury_query_interval(&self) -> Duration {
        Duration::from_secs(self.jury_query_interval_secs)
    }

    #[must_use]
    pub fn rand_commit_interval(&self) -> Duration {
        Duration::from_secs(self.rand_commit_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AgentConfig::default();
        assert_eq!(cfg.num_pub_rand, 100);
        assert_eq!(cfg.min_rand_height_gap, 20);
        assert_eq!(cfg.submission_queue_capacity, 1000);
        assert_eq!(cfg.jury_query_interval(), Duration::from_secs(30));
    }
}

//! Scenarios driven by the periodic reactors rather than direct API calls.

#[cfg(test)]
mod tests {
    use crate::integration::support::{
        block, btc_pk, chain_pk, fast_config, pop, start_agent_with,
    };
    use shared_types::BtcDelegation;
    use std::sync::Arc;
    use std::time::Duration;
    use sv_agent::test_utils::{InMemoryStore, StaticDelegations};
    use sv_agent::{AgentError, ValidatorApi};

    /// Poll the condition until it holds or five seconds pass.
    macro_rules! wait_for {
        ($what:expr, $body:expr) => {{
            let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
            while !$body {
                if tokio::time::Instant::now() > deadline {
                    panic!("timed out waiting for {}", $what);
                }
                tokio::time::sleep(Duration::from_millis(25)).await;
            }
        }};
    }

    fn delegation(tag: u8, validator_tag: u8) -> BtcDelegation {
        BtcDelegation {
            btc_pk: btc_pk(tag),
            validator_btc_pk: btc_pk(validator_tag),
            staking_tx_hash: [tag; 32],
        }
    }

    #[tokio::test]
    async fn test_randomness_reactor_tops_up_registered_validators() {
        let h = start_agent_with(fast_config(), InMemoryStore::default(), None);
        let handle = h.app.handle();
        let pk = chain_pk(1);

        h.chain.set_tip(block(99));
        handle.create_validator(pk, btc_pk(1), pop()).await.unwrap();
        handle.register_validator(pk).await.unwrap();

        // Within a tick or two the reactor notices the missing headroom and
        // commits one range starting past the tip.
        wait_for!(
            "randomness commit",
            handle.get_validator(pk).await.unwrap().last_committed_height >= 104
        );
        let record = handle.get_validator(pk).await.unwrap();
        assert_eq!(record.last_committed_height, 104);

        h.app.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_block_stream_votes_for_every_eligible_validator() {
        let h = start_agent_with(fast_config(), InMemoryStore::default(), None);
        let handle = h.app.handle();
        let (pk_a, pk_b) = (chain_pk(1), chain_pk(2));

        h.chain.set_tip(block(99));
        for (tag, pk) in [(1u8, pk_a), (2u8, pk_b)] {
            handle.create_validator(pk, btc_pk(tag), pop()).await.unwrap();
            handle.register_validator(pk).await.unwrap();
        }
        wait_for!(
            "randomness for both validators",
            handle.get_validator(pk_a).await.unwrap().last_committed_height >= 104
                && handle.get_validator(pk_b).await.unwrap().last_committed_height >= 104
        );

        h.block_tx.send(block(101)).await.unwrap();
        wait_for!(
            "finality votes at 101",
            handle.get_validator(pk_a).await.unwrap().last_voted_height == 101
                && handle.get_validator(pk_b).await.unwrap().last_voted_height == 101
        );

        // An older block arriving late is ignored.
        h.block_tx.send(block(100)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(handle.get_validator(pk_a).await.unwrap().last_voted_height, 101);
        assert_eq!(handle.get_validator(pk_b).await.unwrap().last_voted_height, 101);

        h.app.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_jury_reactor_countersigns_pending_delegations() {
        let delegations = Arc::new(StaticDelegations::default());
        delegations.set_pending(vec![delegation(10, 1), delegation(11, 1)]);
        let h = start_agent_with(
            fast_config(),
            InMemoryStore::default(),
            Some(delegations.clone()),
        );

        wait_for!(
            "two jury signatures",
            h.chain
                .calls()
                .iter()
                .filter(|(op, _)| *op == "submit_jury_sig")
                .count()
                >= 2
        );

        h.app.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_jury_failures_do_not_stall_the_serializer() {
        let delegations = Arc::new(StaticDelegations::default());
        delegations.set_pending(vec![delegation(10, 1)]);
        let h = start_agent_with(
            fast_config(),
            InMemoryStore::default(),
            Some(delegations.clone()),
        );
        h.chain.set_fail_jury(true);

        wait_for!(
            "a jury attempt",
            h.chain.calls().iter().any(|(op, _)| *op == "submit_jury_sig")
        );

        // The serializer keeps serving other submissions after the failure.
        let handle = h.app.handle();
        let pk = chain_pk(1);
        handle.create_validator(pk, btc_pk(1), pop()).await.unwrap();
        let tx = handle.register_validator(pk).await.unwrap();
        assert!(!tx.0.is_empty());

        h.app.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_tip_query_failure_is_fatal() {
        let h = start_agent_with(fast_config(), InMemoryStore::default(), None);
        h.chain.set_fail_best_block(true);

        let fault = h.app.join().await.unwrap_err();
        assert!(matches!(fault, AgentError::TipQuery(_)));
        assert!(fault.is_fatal());
    }
}

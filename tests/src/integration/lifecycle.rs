//! End-to-end lifecycle flows through a running agent:
//! create → register → commit randomness → vote.

#[cfg(test)]
mod tests {
    use crate::integration::support::{block, btc_pk, chain_pk, pop, start_agent};
    use shared_types::ValidatorStatus;
    use sv_agent::test_utils::InMemoryStore;
    use sv_agent::{AgentError, ValidatorApi, ValidatorStore};
    use sv_store::{RocksDbConfig, RocksDbStore};

    #[tokio::test]
    async fn test_full_validator_lifecycle() {
        let h = start_agent(InMemoryStore::default(), None);
        let handle = h.app.handle();
        let pk = chain_pk(1);

        // Create: persisted as CREATED, no chain interaction.
        let resp = handle.create_validator(pk, btc_pk(1), pop()).await.unwrap();
        assert_eq!(resp.chain_pk, pk);
        let record = handle.get_validator(pk).await.unwrap();
        assert_eq!(record.status, ValidatorStatus::Created);
        assert!(h.chain.calls().is_empty());

        // Register: completion flips status and returns the tx handle.
        let tx = handle.register_validator(pk).await.unwrap();
        assert!(!tx.0.is_empty());
        let record = handle.get_validator(pk).await.unwrap();
        assert_eq!(record.status, ValidatorStatus::Registered);

        // Commit randomness against tip 99: range starts at 100, 5 pairs.
        h.chain.set_tip(block(99));
        let tx = handle.commit_randomness(pk).await.unwrap();
        assert!(tx.is_some());
        let record = handle.get_validator(pk).await.unwrap();
        assert_eq!(record.last_committed_height, 104);

        // Vote at 101.
        let tx = handle.submit_finality_signature(pk, block(101)).await.unwrap();
        assert!(!tx.0.is_empty());
        let record = handle.get_validator(pk).await.unwrap();
        assert_eq!(record.last_voted_height, 101);

        // A later vote for a lower height is answered but never moves the
        // voted height backward.
        handle.submit_finality_signature(pk, block(100)).await.unwrap();
        let record = handle.get_validator(pk).await.unwrap();
        assert_eq!(record.last_voted_height, 101);

        h.app.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_validation_errors_reach_the_caller() {
        let h = start_agent(InMemoryStore::default(), None);
        let handle = h.app.handle();
        let pk = chain_pk(2);

        // Register before create.
        assert!(matches!(
            handle.register_validator(pk).await,
            Err(AgentError::ValidatorNotFound { .. })
        ));

        handle.create_validator(pk, btc_pk(2), pop()).await.unwrap();

        // Duplicate create.
        assert!(matches!(
            handle.create_validator(pk, btc_pk(2), pop()).await,
            Err(AgentError::DuplicateValidator { .. })
        ));

        // Vote without committed randomness.
        handle.register_validator(pk).await.unwrap();
        assert!(matches!(
            handle.submit_finality_signature(pk, block(10)).await,
            Err(AgentError::NoCommittedRandomness { .. })
        ));

        // Double registration.
        assert!(matches!(
            handle.register_validator(pk).await,
            Err(AgentError::InvalidStatus { .. })
        ));

        h.app.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_lifecycle_is_durable_across_rocksdb_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = RocksDbConfig::for_testing(dir.path());
        let pk = chain_pk(3);

        {
            let store = RocksDbStore::open(config.clone()).unwrap();
            let h = start_agent(store, None);
            let handle = h.app.handle();

            handle.create_validator(pk, btc_pk(3), pop()).await.unwrap();
            handle.register_validator(pk).await.unwrap();
            h.chain.set_tip(block(99));
            handle.commit_randomness(pk).await.unwrap();
            handle.submit_finality_signature(pk, block(101)).await.unwrap();

            h.app.stop().await.unwrap();
        }

        // Reopen the database directly: the record and the full committed
        // range must be there, with no gaps.
        let store = RocksDbStore::open(config).unwrap();
        let record = store.get_validator(&pk).unwrap().unwrap();
        assert_eq!(record.status, ValidatorStatus::Registered);
        assert_eq!(record.last_committed_height, 104);
        assert_eq!(record.last_voted_height, 101);
        for height in 100..=104 {
            assert!(
                store.get_rand_pair(&pk, height).unwrap().is_some(),
                "missing rand pair at height {height}"
            );
        }
        assert!(store.get_rand_pair(&pk, 105).unwrap().is_none());
    }
}

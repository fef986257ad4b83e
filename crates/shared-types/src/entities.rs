//! # Core Domain Entities
//!
//! Defines the entities managed by the validator agent.
//!
//! ## Clusters
//!
//! - **Identity**: `ChainPublicKey`, `BtcPublicKey`, `ProofOfPossession`
//! - **Validator State**: `ValidatorRecord`, `ValidatorStatus`
//! - **Randomness**: `SchnorrRandPair`
//! - **Chain**: `BlockInfo`, `TxHandle`, `SchnorrSignature`, `BtcDelegation`

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use std::fmt;

/// A 32-byte hash (block last-commit hash, tx digests).
pub type Hash = [u8; 32];

/// Public key identifying a validator on the consensus chain.
///
/// This is the unique identity under which validator records are keyed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct ChainPublicKey(pub [u8; 32]);

impl ChainPublicKey {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ChainPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for ChainPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainPublicKey(0x{})", hex::encode(&self.0[..8]))
    }
}

/// Compressed secp256k1 public key on the Bitcoin side.
#[serde_as]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BtcPublicKey(#[serde_as(as = "Bytes")] pub [u8; 33]);

impl Default for BtcPublicKey {
    fn default() -> Self {
        Self([0u8; 33])
    }
}

impl fmt::Display for BtcPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for BtcPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BtcPublicKey(0x{})", hex::encode(&self.0[..8]))
    }
}

/// A 64-byte Schnorr signature.
#[serde_as]
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchnorrSignature(#[serde_as(as = "Bytes")] pub [u8; 64]);

impl Default for SchnorrSignature {
    fn default() -> Self {
        Self([0u8; 64])
    }
}

impl fmt::Debug for SchnorrSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SchnorrSignature(0x{})", hex::encode(&self.0[..8]))
    }
}

/// Proof that the operator controls both the chain key and the Bitcoin key.
///
/// Produced at key-creation time by the operator's key tooling and replayed
/// verbatim inside the registration transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProofOfPossession {
    /// Chain-key signature over the Bitcoin public key.
    pub chain_sig: Vec<u8>,
    /// Bitcoin-key signature over the chain public key.
    pub btc_sig: Vec<u8>,
}

/// Lifecycle status of a managed validator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ValidatorStatus {
    /// Created locally, not yet known to the consensus chain.
    #[default]
    Created,
    /// The registration transaction was confirmed by the chain.
    Registered,
}

impl fmt::Display for ValidatorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "CREATED"),
            Self::Registered => write!(f, "REGISTERED"),
        }
    }
}

/// Durable record for one managed validator identity.
///
/// INVARIANT: `last_committed_height >= last_voted_height` at all times;
/// randomness must be committed before it can be consumed by a vote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ValidatorRecord {
    /// Consensus-chain public key (unique identity).
    pub chain_pk: ChainPublicKey,
    /// Bitcoin public key used for finality and jury signatures.
    pub btc_pk: BtcPublicKey,
    /// Proof of possession carried by the registration transaction.
    pub pop: ProofOfPossession,
    /// Lifecycle status.
    pub status: ValidatorStatus,
    /// Highest consensus height for which a finality signature was produced.
    pub last_voted_height: u64,
    /// Highest height for which public randomness has been committed.
    pub last_committed_height: u64,
}

impl ValidatorRecord {
    /// Create a fresh record in `Created` status with zeroed heights.
    #[must_use]
    pub fn new(chain_pk: ChainPublicKey, btc_pk: BtcPublicKey, pop: ProofOfPossession) -> Self {
        Self {
            chain_pk,
            btc_pk,
            pop,
            status: ValidatorStatus::Created,
            last_voted_height: 0,
            last_committed_height: 0,
        }
    }

    /// Whether this validator can vote at `height` with already-committed
    /// randomness.
    #[must_use]
    pub fn can_vote_at(&self, height: u64) -> bool {
        self.status == ValidatorStatus::Registered && self.last_committed_height >= height
    }
}

/// One-time Schnorr randomness pair for a single (validator, height) slot.
///
/// The secret half is consumed exactly once when signing; reuse breaks the
/// extractable one-time signature scheme.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchnorrRandPair {
    /// Secret one-time randomness.
    pub sec_rand: [u8; 32],
    /// Corresponding public randomness.
    pub pub_rand: [u8; 32],
}

impl fmt::Debug for SchnorrRandPair {
    // Never log the secret half.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SchnorrRandPair(pub 0x{})", hex::encode(&self.pub_rand[..8]))
    }
}

/// A consensus-chain block as observed by the agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BlockInfo {
    /// Block height.
    pub height: u64,
    /// Hash of the last commit, signed over by finality votes.
    pub last_commit_hash: Hash,
}

/// Handle for a transaction accepted by a chain client.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TxHandle(pub Vec<u8>);

impl fmt::Display for TxHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

impl fmt::Debug for TxHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHandle(0x{})", hex::encode(&self.0))
    }
}

/// A pending Bitcoin staking delegation awaiting a jury countersignature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BtcDelegation {
    /// The delegator's Bitcoin public key.
    pub btc_pk: BtcPublicKey,
    /// The validator the stake is delegated to.
    pub validator_btc_pk: BtcPublicKey,
    /// Hash of the staking transaction being countersigned.
    pub staking_tx_hash: Hash,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_starts_created_with_zero_heights() {
        let rec = ValidatorRecord::new(
            ChainPublicKey([1u8; 32]),
            BtcPublicKey([2u8; 33]),
            ProofOfPossession::default(),
        );
        assert_eq!(rec.status, ValidatorStatus::Created);
        assert_eq!(rec.last_voted_height, 0);
        assert_eq!(rec.last_committed_height, 0);
    }

    #[test]
    fn test_can_vote_requires_registration_and_randomness() {
        let mut rec = ValidatorRecord::new(
            ChainPublicKey([1u8; 32]),
            BtcPublicKey([2u8; 33]),
            ProofOfPossession::default(),
        );
        assert!(!rec.can_vote_at(1));

        rec.status = ValidatorStatus::Registered;
        assert!(!rec.can_vote_at(1), "no randomness committed yet");

        rec.last_committed_height = 10;
        assert!(rec.can_vote_at(10));
        assert!(!rec.can_vote_at(11));
    }

    #[test]
    fn test_record_bincode_roundtrip() {
        let rec = ValidatorRecord::new(
            ChainPublicKey([7u8; 32]),
            BtcPublicKey([8u8; 33]),
            ProofOfPossession {
                chain_sig: vec![1, 2, 3],
                btc_sig: vec![4, 5, 6],
            },
        );
        let bytes = bincode::serialize(&rec).unwrap();
        let back: ValidatorRecord = bincode::deserialize(&bytes).unwrap();
        assert_eq!(rec, back);
    }

    #[test]
    fn test_rand_pair_debug_hides_secret() {
        let pair = SchnorrRandPair {
            sec_rand: [0xAA; 32],
            pub_rand: [0xBB; 32],
        };
        let shown = format!("{pair:?}");
        assert!(!shown.contains("aaaa"), "secret half must not be printed");
        assert!(shown.contains("bbbb"));
    }

    #[test]
    fn test_display_is_hex() {
        let pk = ChainPublicKey([0xFF; 32]);
        assert_eq!(pk.to_string().len(), 64);
        let tx = TxHandle(vec![0xDE, 0xAD]);
        assert_eq!(tx.to_string(), "dead");
    }
}

mod hash;

pub use hash::{Nonce, TransactionHash, HASH_LENGTH, NONCE_LENGTH};

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::model::common::election::{CandidateId, ElectionId, VoteId};

/// Block number of the first block in the demo ledger.
pub const BLOCK_NUMBER_BASE: u64 = 18_245_678;
/// Block numbers are drawn from `BLOCK_NUMBER_BASE..BLOCK_NUMBER_BASE + BLOCK_NUMBER_SPREAD`.
pub const BLOCK_NUMBER_SPREAD: u64 = 10_000;

/// Pick the block a new vote is recorded in.
pub fn random_block_number(rng: &mut impl Rng) -> u64 {
    BLOCK_NUMBER_BASE + rng.gen_range(0..BLOCK_NUMBER_SPREAD)
}

/// A single recorded choice. Public: carries no voter identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: VoteId,
    pub election_id: ElectionId,
    pub candidate_id: CandidateId,
    pub transaction_hash: TransactionHash,
    pub timestamp: DateTime<Utc>,
    pub block_number: u64,
}

impl Vote {
    /// Recompute this vote's hash from its contents and the given nonce.
    pub fn expected_hash(&self, nonce: &Nonce) -> TransactionHash {
        TransactionHash::compute(
            &self.election_id,
            &self.candidate_id,
            self.timestamp,
            self.block_number,
            nonce,
        )
    }

    /// Whether the nonce reproduces this vote's hash.
    pub fn verify_nonce(&self, nonce: &Nonce) -> bool {
        self.expected_hash(nonce) == self.transaction_hash
    }
}

/// A vote as looked up by its transaction hash, with enough context for a
/// voter to confirm what was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedVote {
    #[serde(flatten)]
    pub vote: Vote,
    pub election_title: String,
    pub candidate_name: String,
}

/// What the voter gets back after casting: the vote plus the nonce needed to
/// recompute its hash. Votes imported with the demo data have no nonce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
    #[serde(flatten)]
    pub vote: VerifiedVote,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<Nonce>,
}

/// A voter's ballot: the chosen candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastVoteRequest {
    pub candidate_id: CandidateId,
}

/// Whether the signed-in voter has voted in an election.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotedStatus {
    pub election_id: ElectionId,
    pub has_voted: bool,
}

#[cfg(test)]
mod tests {
    use rocket::serde::json::serde_json;

    use super::*;

    fn cast(nonce: &Nonce) -> Vote {
        let timestamp = Utc::now();
        let block_number = random_block_number(&mut rand::thread_rng());
        Vote {
            id: "v2".to_string(),
            election_id: "e1".to_string(),
            candidate_id: "c1".to_string(),
            transaction_hash: TransactionHash::compute("e1", "c1", timestamp, block_number, nonce),
            timestamp,
            block_number,
        }
    }

    #[test]
    fn block_numbers_in_range() {
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            let block = random_block_number(&mut rng);
            assert!((BLOCK_NUMBER_BASE..BLOCK_NUMBER_BASE + BLOCK_NUMBER_SPREAD).contains(&block));
        }
    }

    #[test]
    fn nonce_verification() {
        let nonce = Nonce::random(&mut rand::thread_rng());
        let vote = cast(&nonce);
        assert!(vote.verify_nonce(&nonce));
        assert!(!vote.verify_nonce(&Nonce::random(&mut rand::thread_rng())));

        let mut tampered = vote.clone();
        tampered.candidate_id = "c2".to_string();
        assert!(!tampered.verify_nonce(&nonce));
    }

    #[test]
    fn receipt_survives_json() {
        // The verification tool recomputes hashes from the JSON form, so the
        // timestamp must come back with the same millisecond value.
        let nonce = Nonce::random(&mut rand::thread_rng());
        let vote = cast(&nonce);
        let receipt = VoteReceipt {
            vote: VerifiedVote {
                vote,
                election_title: "2024 CEO Election".to_string(),
                candidate_name: "Sarah Chen".to_string(),
            },
            nonce: Some(nonce),
        };
        let json = serde_json::to_value(&receipt).unwrap();
        assert_eq!(json["election_id"], "e1");
        assert_eq!(json["candidate_name"], "Sarah Chen");
        assert_eq!(json["nonce"], nonce.to_string());

        let parsed: VoteReceipt = serde_json::from_value(json).unwrap();
        assert!(parsed.vote.vote.verify_nonce(&parsed.nonce.unwrap()));
    }
}

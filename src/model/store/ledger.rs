use std::collections::{HashMap, HashSet};

use chrono::Utc;
use rand::{CryptoRng, RngCore};

use crate::model::{
    common::election::{CandidateId, ElectionId},
    user::VoterKey,
    vote::{random_block_number, Nonce, TransactionHash, Vote},
};

/// A vote plus the private bookkeeping that never leaves the store.
#[derive(Debug, Clone)]
struct LedgerEntry {
    vote: Vote,
    voter: VoterKey,
    /// Absent for imported votes, whose hashes were not derived here.
    nonce: Option<Nonce>,
}

/// The append-only vote ledger. Entries are never changed or removed.
#[derive(Debug, Default)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
    by_hash: HashMap<TransactionHash, usize>,
    cast: HashSet<(VoterKey, ElectionId)>,
    tallies: HashMap<ElectionId, HashMap<CandidateId, u64>>,
}

impl Ledger {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether this voter already has a vote in this election.
    pub fn has_cast(&self, voter: &VoterKey, election_id: &str) -> bool {
        self.cast.contains(&(voter.clone(), election_id.to_string()))
    }

    /// Record a new vote. Eligibility must already have been checked.
    /// Returns the vote and the nonce its hash was derived from.
    pub fn append(
        &mut self,
        voter: VoterKey,
        election_id: &str,
        candidate_id: &str,
        rng: &mut (impl RngCore + CryptoRng),
    ) -> (Vote, Nonce) {
        let timestamp = Utc::now();
        let block_number = random_block_number(rng);
        // A collision is astronomically unlikely, but the hash is the lookup key.
        let (nonce, transaction_hash) = loop {
            let nonce = Nonce::random(rng);
            let hash =
                TransactionHash::compute(election_id, candidate_id, timestamp, block_number, &nonce);
            if !self.by_hash.contains_key(&hash) {
                break (nonce, hash);
            }
        };
        let vote = Vote {
            id: format!("v{}", self.entries.len() + 1),
            election_id: election_id.to_string(),
            candidate_id: candidate_id.to_string(),
            transaction_hash,
            timestamp,
            block_number,
        };

        *self
            .tallies
            .entry(vote.election_id.clone())
            .or_default()
            .entry(vote.candidate_id.clone())
            .or_default() += 1;
        self.insert(LedgerEntry {
            vote: vote.clone(),
            voter,
            nonce: Some(nonce),
        });
        (vote, nonce)
    }

    /// Record a historical vote that is already counted in the election's baseline tally.
    pub fn import(&mut self, vote: Vote, voter: VoterKey) {
        self.insert(LedgerEntry {
            vote,
            voter,
            nonce: None,
        });
    }

    /// Set the starting count for a candidate, for elections with history from before launch.
    pub fn set_baseline(&mut self, election_id: &str, candidate_id: &str, votes: u64) {
        self.tallies
            .entry(election_id.to_string())
            .or_default()
            .insert(candidate_id.to_string(), votes);
    }

    /// The per-candidate tally of an election, if it has any votes or baseline.
    pub fn tally(&self, election_id: &str) -> Option<&HashMap<CandidateId, u64>> {
        self.tallies.get(election_id)
    }

    /// Look up a vote by its transaction hash.
    pub fn find(&self, hash: &TransactionHash) -> Option<&Vote> {
        self.by_hash.get(hash).map(|&i| &self.entries[i].vote)
    }

    /// All votes, oldest first, optionally restricted to one election.
    pub fn votes(&self, election_id: Option<&str>) -> Vec<Vote> {
        self.entries
            .iter()
            .filter(|e| election_id.map_or(true, |id| e.vote.election_id == id))
            .map(|e| e.vote.clone())
            .collect()
    }

    /// A voter's own votes, with the nonces needed to check them.
    pub fn votes_by(&self, voter: &VoterKey) -> Vec<(Vote, Option<Nonce>)> {
        self.entries
            .iter()
            .filter(|e| &e.voter == voter)
            .map(|e| (e.vote.clone(), e.nonce))
            .collect()
    }

    fn insert(&mut self, entry: LedgerEntry) {
        self.by_hash
            .insert(entry.vote.transaction_hash, self.entries.len());
        self.cast
            .insert((entry.voter.clone(), entry.vote.election_id.clone()));
        self.entries.push(entry);
    }
}

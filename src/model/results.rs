use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{
    common::election::{CandidateId, ElectionId, ElectionStatus},
    election::Election,
};

/// Votes for one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteResult {
    pub candidate_id: CandidateId,
    pub candidate_name: String,
    pub votes: u64,
    /// Whole percent of the election's votes.
    pub percentage: u32,
}

/// The results of one election.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionResults {
    pub election_id: ElectionId,
    pub title: String,
    pub status: ElectionStatus,
    pub total_votes: u64,
    pub eligible_voters: u64,
    /// Per-candidate results, in ballot order.
    pub results: Vec<VoteResult>,
    /// The candidate with the most votes, if anyone has any. Ties go to the
    /// earlier candidate on the ballot. Once the election is closed this is the winner.
    pub leader: Option<VoteResult>,
}

impl ElectionResults {
    /// Build results from a per-candidate tally. Candidates missing from the tally have zero votes.
    pub fn from_tally(election: &Election, tally: Option<&HashMap<CandidateId, u64>>) -> Self {
        let votes = election
            .candidates
            .iter()
            .map(|c| tally.and_then(|t| t.get(&c.id)).copied().unwrap_or(0))
            .collect::<Vec<_>>();
        let percentages = whole_percentages(&votes);
        let results = election
            .candidates
            .iter()
            .zip(votes)
            .zip(percentages)
            .map(|((candidate, votes), percentage)| VoteResult {
                candidate_id: candidate.id.clone(),
                candidate_name: candidate.name.clone(),
                votes,
                percentage,
            })
            .collect::<Vec<_>>();

        let leader = results
            .iter()
            .filter(|r| r.votes > 0)
            // `max_by_key` keeps the last maximum, so search from the back.
            .rev()
            .max_by_key(|r| r.votes)
            .cloned();

        Self {
            election_id: election.id.clone(),
            title: election.title.clone(),
            status: election.status,
            total_votes: election.total_votes,
            eligible_voters: election.eligible_voters,
            results,
            leader,
        }
    }
}

/// Split 100% between the given counts by the largest-remainder method.
///
/// The result sums to exactly 100 unless every count is zero, in which case
/// every percentage is zero. Equal remainders favour earlier entries.
pub fn whole_percentages(counts: &[u64]) -> Vec<u32> {
    let total: u128 = counts.iter().map(|&c| u128::from(c)).sum();
    if total == 0 {
        return vec![0; counts.len()];
    }

    let mut percentages = Vec::with_capacity(counts.len());
    let mut remainders = Vec::with_capacity(counts.len());
    for (i, &count) in counts.iter().enumerate() {
        let scaled = u128::from(count) * 100;
        // Each share is at most 100, so the cast is lossless.
        percentages.push((scaled / total) as u32);
        remainders.push((scaled % total, i));
    }

    let assigned: u32 = percentages.iter().sum();
    let leftover = (100 - assigned) as usize;
    remainders.sort_by(|(rem_a, i_a), (rem_b, i_b)| rem_b.cmp(rem_a).then(i_a.cmp(i_b)));
    for &(_, i) in remainders.iter().take(leftover) {
        percentages[i] += 1;
    }
    percentages
}

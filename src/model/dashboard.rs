use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{
    common::election::ElectionStatus,
    election::Election,
    user::User,
    vote::VoteReceipt,
};

/// Headline numbers for the landing page. Drafts are not counted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandingStats {
    pub active_elections: usize,
    pub total_votes: u64,
    pub total_elections: usize,
}

impl LandingStats {
    pub fn from_elections<'a>(elections: impl IntoIterator<Item = &'a Election>) -> Self {
        let mut stats = Self {
            active_elections: 0,
            total_votes: 0,
            total_elections: 0,
        };
        for election in elections.into_iter().filter(|e| e.status.is_public()) {
            stats.total_elections += 1;
            stats.total_votes += election.total_votes;
            if election.status == ElectionStatus::Active {
                stats.active_elections += 1;
            }
        }
        stats
    }
}

/// An election on the voter dashboard, flagged with whether this voter has voted in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotSummary {
    #[serde(flatten)]
    pub election: Election,
    pub has_voted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterCounts {
    /// Active elections the voter can take part in.
    pub eligible: usize,
    pub votes_cast: usize,
    pub upcoming: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterDashboard {
    pub user: User,
    pub active_elections: Vec<BallotSummary>,
    pub upcoming_elections: Vec<Election>,
    /// The voter's own votes, oldest first.
    pub votes: Vec<VoteReceipt>,
    pub counts: VoterCounts,
}

impl VoterDashboard {
    pub fn new<'a>(
        user: User,
        elections: impl IntoIterator<Item = &'a Election>,
        votes: Vec<VoteReceipt>,
    ) -> Self {
        let mut active_elections = Vec::new();
        let mut upcoming_elections = Vec::new();
        for election in elections {
            match election.status {
                ElectionStatus::Active => active_elections.push(BallotSummary {
                    has_voted: user.has_voted(&election.id),
                    election: election.clone(),
                }),
                ElectionStatus::Upcoming => upcoming_elections.push(election.clone()),
                _ => {}
            }
        }
        let counts = VoterCounts {
            eligible: active_elections.len(),
            votes_cast: votes.len(),
            upcoming: upcoming_elections.len(),
        };
        Self {
            user,
            active_elections,
            upcoming_elections,
            votes,
            counts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminDashboard {
    pub total_elections: usize,
    pub active: usize,
    pub upcoming: usize,
    pub draft: usize,
    pub closed: usize,
    pub total_votes: u64,
    /// Every status appears, even with no elections.
    pub elections_by_status: BTreeMap<ElectionStatus, Vec<Election>>,
}

impl AdminDashboard {
    pub fn from_elections<'a>(elections: impl IntoIterator<Item = &'a Election>) -> Self {
        let mut elections_by_status = ElectionStatus::ALL
            .iter()
            .map(|&status| (status, Vec::new()))
            .collect::<BTreeMap<_, Vec<Election>>>();
        let mut total_votes = 0;
        for election in elections {
            total_votes += election.total_votes;
            elections_by_status
                .entry(election.status)
                .or_default()
                .push(election.clone());
        }
        let count = |status: ElectionStatus| elections_by_status.get(&status).map_or(0, Vec::len);
        Self {
            total_elections: elections_by_status.values().map(Vec::len).sum(),
            active: count(ElectionStatus::Active),
            upcoming: count(ElectionStatus::Upcoming),
            draft: count(ElectionStatus::Draft),
            closed: count(ElectionStatus::Closed),
            total_votes,
            elections_by_status,
        }
    }
}

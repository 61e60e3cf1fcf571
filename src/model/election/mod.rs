mod spec;

pub use spec::{CandidateSpec, ElectionSpec, DEFAULT_ELIGIBLE_VOTERS};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::common::election::{CandidateId, ElectionId, ElectionStatus, UserId};

/// A candidate, or more generally an option on the ballot. Owned by exactly one election.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub position: String,
    pub bio: String,
    pub photo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party: Option<String>,
}

/// An election and its ballot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Election {
    pub id: ElectionId,
    pub title: String,
    pub description: String,
    pub status: ElectionStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Candidates in ballot order.
    pub candidates: Vec<Candidate>,
    pub total_votes: u64,
    pub eligible_voters: u64,
    pub created_by: UserId,
}

impl Election {
    /// Look up a candidate on this election's ballot.
    pub fn candidate(&self, candidate_id: &str) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == candidate_id)
    }

    /// Whether another vote would still fit within the electorate.
    pub fn has_capacity(&self) -> bool {
        self.total_votes < self.eligible_voters
    }

    /// Turnout as a whole-number percentage of the electorate.
    pub fn participation(&self) -> u32 {
        if self.eligible_voters == 0 {
            return 0;
        }
        // total_votes <= eligible_voters, so this is at most 100.
        (self.total_votes * 100 / self.eligible_voters) as u32
    }

    /// Move to a later lifecycle stage.
    pub fn advance(&mut self, next: ElectionStatus) -> Result<()> {
        if !self.status.can_advance_to(next) {
            return Err(Error::BadRequest(format!(
                "Election '{}' cannot move from {} to {}",
                self.id, self.status, next
            )));
        }
        if next == ElectionStatus::Active && self.candidates.len() < 2 {
            return Err(Error::BadRequest(format!(
                "Election '{}' needs at least two candidates before it can open",
                self.id
            )));
        }
        self.status = next;
        Ok(())
    }

    /// Case-insensitive substring match on the title and description.
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }
}

/// Body of a status change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: ElectionStatus,
}

/// Example data for tests.
#[cfg(test)]
pub(crate) mod examples {
    use chrono::TimeZone;

    use super::*;

    impl Candidate {
        pub fn example(id: &str, name: &str) -> Self {
            Self {
                id: id.to_string(),
                name: name.to_string(),
                position: "Candidate".to_string(),
                bio: String::new(),
                photo: String::new(),
                party: None,
            }
        }
    }

    impl Election {
        pub fn example(status: ElectionStatus) -> Self {
            Self {
                id: "e9".to_string(),
                title: "Treasurer Election".to_string(),
                description: "Pick the next club treasurer.".to_string(),
                status,
                start_date: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
                end_date: Utc.with_ymd_and_hms(2025, 3, 31, 0, 0, 0).unwrap(),
                candidates: vec![
                    Candidate::example("t1", "Ada"),
                    Candidate::example("t2", "Brook"),
                ],
                total_votes: 0,
                eligible_voters: 3,
                created_by: "u2".to_string(),
            }
        }
    }
}

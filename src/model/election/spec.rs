use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::common::election::{ElectionId, ElectionStatus, UserId};

use super::{Candidate, Election};

/// Electorate size assumed when the admin does not give one.
pub const DEFAULT_ELIGIBLE_VOTERS: u64 = 2500;

/// An election specification, as submitted by an admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElectionSpec {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub candidates: Vec<CandidateSpec>,
    #[serde(default = "default_eligible_voters")]
    pub eligible_voters: u64,
}

fn default_eligible_voters() -> u64 {
    DEFAULT_ELIGIBLE_VOTERS
}

/// A candidate specification. IDs are assigned on creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSpec {
    pub name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub photo: String,
    #[serde(default)]
    pub party: Option<String>,
}

impl ElectionSpec {
    /// Check the spec describes a sensible election.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::BadRequest("Election title is required".to_string()));
        }
        if self.end_date <= self.start_date {
            return Err(Error::BadRequest(
                "Election must end after it starts".to_string(),
            ));
        }
        if self.eligible_voters == 0 {
            return Err(Error::BadRequest(
                "Election must have at least one eligible voter".to_string(),
            ));
        }
        if let Some(i) = self.candidates.iter().position(|c| c.name.trim().is_empty()) {
            return Err(Error::BadRequest(format!("Candidate {} has no name", i + 1)));
        }
        Ok(())
    }

    /// Convert this spec into a draft election with the given ID.
    /// Candidates are numbered `<election_id>-c1`, `<election_id>-c2`, ... in ballot order.
    pub fn into_election(self, id: ElectionId, created_by: UserId) -> Election {
        let candidates = self
            .candidates
            .into_iter()
            .enumerate()
            .map(|(i, c)| Candidate {
                id: format!("{id}-c{}", i + 1),
                name: c.name.trim().to_string(),
                position: c.position,
                bio: c.bio,
                photo: c.photo,
                party: c.party,
            })
            .collect();
        Election {
            id,
            title: self.title.trim().to_string(),
            description: self.description,
            status: ElectionStatus::Draft,
            start_date: self.start_date,
            end_date: self.end_date,
            candidates,
            total_votes: 0,
            eligible_voters: self.eligible_voters,
            created_by,
        }
    }
}

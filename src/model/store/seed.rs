//! Demo data loaded at launch when `seed_demo_data` is set.

use chrono::{DateTime, TimeZone, Utc};

use crate::model::{
    common::election::ElectionStatus,
    election::{Candidate, Election},
    user::{Role, User},
    vote::{TransactionHash, Vote, BLOCK_NUMBER_BASE},
};

use super::Store;

const SEED_VOTER_EMAIL: &str = "john.smith@company.com";
const SEED_VOTE_HASH: &str = "0x8f7d3b2e1a4c5f6d9e0a1b2c3d4e5f6a7b8c9d0e1f2a3b4c5d6e7f8a9b0c1d2e";

/// Fill an empty store with the demo elections, their recorded results,
/// one voter and that voter's vote.
pub async fn seed_demo_data(store: &Store) {
    let elections = elections();
    let mut state = store.state.write().await;

    for (election_id, counts) in [
        ("e1", &[("c1", 523), ("c2", 412), ("c3", 312)][..]),
        ("e3", &[("p1", 1812), ("p2", 322)][..]),
    ] {
        for &(candidate_id, votes) in counts {
            state.ledger.set_baseline(election_id, candidate_id, votes);
        }
    }
    state.elections.extend(elections);

    let voter = store.voter_key(SEED_VOTER_EMAIL);
    match SEED_VOTE_HASH.parse::<TransactionHash>() {
        Ok(transaction_hash) => state.ledger.import(
            Vote {
                id: "v1".to_string(),
                election_id: "e3".to_string(),
                candidate_id: "p1".to_string(),
                transaction_hash,
                timestamp: at(2024, 7, 10, 14, 32),
                block_number: BLOCK_NUMBER_BASE,
            },
            voter,
        ),
        Err(e) => error!("Skipping seed vote: {e}"),
    }

    state.users.push(User {
        id: "u1".to_string(),
        email: SEED_VOTER_EMAIL.to_string(),
        name: "John Smith".to_string(),
        role: Role::Voter,
        wallet_address: Some("0x742d35Cc6634C0532925a3b844Bc9e7595f8fE53".to_string()),
        voted_elections: vec!["e3".to_string()],
    });
}

fn at(year: i32, month: u32, day: u32, hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, 0)
        .single()
        .expect("seed dates are valid")
}

fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    at(year, month, day, 0, 0)
}

fn candidate(
    id: &str,
    name: &str,
    position: &str,
    bio: &str,
    photo: &str,
    party: Option<&str>,
) -> Candidate {
    Candidate {
        id: id.to_string(),
        name: name.to_string(),
        position: position.to_string(),
        bio: bio.to_string(),
        photo: photo.to_string(),
        party: party.map(str::to_string),
    }
}

fn photo(id: &str) -> String {
    format!("https://images.unsplash.com/photo-{id}?w=400&h=400&fit=crop")
}

fn elections() -> Vec<Election> {
    vec![
        Election {
            id: "e1".to_string(),
            title: "2024 CEO Election".to_string(),
            description: "Annual election for the position of Chief Executive Officer. \
                All shareholders with voting rights are eligible to participate."
                .to_string(),
            status: ElectionStatus::Active,
            start_date: date(2024, 1, 15),
            end_date: date(2024, 12, 31),
            candidates: vec![
                candidate(
                    "c1",
                    "Sarah Chen",
                    "CEO Candidate",
                    "Former VP of Operations with 15 years of experience in scaling tech \
                        companies. Focused on sustainable growth and employee development.",
                    &photo("1573496359142-b8d87734a5a2"),
                    Some("Growth Coalition"),
                ),
                candidate(
                    "c2",
                    "Michael Roberts",
                    "CEO Candidate",
                    "Founder of three successful startups. Passionate about innovation and \
                        building products that make a difference.",
                    &photo("1472099645785-5658abf4ff4e"),
                    Some("Innovation First"),
                ),
                candidate(
                    "c3",
                    "Emily Johnson",
                    "CEO Candidate",
                    "CFO with expertise in financial strategy and international expansion. \
                        Committed to transparent leadership.",
                    &photo("1580489944761-15a19d654956"),
                    Some("Stability Alliance"),
                ),
            ],
            total_votes: 1247,
            eligible_voters: 2500,
            created_by: "admin".to_string(),
        },
        Election {
            id: "e2".to_string(),
            title: "Board of Directors Election".to_string(),
            description: "Election for 2 open seats on the Board of Directors. \
                Select up to 2 candidates."
                .to_string(),
            status: ElectionStatus::Upcoming,
            start_date: date(2025, 1, 1),
            end_date: date(2025, 1, 31),
            candidates: vec![
                candidate(
                    "b1",
                    "David Park",
                    "Board Member",
                    "Technology advisor with expertise in AI and machine learning. \
                        Serves on multiple Fortune 500 boards.",
                    &photo("1507003211169-0a1dd7228f2d"),
                    None,
                ),
                candidate(
                    "b2",
                    "Lisa Thompson",
                    "Board Member",
                    "Former SEC commissioner with deep regulatory expertise. \
                        Advocate for corporate governance reform.",
                    &photo("1438761681033-6461ffad8d80"),
                    None,
                ),
                candidate(
                    "b3",
                    "James Wilson",
                    "Board Member",
                    "Investment banker specializing in M&A. \
                        Strong track record in value creation strategies.",
                    &photo("1500648767791-00dcc994a43e"),
                    None,
                ),
                candidate(
                    "b4",
                    "Maria Garcia",
                    "Board Member",
                    "Environmental sustainability expert. \
                        Leading voice in ESG integration and responsible investing.",
                    &photo("1534528741775-53994a69daeb"),
                    None,
                ),
            ],
            total_votes: 0,
            eligible_voters: 2500,
            created_by: "admin".to_string(),
        },
        Election {
            id: "e3".to_string(),
            title: "Q3 Budget Proposal Vote".to_string(),
            description: "Vote on the proposed Q3 budget allocation including R&D expansion \
                and new office facilities."
                .to_string(),
            status: ElectionStatus::Closed,
            start_date: date(2024, 7, 1),
            end_date: date(2024, 7, 15),
            candidates: vec![
                candidate(
                    "p1",
                    "Approve Budget",
                    "Yes",
                    "Approve the proposed Q3 budget of $45M",
                    "",
                    None,
                ),
                candidate(
                    "p2",
                    "Reject Budget",
                    "No",
                    "Reject the proposal and request revision",
                    "",
                    None,
                ),
            ],
            total_votes: 2134,
            eligible_voters: 2500,
            created_by: "admin".to_string(),
        },
    ]
}

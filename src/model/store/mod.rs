pub mod ledger;
pub mod seed;

use std::sync::Arc;

use rocket::tokio::sync::RwLock;

use crate::error::{Error, Result};
use crate::model::{
    common::election::{ElectionId, ElectionStatus, UserId},
    dashboard::{AdminDashboard, LandingStats, VoterDashboard},
    election::{Election, ElectionSpec},
    pagination::{Paginated, PaginationRequest},
    results::ElectionResults,
    user::{
        display_name_from_email, normalise_email, random_wallet_address, AdminAccount, Role, User,
        VoterKey,
    },
    vote::{TransactionHash, VerifiedVote, Vote, VoteReceipt},
};

use self::ledger::Ledger;

/// Which elections to list.
#[derive(Debug, Clone, Default)]
pub struct ElectionFilter {
    pub include_drafts: bool,
    pub status: Option<ElectionStatus>,
    /// Case-insensitive substring of the title or description.
    pub search: Option<String>,
}

/// The whole application state. Cloning is cheap and every clone shares the same data.
///
/// Each operation takes the lock once, so checks and the mutations that
/// depend on them can never interleave with another request.
#[derive(Clone)]
pub struct Store {
    state: Arc<RwLock<State>>,
    hmac_secret: Arc<[u8]>,
}

#[derive(Default)]
struct State {
    elections: Vec<Election>,
    ledger: Ledger,
    users: Vec<User>,
    admins: Vec<AdminAccount>,
}

impl State {
    fn election(&self, election_id: &str, include_drafts: bool) -> Result<&Election> {
        self.elections
            .iter()
            .find(|e| e.id == election_id && (include_drafts || e.status.is_public()))
            .ok_or_else(|| Error::not_found(format!("Election '{election_id}'")))
    }

    fn user(&self, user_id: &str) -> Result<&User> {
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .ok_or_else(|| Error::not_found(format!("User '{user_id}'")))
    }

    fn user_mut(&mut self, user_id: &str) -> Result<&mut User> {
        self.users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| Error::not_found(format!("User '{user_id}'")))
    }

    fn results(&self, election: &Election) -> ElectionResults {
        ElectionResults::from_tally(election, self.ledger.tally(&election.id))
    }

    /// Attach the election title and candidate name to a vote.
    fn describe(&self, vote: Vote) -> VerifiedVote {
        let election = self.elections.iter().find(|e| e.id == vote.election_id);
        let election_title = election.map(|e| e.title.clone()).unwrap_or_default();
        let candidate_name = election
            .and_then(|e| e.candidate(&vote.candidate_id))
            .map(|c| c.name.clone())
            .unwrap_or_default();
        VerifiedVote {
            vote,
            election_title,
            candidate_name,
        }
    }

    fn receipts(&self, voter: &VoterKey) -> Vec<VoteReceipt> {
        self.ledger
            .votes_by(voter)
            .into_iter()
            .map(|(vote, nonce)| VoteReceipt {
                vote: self.describe(vote),
                nonce,
            })
            .collect()
    }

    fn add_user(&mut self, email: String, name: String, role: Role) -> User {
        let user = User {
            id: format!("u{}", self.users.len() + 1),
            email,
            name,
            role,
            wallet_address: None,
            voted_elections: Vec::new(),
        };
        self.users.push(user.clone());
        user
    }
}

impl Store {
    pub fn new(hmac_secret: &[u8]) -> Self {
        Self {
            state: Arc::new(RwLock::new(State::default())),
            hmac_secret: hmac_secret.into(),
        }
    }

    fn voter_key(&self, email: &str) -> VoterKey {
        VoterKey::derive(email, &self.hmac_secret)
    }

    // Elections

    /// List elections matching the filter, in creation order.
    pub async fn elections(&self, filter: &ElectionFilter) -> Vec<Election> {
        let needle = filter.search.as_deref().map(|s| s.trim().to_lowercase());
        let state = self.state.read().await;
        state
            .elections
            .iter()
            .filter(|e| filter.include_drafts || e.status.is_public())
            .filter(|e| filter.status.map_or(true, |s| e.status == s))
            .filter(|e| needle.as_deref().map_or(true, |n| e.matches(n)))
            .cloned()
            .collect()
    }

    pub async fn election(&self, election_id: &str, include_drafts: bool) -> Result<Election> {
        let state = self.state.read().await;
        state.election(election_id, include_drafts).cloned()
    }

    /// Create a draft election from an admin's specification.
    pub async fn create_election(&self, spec: ElectionSpec, created_by: UserId) -> Result<Election> {
        spec.validate()?;
        let mut state = self.state.write().await;
        let id: ElectionId = format!("e{}", state.elections.len() + 1);
        let election = spec.into_election(id, created_by);
        state.elections.push(election.clone());
        info!(
            "Election '{}' ({}) created by {} with {} candidates",
            election.id,
            election.title,
            election.created_by,
            election.candidates.len()
        );
        Ok(election)
    }

    /// Move an election forward through its lifecycle.
    pub async fn update_status(&self, election_id: &str, status: ElectionStatus) -> Result<Election> {
        let mut state = self.state.write().await;
        let election = state
            .elections
            .iter_mut()
            .find(|e| e.id == election_id)
            .ok_or_else(|| Error::not_found(format!("Election '{election_id}'")))?;
        let previous = election.status;
        election.advance(status)?;
        info!("Election '{election_id}' moved from {previous} to {status}");
        Ok(election.clone())
    }

    // Votes

    /// Cast a vote on behalf of a voter.
    pub async fn cast_vote(
        &self,
        user_id: &str,
        election_id: &str,
        candidate_id: &str,
    ) -> Result<VoteReceipt> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let user = state.user(user_id)?;
        let voter = self.voter_key(&user.email);
        let already_voted = user.has_voted(election_id);

        let election = state
            .elections
            .iter_mut()
            .find(|e| e.id == election_id && e.status.is_public())
            .ok_or_else(|| Error::not_found(format!("Election '{election_id}'")))?;
        let candidate_name = election
            .candidate(candidate_id)
            .map(|c| c.name.clone())
            .ok_or_else(|| {
                Error::not_found(format!(
                    "Candidate '{candidate_id}' in election '{election_id}'"
                ))
            })?;
        if election.status != ElectionStatus::Active {
            return Err(Error::BadRequest(format!(
                "Election '{election_id}' is {} and not accepting votes",
                election.status
            )));
        }
        if already_voted || state.ledger.has_cast(&voter, election_id) {
            return Err(Error::Conflict(format!(
                "Already voted in election '{election_id}'"
            )));
        }
        if !election.has_capacity() {
            return Err(Error::Conflict(format!(
                "Election '{election_id}' has reached its {} eligible voters",
                election.eligible_voters
            )));
        }

        let (vote, nonce) =
            state
                .ledger
                .append(voter, election_id, candidate_id, &mut rand::thread_rng());
        election.total_votes += 1;
        let election_title = election.title.clone();
        state
            .user_mut(user_id)?
            .voted_elections
            .push(election_id.to_string());

        info!(
            "Vote {} recorded in election '{}' at block {} with hash {}",
            vote.id, vote.election_id, vote.block_number, vote.transaction_hash
        );
        Ok(VoteReceipt {
            vote: VerifiedVote {
                vote,
                election_title,
                candidate_name,
            },
            nonce: Some(nonce),
        })
    }

    /// Look up a vote by its transaction hash.
    pub async fn verify_vote(&self, hash: &TransactionHash) -> Result<VerifiedVote> {
        let state = self.state.read().await;
        let vote = state
            .ledger
            .find(hash)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("Vote with transaction hash {hash}")))?;
        Ok(state.describe(vote))
    }

    /// Whether the user has voted in the given election.
    pub async fn has_voted(&self, user_id: &str, election_id: &str) -> Result<bool> {
        let state = self.state.read().await;
        let user = state.user(user_id)?;
        Ok(user.has_voted(election_id)
            || state
                .ledger
                .has_cast(&self.voter_key(&user.email), election_id))
    }

    /// The public ledger, oldest first.
    pub async fn votes_page(
        &self,
        election_id: Option<&str>,
        include_drafts: bool,
        pagination: &PaginationRequest,
    ) -> Result<Paginated<Vote>> {
        let state = self.state.read().await;
        if let Some(election_id) = election_id {
            state.election(election_id, include_drafts)?;
        }
        Ok(pagination.paginate(&state.ledger.votes(election_id)))
    }

    /// A user's own votes, with the nonces needed to recheck them.
    pub async fn voter_receipts(&self, user_id: &str) -> Result<Vec<VoteReceipt>> {
        let state = self.state.read().await;
        let user = state.user(user_id)?;
        Ok(state.receipts(&self.voter_key(&user.email)))
    }

    // Results

    pub async fn results(&self, election_id: &str, include_drafts: bool) -> Result<ElectionResults> {
        let state = self.state.read().await;
        let election = state.election(election_id, include_drafts)?;
        Ok(state.results(election))
    }

    /// Results of every election that is closed or has any votes.
    pub async fn all_results(&self, include_drafts: bool) -> Vec<ElectionResults> {
        let state = self.state.read().await;
        state
            .elections
            .iter()
            .filter(|e| include_drafts || e.status.is_public())
            .filter(|e| e.status == ElectionStatus::Closed || e.total_votes > 0)
            .map(|e| state.results(e))
            .collect()
    }

    // Users

    pub async fn user(&self, user_id: &str) -> Result<User> {
        let state = self.state.read().await;
        state.user(user_id).cloned()
    }

    /// Sign in by email, creating the user on first sign-in.
    /// Each role gets its own user record, so one email may have several.
    /// Credentials must already have been checked.
    pub async fn sign_in(&self, email: &str, role: Role) -> Result<User> {
        let email = normalise_email(email)?;
        let mut state = self.state.write().await;
        if let Some(user) = state.users.iter().find(|u| u.email == email && u.role == role) {
            return Ok(user.clone());
        }
        let name = display_name_from_email(&email);
        let user = state.add_user(email, name, role);
        info!("Created {role} {} on first sign-in", user.id);
        Ok(user)
    }

    /// Register a new voter.
    pub async fn sign_up(&self, name: &str, email: &str) -> Result<User> {
        let email = normalise_email(email)?;
        let name = match name.trim() {
            "" => display_name_from_email(&email),
            name => name.to_string(),
        };
        let mut state = self.state.write().await;
        if state
            .users
            .iter()
            .any(|u| u.email == email && u.role == Role::Voter)
        {
            return Err(Error::Conflict(format!(
                "An account for '{email}' already exists"
            )));
        }
        let user = state.add_user(email, name, Role::Voter);
        info!("Registered voter {}", user.id);
        Ok(user)
    }

    /// Give the user a wallet address, or return the one they already have.
    pub async fn connect_wallet(&self, user_id: &str) -> Result<String> {
        let mut state = self.state.write().await;
        let user = state.user_mut(user_id)?;
        if let Some(address) = &user.wallet_address {
            return Ok(address.clone());
        }
        let address = random_wallet_address(&mut rand::thread_rng());
        user.wallet_address = Some(address.clone());
        info!("Connected wallet {address} for user {user_id}");
        Ok(address)
    }

    // Admins

    pub async fn admin_count(&self) -> usize {
        self.state.read().await.admins.len()
    }

    /// Look up an admin account by username, case-insensitively.
    pub async fn admin(&self, username: &str) -> Option<AdminAccount> {
        let username = username.trim().to_lowercase();
        let state = self.state.read().await;
        state.admins.iter().find(|a| a.username == username).cloned()
    }

    pub async fn add_admin(&self, admin: AdminAccount) -> Result<()> {
        let mut state = self.state.write().await;
        if state.admins.iter().any(|a| a.username == admin.username) {
            return Err(Error::Conflict(format!(
                "Admin '{}' already exists",
                admin.username
            )));
        }
        info!("Added admin '{}'", admin.username);
        state.admins.push(admin);
        Ok(())
    }

    /// Remove an admin account. The last admin cannot be removed.
    pub async fn remove_admin(&self, username: &str) -> Result<()> {
        let username = username.trim().to_lowercase();
        let mut state = self.state.write().await;
        let index = state
            .admins
            .iter()
            .position(|a| a.username == username)
            .ok_or_else(|| Error::not_found(format!("Admin '{username}'")))?;
        if state.admins.len() == 1 {
            return Err(Error::Conflict("Cannot remove the last admin".to_string()));
        }
        state.admins.remove(index);
        info!("Removed admin '{username}'");
        Ok(())
    }

    pub async fn admin_usernames(&self) -> Vec<String> {
        let state = self.state.read().await;
        state.admins.iter().map(|a| a.username.clone()).collect()
    }

    // Dashboards

    pub async fn landing_stats(&self) -> LandingStats {
        let state = self.state.read().await;
        LandingStats::from_elections(&state.elections)
    }

    pub async fn admin_dashboard(&self) -> AdminDashboard {
        let state = self.state.read().await;
        AdminDashboard::from_elections(&state.elections)
    }

    pub async fn voter_dashboard(&self, user_id: &str) -> Result<VoterDashboard> {
        let state = self.state.read().await;
        let user = state.user(user_id)?.clone();
        let votes = state.receipts(&self.voter_key(&user.email));
        Ok(VoterDashboard::new(user, &state.elections, votes))
    }
}

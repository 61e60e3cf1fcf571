use rocket::{serde::json::Json, Route, State};

use crate::{
    config::simulate_latency,
    error::Result,
    model::{
        auth::{AuthToken, VoterOnly},
        dashboard::VoterDashboard,
        store::Store,
        user::WalletConnection,
        vote::{CastVoteRequest, VoteReceipt, VotedStatus},
    },
    Config,
};

pub fn routes() -> Vec<Route> {
    routes![cast_vote, voted, dashboard, connect_wallet]
}

#[post("/elections/<election_id>/vote", data = "<ballot>", format = "json")]
async fn cast_vote(
    token: AuthToken<VoterOnly>,
    election_id: &str,
    ballot: Json<CastVoteRequest>,
    store: &State<Store>,
    config: &State<Config>,
) -> Result<Json<VoteReceipt>> {
    simulate_latency(config.cast_latency()).await;
    let receipt = store
        .cast_vote(token.id(), election_id, &ballot.candidate_id)
        .await?;
    Ok(Json(receipt))
}

#[get("/elections/<election_id>/voted")]
async fn voted(
    token: AuthToken<VoterOnly>,
    election_id: &str,
    store: &State<Store>,
) -> Result<Json<VotedStatus>> {
    let election = store.election(election_id, false).await?;
    let has_voted = store.has_voted(token.id(), &election.id).await?;
    Ok(Json(VotedStatus {
        election_id: election.id,
        has_voted,
    }))
}

#[get("/voter/dashboard")]
async fn dashboard(token: AuthToken<VoterOnly>, store: &State<Store>) -> Result<Json<VoterDashboard>> {
    Ok(Json(store.voter_dashboard(token.id()).await?))
}

#[post("/voter/wallet")]
async fn connect_wallet(
    token: AuthToken<VoterOnly>,
    store: &State<Store>,
    config: &State<Config>,
) -> Result<Json<WalletConnection>> {
    simulate_latency(config.wallet_latency()).await;
    let wallet_address = store.connect_wallet(token.id()).await?;
    Ok(Json(WalletConnection { wallet_address }))
}

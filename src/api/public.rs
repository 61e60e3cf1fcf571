use rocket::{serde::json::Json, Route, State};

use crate::{
    config::simulate_latency,
    error::{Error, Result},
    model::{
        auth::{AdminOnly, AuthToken},
        common::election::ElectionStatus,
        dashboard::LandingStats,
        election::Election,
        pagination::{Paginated, PaginationRequest},
        results::ElectionResults,
        store::{ElectionFilter, Store},
        vote::{TransactionHash, VerifiedVote, Vote},
    },
    Config,
};

pub fn routes() -> Vec<Route> {
    routes![
        stats,
        elections,
        election,
        election_results,
        all_results,
        verify_vote,
        votes,
    ]
}

/// Admins see drafts; everyone else does not.
type MaybeAdmin = Option<AuthToken<AdminOnly>>;

#[get("/stats")]
async fn stats(store: &State<Store>) -> Json<LandingStats> {
    Json(store.landing_stats().await)
}

#[get("/elections?<status>&<search>")]
async fn elections(
    admin: MaybeAdmin,
    status: Option<ElectionStatus>,
    search: Option<String>,
    store: &State<Store>,
) -> Json<Vec<Election>> {
    let filter = ElectionFilter {
        include_drafts: admin.is_some(),
        status,
        search: search.filter(|s| !s.trim().is_empty()),
    };
    Json(store.elections(&filter).await)
}

#[get("/elections/<election_id>")]
async fn election(
    admin: MaybeAdmin,
    election_id: &str,
    store: &State<Store>,
) -> Result<Json<Election>> {
    Ok(Json(store.election(election_id, admin.is_some()).await?))
}

#[get("/elections/<election_id>/results")]
async fn election_results(
    admin: MaybeAdmin,
    election_id: &str,
    store: &State<Store>,
) -> Result<Json<ElectionResults>> {
    Ok(Json(store.results(election_id, admin.is_some()).await?))
}

#[get("/results")]
async fn all_results(admin: MaybeAdmin, store: &State<Store>) -> Json<Vec<ElectionResults>> {
    Json(store.all_results(admin.is_some()).await)
}

/// Look a vote up by transaction hash. Malformed hashes are rejected
/// before the simulated lookup.
#[get("/votes/<hash>")]
async fn verify_vote(
    hash: std::result::Result<TransactionHash, Error>,
    store: &State<Store>,
    config: &State<Config>,
) -> Result<Json<VerifiedVote>> {
    let hash = hash?;
    simulate_latency(config.verify_latency()).await;
    Ok(Json(store.verify_vote(&hash).await?))
}

#[get("/votes?<election_id>&<pagination..>")]
async fn votes(
    admin: MaybeAdmin,
    election_id: Option<&str>,
    pagination: PaginationRequest,
    store: &State<Store>,
) -> Result<Json<Paginated<Vote>>> {
    Ok(Json(
        store
            .votes_page(election_id, admin.is_some(), &pagination)
            .await?,
    ))
}

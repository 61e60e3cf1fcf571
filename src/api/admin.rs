use rocket::{http::Status, serde::json::Json, Route, State};

use crate::{
    error::Result,
    model::{
        auth::{AdminOnly, AuthToken},
        dashboard::AdminDashboard,
        election::{Election, ElectionSpec, StatusUpdate},
        store::Store,
        user::{AdminAccount, AdminCredentials},
    },
};

pub fn routes() -> Vec<Route> {
    routes![
        get_admins,
        create_admin,
        delete_admin,
        create_election,
        set_status,
        dashboard,
    ]
}

#[get("/admins")]
async fn get_admins(_token: AuthToken<AdminOnly>, store: &State<Store>) -> Json<Vec<String>> {
    Json(store.admin_usernames().await)
}

#[post("/admins", data = "<new_admin>", format = "json")]
async fn create_admin(
    _token: AuthToken<AdminOnly>,
    new_admin: Json<AdminCredentials>,
    store: &State<Store>,
) -> Result<Status> {
    let admin = AdminAccount::try_from(new_admin.0)?;
    store.add_admin(admin).await?;
    Ok(Status::Created)
}

#[delete("/admins/<username>")]
async fn delete_admin(
    token: AuthToken<AdminOnly>,
    username: &str,
    store: &State<Store>,
) -> Result<Status> {
    store.remove_admin(username).await?;
    info!("Admin '{username}' removed by {}", token.id());
    Ok(Status::Ok)
}

#[post("/elections", data = "<spec>", format = "json")]
async fn create_election(
    token: AuthToken<AdminOnly>,
    spec: Json<ElectionSpec>,
    store: &State<Store>,
) -> Result<(Status, Json<Election>)> {
    let election = store
        .create_election(spec.0, token.id().to_string())
        .await?;
    Ok((Status::Created, Json(election)))
}

#[put("/elections/<election_id>/status", data = "<update>", format = "json")]
async fn set_status(
    _token: AuthToken<AdminOnly>,
    election_id: &str,
    update: Json<StatusUpdate>,
    store: &State<Store>,
) -> Result<Json<Election>> {
    Ok(Json(store.update_status(election_id, update.status).await?))
}

#[get("/admin/dashboard")]
async fn dashboard(_token: AuthToken<AdminOnly>, store: &State<Store>) -> Json<AdminDashboard> {
    Json(store.admin_dashboard().await)
}

#[cfg(test)]
mod tests {
    use rocket::{http::ContentType, local::asynchronous::Client, serde::json::serde_json::json};

    use crate::config::TEST_ADMIN_USERNAME;
    use crate::error::ErrorBody;
    use crate::model::{
        auth::LoginRequest,
        common::election::ElectionStatus,
        election::CandidateSpec,
        user::Role,
    };

    use super::*;

    async fn put_status(client: &Client, election_id: &str, status: ElectionStatus) -> Status {
        client
            .put(uri!(set_status(election_id)))
            .header(ContentType::JSON)
            .body(json!(StatusUpdate { status }).to_string())
            .dispatch()
            .await
            .status()
    }

    #[backend_test(admin)]
    async fn create_election_as_draft(client: Client, store: Store) {
        let response = client
            .post(uri!(create_election))
            .header(ContentType::JSON)
            .body(json!(ElectionSpec::example()).to_string())
            .dispatch()
            .await;

        assert_eq!(Status::Created, response.status());
        let election: Election = response.into_json().await.unwrap();
        assert_eq!(election.id, "e4");
        assert_eq!(election.status, ElectionStatus::Draft);
        assert_eq!(election.total_votes, 0);
        let ids = election
            .candidates
            .iter()
            .map(|c| c.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["e4-c1", "e4-c2"]);

        // Created by the signed-in admin.
        let creator = store.user(&election.created_by).await.unwrap();
        assert_eq!(creator.role, Role::Admin);
        assert_eq!(store.election("e4", true).await.unwrap(), election);
    }

    #[backend_test(admin)]
    async fn create_election_defaults(client: Client) {
        let response = client
            .post(uri!(create_election))
            .header(ContentType::JSON)
            .body(
                json!({
                    "title": "Bylaw Amendment",
                    "start_date": "2025-02-01T00:00:00Z",
                    "end_date": "2025-02-08T00:00:00Z",
                })
                .to_string(),
            )
            .dispatch()
            .await;

        assert_eq!(Status::Created, response.status());
        let election: Election = response.into_json().await.unwrap();
        assert_eq!(election.description, "");
        assert_eq!(election.eligible_voters, 2500);
        assert!(election.candidates.is_empty());
    }

    #[backend_test(admin)]
    async fn create_election_invalid(client: Client) {
        let mut spec = ElectionSpec::example();
        spec.end_date = spec.start_date;
        let response = client
            .post(uri!(create_election))
            .header(ContentType::JSON)
            .body(json!(spec).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());

        // Missing title.
        let response = client
            .post(uri!(create_election))
            .header(ContentType::JSON)
            .body(json!({ "start_date": "2025-02-01T00:00:00Z", "end_date": "2025-02-08T00:00:00Z" }).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::UnprocessableEntity, response.status());
    }

    #[backend_test(voter)]
    async fn voters_cannot_create_elections(client: Client, store: Store) {
        let response = client
            .post(uri!(create_election))
            .header(ContentType::JSON)
            .body(json!(ElectionSpec::example()).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Forbidden, response.status());
        assert!(store.election("e4", true).await.is_err());
    }

    #[backend_test]
    async fn anonymous_cannot_create_elections(client: Client) {
        let response = client
            .post(uri!(create_election))
            .header(ContentType::JSON)
            .body(json!(ElectionSpec::example()).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Unauthorized, response.status());
    }

    #[backend_test(admin)]
    async fn status_moves_forward(client: Client, store: Store) {
        let election = store
            .create_election(ElectionSpec::example(), "u0".to_string())
            .await
            .unwrap();
        let id = election.id.as_str();

        assert_eq!(Status::Ok, put_status(&client, id, ElectionStatus::Upcoming).await);
        assert_eq!(Status::BadRequest, put_status(&client, id, ElectionStatus::Draft).await);
        assert_eq!(Status::BadRequest, put_status(&client, id, ElectionStatus::Upcoming).await);
        assert_eq!(Status::Ok, put_status(&client, id, ElectionStatus::Active).await);
        assert_eq!(Status::Ok, put_status(&client, id, ElectionStatus::Closed).await);
        assert_eq!(Status::BadRequest, put_status(&client, id, ElectionStatus::Active).await);
        assert_eq!(
            store.election(id, true).await.unwrap().status,
            ElectionStatus::Closed
        );

        assert_eq!(Status::NotFound, put_status(&client, "e99", ElectionStatus::Closed).await);
    }

    #[backend_test(admin)]
    async fn opening_needs_two_candidates(client: Client, store: Store) {
        let mut spec = ElectionSpec::example();
        spec.candidates = vec![CandidateSpec::example("Only Option")];
        let election = store.create_election(spec, "u0".to_string()).await.unwrap();

        let response = client
            .put(uri!(set_status(election.id.as_str())))
            .header(ContentType::JSON)
            .body(json!({ "status": "active" }).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());
        let body: ErrorBody = response.into_json().await.unwrap();
        assert!(body.reason.contains("two candidates"));
    }

    #[backend_test(admin)]
    async fn admin_dashboard(client: Client, store: Store) {
        store
            .create_election(ElectionSpec::example(), "u0".to_string())
            .await
            .unwrap();

        let response = client.get(uri!(dashboard)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let dashboard: AdminDashboard = response.into_json().await.unwrap();
        assert_eq!(dashboard.total_elections, 4);
        assert_eq!(dashboard.draft, 1);
        assert_eq!(dashboard.upcoming, 1);
        assert_eq!(dashboard.active, 1);
        assert_eq!(dashboard.closed, 1);
        assert_eq!(dashboard.total_votes, 1247 + 2134);
        assert_eq!(dashboard.elections_by_status[&ElectionStatus::Draft][0].id, "e4");
    }

    #[backend_test(voter)]
    async fn admin_dashboard_forbidden(client: Client) {
        let response = client.get(uri!(dashboard)).dispatch().await;
        assert_eq!(Status::Forbidden, response.status());
    }

    #[backend_test(admin)]
    async fn manage_admins(client: Client) {
        let response = client.get(uri!(get_admins)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let admins: Vec<String> = response.into_json().await.unwrap();
        assert_eq!(admins, vec![TEST_ADMIN_USERNAME]);

        let response = client
            .post(uri!(create_admin))
            .header(ContentType::JSON)
            .body(json!(AdminCredentials::example()).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Created, response.status());

        // Usernames are unique.
        let response = client
            .post(uri!(create_admin))
            .header(ContentType::JSON)
            .body(json!(AdminCredentials::example()).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Conflict, response.status());

        let response = client
            .post(uri!(create_admin))
            .header(ContentType::JSON)
            .body(json!(AdminCredentials::empty()).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());

        let response = client.get(uri!(get_admins)).dispatch().await;
        let admins: Vec<String> = response.into_json().await.unwrap();
        assert_eq!(admins, vec![TEST_ADMIN_USERNAME, "returning-officer"]);
    }

    #[backend_test(admin)]
    async fn delete_admins(client: Client, store: Store) {
        // The last admin cannot be removed.
        let response = client
            .delete(uri!(delete_admin(TEST_ADMIN_USERNAME)))
            .dispatch()
            .await;
        assert_eq!(Status::Conflict, response.status());

        store
            .add_admin(AdminAccount::try_from(AdminCredentials::example()).unwrap())
            .await
            .unwrap();
        let response = client
            .delete(uri!(delete_admin("returning-officer")))
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        assert_eq!(store.admin_count().await, 1);

        let response = client
            .delete(uri!(delete_admin("returning-officer")))
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[backend_test(admin)]
    async fn removed_admin_loses_access(client: Client, store: Store) {
        let deputy = AdminCredentials::example();
        store
            .add_admin(AdminAccount::try_from(deputy.clone()).unwrap())
            .await
            .unwrap();
        store.remove_admin(TEST_ADMIN_USERNAME).await.unwrap();

        // The session outlives the account but no longer grants anything.
        let response = client.get(uri!(get_admins)).dispatch().await;
        assert_eq!(Status::Unauthorized, response.status());
        let body: ErrorBody = response.into_json().await.unwrap();
        assert!(body.reason.contains("no longer exists"));

        let response = client
            .post(uri!(create_admin))
            .header(ContentType::JSON)
            .body(
                json!(AdminCredentials {
                    username: TEST_ADMIN_USERNAME.to_string(),
                    password: "back-again-123".to_string(),
                })
                .to_string(),
            )
            .dispatch()
            .await;
        assert_eq!(Status::Unauthorized, response.status());
        assert_eq!(store.admin_usernames().await, vec!["returning-officer"]);

        // The remaining admin can still sign in and work.
        let response = client
            .post(uri!(crate::api::auth::login))
            .header(ContentType::JSON)
            .body(
                json!(LoginRequest::admin(
                    &format!("{}@blockvote.local", deputy.username),
                    &deputy.password
                ))
                .to_string(),
            )
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let response = client.get(uri!(get_admins)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
    }

    #[backend_test(voter)]
    async fn voters_cannot_manage_admins(client: Client) {
        let response = client.get(uri!(get_admins)).dispatch().await;
        assert_eq!(Status::Forbidden, response.status());

        let response = client
            .post(uri!(create_admin))
            .header(ContentType::JSON)
            .body(json!(AdminCredentials::example()).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Forbidden, response.status());
    }
}

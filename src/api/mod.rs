use rocket::{
    http::Status,
    response::status::Custom,
    serde::json::Json,
    Catcher, Request, Route,
};

use crate::{error::ErrorBody, model::auth::AuthRejection};

pub mod admin;
pub mod auth;
pub mod public;
pub mod voter;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(admin::routes());
    routes.extend(public::routes());
    routes.extend(auth::routes());
    routes.extend(voter::routes());
    routes
}

pub fn catchers() -> Vec<Catcher> {
    catchers![default_catcher]
}

/// Answer every unhandled error with the same JSON body as handler errors.
#[catch(default)]
fn default_catcher(status: Status, req: &Request) -> Custom<Json<ErrorBody>> {
    let reason = match &req.local_cache(|| AuthRejection(None)).0 {
        Some(reason) if matches!(status.code, 401 | 403) => reason.clone(),
        _ => status.reason_lossy().to_string(),
    };
    Custom(status, Json(ErrorBody::new(status, reason)))
}

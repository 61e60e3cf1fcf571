use rocket::{
    http::{Cookie, CookieJar, Status},
    serde::json::Json,
    Route, State,
};

use crate::{
    config::simulate_latency,
    error::{Error, Result},
    model::{
        auth::{AuthToken, LoginRequest, SignedIn, SignupRequest, AUTH_TOKEN_COOKIE},
        store::Store,
        user::{Role, User},
    },
    Config,
};

pub fn routes() -> Vec<Route> {
    routes![login, signup, logout, me]
}

#[post("/auth/login", data = "<request>", format = "json")]
pub async fn login(
    request: Json<LoginRequest>,
    cookies: &CookieJar<'_>,
    store: &State<Store>,
    config: &State<Config>,
) -> Result<Json<User>> {
    let email = request.validate()?;
    simulate_latency(config.login_latency()).await;

    if request.role == Role::Admin {
        let verified = match store.admin(request.admin_username()).await {
            Some(admin) => admin.verify_password(&request.password),
            None => false,
        };
        if !verified {
            return Err(Error::Unauthorized(
                "No admin found with the provided email and password combination".to_string(),
            ));
        }
    }

    let user = store.sign_in(&email, request.role).await?;
    let token = match user.role {
        Role::Admin => AuthToken::<SignedIn>::for_admin(&user, request.admin_username()),
        _ => AuthToken::<SignedIn>::new(&user),
    };
    cookies.add(token.into_cookie(config)?);
    info!("{} signed in as {}", user.id, user.role);
    Ok(Json(user))
}

#[post("/auth/signup", data = "<request>", format = "json")]
pub async fn signup(
    request: Json<SignupRequest>,
    cookies: &CookieJar<'_>,
    store: &State<Store>,
    config: &State<Config>,
) -> Result<Json<User>> {
    let email = request.validate()?;
    simulate_latency(config.login_latency()).await;

    let user = store.sign_up(&request.name, &email).await?;
    cookies.add(AuthToken::<SignedIn>::new(&user).into_cookie(config)?);
    Ok(Json(user))
}

#[delete("/auth")]
pub fn logout(cookies: &CookieJar) -> Status {
    cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
    Status::Ok
}

#[get("/auth/me")]
pub async fn me(token: AuthToken<SignedIn>, store: &State<Store>) -> Result<Json<User>> {
    Ok(Json(store.user(token.id()).await?))
}

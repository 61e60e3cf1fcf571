use std::marker::PhantomData;

use chrono::{serde::ts_seconds, DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use rocket::{
    http::{Cookie, SameSite},
    request::{self, FromRequest},
    Request,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{common::election::UserId, store::Store, user::{Role, User}};
use crate::Config;

use super::Rights;

pub const AUTH_TOKEN_COOKIE: &str = "auth_token";

/// Why the auth guard turned a request away, for the error catcher to report.
/// Cached on the request, empty unless the guard failed.
pub struct AuthRejection(pub Option<String>);

/// An authentication token representing a specific user signed in with a
/// specific role. As a request guard, it only succeeds if the role has the rights `R`.
#[derive(Serialize, Deserialize)]
pub struct AuthToken<R> {
    id: UserId,
    role: Role,
    /// The admin account the session was opened with, for admin sessions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    admin: Option<String>,
    #[serde(skip)]
    phantom: PhantomData<R>,
}

impl<R> AuthToken<R> {
    /// Get the user ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the role the user signed in with.
    pub fn role(&self) -> Role {
        self.role
    }
}

impl<R: Rights> AuthToken<R> {
    /// Create a token for the given user in their current role.
    pub fn new(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            role: user.role,
            admin: None,
            phantom: PhantomData,
        }
    }

    /// Create a token for a user signed in through the named admin account.
    /// The session only lasts as long as that account does.
    pub fn for_admin(user: &User, username: &str) -> Self {
        Self {
            admin: Some(username.trim().to_lowercase()),
            ..Self::new(user)
        }
    }

    /// Serialize this token into a cookie.
    pub fn into_cookie(self, config: &Config) -> Result<Cookie<'static>> {
        let claims = Claims {
            token: self,
            expire_at: Utc::now() + config.auth_ttl(),
        };

        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret()),
        )?;

        Ok(Cookie::build(AUTH_TOKEN_COOKIE, token)
            .path("/")
            .max_age(rocket::time::Duration::seconds(
                config.auth_ttl().num_seconds(),
            ))
            .http_only(true)
            .same_site(SameSite::Strict)
            .finish())
    }

    /// Deserialize a token from a cookie.
    pub fn from_cookie(cookie: &Cookie<'_>, config: &Config) -> Result<Self> {
        let data: TokenData<Claims<R>> = jsonwebtoken::decode(
            cookie.value(),
            &DecodingKey::from_secret(config.jwt_secret()),
            &Validation::default(),
        )?;
        Ok(data.claims.token)
    }

    /// Decode the cookie, check the user and any admin account still exist,
    /// then check their rights.
    async fn authenticate(req: &Request<'_>) -> Result<Self> {
        // Both are placed in managed state by the ignite fairings.
        let config = req
            .rocket()
            .state::<Config>()
            .expect("Config is always managed");
        let store = req.rocket().state::<Store>().expect("Store is always managed");

        let cookie = req
            .cookies()
            .get(AUTH_TOKEN_COOKIE)
            .ok_or_else(|| Error::Unauthorized("Not signed in".to_string()))?;
        let token = Self::from_cookie(cookie, config)
            .map_err(|e| Error::Unauthorized(format!("Invalid auth token: {e}")))?;
        store
            .user(&token.id)
            .await
            .map_err(|_| Error::Unauthorized("Session refers to an unknown user".to_string()))?;
        if token.role == Role::Admin {
            let username = token.admin.as_deref().unwrap_or_default();
            if store.admin(username).await.is_none() {
                return Err(Error::Unauthorized(format!(
                    "Admin account '{username}' no longer exists"
                )));
            }
        }

        if !R::permits(token.role) {
            return Err(Error::Forbidden(format!(
                "Only {} may do this, but you are signed in as {}",
                R::NAME,
                token.role
            )));
        }
        Ok(token)
    }
}

/// Cookie claims: the token itself plus an expiry datetime.
#[derive(Serialize, Deserialize)]
struct Claims<R> {
    #[serde(flatten, bound = "")]
    token: AuthToken<R>,
    #[serde(rename = "exp", with = "ts_seconds")]
    expire_at: DateTime<Utc>,
}

#[rocket::async_trait]
impl<'r, R: Rights> FromRequest<'r> for AuthToken<R> {
    type Error = Error;

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        match Self::authenticate(req).await {
            Ok(token) => request::Outcome::Success(token),
            Err(err) => {
                debug!("Rejected auth token: {err}");
                req.local_cache(|| AuthRejection(Some(err.to_string())));
                request::Outcome::Failure((err.status(), err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::model::auth::{AdminOnly, SignedIn};

    fn config() -> Config {
        crate::test_rocket().figment().extract().unwrap()
    }

    #[test]
    fn cookie_round_trip() {
        let config = config();
        let user = User::example();
        let cookie = AuthToken::<SignedIn>::new(&user).into_cookie(&config).unwrap();

        assert_eq!(cookie.name(), AUTH_TOKEN_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));

        // The rights marker is not part of the encoding.
        let token = AuthToken::<AdminOnly>::from_cookie(&cookie, &config).unwrap();
        assert_eq!(token.id(), user.id);
        assert_eq!(token.role(), Role::Voter);
        assert_eq!(token.admin, None);

        let mut admin = User::example();
        admin.role = Role::Admin;
        let cookie = AuthToken::<AdminOnly>::for_admin(&admin, "Returning-Officer")
            .into_cookie(&config)
            .unwrap();
        let token = AuthToken::<AdminOnly>::from_cookie(&cookie, &config).unwrap();
        assert_eq!(token.role(), Role::Admin);
        assert_eq!(token.admin.as_deref(), Some("returning-officer"));
    }

    #[test]
    fn rejects_tampered_and_expired_tokens() {
        let config = config();
        let cookie = AuthToken::<SignedIn>::new(&User::example())
            .into_cookie(&config)
            .unwrap();
        let tampered = Cookie::new(AUTH_TOKEN_COOKIE, format!("{}x", cookie.value()));
        assert!(AuthToken::<SignedIn>::from_cookie(&tampered, &config).is_err());

        let expired = Claims {
            token: AuthToken::<SignedIn>::new(&User::example()),
            expire_at: Utc::now() - Duration::hours(1),
        };
        let expired = jsonwebtoken::encode(
            &Header::default(),
            &expired,
            &EncodingKey::from_secret(config.jwt_secret()),
        )
        .unwrap();
        let err = AuthToken::<SignedIn>::from_cookie(&Cookie::new(AUTH_TOKEN_COOKIE, expired), &config)
            .err()
            .unwrap();
        assert_eq!(err.status(), rocket::http::Status::Unauthorized);
    }
}

use std::time::Duration as StdDuration;

use chrono::Duration;
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::model::{
    store::{seed::seed_demo_data, Store},
    user::{AdminAccount, AdminCredentials},
};

#[cfg(test)]
pub(crate) const TEST_ADMIN_USERNAME: &str = "coordinator";
#[cfg(test)]
pub(crate) const TEST_ADMIN_PASSWORD: &str = "coordinator-password";

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Deserialize)]
pub struct Config {
    // non-secrets
    auth_ttl: u32,
    cast_latency_ms: u64,
    verify_latency_ms: u64,
    login_latency_ms: u64,
    wallet_latency_ms: u64,
    seed_demo_data: bool,
    default_admin_username: String,
    // secrets
    jwt_secret: String,
    hmac_secret: String,
    default_admin_password: String,
}

impl Config {
    /// Valid lifetime of auth token cookies in seconds.
    pub fn auth_ttl(&self) -> Duration {
        Duration::seconds(self.auth_ttl.into())
    }

    /// Secret key used to encrypt JWTs.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Secret key used to derive voter keys from email addresses.
    pub fn hmac_secret(&self) -> &[u8] {
        self.hmac_secret.as_bytes()
    }

    /// Simulated ledger write time when casting a vote.
    pub fn cast_latency(&self) -> StdDuration {
        StdDuration::from_millis(self.cast_latency_ms)
    }

    /// Simulated ledger lookup time when verifying a vote.
    pub fn verify_latency(&self) -> StdDuration {
        StdDuration::from_millis(self.verify_latency_ms)
    }

    /// Simulated round trip when signing in or up.
    pub fn login_latency(&self) -> StdDuration {
        StdDuration::from_millis(self.login_latency_ms)
    }

    /// Simulated wallet handshake.
    pub fn wallet_latency(&self) -> StdDuration {
        StdDuration::from_millis(self.wallet_latency_ms)
    }
}

/// Wait out a configured artificial delay. Zero-length delays return immediately.
pub async fn simulate_latency(delay: StdDuration) {
    if !delay.is_zero() {
        rocket::tokio::time::sleep(delay).await;
    }
}

/// A fairing that loads the application config and puts it in managed state.
/// This could easily be achieved using `AdHoc::config`, but is written out
/// explicitly for symmetry with the store fairing and control over error
/// messages.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// A fairing that creates the in-memory store, seeds it with demo data if
/// configured to, ensures at least one admin account exists, and places the
/// store into managed state.
///
/// Must be attached after [`ConfigFairing`].
pub struct StoreFairing;

#[rocket::async_trait]
impl Fairing for StoreFairing {
    fn info(&self) -> Info {
        Info {
            name: "Store",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Copy out what we need so `rocket` is free to be returned on failure.
        let (hmac_secret, seed, credentials) = match rocket.state::<Config>() {
            Some(config) => (
                config.hmac_secret.clone(),
                config.seed_demo_data,
                AdminCredentials {
                    username: config.default_admin_username.clone(),
                    password: config.default_admin_password.clone(),
                },
            ),
            None => {
                error!("Store requires the application config to be loaded first");
                return Err(rocket);
            }
        };

        let store = Store::new(hmac_secret.as_bytes());
        if seed {
            seed_demo_data(&store).await;
            info!("Seeded store with demo data");
        }

        // Ensure there is at least one admin user.
        if store.admin_count().await == 0 {
            let username = credentials.username.clone();
            let admin = match AdminAccount::try_from(credentials) {
                Ok(admin) => admin,
                Err(e) => {
                    error!("Default admin credentials are unusable: {e}");
                    return Err(rocket);
                }
            };
            if let Err(e) = store.add_admin(admin).await {
                error!("Failed to create default admin: {e}");
                return Err(rocket);
            }
            warn!("Created default admin '{username}'; change its password for production use");
        }

        Ok(rocket.manage(store))
    }
}

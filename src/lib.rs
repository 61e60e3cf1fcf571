#[macro_use]
extern crate rocket;
#[macro_use]
extern crate log;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{figment::Figment, Build, Rocket};

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;

pub use config::Config;

use crate::{
    config::{ConfigFairing, StoreFairing},
    logging::LoggerFairing,
};

/// Build a rocket configured from `Rocket.toml` and `ROCKET_*` environment variables.
pub fn build() -> Rocket<Build> {
    rocket_for_figment(rocket::Config::figment())
}

/// Build a rocket from an explicit configuration source.
pub fn rocket_for_figment(figment: Figment) -> Rocket<Build> {
    rocket::custom(figment)
        .attach(ConfigFairing)
        .attach(StoreFairing)
        .attach(LoggerFairing)
        .mount("/", api::routes())
        .register("/", api::catchers())
}

/// A rocket for tests: fixed secrets, seeded demo data, and no artificial latency.
#[cfg(test)]
pub(crate) fn test_rocket() -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("log_level", "off"))
        .merge(("auth_ttl", 600))
        .merge(("jwt_secret", "test-jwt-secret"))
        .merge(("hmac_secret", "test-hmac-secret"))
        .merge(("cast_latency_ms", 0))
        .merge(("verify_latency_ms", 0))
        .merge(("login_latency_ms", 0))
        .merge(("wallet_latency_ms", 0))
        .merge(("seed_demo_data", true))
        .merge(("default_admin_username", config::TEST_ADMIN_USERNAME))
        .merge(("default_admin_password", config::TEST_ADMIN_PASSWORD));
    rocket_for_figment(figment)
}

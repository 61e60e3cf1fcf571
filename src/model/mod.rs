pub mod auth;
pub mod common;
pub mod dashboard;
pub mod election;
pub mod pagination;
pub mod results;
pub mod store;
pub mod user;
pub mod vote;

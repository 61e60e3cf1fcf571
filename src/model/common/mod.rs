//! Types shared between the store and the API.

pub mod election;

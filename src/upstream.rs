//! Memento API client
//!
//! The front-end owns no data; every page and action resolves against the
//! remote JSON/HTTP API through this module.

mod client;
mod error;

pub use client::{
    AuthSession, Credentials, ItemPayload, MementoClient, NewPerson, PersonUpdate, SignupRequest,
};
pub use error::{UpstreamError, UpstreamErrorKind};

/// Upstream connection settings
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base URL of the Memento API, e.g. `http://localhost:8080/api`
    pub base_url: String,
}

impl UpstreamConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("MEMENTO_API_URL")
                .unwrap_or_else(|_| "http://localhost:8080/api".to_string()),
        }
    }
}

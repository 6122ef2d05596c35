//! HTTP surface of the front-end
//!
//! Page routes render HTML; the `/api` action routes speak JSON and back
//! the forms and fetches the pages issue.

mod handlers;
mod render;
mod session;
mod types;

pub use handlers::create_router;

use crate::upstream::MementoClient;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<MementoClient>,
}

impl AppState {
    pub fn new(upstream: MementoClient) -> Self {
        Self {
            upstream: Arc::new(upstream),
        }
    }
}

//! Gateway request and response types

use crate::models::User;
use serde::{Deserialize, Serialize};

/// Response for login/signup: the user plus where the client should go next
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: User,
    pub redirect: &'static str,
}

/// Response for logout
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub redirect: &'static str,
}

/// Request to replace the profile image
#[derive(Debug, Deserialize)]
pub struct ProfileImageRequest {
    #[serde(default)]
    pub image: String,
}

/// Response for delete actions
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

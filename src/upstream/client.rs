//! Typed client for the Memento API

use super::{UpstreamConfig, UpstreamError};
use crate::models::{Conversation, Item, Person, User};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// HTTP client for the externally-owned Memento API.
///
/// Every data operation the front-end performs goes through here; the
/// gateway itself holds no state beyond the session cookie.
pub struct MementoClient {
    client: Client,
    base_url: String,
}

impl MementoClient {
    pub fn new(config: &UpstreamConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    // ============================================================
    // Auth
    // ============================================================

    pub async fn login(&self, credentials: &Credentials) -> Result<AuthSession, UpstreamError> {
        self.post_json("/login", None, credentials, "Login failed")
            .await
    }

    pub async fn signup(&self, signup: &SignupRequest) -> Result<AuthSession, UpstreamError> {
        self.post_json("/signup", None, signup, "Signup failed").await
    }

    pub async fn me(&self, token: &str) -> Result<User, UpstreamError> {
        self.get_json("/me", token, "Not authenticated").await
    }

    pub async fn update_profile_image(
        &self,
        token: &str,
        image: &str,
    ) -> Result<User, UpstreamError> {
        let body = ProfileImageUpdate { image };
        self.post_json(
            "/user/update-profile-image",
            Some(token),
            &body,
            "Failed to update profile image",
        )
        .await
    }

    // ============================================================
    // Items
    // ============================================================

    pub async fn list_items(&self, token: &str) -> Result<Vec<Item>, UpstreamError> {
        self.get_json("/items", token, "Failed to load items").await
    }

    pub async fn create_item(
        &self,
        token: &str,
        item: &ItemPayload,
    ) -> Result<Item, UpstreamError> {
        self.post_json("/items", Some(token), item, "Failed to create item")
            .await
    }

    pub async fn update_item(
        &self,
        token: &str,
        id: &str,
        item: &ItemPayload,
    ) -> Result<Item, UpstreamError> {
        self.put_json(&format!("/items/{id}"), token, item, "Failed to update item")
            .await
    }

    pub async fn delete_item(&self, token: &str, id: &str) -> Result<(), UpstreamError> {
        self.delete(&format!("/items/{id}"), token, "Failed to delete item")
            .await
    }

    // ============================================================
    // Conversations
    // ============================================================

    pub async fn list_conversations(&self, token: &str) -> Result<Vec<Conversation>, UpstreamError> {
        self.get_json("/conversations", token, "Failed to load conversations")
            .await
    }

    pub async fn get_conversation(
        &self,
        token: &str,
        id: &str,
    ) -> Result<Conversation, UpstreamError> {
        self.get_json(
            &format!("/conversations/{id}"),
            token,
            "Failed to load conversation",
        )
        .await
    }

    pub async fn delete_conversation(&self, token: &str, id: &str) -> Result<(), UpstreamError> {
        self.delete(
            &format!("/conversations/{id}"),
            token,
            "Failed to delete conversation",
        )
        .await
    }

    // ============================================================
    // People
    // ============================================================

    pub async fn list_people(&self, token: &str) -> Result<Vec<Person>, UpstreamError> {
        self.get_json("/people", token, "Failed to load people").await
    }

    pub async fn get_person(&self, token: &str, id: &str) -> Result<Person, UpstreamError> {
        self.get_json(&format!("/people/{id}"), token, "Failed to load person")
            .await
    }

    pub async fn create_person(
        &self,
        token: &str,
        person: &NewPerson,
    ) -> Result<Person, UpstreamError> {
        self.post_json("/people", Some(token), person, "Failed to add person")
            .await
    }

    pub async fn update_person(
        &self,
        token: &str,
        id: &str,
        update: &PersonUpdate,
    ) -> Result<Person, UpstreamError> {
        self.put_json(
            &format!("/people/{id}"),
            token,
            update,
            "Failed to update person",
        )
        .await
    }

    pub async fn delete_person(&self, token: &str, id: &str) -> Result<(), UpstreamError> {
        self.delete(&format!("/people/{id}"), token, "Failed to delete person")
            .await
    }

    // ============================================================
    // Request plumbing
    // ============================================================

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let mut req = self.client.request(method, format!("{}{path}", self.base_url));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        req
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
        fallback: &str,
    ) -> Result<T, UpstreamError> {
        let req = self.request(Method::GET, path, Some(token));
        self.send_parsed(req, fallback).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
        fallback: &str,
    ) -> Result<T, UpstreamError> {
        let req = self.request(Method::POST, path, token).json(body);
        self.send_parsed(req, fallback).await
    }

    async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
        body: &B,
        fallback: &str,
    ) -> Result<T, UpstreamError> {
        let req = self.request(Method::PUT, path, Some(token)).json(body);
        self.send_parsed(req, fallback).await
    }

    async fn delete(&self, path: &str, token: &str, fallback: &str) -> Result<(), UpstreamError> {
        let req = self.request(Method::DELETE, path, Some(token));
        self.send_raw(req, fallback).await?;
        Ok(())
    }

    async fn send_parsed<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        fallback: &str,
    ) -> Result<T, UpstreamError> {
        let body = self.send_raw(req, fallback).await?;
        serde_json::from_str(&body)
            .map_err(|e| UpstreamError::unknown(format!("Failed to parse response: {e}")))
    }

    async fn send_raw(&self, req: RequestBuilder, fallback: &str) -> Result<String, UpstreamError> {
        let start = Instant::now();
        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                UpstreamError::network(format!("Request timeout: {e}"))
            } else if e.is_connect() {
                UpstreamError::network(format!("Connection failed: {e}"))
            } else {
                UpstreamError::unknown(format!("Request failed: {e}"))
            }
        })?;

        let status = response.status();
        let path = response.url().path().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| UpstreamError::network(format!("Failed to read response: {e}")))?;

        tracing::debug!(
            path = %path,
            status = status.as_u16(),
            duration_ms = %start.elapsed().as_millis(),
            "Upstream request completed"
        );

        if !status.is_success() {
            return Err(UpstreamError::from_response(status, &body, fallback));
        }

        Ok(body)
    }
}

// Memento API payload types

/// Login credentials
#[derive(Debug, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Signup payload.
///
/// Fields default so that an incomplete submission reaches the validation
/// layer and gets a field-level message instead of a deserialize error.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub primary_caregiver: crate::models::PrimaryCaregiver,
}

/// Token and user returned by `/login` and `/signup`
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
struct ProfileImageUpdate<'a> {
    image: &'a str,
}

/// Item create/update payload
#[derive(Debug, Serialize, Deserialize)]
pub struct ItemPayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Person creation payload (every field is required by validation)
#[derive(Debug, Serialize, Deserialize)]
pub struct NewPerson {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub relation: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub photo: String,
}

/// Person update payload (partial)
#[derive(Debug, Serialize, Deserialize)]
pub struct PersonUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

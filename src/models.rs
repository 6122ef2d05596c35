//! Wire models for the Memento API
//!
//! Field names match the upstream JSON contract exactly. Records pass
//! through the gateway unchanged, so every type derives both `Serialize`
//! and `Deserialize`.

use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// A user account as returned by `/login`, `/signup`, and `/me`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_caregiver: Option<PrimaryCaregiver>,
}

/// Caregiver contact metadata attached to a user account
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrimaryCaregiver {
    pub name: String,
    pub relationship: String,
    pub contact: String,
}

/// A user-owned title/description record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: String,
}

/// A remembered contact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub relation: String,
    pub summary: String,
    pub photo: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// A recorded exchange with a summary and an ordered transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(rename = "_id")]
    pub id: String,
    pub summary: String,
    #[serde(default)]
    pub transcript: Vec<TranscriptMessage>,
    #[serde(rename = "createdAt", default)]
    pub created_at: String,
}

/// One speaker turn in a conversation transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub speaker: String,
    pub text: String,
}

/// Format an upstream timestamp for display, e.g. "January 5, 2026 at 3:04 PM".
///
/// Upstream dates are carried as strings and may be absent or malformed;
/// display falls back rather than erroring.
pub fn format_timestamp(raw: &str) -> String {
    if raw.is_empty() {
        return "Unknown date".to_string();
    }
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.format("%B %-d, %Y at %-I:%M %p").to_string(),
        Err(_) => "Invalid date".to_string(),
    }
}

/// Short form used for conversation list titles, e.g. "Jan 5, 2026"
pub fn format_date_short(raw: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.format("%b %-d, %Y").to_string())
}

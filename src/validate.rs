//! Form validation rules
//!
//! These mirror the checks the browser performed before submitting:
//! image uploads are bounded base64 data URLs, and a new person needs a
//! name, a relationship from the fixed set, a summary, and a photo.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum decoded size for an uploaded image (5 MiB)
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Validation failure with the user-facing message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Image size should be less than 5MB")]
    ImageTooLarge,
    #[error("Please upload an image file")]
    NotAnImage,
    #[error("Name is required")]
    NameRequired,
    #[error("Please select a relationship")]
    RelationRequired,
    #[error("Summary is required")]
    SummaryRequired,
    #[error("Please upload a photo")]
    PhotoRequired,
    #[error("Title is required")]
    TitleRequired,
    #[error("Email is required")]
    EmailRequired,
    #[error("Password must be at least 6 characters")]
    PasswordTooShort,
    #[error("Caregiver name is required")]
    CaregiverNameRequired,
    #[error("Please select a caregiver relationship")]
    CaregiverRelationshipRequired,
    #[error("Caregiver contact is required")]
    CaregiverContactRequired,
}

/// Relationship categories for a remembered person
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Family,
    Friend,
    Coworker,
    Neighbor,
    Acquaintance,
    Healthcare,
    Other,
}

impl Relation {
    pub const ALL: [Relation; 7] = [
        Relation::Family,
        Relation::Friend,
        Relation::Coworker,
        Relation::Neighbor,
        Relation::Acquaintance,
        Relation::Healthcare,
        Relation::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Relation::Family => "family",
            Relation::Friend => "friend",
            Relation::Coworker => "coworker",
            Relation::Neighbor => "neighbor",
            Relation::Acquaintance => "acquaintance",
            Relation::Healthcare => "healthcare",
            Relation::Other => "other",
        }
    }

    /// Human label as shown in the relationship picker
    pub fn label(self) -> &'static str {
        match self {
            Relation::Family => "Family",
            Relation::Friend => "Friend",
            Relation::Coworker => "Coworker",
            Relation::Neighbor => "Neighbor",
            Relation::Acquaintance => "Acquaintance",
            Relation::Healthcare => "Healthcare Provider",
            Relation::Other => "Other",
        }
    }
}

impl FromStr for Relation {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Relation::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or(ValidationError::RelationRequired)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relationship categories for the primary caregiver (signup form)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaregiverRelationship {
    Parent,
    Spouse,
    Partner,
    Sibling,
    Child,
    Friend,
    Professional,
    Other,
}

impl CaregiverRelationship {
    pub const ALL: [CaregiverRelationship; 8] = [
        CaregiverRelationship::Parent,
        CaregiverRelationship::Spouse,
        CaregiverRelationship::Partner,
        CaregiverRelationship::Sibling,
        CaregiverRelationship::Child,
        CaregiverRelationship::Friend,
        CaregiverRelationship::Professional,
        CaregiverRelationship::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CaregiverRelationship::Parent => "parent",
            CaregiverRelationship::Spouse => "spouse",
            CaregiverRelationship::Partner => "partner",
            CaregiverRelationship::Sibling => "sibling",
            CaregiverRelationship::Child => "child",
            CaregiverRelationship::Friend => "friend",
            CaregiverRelationship::Professional => "professional",
            CaregiverRelationship::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CaregiverRelationship::Parent => "Parent",
            CaregiverRelationship::Spouse => "Spouse",
            CaregiverRelationship::Partner => "Partner",
            CaregiverRelationship::Sibling => "Sibling",
            CaregiverRelationship::Child => "Child",
            CaregiverRelationship::Friend => "Friend",
            CaregiverRelationship::Professional => "Professional Caregiver",
            CaregiverRelationship::Other => "Other",
        }
    }
}

impl FromStr for CaregiverRelationship {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CaregiverRelationship::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or(ValidationError::CaregiverRelationshipRequired)
    }
}

/// Validate an uploaded image carried as a base64 data URL.
///
/// The MIME type must be `image/*` and the decoded payload at most 5 MiB.
pub fn validate_image(data_url: &str) -> Result<(), ValidationError> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or(ValidationError::NotAnImage)?;
    let (mime, payload) = rest
        .split_once(";base64,")
        .ok_or(ValidationError::NotAnImage)?;
    if !mime.starts_with("image/") {
        return Err(ValidationError::NotAnImage);
    }
    let decoded = STANDARD
        .decode(payload)
        .map_err(|_| ValidationError::NotAnImage)?;
    if decoded.len() > MAX_IMAGE_BYTES {
        return Err(ValidationError::ImageTooLarge);
    }
    Ok(())
}

fn require(value: &str, err: ValidationError) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(err)
    } else {
        Ok(())
    }
}

/// Validate a new-person submission (all fields mandatory)
pub fn validate_new_person(
    name: &str,
    relation: &str,
    summary: &str,
    photo: &str,
) -> Result<(), ValidationError> {
    require(name, ValidationError::NameRequired)?;
    if relation.is_empty() {
        return Err(ValidationError::RelationRequired);
    }
    Relation::from_str(relation)?;
    require(summary, ValidationError::SummaryRequired)?;
    if photo.is_empty() {
        return Err(ValidationError::PhotoRequired);
    }
    validate_image(photo)
}

/// Validate a person update (only present fields are checked)
pub fn validate_person_update(
    name: Option<&str>,
    relation: Option<&str>,
    summary: Option<&str>,
    photo: Option<&str>,
) -> Result<(), ValidationError> {
    if let Some(name) = name {
        require(name, ValidationError::NameRequired)?;
    }
    if let Some(relation) = relation {
        Relation::from_str(relation)?;
    }
    if let Some(summary) = summary {
        require(summary, ValidationError::SummaryRequired)?;
    }
    if let Some(photo) = photo {
        validate_image(photo)?;
    }
    Ok(())
}

/// Validate a signup submission (form-level rules from the signup page)
pub fn validate_signup(
    email: &str,
    password: &str,
    name: &str,
    profile_image: Option<&str>,
    caregiver_name: &str,
    caregiver_relationship: &str,
    caregiver_contact: &str,
) -> Result<(), ValidationError> {
    require(email, ValidationError::EmailRequired)?;
    if password.chars().count() < 6 {
        return Err(ValidationError::PasswordTooShort);
    }
    require(name, ValidationError::NameRequired)?;
    if let Some(image) = profile_image {
        if !image.is_empty() {
            validate_image(image)?;
        }
    }
    require(caregiver_name, ValidationError::CaregiverNameRequired)?;
    CaregiverRelationship::from_str(caregiver_relationship)?;
    require(caregiver_contact, ValidationError::CaregiverContactRequired)?;
    Ok(())
}

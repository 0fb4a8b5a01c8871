// src/domain/media_type.rs
//
// Media Type Entity
//
// User-scoped category ("Books", "Anime", ...). Created at signup-time
// seeding or manually; never auto-deleted. (user, slug) is unique.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::UserId;
use crate::domain::{DomainError, DomainResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaType {
    /// Internal immutable identifier
    pub id: Uuid,

    /// Owning user
    pub user_id: UserId,

    /// Display name (e.g. "Books")
    pub name: String,

    /// URL-friendly identifier, unique per user
    pub slug: String,

    /// Key of the metadata provider backing imports for this type, if any
    pub provider_key: Option<String>,

    /// Opaque provider configuration, passed through to the adapter
    pub provider_config: Option<serde_json::Value>,

    pub created_at: DateTime<Utc>,
}

impl MediaType {
    pub fn new(user_id: UserId, name: String, slug: String, provider_key: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            slug,
            provider_key,
            provider_config: None,
            created_at: Utc::now(),
        }
    }
}

/// Validates MediaType invariants
pub fn validate_media_type(media_type: &MediaType) -> DomainResult<()> {
    if media_type.name.trim().is_empty() {
        return Err(DomainError::InvariantViolation(
            "Media type name cannot be empty".to_string(),
        ));
    }

    if media_type.slug.trim().is_empty() {
        return Err(DomainError::InvariantViolation(
            "Media type slug cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_media_type() {
        let t = MediaType::new(
            UserId::from("user-1"),
            "Books".to_string(),
            "books".to_string(),
            Some("openlibrary".to_string()),
        );
        assert!(validate_media_type(&t).is_ok());
    }

    #[test]
    fn test_empty_slug_rejected() {
        let t = MediaType::new(
            UserId::from("user-1"),
            "Books".to_string(),
            "  ".to_string(),
            None,
        );
        assert!(validate_media_type(&t).is_err());
    }
}

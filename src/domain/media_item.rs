// src/domain/media_item.rs
//
// Media Item Entity
//
// One cataloged work (a book, a film, a series...). Created by manual entry
// or provider import. Deleting an item cascades to its sources, entries,
// segments and notes; that wiring lives in the schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::UserId;
use crate::domain::{DomainError, DomainResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItem {
    /// Internal immutable identifier
    pub id: Uuid,

    /// Owning user
    pub user_id: UserId,

    /// Category this item belongs to
    pub type_id: Uuid,

    pub title: String,

    /// Secondary line: authors for books, original title for films...
    pub subtitle: Option<String>,

    pub description: Option<String>,

    pub image_url: Option<String>,

    /// Free-form provider metadata, stored as JSON
    pub metadata: Option<serde_json::Value>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MediaItem {
    pub fn new(user_id: UserId, type_id: Uuid, title: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            type_id,
            title,
            subtitle: None,
            description: None,
            image_url: None,
            metadata: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_details(
        mut self,
        subtitle: Option<String>,
        description: Option<String>,
        image_url: Option<String>,
        metadata: Option<serde_json::Value>,
    ) -> Self {
        self.subtitle = subtitle;
        self.description = description;
        self.image_url = image_url;
        self.metadata = metadata;
        self
    }
}

/// Validates MediaItem invariants
pub fn validate_media_item(item: &MediaItem) -> DomainResult<()> {
    if item.title.trim().is_empty() {
        return Err(DomainError::InvariantViolation(
            "Media item title cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_details() {
        let item = MediaItem::new(
            UserId::from("user-1"),
            Uuid::new_v4(),
            "Dune".to_string(),
        )
        .with_details(
            Some("Frank Herbert".to_string()),
            None,
            None,
            Some(serde_json::json!({"authors": ["Frank Herbert"]})),
        );

        assert_eq!(item.subtitle.as_deref(), Some("Frank Herbert"));
        assert!(item.description.is_none());
        assert!(validate_media_item(&item).is_ok());
    }

    #[test]
    fn test_empty_title_rejected() {
        let item = MediaItem::new(UserId::from("user-1"), Uuid::new_v4(), "".to_string());
        assert!(validate_media_item(&item).is_err());
    }
}

// src/domain/note.rs
//
// Note Entity
//
// Free-text reflection on an item, optionally pinned to one entry and/or
// one segment. When the referenced entry or segment is deleted the link is
// cleared, the note survives; the note itself dies with its item.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::UserId;
use crate::domain::{DomainError, DomainResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    /// Internal identifier
    pub id: Uuid,

    /// Owning user
    pub user_id: UserId,

    /// Item this note is about
    pub item_id: Uuid,

    /// Entry this note refers to, if any
    pub entry_id: Option<Uuid>,

    /// Segment this note refers to, if any
    pub segment_id: Option<Uuid>,

    /// Optional free-text tag ("chapter one", "episode 5", ...)
    pub tag: Option<String>,

    pub body: String,

    pub created_at: DateTime<Utc>,
}

impl Note {
    pub fn new(user_id: UserId, item_id: Uuid, body: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            item_id,
            entry_id: None,
            segment_id: None,
            tag: None,
            body,
            created_at: Utc::now(),
        }
    }
}

/// Validates Note invariants
pub fn validate_note(note: &Note) -> DomainResult<()> {
    if note.body.trim().is_empty() {
        return Err(DomainError::InvariantViolation(
            "Note body cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_rejected() {
        let note = Note::new(UserId::from("user-1"), Uuid::new_v4(), "  \n".to_string());
        assert!(validate_note(&note).is_err());
    }
}

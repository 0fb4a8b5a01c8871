// src/domain/item_source.rs
//
// Item Source Entity
//
// Links one local item to the external provider record it was imported
// from. (user, provider_key, external_id) is unique: at most one imported
// item per external record per user, which is what import deduplication
// keys on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::UserId;
use crate::domain::{DomainError, DomainResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSource {
    /// Internal identifier
    pub id: Uuid,

    /// Owning user
    pub user_id: UserId,

    /// Local item this source belongs to
    pub item_id: Uuid,

    /// Provider key (e.g. "openlibrary")
    pub provider_key: String,

    /// ID in the external catalog
    pub external_id: String,

    /// Raw provider metadata captured at import time
    pub raw_data: Option<serde_json::Value>,

    pub created_at: DateTime<Utc>,
}

impl ItemSource {
    pub fn new(
        user_id: UserId,
        item_id: Uuid,
        provider_key: String,
        external_id: String,
        raw_data: Option<serde_json::Value>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            item_id,
            provider_key,
            external_id,
            raw_data,
            created_at: Utc::now(),
        }
    }
}

/// Validates ItemSource invariants
pub fn validate_item_source(source: &ItemSource) -> DomainResult<()> {
    if source.provider_key.trim().is_empty() {
        return Err(DomainError::InvariantViolation(
            "Source provider key cannot be empty".to_string(),
        ));
    }

    if source.external_id.trim().is_empty() {
        return Err(DomainError::InvariantViolation(
            "Source external id cannot be empty".to_string(),
        ));
    }

    Ok(())
}

// src/domain/segment.rs
//
// Media Segment Entity
//
// An ordered sub-part of an item: a chapter, an episode, a part.
// (item, order_index) is unique; indexes are assigned max-existing + 1 at
// creation. Ordering is append-only, there is no reordering or insertion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaSegment {
    /// Internal identifier
    pub id: Uuid,

    /// Item this segment belongs to
    pub item_id: Uuid,

    /// Zero-based append position
    pub order_index: i64,

    pub title: Option<String>,

    /// Free-form metadata, stored as JSON
    pub metadata: Option<serde_json::Value>,

    pub created_at: DateTime<Utc>,
}

impl MediaSegment {
    pub fn new(item_id: Uuid, order_index: i64, title: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            item_id,
            order_index,
            title,
            metadata: None,
            created_at: Utc::now(),
        }
    }
}

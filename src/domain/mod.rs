// src/domain/mod.rs
//
// Domain Root - The Single Source of Truth for Domain API
//
// This file declares all domain modules and re-exports their public API.
// All other modules import from `crate::domain::*`.

pub mod entry;
pub mod item_source;
pub mod media_item;
pub mod media_type;
pub mod note;
pub mod segment;

pub use entry::{validate_entry, Entry, EntryStatus};
pub use item_source::{validate_item_source, ItemSource};
pub use media_item::{validate_media_item, MediaItem};
pub use media_type::{validate_media_type, MediaType};
pub use note::{validate_note, Note};
pub use segment::MediaSegment;

use thiserror::Error;

/// Domain-level errors
/// These represent violations of business rules and invariants
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Entity not found: {0}")]
    NotFound(String),
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;

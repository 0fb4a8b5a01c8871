// src/repositories/mod.rs
//
// Repository layer
//
// CRITICAL RULES:
// - Repositories are DUMB data mappers
// - NO business logic
// - NO cross-repository calls
// - Explicit SQL only
// - Every method on user-owned data takes the owning UserId; tenant
//   scoping happens here and nowhere else

pub mod entry_repository;
pub mod import_repository;
pub mod item_source_repository;
pub mod media_item_repository;
pub mod media_type_repository;
pub mod note_repository;
pub mod segment_repository;

pub use entry_repository::{EntryRepository, SqliteEntryRepository};
pub use import_repository::{ImportRepository, SqliteImportRepository};
pub use item_source_repository::{ItemSourceRepository, SqliteItemSourceRepository};
pub use media_item_repository::{MediaItemRepository, SqliteMediaItemRepository};
pub use media_type_repository::{MediaTypeRepository, SqliteMediaTypeRepository};
pub use note_repository::{NoteRepository, SqliteNoteRepository};
pub use segment_repository::{SegmentRepository, SqliteSegmentRepository};

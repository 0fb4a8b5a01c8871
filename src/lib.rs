// src/lib.rs
// Medialog - personal media tracking service
//
// Architecture:
// - Domain-centric: entities and invariants live in `domain`
// - Dumb repositories: explicit SQL, tenant-scoped by construction
// - Services orchestrate repositories and provider adapters
// - Providers normalize external catalogs into one shared shape
// - The API layer is a thin axum skin over the services

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod providers;
pub mod repositories;
pub mod services;

// ============================================================================
// PUBLIC API - Domain Entities
// ============================================================================

pub use domain::{
    validate_entry, validate_item_source, validate_media_item, validate_media_type, validate_note,
    Entry, EntryStatus, ItemSource, MediaItem, MediaSegment, MediaType, Note,
};

// ============================================================================
// PUBLIC API - Error Types
// ============================================================================

pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Database
// ============================================================================

pub use db::{create_connection_pool, get_database_path, initialize_database, ConnectionPool};

// ============================================================================
// PUBLIC API - Repositories
// ============================================================================

pub use repositories::{
    EntryRepository, ImportRepository, ItemSourceRepository, MediaItemRepository,
    MediaTypeRepository, NoteRepository, SegmentRepository, SqliteEntryRepository,
    SqliteImportRepository, SqliteItemSourceRepository, SqliteMediaItemRepository,
    SqliteMediaTypeRepository, SqliteNoteRepository, SqliteSegmentRepository,
};

// ============================================================================
// PUBLIC API - Providers
// ============================================================================

pub use providers::{
    AniListProvider, MediaProvider, OpenLibraryProvider, ProviderItemDetails, ProviderRegistry,
    ProviderSearchResult, SegmentSuggestion, TmdbProvider,
};

// ============================================================================
// PUBLIC API - Services
// ============================================================================

pub use services::{
    CreateManualItemRequest, CreateNoteRequest, ImportOutcome, ImportService, LibraryService,
    UpdateEntryRequest,
};

// ============================================================================
// PUBLIC API - Auth & HTTP
// ============================================================================

pub use api::{create_router, AppState};
pub use auth::{SessionProvider, StaticSessionProvider, UserId};
pub use config::AppConfig;

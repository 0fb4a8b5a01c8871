// src/services/mod.rs
//
// Services Module - Orchestration Layer

pub mod import_service;
pub mod library_service;


// Re-export all services and their types
pub use import_service::{
    ImportOutcome,
    ImportService,
};

pub use library_service::{
    CreateManualItemRequest,
    CreateNoteRequest,
    LibraryService,
    UpdateEntryRequest,
};

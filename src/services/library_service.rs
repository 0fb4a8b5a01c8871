// src/services/library_service.rs
//
// Library actions: entries, notes, segments, manual items, default-type
// seeding. Each action takes the authenticated user; the repositories
// enforce that every touched row belongs to that user.

use std::sync::Arc;

use uuid::Uuid;

use crate::auth::UserId;
use crate::domain::{
    validate_entry, validate_media_item, validate_media_type, validate_note, Entry, EntryStatus,
    MediaItem, MediaSegment, MediaType, Note,
};
use crate::error::{AppError, AppResult};
use crate::repositories::{
    EntryRepository, MediaItemRepository, MediaTypeRepository, NoteRepository, SegmentRepository,
};

/// Types every fresh account starts with.
const DEFAULT_TYPES: [(&str, &str, &str); 5] = [
    ("Books", "books", "openlibrary"),
    ("Anime", "anime", "anilist-anime"),
    ("Manga", "manga", "anilist-manga"),
    ("Movies", "movies", "tmdb-movie"),
    ("TV Shows", "tv-shows", "tmdb-tv"),
];

#[derive(Debug, Clone)]
pub struct UpdateEntryRequest {
    pub entry_id: Uuid,
    pub status: Option<EntryStatus>,
    /// Outer None leaves the field untouched, inner None clears it
    pub recommend: Option<Option<bool>>,
    pub score: Option<Option<i32>>,
}

#[derive(Debug, Clone)]
pub struct CreateNoteRequest {
    pub item_id: Uuid,
    pub entry_id: Option<Uuid>,
    pub segment_id: Option<Uuid>,
    pub tag: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct CreateManualItemRequest {
    pub type_id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    pub description: Option<String>,
}

pub struct LibraryService {
    type_repo: Arc<dyn MediaTypeRepository>,
    item_repo: Arc<dyn MediaItemRepository>,
    entry_repo: Arc<dyn EntryRepository>,
    segment_repo: Arc<dyn SegmentRepository>,
    note_repo: Arc<dyn NoteRepository>,
}

impl LibraryService {
    pub fn new(
        type_repo: Arc<dyn MediaTypeRepository>,
        item_repo: Arc<dyn MediaItemRepository>,
        entry_repo: Arc<dyn EntryRepository>,
        segment_repo: Arc<dyn SegmentRepository>,
        note_repo: Arc<dyn NoteRepository>,
    ) -> Self {
        Self {
            type_repo,
            item_repo,
            entry_repo,
            segment_repo,
            note_repo,
        }
    }

    // ------------------------------------------------------------------
    // Entries
    // ------------------------------------------------------------------

    pub fn create_entry(
        &self,
        owner: &UserId,
        item_id: Uuid,
        status: EntryStatus,
    ) -> AppResult<Entry> {
        self.item_repo
            .get(owner, item_id)?
            .ok_or(AppError::NotFound)?;

        let entry = Entry::new(owner.clone(), item_id, status);
        validate_entry(&entry)?;
        self.entry_repo.save(&entry)?;

        Ok(entry)
    }

    pub fn update_entry(&self, owner: &UserId, request: UpdateEntryRequest) -> AppResult<Entry> {
        let mut entry = self
            .entry_repo
            .get(owner, request.entry_id)?
            .ok_or(AppError::NotFound)?;

        if let Some(status) = request.status {
            if status != entry.status {
                entry.apply_status(status);
            }
        }

        if let Some(recommend) = request.recommend {
            entry.set_recommend(recommend);
        }

        if let Some(score) = request.score {
            entry.set_score(score);
        }

        validate_entry(&entry)?;
        self.entry_repo.save(&entry)?;

        Ok(entry)
    }

    pub fn delete_entry(&self, owner: &UserId, entry_id: Uuid) -> AppResult<()> {
        self.entry_repo.delete(owner, entry_id)
    }

    pub fn list_entries(&self, owner: &UserId, item_id: Uuid) -> AppResult<Vec<Entry>> {
        self.entry_repo.list_by_item(owner, item_id)
    }

    // ------------------------------------------------------------------
    // Notes
    // ------------------------------------------------------------------

    pub fn create_note(&self, owner: &UserId, request: CreateNoteRequest) -> AppResult<Note> {
        self.item_repo
            .get(owner, request.item_id)?
            .ok_or(AppError::NotFound)?;

        // Linked records must exist, belong to the caller, and belong to
        // the same item as the note.
        if let Some(entry_id) = request.entry_id {
            let entry = self
                .entry_repo
                .get(owner, entry_id)?
                .ok_or(AppError::NotFound)?;
            if entry.item_id != request.item_id {
                return Err(AppError::NotFound);
            }
        }

        if let Some(segment_id) = request.segment_id {
            let segment = self
                .segment_repo
                .get(owner, segment_id)?
                .ok_or(AppError::NotFound)?;
            if segment.item_id != request.item_id {
                return Err(AppError::NotFound);
            }
        }

        let mut note = Note::new(owner.clone(), request.item_id, request.body.trim().to_string());
        note.entry_id = request.entry_id;
        note.segment_id = request.segment_id;
        note.tag = request.tag.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());

        validate_note(&note)?;
        self.note_repo.save(&note)?;

        Ok(note)
    }

    pub fn list_notes(&self, owner: &UserId, item_id: Uuid) -> AppResult<Vec<Note>> {
        self.note_repo.list_by_item(owner, item_id)
    }

    // ------------------------------------------------------------------
    // Segments
    // ------------------------------------------------------------------

    pub fn create_segment(
        &self,
        owner: &UserId,
        item_id: Uuid,
        title: String,
    ) -> AppResult<MediaSegment> {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::Validation("Segment title is required".to_string()));
        }

        self.segment_repo.append(owner, item_id, Some(title))
    }

    pub fn list_segments(&self, owner: &UserId, item_id: Uuid) -> AppResult<Vec<MediaSegment>> {
        self.segment_repo.list_by_item(owner, item_id)
    }

    // ------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------

    pub fn create_manual_item(
        &self,
        owner: &UserId,
        request: CreateManualItemRequest,
    ) -> AppResult<MediaItem> {
        let media_type = self
            .type_repo
            .get(owner, request.type_id)?
            .ok_or(AppError::NotFound)?;

        let item = MediaItem::new(owner.clone(), media_type.id, request.title).with_details(
            request.subtitle.filter(|s| !s.is_empty()),
            request.description.filter(|d| !d.is_empty()),
            None,
            None,
        );
        validate_media_item(&item)?;
        self.item_repo.save(&item)?;

        Ok(item)
    }

    pub fn get_item(&self, owner: &UserId, item_id: Uuid) -> AppResult<MediaItem> {
        self.item_repo
            .get(owner, item_id)?
            .ok_or(AppError::NotFound)
    }

    pub fn list_items(&self, owner: &UserId, type_id: Option<Uuid>) -> AppResult<Vec<MediaItem>> {
        match type_id {
            Some(type_id) => self.item_repo.list_by_type(owner, type_id),
            None => self.item_repo.list(owner),
        }
    }

    /// Delete an item. Entries, sources, segments and notes go with it.
    pub fn delete_item(&self, owner: &UserId, item_id: Uuid) -> AppResult<()> {
        self.item_repo.delete(owner, item_id)
    }

    // ------------------------------------------------------------------
    // Media types
    // ------------------------------------------------------------------

    pub fn list_types(&self, owner: &UserId) -> AppResult<Vec<MediaType>> {
        self.type_repo.list(owner)
    }

    pub fn get_type(&self, owner: &UserId, type_id: Uuid) -> AppResult<MediaType> {
        self.type_repo
            .get(owner, type_id)?
            .ok_or(AppError::NotFound)
    }

    /// Seed the default categories for a user who has none yet. A user who
    /// already owns any type is left alone.
    pub fn seed_default_types(&self, owner: &UserId) -> AppResult<()> {
        if self.type_repo.any_for_user(owner)? {
            return Ok(());
        }

        for (name, slug, provider_key) in DEFAULT_TYPES {
            let media_type = MediaType::new(
                owner.clone(),
                name.to_string(),
                slug.to_string(),
                Some(provider_key.to_string()),
            );
            validate_media_type(&media_type)?;
            self.type_repo.save(&media_type)?;
        }

        log::info!("seeded default media types for {}", owner);
        Ok(())
    }
}

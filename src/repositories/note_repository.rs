// src/repositories/note_repository.rs
//
// Note persistence

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::{params, Row};
use uuid::Uuid;

use crate::auth::UserId;
use crate::db::ConnectionPool;
use crate::domain::Note;
use crate::error::{AppError, AppResult};

pub trait NoteRepository: Send + Sync {
    fn save(&self, note: &Note) -> AppResult<()>;
    fn get(&self, owner: &UserId, id: Uuid) -> AppResult<Option<Note>>;
    fn list_by_item(&self, owner: &UserId, item_id: Uuid) -> AppResult<Vec<Note>>;
    fn delete(&self, owner: &UserId, id: Uuid) -> AppResult<()>;
}

pub struct SqliteNoteRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteNoteRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    /// Map database row to Note - returns rusqlite::Error for query_map compatibility
    fn row_to_note(row: &Row) -> Result<Note, rusqlite::Error> {
        let id_str: String = row.get("id")?;
        let id = Uuid::parse_str(&id_str)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let user_id: String = row.get("user_id")?;

        let item_id_str: String = row.get("item_id")?;
        let item_id = Uuid::parse_str(&item_id_str)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let parse_opt_uuid = |value: Option<String>| {
            value
                .map(|s| {
                    Uuid::parse_str(&s)
                        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
                })
                .transpose()
        };

        let entry_id = parse_opt_uuid(row.get("entry_id")?)?;
        let segment_id = parse_opt_uuid(row.get("segment_id")?)?;

        let created_at_str: String = row.get("created_at")?;
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        Ok(Note {
            id,
            user_id: UserId::from(user_id),
            item_id,
            entry_id,
            segment_id,
            tag: row.get("tag")?,
            body: row.get("body")?,
            created_at,
        })
    }
}

impl NoteRepository for SqliteNoteRepository {
    fn save(&self, note: &Note) -> AppResult<()> {
        let conn = self.pool.get()?;

        conn.execute(
            "INSERT OR REPLACE INTO note (
                id, user_id, item_id, entry_id, segment_id, tag, body, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                note.id.to_string(),
                note.user_id.as_str(),
                note.item_id.to_string(),
                note.entry_id.map(|id| id.to_string()),
                note.segment_id.map(|id| id.to_string()),
                note.tag,
                note.body,
                note.created_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    fn get(&self, owner: &UserId, id: Uuid) -> AppResult<Option<Note>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT id, user_id, item_id, entry_id, segment_id, tag, body, created_at
             FROM note WHERE id = ?1 AND user_id = ?2",
        )?;

        match stmt.query_row(params![id.to_string(), owner.as_str()], Self::row_to_note) {
            Ok(note) => Ok(Some(note)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    fn list_by_item(&self, owner: &UserId, item_id: Uuid) -> AppResult<Vec<Note>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT id, user_id, item_id, entry_id, segment_id, tag, body, created_at
             FROM note
             WHERE user_id = ?1 AND item_id = ?2
             ORDER BY created_at",
        )?;

        let notes: Vec<Note> = stmt
            .query_map(
                params![owner.as_str(), item_id.to_string()],
                Self::row_to_note,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(notes)
    }

    fn delete(&self, owner: &UserId, id: Uuid) -> AppResult<()> {
        let conn = self.pool.get()?;

        let rows_affected = conn.execute(
            "DELETE FROM note WHERE id = ?1 AND user_id = ?2",
            params![id.to_string(), owner.as_str()],
        )?;

        if rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::domain::{Entry, EntryStatus, MediaItem, MediaType};
    use crate::repositories::{
        EntryRepository, MediaItemRepository, MediaTypeRepository, SegmentRepository,
        SqliteEntryRepository, SqliteMediaItemRepository, SqliteMediaTypeRepository,
        SqliteSegmentRepository,
    };

    fn setup() -> (Arc<ConnectionPool>, UserId, Uuid) {
        let pool = Arc::new(create_test_pool().unwrap());
        let owner = UserId::from("user-1");
        let media_type =
            MediaType::new(owner.clone(), "Books".to_string(), "books".to_string(), None);
        SqliteMediaTypeRepository::new(pool.clone())
            .save(&media_type)
            .unwrap();
        let item = MediaItem::new(owner.clone(), media_type.id, "Dune".to_string());
        SqliteMediaItemRepository::new(pool.clone())
            .save(&item)
            .unwrap();
        (pool, owner, item.id)
    }

    #[test]
    fn test_deleting_entry_nulls_note_link() {
        let (pool, owner, item_id) = setup();
        let entries = SqliteEntryRepository::new(pool.clone());
        let notes = SqliteNoteRepository::new(pool.clone());

        let entry = Entry::new(owner.clone(), item_id, EntryStatus::Started);
        entries.save(&entry).unwrap();

        let mut note = Note::new(owner.clone(), item_id, "Great opening".to_string());
        note.entry_id = Some(entry.id);
        notes.save(&note).unwrap();

        entries.delete(&owner, entry.id).unwrap();

        let survived = notes.get(&owner, note.id).unwrap().unwrap();
        assert!(survived.entry_id.is_none());
        assert_eq!(survived.body, "Great opening");
    }

    #[test]
    fn test_deleting_segment_nulls_note_link() {
        let (pool, owner, item_id) = setup();
        let segments = SqliteSegmentRepository::new(pool.clone());
        let notes = SqliteNoteRepository::new(pool.clone());

        let segment = segments
            .append(&owner, item_id, Some("Chapter 1".to_string()))
            .unwrap();

        let mut note = Note::new(owner.clone(), item_id, "About the chapter".to_string());
        note.segment_id = Some(segment.id);
        notes.save(&note).unwrap();

        segments.delete(&owner, segment.id).unwrap();

        let survived = notes.get(&owner, note.id).unwrap().unwrap();
        assert!(survived.segment_id.is_none());
    }

    #[test]
    fn test_deleting_item_cascades_to_notes() {
        let (pool, owner, item_id) = setup();
        let items = SqliteMediaItemRepository::new(pool.clone());
        let notes = SqliteNoteRepository::new(pool.clone());

        let note = Note::new(owner.clone(), item_id, "Gone with the item".to_string());
        notes.save(&note).unwrap();

        items.delete(&owner, item_id).unwrap();

        assert!(notes.get(&owner, note.id).unwrap().is_none());
    }
}

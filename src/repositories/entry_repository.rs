// src/repositories/entry_repository.rs
//
// Entry persistence

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::{params, Row};
use uuid::Uuid;

use crate::auth::UserId;
use crate::db::ConnectionPool;
use crate::domain::{Entry, EntryStatus};
use crate::error::{AppError, AppResult};

pub trait EntryRepository: Send + Sync {
    fn save(&self, entry: &Entry) -> AppResult<()>;
    fn get(&self, owner: &UserId, id: Uuid) -> AppResult<Option<Entry>>;
    fn list_by_item(&self, owner: &UserId, item_id: Uuid) -> AppResult<Vec<Entry>>;
    fn any_for_item(&self, owner: &UserId, item_id: Uuid) -> AppResult<bool>;
    fn delete(&self, owner: &UserId, id: Uuid) -> AppResult<()>;
}

pub struct SqliteEntryRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteEntryRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    /// Map database row to Entry - returns rusqlite::Error for query_map compatibility
    fn row_to_entry(row: &Row) -> Result<Entry, rusqlite::Error> {
        let id_str: String = row.get("id")?;
        let id = Uuid::parse_str(&id_str)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let user_id: String = row.get("user_id")?;

        let item_id_str: String = row.get("item_id")?;
        let item_id = Uuid::parse_str(&item_id_str)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let status_str: String = row.get("status")?;
        let status = EntryStatus::from_str(&status_str)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let parse_opt_ts = |value: Option<String>| {
            value
                .map(|s| {
                    DateTime::parse_from_rfc3339(&s)
                        .map(|dt| dt.with_timezone(&Utc))
                        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
                })
                .transpose()
        };

        let started_at = parse_opt_ts(row.get("started_at")?)?;
        let finished_at = parse_opt_ts(row.get("finished_at")?)?;
        let dropped_at = parse_opt_ts(row.get("dropped_at")?)?;

        let created_at_str: String = row.get("created_at")?;
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let updated_at_str: String = row.get("updated_at")?;
        let updated_at = DateTime::parse_from_rfc3339(&updated_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        Ok(Entry {
            id,
            user_id: UserId::from(user_id),
            item_id,
            status,
            started_at,
            finished_at,
            dropped_at,
            recommend: row.get("recommend")?,
            score: row.get("score")?,
            created_at,
            updated_at,
        })
    }

    pub(crate) fn insert_with_conn(conn: &rusqlite::Connection, entry: &Entry) -> AppResult<()> {
        conn.execute(
            "INSERT OR REPLACE INTO entry (
                id, user_id, item_id, status, started_at, finished_at, dropped_at,
                recommend, score, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                entry.id.to_string(),
                entry.user_id.as_str(),
                entry.item_id.to_string(),
                entry.status.to_string(),
                entry.started_at.map(|dt| dt.to_rfc3339()),
                entry.finished_at.map(|dt| dt.to_rfc3339()),
                entry.dropped_at.map(|dt| dt.to_rfc3339()),
                entry.recommend,
                entry.score,
                entry.created_at.to_rfc3339(),
                entry.updated_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }
}

impl EntryRepository for SqliteEntryRepository {
    fn save(&self, entry: &Entry) -> AppResult<()> {
        let conn = self.pool.get()?;
        Self::insert_with_conn(&conn, entry)
    }

    fn get(&self, owner: &UserId, id: Uuid) -> AppResult<Option<Entry>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT id, user_id, item_id, status, started_at, finished_at, dropped_at,
                    recommend, score, created_at, updated_at
             FROM entry WHERE id = ?1 AND user_id = ?2",
        )?;

        match stmt.query_row(params![id.to_string(), owner.as_str()], Self::row_to_entry) {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    fn list_by_item(&self, owner: &UserId, item_id: Uuid) -> AppResult<Vec<Entry>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT id, user_id, item_id, status, started_at, finished_at, dropped_at,
                    recommend, score, created_at, updated_at
             FROM entry
             WHERE user_id = ?1 AND item_id = ?2
             ORDER BY created_at",
        )?;

        let entries: Vec<Entry> = stmt
            .query_map(
                params![owner.as_str(), item_id.to_string()],
                Self::row_to_entry,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    fn any_for_item(&self, owner: &UserId, item_id: Uuid) -> AppResult<bool> {
        let conn = self.pool.get()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM entry WHERE user_id = ?1 AND item_id = ?2",
            params![owner.as_str(), item_id.to_string()],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    fn delete(&self, owner: &UserId, id: Uuid) -> AppResult<()> {
        let conn = self.pool.get()?;

        let rows_affected = conn.execute(
            "DELETE FROM entry WHERE id = ?1 AND user_id = ?2",
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
    use crate::domain::{MediaItem, MediaType};
    use crate::repositories::{
        MediaItemRepository, MediaTypeRepository, SqliteMediaItemRepository,
        SqliteMediaTypeRepository,
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
    fn test_round_trip_preserves_status_and_timestamps() {
        let (pool, owner, item_id) = setup();
        let repo = SqliteEntryRepository::new(pool);

        let mut entry = Entry::new(owner.clone(), item_id, EntryStatus::Started);
        entry.set_score(Some(85));
        entry.set_recommend(Some(true));
        repo.save(&entry).unwrap();

        let found = repo.get(&owner, entry.id).unwrap().unwrap();
        assert_eq!(found.status, EntryStatus::Started);
        assert_eq!(found.started_at, entry.started_at);
        assert!(found.finished_at.is_none());
        assert_eq!(found.score, Some(85));
        assert_eq!(found.recommend, Some(true));
    }

    #[test]
    fn test_multiple_entries_per_item() {
        let (pool, owner, item_id) = setup();
        let repo = SqliteEntryRepository::new(pool);

        assert!(!repo.any_for_item(&owner, item_id).unwrap());

        repo.save(&Entry::new(owner.clone(), item_id, EntryStatus::Finished))
            .unwrap();
        repo.save(&Entry::new(owner.clone(), item_id, EntryStatus::Started))
            .unwrap();

        assert!(repo.any_for_item(&owner, item_id).unwrap());
        assert_eq!(repo.list_by_item(&owner, item_id).unwrap().len(), 2);
    }

    #[test]
    fn test_delete_scoped_to_owner() {
        let (pool, owner, item_id) = setup();
        let repo = SqliteEntryRepository::new(pool);

        let entry = Entry::new(owner.clone(), item_id, EntryStatus::Planned);
        repo.save(&entry).unwrap();

        let other = UserId::from("user-2");
        assert!(matches!(
            repo.delete(&other, entry.id),
            Err(AppError::NotFound)
        ));

        repo.delete(&owner, entry.id).unwrap();
        assert!(repo.get(&owner, entry.id).unwrap().is_none());
    }
}

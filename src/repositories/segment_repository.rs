// src/repositories/segment_repository.rs
//
// Media segment persistence.
//
// Segments carry no user column; ownership flows through the item, so every
// query scopes through a join on media_item. Appending computes
// max(order_index) + 1 inside the insert transaction, which keeps the
// (item, order_index) uniqueness intact without a separate read.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::{params, Row};
use uuid::Uuid;

use crate::auth::UserId;
use crate::db::ConnectionPool;
use crate::domain::MediaSegment;
use crate::error::{AppError, AppResult};

pub trait SegmentRepository: Send + Sync {
    /// Insert a segment at the next free order index (0 for the first).
    fn append(
        &self,
        owner: &UserId,
        item_id: Uuid,
        title: Option<String>,
    ) -> AppResult<MediaSegment>;

    fn get(&self, owner: &UserId, id: Uuid) -> AppResult<Option<MediaSegment>>;
    fn list_by_item(&self, owner: &UserId, item_id: Uuid) -> AppResult<Vec<MediaSegment>>;
    fn delete(&self, owner: &UserId, id: Uuid) -> AppResult<()>;
}

pub struct SqliteSegmentRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteSegmentRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    /// Map database row to MediaSegment - returns rusqlite::Error for query_map compatibility
    fn row_to_segment(row: &Row) -> Result<MediaSegment, rusqlite::Error> {
        let id_str: String = row.get("id")?;
        let id = Uuid::parse_str(&id_str)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let item_id_str: String = row.get("item_id")?;
        let item_id = Uuid::parse_str(&item_id_str)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let metadata_json: Option<String> = row.get("metadata")?;
        let metadata = metadata_json
            .map(|s| {
                serde_json::from_str(&s)
                    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
            })
            .transpose()?;

        let created_at_str: String = row.get("created_at")?;
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        Ok(MediaSegment {
            id,
            item_id,
            order_index: row.get("order_index")?,
            title: row.get("title")?,
            metadata,
            created_at,
        })
    }
}

impl SegmentRepository for SqliteSegmentRepository {
    fn append(
        &self,
        owner: &UserId,
        item_id: Uuid,
        title: Option<String>,
    ) -> AppResult<MediaSegment> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        // The item must exist and belong to the caller.
        let item_exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM media_item WHERE id = ?1 AND user_id = ?2)",
            params![item_id.to_string(), owner.as_str()],
            |row| row.get(0),
        )?;
        if !item_exists {
            return Err(AppError::NotFound);
        }

        let next_index: i64 = tx.query_row(
            "SELECT COALESCE(MAX(order_index) + 1, 0) FROM media_segment WHERE item_id = ?1",
            params![item_id.to_string()],
            |row| row.get(0),
        )?;

        let segment = MediaSegment::new(item_id, next_index, title);

        tx.execute(
            "INSERT INTO media_segment (id, item_id, order_index, title, metadata, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                segment.id.to_string(),
                segment.item_id.to_string(),
                segment.order_index,
                segment.title,
                Option::<String>::None,
                segment.created_at.to_rfc3339(),
            ],
        )?;

        tx.commit()?;
        Ok(segment)
    }

    fn get(&self, owner: &UserId, id: Uuid) -> AppResult<Option<MediaSegment>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT s.id, s.item_id, s.order_index, s.title, s.metadata, s.created_at
             FROM media_segment s
             JOIN media_item i ON i.id = s.item_id
             WHERE s.id = ?1 AND i.user_id = ?2",
        )?;

        match stmt.query_row(params![id.to_string(), owner.as_str()], Self::row_to_segment) {
            Ok(segment) => Ok(Some(segment)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    fn list_by_item(&self, owner: &UserId, item_id: Uuid) -> AppResult<Vec<MediaSegment>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT s.id, s.item_id, s.order_index, s.title, s.metadata, s.created_at
             FROM media_segment s
             JOIN media_item i ON i.id = s.item_id
             WHERE s.item_id = ?1 AND i.user_id = ?2
             ORDER BY s.order_index",
        )?;

        let segments: Vec<MediaSegment> = stmt
            .query_map(
                params![item_id.to_string(), owner.as_str()],
                Self::row_to_segment,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(segments)
    }

    fn delete(&self, owner: &UserId, id: Uuid) -> AppResult<()> {
        let conn = self.pool.get()?;

        let rows_affected = conn.execute(
            "DELETE FROM media_segment
             WHERE id = ?1
               AND item_id IN (SELECT id FROM media_item WHERE user_id = ?2)",
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
    fn test_append_assigns_increasing_indexes_from_zero() {
        let (pool, owner, item_id) = setup();
        let repo = SqliteSegmentRepository::new(pool);

        let first = repo
            .append(&owner, item_id, Some("Chapter 1".to_string()))
            .unwrap();
        let second = repo
            .append(&owner, item_id, Some("Chapter 2".to_string()))
            .unwrap();
        let third = repo.append(&owner, item_id, None).unwrap();

        assert_eq!(first.order_index, 0);
        assert_eq!(second.order_index, 1);
        assert_eq!(third.order_index, 2);

        let listed = repo.list_by_item(&owner, item_id).unwrap();
        let indexes: Vec<i64> = listed.iter().map(|s| s.order_index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
    }

    #[test]
    fn test_append_rejects_foreign_item() {
        let (pool, _, item_id) = setup();
        let repo = SqliteSegmentRepository::new(pool);

        let other = UserId::from("user-2");
        assert!(matches!(
            repo.append(&other, item_id, None),
            Err(AppError::NotFound)
        ));
    }

    #[test]
    fn test_indexes_are_independent_per_item() {
        let (pool, owner, item_id) = setup();

        let media_type = MediaType::new(
            owner.clone(),
            "Manga".to_string(),
            "manga".to_string(),
            None,
        );
        SqliteMediaTypeRepository::new(pool.clone())
            .save(&media_type)
            .unwrap();
        let other_item = MediaItem::new(owner.clone(), media_type.id, "Berserk".to_string());
        SqliteMediaItemRepository::new(pool.clone())
            .save(&other_item)
            .unwrap();

        let repo = SqliteSegmentRepository::new(pool);
        repo.append(&owner, item_id, None).unwrap();
        repo.append(&owner, item_id, None).unwrap();

        let fresh = repo.append(&owner, other_item.id, None).unwrap();
        assert_eq!(fresh.order_index, 0);
    }
}

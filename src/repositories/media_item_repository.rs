// src/repositories/media_item_repository.rs
//
// Media item persistence

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::{params, Row};
use uuid::Uuid;

use crate::auth::UserId;
use crate::db::ConnectionPool;
use crate::domain::MediaItem;
use crate::error::{AppError, AppResult};

pub trait MediaItemRepository: Send + Sync {
    fn save(&self, item: &MediaItem) -> AppResult<()>;
    fn get(&self, owner: &UserId, id: Uuid) -> AppResult<Option<MediaItem>>;
    fn list(&self, owner: &UserId) -> AppResult<Vec<MediaItem>>;
    fn list_by_type(&self, owner: &UserId, type_id: Uuid) -> AppResult<Vec<MediaItem>>;
    fn delete(&self, owner: &UserId, id: Uuid) -> AppResult<()>;
}

pub struct SqliteMediaItemRepository {
    pool: Arc<ConnectionPool>,
}

const ITEM_COLUMNS: &str = "id, user_id, type_id, title, subtitle, description,
                image_url, metadata, created_at, updated_at";

impl SqliteMediaItemRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    /// Map database row to MediaItem - returns rusqlite::Error for query_map compatibility
    pub(crate) fn row_to_item(row: &Row) -> Result<MediaItem, rusqlite::Error> {
        let id_str: String = row.get("id")?;
        let id = Uuid::parse_str(&id_str)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let user_id: String = row.get("user_id")?;

        let type_id_str: String = row.get("type_id")?;
        let type_id = Uuid::parse_str(&type_id_str)
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

        let updated_at_str: String = row.get("updated_at")?;
        let updated_at = DateTime::parse_from_rfc3339(&updated_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        Ok(MediaItem {
            id,
            user_id: UserId::from(user_id),
            type_id,
            title: row.get("title")?,
            subtitle: row.get("subtitle")?,
            description: row.get("description")?,
            image_url: row.get("image_url")?,
            metadata,
            created_at,
            updated_at,
        })
    }

    pub(crate) fn insert_with_conn(
        conn: &rusqlite::Connection,
        item: &MediaItem,
    ) -> AppResult<()> {
        let metadata_json = item
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        conn.execute(
            "INSERT OR REPLACE INTO media_item (
                id, user_id, type_id, title, subtitle, description,
                image_url, metadata, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                item.id.to_string(),
                item.user_id.as_str(),
                item.type_id.to_string(),
                item.title,
                item.subtitle,
                item.description,
                item.image_url,
                metadata_json,
                item.created_at.to_rfc3339(),
                item.updated_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }
}

impl MediaItemRepository for SqliteMediaItemRepository {
    fn save(&self, item: &MediaItem) -> AppResult<()> {
        let conn = self.pool.get()?;
        Self::insert_with_conn(&conn, item)
    }

    fn get(&self, owner: &UserId, id: Uuid) -> AppResult<Option<MediaItem>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM media_item WHERE id = ?1 AND user_id = ?2"
        ))?;

        match stmt.query_row(params![id.to_string(), owner.as_str()], Self::row_to_item) {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    fn list(&self, owner: &UserId) -> AppResult<Vec<MediaItem>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM media_item WHERE user_id = ?1 ORDER BY title"
        ))?;

        let items: Vec<MediaItem> = stmt
            .query_map(params![owner.as_str()], Self::row_to_item)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    fn list_by_type(&self, owner: &UserId, type_id: Uuid) -> AppResult<Vec<MediaItem>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM media_item
             WHERE user_id = ?1 AND type_id = ?2
             ORDER BY title"
        ))?;

        let items: Vec<MediaItem> = stmt
            .query_map(
                params![owner.as_str(), type_id.to_string()],
                Self::row_to_item,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    fn delete(&self, owner: &UserId, id: Uuid) -> AppResult<()> {
        let conn = self.pool.get()?;

        let rows_affected = conn.execute(
            "DELETE FROM media_item WHERE id = ?1 AND user_id = ?2",
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
    use crate::domain::MediaType;
    use crate::repositories::{MediaTypeRepository, SqliteMediaTypeRepository};

    fn setup() -> (Arc<ConnectionPool>, UserId, Uuid) {
        let pool = Arc::new(create_test_pool().unwrap());
        let owner = UserId::from("user-1");
        let media_type = MediaType::new(owner.clone(), "Books".to_string(), "books".to_string(), None);
        SqliteMediaTypeRepository::new(pool.clone())
            .save(&media_type)
            .unwrap();
        (pool, owner, media_type.id)
    }

    #[test]
    fn test_round_trip_with_metadata() {
        let (pool, owner, type_id) = setup();
        let repo = SqliteMediaItemRepository::new(pool);

        let item = MediaItem::new(owner.clone(), type_id, "Dune".to_string()).with_details(
            Some("Frank Herbert".to_string()),
            Some("Desert planet".to_string()),
            Some("https://covers.example/dune.jpg".to_string()),
            Some(serde_json::json!({"authors": ["Frank Herbert"], "editionCount": 42})),
        );
        repo.save(&item).unwrap();

        let found = repo.get(&owner, item.id).unwrap().unwrap();
        assert_eq!(found.title, "Dune");
        assert_eq!(found.subtitle.as_deref(), Some("Frank Herbert"));
        assert_eq!(
            found.metadata.unwrap()["editionCount"],
            serde_json::json!(42)
        );
    }

    #[test]
    fn test_tenant_isolation() {
        let (pool, owner, type_id) = setup();
        let repo = SqliteMediaItemRepository::new(pool);

        let item = MediaItem::new(owner.clone(), type_id, "Dune".to_string());
        repo.save(&item).unwrap();

        let other = UserId::from("user-2");
        assert!(repo.get(&other, item.id).unwrap().is_none());
        assert!(repo.list(&other).unwrap().is_empty());
        assert!(matches!(
            repo.delete(&other, item.id),
            Err(AppError::NotFound)
        ));

        // Still there for the owner
        assert!(repo.get(&owner, item.id).unwrap().is_some());
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let (pool, owner, _) = setup();
        let repo = SqliteMediaItemRepository::new(pool);

        assert!(matches!(
            repo.delete(&owner, Uuid::new_v4()),
            Err(AppError::NotFound)
        ));
    }
}

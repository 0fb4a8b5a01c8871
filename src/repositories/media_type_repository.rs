// src/repositories/media_type_repository.rs
//
// Media type persistence

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::{params, Row};
use uuid::Uuid;

use crate::auth::UserId;
use crate::db::ConnectionPool;
use crate::domain::MediaType;
use crate::error::{AppError, AppResult};

pub trait MediaTypeRepository: Send + Sync {
    fn save(&self, media_type: &MediaType) -> AppResult<()>;
    fn get(&self, owner: &UserId, id: Uuid) -> AppResult<Option<MediaType>>;
    fn get_by_slug(&self, owner: &UserId, slug: &str) -> AppResult<Option<MediaType>>;
    fn list(&self, owner: &UserId) -> AppResult<Vec<MediaType>>;
    fn any_for_user(&self, owner: &UserId) -> AppResult<bool>;
}

pub struct SqliteMediaTypeRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteMediaTypeRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    /// Map database row to MediaType - returns rusqlite::Error for query_map compatibility
    fn row_to_media_type(row: &Row) -> Result<MediaType, rusqlite::Error> {
        let id_str: String = row.get("id")?;
        let id = Uuid::parse_str(&id_str)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let user_id: String = row.get("user_id")?;

        let provider_config_json: Option<String> = row.get("provider_config")?;
        let provider_config = provider_config_json
            .map(|s| {
                serde_json::from_str(&s)
                    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
            })
            .transpose()?;

        let created_at_str: String = row.get("created_at")?;
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        Ok(MediaType {
            id,
            user_id: UserId::from(user_id),
            name: row.get("name")?,
            slug: row.get("slug")?,
            provider_key: row.get("provider_key")?,
            provider_config,
            created_at,
        })
    }
}

impl MediaTypeRepository for SqliteMediaTypeRepository {
    fn save(&self, media_type: &MediaType) -> AppResult<()> {
        let conn = self.pool.get()?;

        let provider_config_json = media_type
            .provider_config
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        conn.execute(
            "INSERT OR REPLACE INTO media_type (
                id, user_id, name, slug, provider_key, provider_config, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                media_type.id.to_string(),
                media_type.user_id.as_str(),
                media_type.name,
                media_type.slug,
                media_type.provider_key,
                provider_config_json,
                media_type.created_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    fn get(&self, owner: &UserId, id: Uuid) -> AppResult<Option<MediaType>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT id, user_id, name, slug, provider_key, provider_config, created_at
             FROM media_type WHERE id = ?1 AND user_id = ?2",
        )?;

        match stmt.query_row(
            params![id.to_string(), owner.as_str()],
            Self::row_to_media_type,
        ) {
            Ok(media_type) => Ok(Some(media_type)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    fn get_by_slug(&self, owner: &UserId, slug: &str) -> AppResult<Option<MediaType>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT id, user_id, name, slug, provider_key, provider_config, created_at
             FROM media_type WHERE slug = ?1 AND user_id = ?2",
        )?;

        match stmt.query_row(params![slug, owner.as_str()], Self::row_to_media_type) {
            Ok(media_type) => Ok(Some(media_type)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    fn list(&self, owner: &UserId) -> AppResult<Vec<MediaType>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT id, user_id, name, slug, provider_key, provider_config, created_at
             FROM media_type
             WHERE user_id = ?1
             ORDER BY name",
        )?;

        let types: Vec<MediaType> = stmt
            .query_map(params![owner.as_str()], Self::row_to_media_type)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(types)
    }

    fn any_for_user(&self, owner: &UserId) -> AppResult<bool> {
        let conn = self.pool.get()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM media_type WHERE user_id = ?1",
            params![owner.as_str()],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    fn repo() -> SqliteMediaTypeRepository {
        SqliteMediaTypeRepository::new(Arc::new(create_test_pool().unwrap()))
    }

    #[test]
    fn test_save_and_get_scoped_to_owner() {
        let repo = repo();
        let owner = UserId::from("user-1");
        let media_type = MediaType::new(
            owner.clone(),
            "Books".to_string(),
            "books".to_string(),
            Some("openlibrary".to_string()),
        );
        repo.save(&media_type).unwrap();

        let found = repo.get(&owner, media_type.id).unwrap().unwrap();
        assert_eq!(found.slug, "books");
        assert_eq!(found.provider_key.as_deref(), Some("openlibrary"));

        // Another user cannot see it
        let other = UserId::from("user-2");
        assert!(repo.get(&other, media_type.id).unwrap().is_none());
        assert!(repo.get_by_slug(&other, "books").unwrap().is_none());
    }

    #[test]
    fn test_list_and_any_for_user() {
        let repo = repo();
        let owner = UserId::from("user-1");

        assert!(!repo.any_for_user(&owner).unwrap());

        repo.save(&MediaType::new(
            owner.clone(),
            "Books".to_string(),
            "books".to_string(),
            None,
        ))
        .unwrap();
        repo.save(&MediaType::new(
            owner.clone(),
            "Anime".to_string(),
            "anime".to_string(),
            None,
        ))
        .unwrap();

        assert!(repo.any_for_user(&owner).unwrap());
        let listed = repo.list(&owner).unwrap();
        assert_eq!(listed.len(), 2);
        // Ordered by name
        assert_eq!(listed[0].name, "Anime");
    }
}

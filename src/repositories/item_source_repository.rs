// src/repositories/item_source_repository.rs
//
// Item source persistence. Inserts happen through the import repository so
// the item + source write stays atomic; this repository only reads.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::{params, Row};
use uuid::Uuid;

use crate::auth::UserId;
use crate::db::ConnectionPool;
use crate::domain::ItemSource;
use crate::error::{AppError, AppResult};

pub trait ItemSourceRepository: Send + Sync {
    /// Dedup lookup: the at-most-one source for (owner, provider, external id).
    fn find(
        &self,
        owner: &UserId,
        provider_key: &str,
        external_id: &str,
    ) -> AppResult<Option<ItemSource>>;

    fn list_by_item(&self, owner: &UserId, item_id: Uuid) -> AppResult<Vec<ItemSource>>;
}

pub struct SqliteItemSourceRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteItemSourceRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    /// Map database row to ItemSource - returns rusqlite::Error for query_map compatibility
    fn row_to_source(row: &Row) -> Result<ItemSource, rusqlite::Error> {
        let id_str: String = row.get("id")?;
        let id = Uuid::parse_str(&id_str)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let user_id: String = row.get("user_id")?;

        let item_id_str: String = row.get("item_id")?;
        let item_id = Uuid::parse_str(&item_id_str)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let raw_data_json: Option<String> = row.get("raw_data")?;
        let raw_data = raw_data_json
            .map(|s| {
                serde_json::from_str(&s)
                    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
            })
            .transpose()?;

        let created_at_str: String = row.get("created_at")?;
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        Ok(ItemSource {
            id,
            user_id: UserId::from(user_id),
            item_id,
            provider_key: row.get("provider_key")?,
            external_id: row.get("external_id")?,
            raw_data,
            created_at,
        })
    }

    pub(crate) fn insert_with_conn(
        conn: &rusqlite::Connection,
        source: &ItemSource,
    ) -> AppResult<()> {
        let raw_data_json = source
            .raw_data
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        conn.execute(
            "INSERT INTO media_item_source (
                id, user_id, item_id, provider_key, external_id, raw_data, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                source.id.to_string(),
                source.user_id.as_str(),
                source.item_id.to_string(),
                source.provider_key,
                source.external_id,
                raw_data_json,
                source.created_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }
}

impl ItemSourceRepository for SqliteItemSourceRepository {
    fn find(
        &self,
        owner: &UserId,
        provider_key: &str,
        external_id: &str,
    ) -> AppResult<Option<ItemSource>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT id, user_id, item_id, provider_key, external_id, raw_data, created_at
             FROM media_item_source
             WHERE user_id = ?1 AND provider_key = ?2 AND external_id = ?3",
        )?;

        match stmt.query_row(
            params![owner.as_str(), provider_key, external_id],
            Self::row_to_source,
        ) {
            Ok(source) => Ok(Some(source)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    fn list_by_item(&self, owner: &UserId, item_id: Uuid) -> AppResult<Vec<ItemSource>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT id, user_id, item_id, provider_key, external_id, raw_data, created_at
             FROM media_item_source
             WHERE user_id = ?1 AND item_id = ?2
             ORDER BY created_at",
        )?;

        let sources: Vec<ItemSource> = stmt
            .query_map(
                params![owner.as_str(), item_id.to_string()],
                Self::row_to_source,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(sources)
    }
}

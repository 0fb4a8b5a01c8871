// src/repositories/import_repository.rs
//
// The one multi-table write in the system: a provider import persists an
// item, its source link, and optionally an initial entry in a single
// transaction. Either all rows land or none do.

use std::sync::Arc;

use crate::db::ConnectionPool;
use crate::domain::{Entry, ItemSource, MediaItem};
use crate::error::AppResult;
use crate::repositories::{
    SqliteEntryRepository, SqliteItemSourceRepository, SqliteMediaItemRepository,
};

pub trait ImportRepository: Send + Sync {
    fn create_item_with_source(
        &self,
        item: &MediaItem,
        source: &ItemSource,
        entry: Option<&Entry>,
    ) -> AppResult<()>;
}

pub struct SqliteImportRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteImportRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }
}

impl ImportRepository for SqliteImportRepository {
    fn create_item_with_source(
        &self,
        item: &MediaItem,
        source: &ItemSource,
        entry: Option<&Entry>,
    ) -> AppResult<()> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        SqliteMediaItemRepository::insert_with_conn(&tx, item)?;
        SqliteItemSourceRepository::insert_with_conn(&tx, source)?;
        if let Some(entry) = entry {
            SqliteEntryRepository::insert_with_conn(&tx, entry)?;
        }

        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::UserId;
    use crate::db::create_test_pool;
    use crate::domain::{EntryStatus, MediaType};
    use crate::repositories::{
        EntryRepository, ItemSourceRepository, MediaItemRepository, MediaTypeRepository,
        SqliteMediaTypeRepository,
    };
    use uuid::Uuid;

    fn setup() -> (Arc<ConnectionPool>, UserId, Uuid) {
        let pool = Arc::new(create_test_pool().unwrap());
        let owner = UserId::from("user-1");
        let media_type =
            MediaType::new(owner.clone(), "Books".to_string(), "books".to_string(), None);
        SqliteMediaTypeRepository::new(pool.clone())
            .save(&media_type)
            .unwrap();
        (pool, owner, media_type.id)
    }

    #[test]
    fn test_all_three_rows_land_together() {
        let (pool, owner, type_id) = setup();
        let repo = SqliteImportRepository::new(pool.clone());

        let item = MediaItem::new(owner.clone(), type_id, "Dune".to_string());
        let source = ItemSource::new(
            owner.clone(),
            item.id,
            "openlibrary".to_string(),
            "OL45883W".to_string(),
            None,
        );
        let entry = Entry::new(owner.clone(), item.id, EntryStatus::Started);

        repo.create_item_with_source(&item, &source, Some(&entry))
            .unwrap();

        let items = SqliteMediaItemRepository::new(pool.clone());
        let sources = SqliteItemSourceRepository::new(pool.clone());
        let entries = SqliteEntryRepository::new(pool);

        assert!(items.get(&owner, item.id).unwrap().is_some());
        assert!(sources
            .find(&owner, "openlibrary", "OL45883W")
            .unwrap()
            .is_some());
        assert_eq!(entries.list_by_item(&owner, item.id).unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_source_rolls_back_item() {
        let (pool, owner, type_id) = setup();
        let repo = SqliteImportRepository::new(pool.clone());

        let first = MediaItem::new(owner.clone(), type_id, "Dune".to_string());
        let first_source = ItemSource::new(
            owner.clone(),
            first.id,
            "openlibrary".to_string(),
            "OL45883W".to_string(),
            None,
        );
        repo.create_item_with_source(&first, &first_source, None)
            .unwrap();

        // Same (user, provider, external id): the unique index must reject
        // the source and the transaction must take the new item with it.
        let second = MediaItem::new(owner.clone(), type_id, "Dune again".to_string());
        let second_source = ItemSource::new(
            owner.clone(),
            second.id,
            "openlibrary".to_string(),
            "OL45883W".to_string(),
            None,
        );
        assert!(repo
            .create_item_with_source(&second, &second_source, None)
            .is_err());

        let items = SqliteMediaItemRepository::new(pool);
        assert!(items.get(&owner, second.id).unwrap().is_none());
        assert_eq!(items.list(&owner).unwrap().len(), 1);
    }
}

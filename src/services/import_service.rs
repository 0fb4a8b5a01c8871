// src/services/import_service.rs
//
// Import orchestration: provider search, dedup against previously imported
// sources, and the atomic item + source (+ entry) write.

use std::sync::Arc;

use uuid::Uuid;

use crate::auth::UserId;
use crate::domain::{
    validate_item_source, validate_media_item, Entry, EntryStatus, ItemSource, MediaItem,
    MediaType,
};
use crate::error::{AppError, AppResult};
use crate::providers::{MediaProvider, ProviderRegistry, ProviderSearchResult};
use crate::repositories::{
    EntryRepository, ImportRepository, ItemSourceRepository, MediaTypeRepository,
};

/// Where an import landed: a freshly created item, or the item a previous
/// import of the same external record already created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutcome {
    pub item_id: Uuid,
    pub created: bool,
}

pub struct ImportService {
    registry: Arc<ProviderRegistry>,
    type_repo: Arc<dyn MediaTypeRepository>,
    source_repo: Arc<dyn ItemSourceRepository>,
    entry_repo: Arc<dyn EntryRepository>,
    import_repo: Arc<dyn ImportRepository>,
}

impl ImportService {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        type_repo: Arc<dyn MediaTypeRepository>,
        source_repo: Arc<dyn ItemSourceRepository>,
        entry_repo: Arc<dyn EntryRepository>,
        import_repo: Arc<dyn ImportRepository>,
    ) -> Self {
        Self {
            registry,
            type_repo,
            source_repo,
            entry_repo,
            import_repo,
        }
    }

    /// Resolve a media type to its configured provider.
    ///
    /// Absent or foreign type -> NotFound; type without a provider key ->
    /// validation error; provider key that is not registered -> internal
    /// error (the configuration references an adapter that does not exist).
    fn resolve_provider(
        &self,
        owner: &UserId,
        type_id: Uuid,
    ) -> AppResult<(MediaType, Arc<dyn MediaProvider>)> {
        let media_type = self
            .type_repo
            .get(owner, type_id)?
            .ok_or(AppError::NotFound)?;

        let provider_key = media_type.provider_key.clone().ok_or_else(|| {
            AppError::Validation(
                "This media type does not have a search provider configured".to_string(),
            )
        })?;

        let provider = self.registry.get(&provider_key).ok_or_else(|| {
            AppError::Other(format!("Provider {} not registered", provider_key))
        })?;

        Ok((media_type, provider))
    }

    pub async fn search(
        &self,
        owner: &UserId,
        type_id: Uuid,
        query: &str,
    ) -> AppResult<Vec<ProviderSearchResult>> {
        let (_, provider) = self.resolve_provider(owner, type_id)?;
        provider.search(query).await
    }

    /// Import an external record as a new item, or resolve to the item a
    /// previous import created.
    pub async fn import_item(
        &self,
        owner: &UserId,
        type_id: Uuid,
        external_id: &str,
    ) -> AppResult<ImportOutcome> {
        self.import(owner, type_id, external_id, None).await
    }

    /// Same flow, but the fresh item also gets one entry with the given
    /// initial status. If the record was imported before and the item has
    /// no entry yet, the entry is back-filled; an existing entry wins and
    /// nothing is written.
    pub async fn import_item_with_status(
        &self,
        owner: &UserId,
        type_id: Uuid,
        external_id: &str,
        status: EntryStatus,
    ) -> AppResult<ImportOutcome> {
        self.import(owner, type_id, external_id, Some(status)).await
    }

    async fn import(
        &self,
        owner: &UserId,
        type_id: Uuid,
        external_id: &str,
        initial_status: Option<EntryStatus>,
    ) -> AppResult<ImportOutcome> {
        let (media_type, provider) = self.resolve_provider(owner, type_id)?;
        let provider_key = provider.key();

        // Dedup: at most one imported item per (user, provider, external id).
        if let Some(existing) = self.source_repo.find(owner, provider_key, external_id)? {
            if let Some(status) = initial_status {
                if !self.entry_repo.any_for_item(owner, existing.item_id)? {
                    let entry = Entry::new(owner.clone(), existing.item_id, status);
                    self.entry_repo.save(&entry)?;
                    log::info!(
                        "back-filled {} entry for previously imported item {}",
                        status,
                        existing.item_id
                    );
                }
            }

            return Ok(ImportOutcome {
                item_id: existing.item_id,
                created: false,
            });
        }

        let details = provider
            .get_details(external_id)
            .await?
            .ok_or_else(|| {
                AppError::Provider(format!(
                    "Provider {} has no details for {}",
                    provider_key, external_id
                ))
            })?;

        let item = MediaItem::new(owner.clone(), media_type.id, details.title).with_details(
            details.subtitle,
            details.description,
            details.image_url,
            Some(details.metadata.clone()),
        );
        validate_media_item(&item)?;

        let source = ItemSource::new(
            owner.clone(),
            item.id,
            provider_key.to_string(),
            details.external_id,
            Some(details.metadata),
        );
        validate_item_source(&source)?;

        let entry = initial_status.map(|status| Entry::new(owner.clone(), item.id, status));

        self.import_repo
            .create_item_with_source(&item, &source, entry.as_ref())?;

        log::info!(
            "imported {} from {} as item {}",
            source.external_id,
            provider_key,
            item.id
        );

        Ok(ImportOutcome {
            item_id: item.id,
            created: true,
        })
    }
}

// src/providers/mod.rs
//
// Metadata provider adapters
//
// Each adapter wraps one external catalog API behind the same two-method
// contract: full-text search and detail lookup by external id. Adapters map
// external data to the shared result shapes and never touch domain
// entities; the import service decides what to persist.
//
// Missing optional upstream fields degrade to None rather than failing the
// call. Only transport-level failures (non-2xx beyond each adapter's
// documented not-found cases) surface as errors.

pub mod anilist;
pub mod http;
pub mod open_library;
pub mod tmdb;

pub use anilist::AniListProvider;
pub use open_library::OpenLibraryProvider;
pub use tmdb::TmdbProvider;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;

/// One row of a provider search response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSearchResult {
    pub external_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// Opaque provider-specific bag, persisted verbatim on import
    pub metadata: serde_json::Value,
}

/// Segment suggestion attached to a detail response. No adapter populates
/// these yet; users add segments manually.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentSuggestion {
    pub order_index: i64,
    pub title: String,
}

/// Full detail for a single external record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderItemDetails {
    pub external_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub metadata: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<SegmentSuggestion>>,
}

/// Uniform contract over external metadata catalogs.
///
/// `get_details` returns Ok(None) for records the catalog does not know
/// (including ids that cannot possibly exist, such as non-numeric ids for
/// numeric catalogs); any other failure is an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaProvider: Send + Sync {
    fn key(&self) -> &'static str;
    fn name(&self) -> &'static str;

    async fn search(&self, query: &str) -> AppResult<Vec<ProviderSearchResult>>;
    async fn get_details(&self, external_id: &str) -> AppResult<Option<ProviderItemDetails>>;
}

/// Provider lookup table, keyed by provider key.
///
/// Built once at startup and handed to the services that need it; there is
/// no global registry. Registering a key twice overwrites the previous
/// provider.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn MediaProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: Arc<dyn MediaProvider>) {
        self.providers.insert(provider.key().to_string(), provider);
    }

    pub fn get(&self, key: &str) -> Option<Arc<dyn MediaProvider>> {
        self.providers.get(key).cloned()
    }

    pub fn list_all(&self) -> Vec<Arc<dyn MediaProvider>> {
        self.providers.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DummyProvider {
        key: &'static str,
        name: &'static str,
    }

    #[async_trait]
    impl MediaProvider for DummyProvider {
        fn key(&self) -> &'static str {
            self.key
        }

        fn name(&self) -> &'static str {
            self.name
        }

        async fn search(&self, _query: &str) -> AppResult<Vec<ProviderSearchResult>> {
            Ok(Vec::new())
        }

        async fn get_details(
            &self,
            _external_id: &str,
        ) -> AppResult<Option<ProviderItemDetails>> {
            Ok(None)
        }
    }

    #[test]
    fn test_register_get_and_list() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(DummyProvider {
            key: "openlibrary",
            name: "Open Library",
        }));
        registry.register(Arc::new(DummyProvider {
            key: "tmdb-movie",
            name: "TMDB (Movies)",
        }));

        assert!(registry.get("openlibrary").is_some());
        assert!(registry.get("unknown").is_none());
        assert_eq!(registry.list_all().len(), 2);
    }

    #[test]
    fn test_register_overwrites_by_key() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(DummyProvider {
            key: "openlibrary",
            name: "First",
        }));
        registry.register(Arc::new(DummyProvider {
            key: "openlibrary",
            name: "Second",
        }));

        assert_eq!(registry.list_all().len(), 1);
        assert_eq!(registry.get("openlibrary").unwrap().name(), "Second");
    }
}

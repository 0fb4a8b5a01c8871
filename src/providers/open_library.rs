// src/providers/open_library.rs
//
// Open Library adapter (books).
//
// Search hits the full-text endpoint; details fetch the work resource and
// then fan out to at most 5 author lookups in parallel. An author fetch
// that fails contributes no name instead of failing the whole call.

use futures::future::join_all;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

use async_trait::async_trait;

use crate::error::{AppError, AppResult};
use crate::providers::http::{build_client, send_with_retry};
use crate::providers::{MediaProvider, ProviderItemDetails, ProviderSearchResult};

const SEARCH_FIELDS: &str = "key,title,author_name,first_publish_year,cover_i,subject,edition_count";
const MAX_AUTHOR_FETCHES: usize = 5;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    docs: Vec<SearchDoc>,
}

#[derive(Debug, Deserialize)]
struct SearchDoc {
    key: String,
    title: String,
    author_name: Option<Vec<String>>,
    first_publish_year: Option<i32>,
    cover_i: Option<i64>,
    subject: Option<Vec<String>>,
    edition_count: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Work {
    key: String,
    title: String,
    description: Option<WorkDescription>,
    covers: Option<Vec<i64>>,
    subjects: Option<Vec<String>>,
    authors: Option<Vec<WorkAuthorRef>>,
}

/// Work descriptions arrive either as a bare string or as {"value": ...}.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WorkDescription {
    Text(String),
    Object { value: String },
}

impl WorkDescription {
    fn into_text(self) -> String {
        match self {
            WorkDescription::Text(text) => text,
            WorkDescription::Object { value } => value,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WorkAuthorRef {
    author: AuthorKey,
}

#[derive(Debug, Deserialize)]
struct AuthorKey {
    key: String,
}

#[derive(Debug, Deserialize)]
struct Author {
    name: String,
}

/// Work keys arrive as "/works/OL45883W"; external ids carry only the tail.
fn extract_work_id(key: &str) -> &str {
    key.strip_prefix("/works/").unwrap_or(key)
}

pub struct OpenLibraryProvider {
    base_url: String,
    covers_base_url: String,
    http_client: Client,
}

impl OpenLibraryProvider {
    pub fn new() -> Self {
        Self {
            base_url: "https://openlibrary.org".to_string(),
            covers_base_url: "https://covers.openlibrary.org".to_string(),
            http_client: build_client(),
        }
    }

    fn cover_url(&self, cover_id: Option<i64>, size: char) -> Option<String> {
        cover_id.map(|id| format!("{}/b/id/{}-{}.jpg", self.covers_base_url, id, size))
    }

    fn map_search_doc(&self, doc: SearchDoc) -> ProviderSearchResult {
        let subjects: Vec<String> = doc
            .subject
            .unwrap_or_default()
            .into_iter()
            .take(5)
            .collect();
        let authors = doc.author_name.unwrap_or_default();

        ProviderSearchResult {
            external_id: extract_work_id(&doc.key).to_string(),
            title: doc.title,
            subtitle: if authors.is_empty() {
                None
            } else {
                Some(authors.join(", "))
            },
            description: None,
            image_url: self.cover_url(doc.cover_i, 'M'),
            year: doc.first_publish_year,
            metadata: json!({
                "authors": authors,
                "subjects": subjects,
                "editionCount": doc.edition_count,
            }),
        }
    }

    /// Fetch one author name. Failures of any kind yield None.
    async fn fetch_author_name(&self, author_key: &str) -> Option<String> {
        let url = format!("{}{}.json", self.base_url, author_key);
        let response = self.http_client.get(url).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        let author: Author = response.json().await.ok()?;
        Some(author.name)
    }
}

impl Default for OpenLibraryProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaProvider for OpenLibraryProvider {
    fn key(&self) -> &'static str {
        "openlibrary"
    }

    fn name(&self) -> &'static str {
        "Open Library"
    }

    async fn search(&self, query: &str) -> AppResult<Vec<ProviderSearchResult>> {
        let request = self
            .http_client
            .get(format!("{}/search.json", self.base_url))
            .query(&[("q", query), ("limit", "20"), ("fields", SEARCH_FIELDS)]);

        let response = send_with_retry(request).await?;

        if !response.status().is_success() {
            return Err(AppError::Provider(format!(
                "Open Library search failed: {}",
                response.status()
            )));
        }

        let data: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to parse Open Library response: {}", e)))?;

        Ok(data
            .docs
            .into_iter()
            .map(|doc| self.map_search_doc(doc))
            .collect())
    }

    async fn get_details(&self, external_id: &str) -> AppResult<Option<ProviderItemDetails>> {
        let request = self
            .http_client
            .get(format!("{}/works/{}.json", self.base_url, external_id));

        let response = send_with_retry(request).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(AppError::Provider(format!(
                "Open Library work fetch failed: {}",
                response.status()
            )));
        }

        let work: Work = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to parse Open Library work: {}", e)))?;

        let author_keys: Vec<String> = work
            .authors
            .unwrap_or_default()
            .into_iter()
            .take(MAX_AUTHOR_FETCHES)
            .map(|r| r.author.key)
            .collect();

        let fetches = author_keys.iter().map(|key| self.fetch_author_name(key));
        let author_names: Vec<String> = join_all(fetches).await.into_iter().flatten().collect();

        let subjects: Vec<String> = work
            .subjects
            .unwrap_or_default()
            .into_iter()
            .take(10)
            .collect();

        Ok(Some(ProviderItemDetails {
            external_id: external_id.to_string(),
            title: work.title,
            subtitle: if author_names.is_empty() {
                None
            } else {
                Some(author_names.join(", "))
            },
            description: work.description.map(WorkDescription::into_text),
            image_url: self.cover_url(work.covers.and_then(|c| c.first().copied()), 'L'),
            metadata: json!({
                "authors": author_names,
                "subjects": subjects,
                "openLibraryKey": work.key,
            }),
            segments: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_work_id() {
        assert_eq!(extract_work_id("/works/OL45883W"), "OL45883W");
        assert_eq!(extract_work_id("OL45883W"), "OL45883W");
    }

    #[test]
    fn test_cover_url() {
        let provider = OpenLibraryProvider::new();
        assert_eq!(
            provider.cover_url(Some(240727), 'M').unwrap(),
            "https://covers.openlibrary.org/b/id/240727-M.jpg"
        );
        assert!(provider.cover_url(None, 'M').is_none());
    }

    #[test]
    fn test_map_search_doc() {
        let provider = OpenLibraryProvider::new();
        let doc: SearchDoc = serde_json::from_value(json!({
            "key": "/works/OL45883W",
            "title": "Fantastic Mr Fox",
            "author_name": ["Roald Dahl"],
            "first_publish_year": 1970,
            "cover_i": 6498519,
            "subject": ["Foxes", "Fiction", "Farmers", "Juvenile fiction", "Animals", "Extra"],
            "edition_count": 191
        }))
        .unwrap();

        let result = provider.map_search_doc(doc);
        assert_eq!(result.external_id, "OL45883W");
        assert_eq!(result.title, "Fantastic Mr Fox");
        assert_eq!(result.subtitle.as_deref(), Some("Roald Dahl"));
        assert_eq!(result.year, Some(1970));
        assert_eq!(
            result.image_url.as_deref(),
            Some("https://covers.openlibrary.org/b/id/6498519-M.jpg")
        );
        // Subjects are capped at 5 in search metadata
        assert_eq!(result.metadata["subjects"].as_array().unwrap().len(), 5);
        assert_eq!(result.metadata["editionCount"], json!(191));
    }

    #[test]
    fn test_map_search_doc_without_optionals() {
        let provider = OpenLibraryProvider::new();
        let doc: SearchDoc = serde_json::from_value(json!({
            "key": "/works/OL1W",
            "title": "Bare"
        }))
        .unwrap();

        let result = provider.map_search_doc(doc);
        assert!(result.subtitle.is_none());
        assert!(result.image_url.is_none());
        assert!(result.year.is_none());
        assert_eq!(result.metadata["authors"], json!([]));
    }

    #[test]
    fn test_description_variants_deserialize() {
        let text: WorkDescription = serde_json::from_value(json!("plain text")).unwrap();
        assert_eq!(text.into_text(), "plain text");

        let object: WorkDescription =
            serde_json::from_value(json!({"type": "/type/text", "value": "wrapped"})).unwrap();
        assert_eq!(object.into_text(), "wrapped");
    }
}

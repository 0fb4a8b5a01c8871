// src/providers/anilist.rs
//
// AniList adapter (anime and manga).
//
// One GraphQL query template serves both operations: search passes a title
// and page size, details passes a numeric id. The same adapter type is
// instantiated once per media kind.

use async_trait::async_trait;
use regex::Regex;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::providers::http::{build_client, send_with_retry};
use crate::providers::{MediaProvider, ProviderItemDetails, ProviderSearchResult};

const MEDIA_QUERY: &str = r#"
query ($id: Int, $search: String, $type: MediaType, $perPage: Int) {
    Page(page: 1, perPage: $perPage) {
        media(id: $id, search: $search, type: $type, sort: POPULARITY_DESC) {
            id
            title {
                romaji
                english
                native
            }
            description
            coverImage {
                large
                extraLarge
            }
            startDate {
                year
            }
            episodes
            chapters
            volumes
            genres
            averageScore
            status
            format
        }
    }
}
"#;

/// GraphQL response wrapper
#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct PageEnvelope {
    #[serde(rename = "Page")]
    page: PageData,
}

#[derive(Debug, Deserialize)]
struct PageData {
    media: Vec<Media>,
}

#[derive(Debug, Deserialize)]
struct Media {
    id: i64,
    title: Title,
    description: Option<String>,
    #[serde(rename = "coverImage")]
    cover_image: CoverImage,
    #[serde(rename = "startDate")]
    start_date: StartDate,
    episodes: Option<i32>,
    chapters: Option<i32>,
    volumes: Option<i32>,
    genres: Vec<String>,
    #[serde(rename = "averageScore")]
    average_score: Option<i32>,
    status: Option<String>,
    format: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Title {
    romaji: Option<String>,
    english: Option<String>,
    native: Option<String>,
}

impl Title {
    /// Preference order: english, romaji, native, then a literal fallback.
    fn resolve(&self) -> String {
        self.english
            .clone()
            .or_else(|| self.romaji.clone())
            .or_else(|| self.native.clone())
            .unwrap_or_else(|| "Unknown Title".to_string())
    }
}

#[derive(Debug, Deserialize)]
struct CoverImage {
    large: Option<String>,
    #[serde(rename = "extraLarge")]
    extra_large: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StartDate {
    year: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MediaKind {
    Anime,
    Manga,
}

impl MediaKind {
    fn graphql_name(self) -> &'static str {
        match self {
            MediaKind::Anime => "ANIME",
            MediaKind::Manga => "MANGA",
        }
    }
}

pub struct AniListProvider {
    base_url: String,
    http_client: Client,
    kind: MediaKind,
    tag_re: Regex,
}

impl AniListProvider {
    pub fn anime() -> Self {
        Self::with_kind(MediaKind::Anime)
    }

    pub fn manga() -> Self {
        Self::with_kind(MediaKind::Manga)
    }

    fn with_kind(kind: MediaKind) -> Self {
        Self {
            base_url: "https://graphql.anilist.co".to_string(),
            http_client: build_client(),
            kind,
            tag_re: Regex::new(r"<[^>]*>").expect("valid HTML tag pattern"),
        }
    }

    /// AniList descriptions embed HTML tags; strip them and trim.
    fn clean_description(&self, desc: Option<String>) -> Option<String> {
        let desc = desc?;
        let cleaned = self.tag_re.replace_all(&desc, "").trim().to_string();
        if cleaned.is_empty() {
            None
        } else {
            Some(cleaned)
        }
    }

    fn map_media(&self, media: Media) -> ProviderSearchResult {
        let title = media.title.resolve();
        let subtitle = media
            .title
            .romaji
            .clone()
            .filter(|romaji| *romaji != title);

        ProviderSearchResult {
            external_id: media.id.to_string(),
            title,
            subtitle,
            description: self.clean_description(media.description),
            image_url: media.cover_image.extra_large.or(media.cover_image.large),
            year: media.start_date.year,
            metadata: json!({
                "format": media.format,
                "status": media.status,
                "episodes": media.episodes,
                "chapters": media.chapters,
                "volumes": media.volumes,
                "genres": media.genres,
                "averageScore": media.average_score,
                "titles": media.title,
            }),
        }
    }

    /// Execute the media query and unwrap the GraphQL envelope.
    async fn execute_query(&self, variables: serde_json::Value) -> AppResult<Vec<Media>> {
        let body = json!({
            "query": MEDIA_QUERY,
            "variables": variables,
        });

        let request = self
            .http_client
            .post(&self.base_url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json")
            .json(&body);

        let response = send_with_retry(request).await?;

        if !response.status().is_success() {
            return Err(AppError::Provider(format!(
                "AniList API returned status: {}",
                response.status()
            )));
        }

        let graphql_response: GraphQlResponse<PageEnvelope> = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to parse AniList response: {}", e)))?;

        if let Some(errors) = graphql_response.errors {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(AppError::Provider(format!(
                "AniList API errors: {}",
                messages.join(", ")
            )));
        }

        let data = graphql_response
            .data
            .ok_or_else(|| AppError::Provider("AniList API returned no data".to_string()))?;

        Ok(data.page.media)
    }
}

#[async_trait]
impl MediaProvider for AniListProvider {
    fn key(&self) -> &'static str {
        match self.kind {
            MediaKind::Anime => "anilist-anime",
            MediaKind::Manga => "anilist-manga",
        }
    }

    fn name(&self) -> &'static str {
        match self.kind {
            MediaKind::Anime => "AniList (Anime)",
            MediaKind::Manga => "AniList (Manga)",
        }
    }

    async fn search(&self, query: &str) -> AppResult<Vec<ProviderSearchResult>> {
        let media = self
            .execute_query(json!({
                "search": query,
                "type": self.kind.graphql_name(),
                "perPage": 20,
            }))
            .await?;

        Ok(media.into_iter().map(|m| self.map_media(m)).collect())
    }

    async fn get_details(&self, external_id: &str) -> AppResult<Option<ProviderItemDetails>> {
        // AniList ids are numeric; anything else cannot exist there.
        let id: i64 = match external_id.parse() {
            Ok(id) => id,
            Err(_) => return Ok(None),
        };

        let media = self
            .execute_query(json!({
                "id": id,
                "type": self.kind.graphql_name(),
                "perPage": 1,
            }))
            .await?;

        let Some(media) = media.into_iter().next() else {
            return Ok(None);
        };

        let result = self.map_media(media);

        Ok(Some(ProviderItemDetails {
            external_id: result.external_id,
            title: result.title,
            subtitle: result.subtitle,
            description: result.description,
            image_url: result.image_url,
            metadata: result.metadata,
            segments: None,
        }))
    }
}

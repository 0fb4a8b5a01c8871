// src/providers/tmdb.rs
//
// TMDB adapter (movies and TV shows).
//
// Two sub-adapters share the request helper; the API key comes from
// configuration and is checked once at startup, never per call. Detail
// lookups distinguish not-found (404, or an id that cannot be numeric)
// from other upstream failures.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::providers::http::{build_client, send_with_retry};
use crate::providers::{MediaProvider, ProviderItemDetails, ProviderSearchResult};

const SEARCH_LIMIT: usize = 20;

#[derive(Debug, Deserialize)]
struct SearchResponse<T> {
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct Movie {
    id: i64,
    title: String,
    original_title: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    release_date: Option<String>,
    vote_average: Option<f64>,
    vote_count: Option<i64>,
    genre_ids: Option<Vec<i64>>,
    genres: Option<Vec<Genre>>,
    runtime: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TvShow {
    id: i64,
    name: String,
    original_name: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    first_air_date: Option<String>,
    vote_average: Option<f64>,
    vote_count: Option<i64>,
    genre_ids: Option<Vec<i64>>,
    genres: Option<Vec<Genre>>,
    number_of_seasons: Option<i64>,
    number_of_episodes: Option<i64>,
    episode_run_time: Option<Vec<i64>>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Genre {
    name: String,
}

/// "2010-07-15" -> 2010. Anything unparseable degrades to None.
fn extract_year(date: Option<&str>) -> Option<i32> {
    let date = date?;
    date.get(..4)?.parse().ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TmdbKind {
    Movie,
    Tv,
}

pub struct TmdbProvider {
    base_url: String,
    image_base_url: String,
    api_key: String,
    http_client: Client,
    kind: TmdbKind,
}

impl TmdbProvider {
    pub fn movie(api_key: String) -> Self {
        Self::with_kind(TmdbKind::Movie, api_key)
    }

    pub fn tv(api_key: String) -> Self {
        Self::with_kind(TmdbKind::Tv, api_key)
    }

    fn with_kind(kind: TmdbKind, api_key: String) -> Self {
        Self {
            base_url: "https://api.themoviedb.org/3".to_string(),
            image_base_url: "https://image.tmdb.org/t/p".to_string(),
            api_key,
            http_client: build_client(),
            kind,
        }
    }

    fn image_url(&self, path: Option<&str>, size: &str) -> Option<String> {
        path.map(|p| format!("{}/{}{}", self.image_base_url, size, p))
    }

    /// GET an endpoint with the api key appended, as every TMDB call needs.
    async fn tmdb_get(&self, path: &str, params: &[(&str, &str)]) -> AppResult<reqwest::Response> {
        let request = self
            .http_client
            .get(format!("{}{}", self.base_url, path))
            .query(&[("api_key", self.api_key.as_str())])
            .query(params);

        send_with_retry(request).await
    }

    fn map_movie_result(&self, movie: Movie) -> ProviderSearchResult {
        let subtitle = movie
            .original_title
            .clone()
            .filter(|original| *original != movie.title);

        ProviderSearchResult {
            external_id: movie.id.to_string(),
            title: movie.title,
            subtitle,
            description: movie.overview.filter(|o| !o.is_empty()),
            image_url: self.image_url(movie.poster_path.as_deref(), "w500"),
            year: extract_year(movie.release_date.as_deref()),
            metadata: json!({
                "voteAverage": movie.vote_average,
                "voteCount": movie.vote_count,
                "genreIds": movie.genre_ids,
                "backdropPath": movie.backdrop_path,
            }),
        }
    }

    fn map_movie_details(&self, movie: Movie) -> ProviderItemDetails {
        let subtitle = movie
            .original_title
            .clone()
            .filter(|original| *original != movie.title);
        let genres: Vec<String> = movie
            .genres
            .unwrap_or_default()
            .into_iter()
            .map(|g| g.name)
            .collect();

        ProviderItemDetails {
            external_id: movie.id.to_string(),
            title: movie.title,
            subtitle,
            description: movie.overview.filter(|o| !o.is_empty()),
            image_url: self.image_url(movie.poster_path.as_deref(), "w780"),
            metadata: json!({
                "releaseDate": movie.release_date,
                "runtime": movie.runtime,
                "voteAverage": movie.vote_average,
                "voteCount": movie.vote_count,
                "genres": genres,
                "backdropUrl": self.image_url(movie.backdrop_path.as_deref(), "w1280"),
            }),
            segments: None,
        }
    }

    fn map_tv_result(&self, show: TvShow) -> ProviderSearchResult {
        let subtitle = show
            .original_name
            .clone()
            .filter(|original| *original != show.name);

        ProviderSearchResult {
            external_id: show.id.to_string(),
            title: show.name,
            subtitle,
            description: show.overview.filter(|o| !o.is_empty()),
            image_url: self.image_url(show.poster_path.as_deref(), "w500"),
            year: extract_year(show.first_air_date.as_deref()),
            metadata: json!({
                "voteAverage": show.vote_average,
                "voteCount": show.vote_count,
                "genreIds": show.genre_ids,
                "backdropPath": show.backdrop_path,
            }),
        }
    }

    fn map_tv_details(&self, show: TvShow) -> ProviderItemDetails {
        let subtitle = show
            .original_name
            .clone()
            .filter(|original| *original != show.name);
        let genres: Vec<String> = show
            .genres
            .unwrap_or_default()
            .into_iter()
            .map(|g| g.name)
            .collect();

        ProviderItemDetails {
            external_id: show.id.to_string(),
            title: show.name,
            subtitle,
            description: show.overview.filter(|o| !o.is_empty()),
            image_url: self.image_url(show.poster_path.as_deref(), "w780"),
            metadata: json!({
                "firstAirDate": show.first_air_date,
                "numberOfSeasons": show.number_of_seasons,
                "numberOfEpisodes": show.number_of_episodes,
                "episodeRunTime": show.episode_run_time,
                "status": show.status,
                "voteAverage": show.vote_average,
                "voteCount": show.vote_count,
                "genres": genres,
                "backdropUrl": self.image_url(show.backdrop_path.as_deref(), "w1280"),
            }),
            segments: None,
        }
    }
}

#[async_trait]
impl MediaProvider for TmdbProvider {
    fn key(&self) -> &'static str {
        match self.kind {
            TmdbKind::Movie => "tmdb-movie",
            TmdbKind::Tv => "tmdb-tv",
        }
    }

    fn name(&self) -> &'static str {
        match self.kind {
            TmdbKind::Movie => "TMDB (Movies)",
            TmdbKind::Tv => "TMDB (TV Shows)",
        }
    }

    async fn search(&self, query: &str) -> AppResult<Vec<ProviderSearchResult>> {
        let path = match self.kind {
            TmdbKind::Movie => "/search/movie",
            TmdbKind::Tv => "/search/tv",
        };

        let response = self
            .tmdb_get(path, &[("query", query), ("include_adult", "false")])
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Provider(format!(
                "TMDB search failed: {}",
                response.status()
            )));
        }

        match self.kind {
            TmdbKind::Movie => {
                let data: SearchResponse<Movie> = response
                    .json()
                    .await
                    .map_err(|e| AppError::Provider(format!("Failed to parse TMDB response: {}", e)))?;
                Ok(data
                    .results
                    .into_iter()
                    .take(SEARCH_LIMIT)
                    .map(|m| self.map_movie_result(m))
                    .collect())
            }
            TmdbKind::Tv => {
                let data: SearchResponse<TvShow> = response
                    .json()
                    .await
                    .map_err(|e| AppError::Provider(format!("Failed to parse TMDB response: {}", e)))?;
                Ok(data
                    .results
                    .into_iter()
                    .take(SEARCH_LIMIT)
                    .map(|s| self.map_tv_result(s))
                    .collect())
            }
        }
    }

    async fn get_details(&self, external_id: &str) -> AppResult<Option<ProviderItemDetails>> {
        // TMDB ids are numeric; anything else cannot exist there.
        let id: i64 = match external_id.parse() {
            Ok(id) => id,
            Err(_) => return Ok(None),
        };

        let path = match self.kind {
            TmdbKind::Movie => format!("/movie/{}", id),
            TmdbKind::Tv => format!("/tv/{}", id),
        };

        let response = self.tmdb_get(&path, &[]).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(AppError::Provider(format!(
                "TMDB detail fetch failed: {}",
                response.status()
            )));
        }

        let details = match self.kind {
            TmdbKind::Movie => {
                let movie: Movie = response
                    .json()
                    .await
                    .map_err(|e| AppError::Provider(format!("Failed to parse TMDB movie: {}", e)))?;
                self.map_movie_details(movie)
            }
            TmdbKind::Tv => {
                let show: TvShow = response
                    .json()
                    .await
                    .map_err(|e| AppError::Provider(format!("Failed to parse TMDB show: {}", e)))?;
                self.map_tv_details(show)
            }
        };

        Ok(Some(details))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> TmdbProvider {
        TmdbProvider::movie("test-key".to_string())
    }

    #[test]
    fn test_extract_year() {
        assert_eq!(extract_year(Some("2010-07-15")), Some(2010));
        assert_eq!(extract_year(Some("")), None);
        assert_eq!(extract_year(Some("n/a")), None);
        assert_eq!(extract_year(None), None);
    }

    #[test]
    fn test_image_url() {
        let p = provider();
        assert_eq!(
            p.image_url(Some("/abc.jpg"), "w500").unwrap(),
            "https://image.tmdb.org/t/p/w500/abc.jpg"
        );
        assert!(p.image_url(None, "w500").is_none());
    }

    #[test]
    fn test_map_movie_result() {
        let p = provider();
        let movie: Movie = serde_json::from_value(json!({
            "id": 27205,
            "title": "Inception",
            "original_title": "Inception",
            "overview": "A thief who steals corporate secrets...",
            "poster_path": "/inception.jpg",
            "backdrop_path": "/inception-backdrop.jpg",
            "release_date": "2010-07-15",
            "vote_average": 8.4,
            "vote_count": 36000,
            "genre_ids": [28, 878]
        }))
        .unwrap();

        let result = p.map_movie_result(movie);
        assert_eq!(result.external_id, "27205");
        assert_eq!(result.title, "Inception");
        // Original title equals the title, so no subtitle
        assert!(result.subtitle.is_none());
        assert_eq!(result.year, Some(2010));
        assert_eq!(
            result.image_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w500/inception.jpg")
        );
        assert_eq!(result.metadata["voteAverage"], json!(8.4));
    }

    #[test]
    fn test_map_movie_details_differs_from_search_mapping() {
        let p = provider();
        let movie: Movie = serde_json::from_value(json!({
            "id": 129,
            "title": "Spirited Away",
            "original_title": "千と千尋の神隠し",
            "overview": "A young girl wanders into a world of spirits.",
            "poster_path": "/spirited.jpg",
            "backdrop_path": "/spirited-backdrop.jpg",
            "release_date": "2001-07-20",
            "vote_average": 8.5,
            "vote_count": 14000,
            "runtime": 125,
            "genres": [{"id": 16, "name": "Animation"}, {"id": 14, "name": "Fantasy"}]
        }))
        .unwrap();

        let details = p.map_movie_details(movie);
        assert_eq!(details.subtitle.as_deref(), Some("千と千尋の神隠し"));
        // Details use the wider poster size
        assert_eq!(
            details.image_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w780/spirited.jpg")
        );
        assert_eq!(details.metadata["runtime"], json!(125));
        assert_eq!(
            details.metadata["genres"],
            json!(["Animation", "Fantasy"])
        );
        assert_eq!(
            details.metadata["backdropUrl"],
            json!("https://image.tmdb.org/t/p/w1280/spirited-backdrop.jpg")
        );
    }

    #[test]
    fn test_map_tv_result_without_optionals() {
        let p = TmdbProvider::tv("test-key".to_string());
        let show: TvShow = serde_json::from_value(json!({
            "id": 1396,
            "name": "Breaking Bad"
        }))
        .unwrap();

        let result = p.map_tv_result(show);
        assert_eq!(result.external_id, "1396");
        assert!(result.subtitle.is_none());
        assert!(result.description.is_none());
        assert!(result.image_url.is_none());
        assert!(result.year.is_none());
    }

    #[tokio::test]
    async fn test_get_details_non_numeric_id_is_not_found() {
        let p = provider();
        let result = p.get_details("not-a-number").await.unwrap();
        assert!(result.is_none());
    }
}

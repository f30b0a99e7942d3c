//! TMDB API client.
//!
//! Two endpoints are used:
//!
//! | Method | Path | Auth |
//! |--------|------|------|
//! | `GET` | `/search/movie?api_key=&query=` | API key |
//! | `GET` | `/movie/{id}?api_key=&language=` | API key + bearer token |
//!
//! Search results are taken as they come: each entry is read field by
//! field and anything missing or mistyped becomes `None`. Any non-2xx
//! status is returned as [`TmdbError::Api`]; there is no retry.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::config::TmdbConfig;
use crate::traits::MovieSource;

#[derive(Debug, Error)]
pub enum TmdbError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TMDB returned {status_code}: {message}")]
    Api { status_code: u16, message: String },

    #[error("failed to parse TMDB response: {0}")]
    Json(#[from] serde_json::Error),
}

/// One entry of a `/search/movie` response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchCandidate {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub release_date: Option<String>,
    pub overview: Option<String>,
}

impl SearchCandidate {
    fn from_value(value: &Value) -> Self {
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            id: value.get("id").and_then(Value::as_i64),
            title: text("title"),
            release_date: text("release_date"),
            overview: text("overview"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Value>,
}

/// The subset of `/movie/{id}` the collection stores.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieDetails {
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

pub struct TmdbClient {
    client: Client,
    base_url: String,
    language: String,
    api_key: Option<String>,
    api_token: Option<String>,
}

impl TmdbClient {
    pub fn new(config: &TmdbConfig) -> Result<Self, TmdbError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Create a client around an existing reqwest `Client`.
    pub fn with_client(client: Client, config: &TmdbConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
            api_key: config.api_key.clone(),
            api_token: config.api_token.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn key_param(&self) -> Vec<(&'static str, &str)> {
        self.api_key
            .as_deref()
            .map(|key| vec![("api_key", key)])
            .unwrap_or_default()
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, TmdbError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(TmdbError::Api {
                status_code: status.as_u16(),
                message: body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// GET /search/movie
    pub async fn search_movies(&self, query: &str) -> Result<Vec<SearchCandidate>, TmdbError> {
        let url = self.url("/search/movie");
        tracing::debug!(%url, query, "searching TMDB");

        let response = self
            .client
            .get(&url)
            .query(&self.key_param())
            .query(&[("query", query)])
            .send()
            .await?;

        let raw: SearchResponse = self.handle_response(response).await?;
        Ok(raw.results.iter().map(SearchCandidate::from_value).collect())
    }

    /// GET /movie/{movie_id}
    pub async fn movie_details(&self, movie_id: i64) -> Result<MovieDetails, TmdbError> {
        let url = self.url(&format!("/movie/{}", movie_id));
        tracing::debug!(%url, "fetching TMDB movie details");

        let mut request = self
            .client
            .get(&url)
            .query(&self.key_param())
            .query(&[("language", self.language.as_str())]);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        self.handle_response(response).await
    }
}

#[async_trait]
impl MovieSource for TmdbClient {
    async fn search(&self, title: &str) -> Result<Vec<SearchCandidate>, TmdbError> {
        self.search_movies(title).await
    }

    async fn details(&self, id: i64) -> Result<MovieDetails, TmdbError> {
        self.movie_details(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_candidate_reads_known_fields() {
        let c = SearchCandidate::from_value(&json!({
            "id": 27205,
            "title": "Inception",
            "release_date": "2010-07-15",
            "overview": "Cobb, a skilled thief...",
            "popularity": 83.9
        }));
        assert_eq!(c.id, Some(27205));
        assert_eq!(c.title.as_deref(), Some("Inception"));
        assert_eq!(c.release_date.as_deref(), Some("2010-07-15"));
    }

    #[test]
    fn test_candidate_tolerates_malformed_entry() {
        let c = SearchCandidate::from_value(&json!({ "id": "not-a-number", "title": null }));
        assert_eq!(c, SearchCandidate::default());

        let c = SearchCandidate::from_value(&json!("just a string"));
        assert_eq!(c, SearchCandidate::default());
    }

    #[test]
    fn test_search_response_without_results_is_empty() {
        let raw: SearchResponse = serde_json::from_str(r#"{"page": 1}"#).unwrap();
        assert!(raw.results.is_empty());
    }

    #[test]
    fn test_details_nullable_fields() {
        let d: MovieDetails = serde_json::from_value(json!({
            "title": "X",
            "release_date": "1999-03-05",
            "overview": "d",
            "popularity": 1.2,
            "vote_average": 3.4,
            "tagline": null,
            "poster_path": null
        }))
        .unwrap();
        assert_eq!(d.title, "X");
        assert_eq!(d.tagline, None);
        assert_eq!(d.poster_path, None);
    }

    #[test]
    fn test_url_strips_trailing_slash() {
        let config = TmdbConfig {
            base_url: "http://127.0.0.1:9/3/".to_string(),
            ..TmdbConfig::default()
        };
        let client = TmdbClient::new(&config).unwrap();
        assert_eq!(client.url("/movie/1"), "http://127.0.0.1:9/3/movie/1");
    }
}

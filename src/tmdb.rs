use std::{num::NonZeroU32, sync::Arc};

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    catalog::{Catalog, CatalogError},
    models::{Genre, MovieDetails, PopularFilm, Video},
};

pub struct TmdbClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    language: String,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl TmdbClient {
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        base_url: String,
        language: String,
        rps: u32,
    ) -> Self {
        // The key is not validated locally, a bad one shows up as upstream 401s
        if api_key.trim().is_empty() {
            tracing::warn!("no TMDB_API_KEY provided, catalog requests will be rejected");
        }

        let limiter = Arc::new(RateLimiter::direct(Quota::per_second(
            NonZeroU32::new(rps).unwrap_or(NonZeroU32::MIN),
        )));
        Self { client, api_key, base_url, language, limiter }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        self.limiter.until_ready().await;

        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        debug!(path = %path, "catalog request");

        let resp = self
            .client
            .get(url)
            .query(&[("api_key", self.api_key.as_str()), ("language", self.language.as_str())])
            .query(params)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = match resp.json::<ErrorBody>().await {
                Ok(body) => body.status_message,
                Err(_) => status.canonical_reason().unwrap_or("upstream error").to_string(),
            };
            return Err(CatalogError::Upstream { status: status.as_u16(), message });
        }

        Ok(resp.json().await?)
    }
}

impl Catalog for TmdbClient {
    async fn popular_page(
        &self,
        region: Option<&str>,
        page: u32,
    ) -> Result<Vec<PopularFilm>, CatalogError> {
        let mut params = vec![("page", page.to_string())];
        if let Some(region) = region {
            params.push(("region", region.to_string()));
        }

        let resp: PagedResponse<PopularFilm> = self.get_json("/movie/popular", &params).await?;
        Ok(resp.results)
    }

    async fn movie_details(&self, id: i32) -> Result<MovieDetails, CatalogError> {
        self.get_json(&format!("/movie/{id}"), &[]).await
    }

    async fn genres(&self) -> Result<Vec<Genre>, CatalogError> {
        let resp: GenresResponse = self.get_json("/genre/movie/list", &[]).await?;
        Ok(resp.genres)
    }

    async fn videos(&self, id: i32) -> Result<Vec<Video>, CatalogError> {
        let resp: PagedResponse<Video> = self.get_json(&format!("/movie/{id}/videos"), &[]).await?;
        Ok(resp.results)
    }
}

#[derive(Debug, Deserialize)]
struct PagedResponse<T> {
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct GenresResponse {
    genres: Vec<Genre>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    status_message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_parses_tmdb_rejection() {
        let body: ErrorBody = serde_json::from_str(
            r#"{"success":false,"status_code":34,"status_message":"The resource you requested could not be found."}"#,
        )
        .unwrap();
        assert_eq!(body.status_message, "The resource you requested could not be found.");
    }

    #[test]
    fn test_popular_page_parses_listing() {
        let json = r#"{
            "page": 1,
            "results": [
                {"id": 1, "title": "A", "poster_path": "/a.jpg", "backdrop_path": null,
                 "overview": "", "release_date": "2025-01-01", "genre_ids": [28], "vote_average": 7.2},
                {"id": 2, "title": "B", "poster_path": null, "backdrop_path": null,
                 "overview": "", "release_date": "", "genre_ids": [], "vote_average": 0}
            ],
            "total_pages": 500,
            "total_results": 10000
        }"#;
        let resp: PagedResponse<PopularFilm> = serde_json::from_str(json).unwrap();
        assert_eq!(resp.results.iter().map(|f| f.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_zero_rps_does_not_panic() {
        let client = TmdbClient::new(
            reqwest::Client::new(),
            String::new(),
            "http://localhost".to_string(),
            "fr-FR".to_string(),
            0,
        );
        assert!(client.limiter.check().is_ok());
    }
}

use std::future::Future;

use futures::future::try_join_all;
use tracing::debug;

use crate::models::{Genre, MovieDetails, PopularFilm, Video};

/// Films per page of the popular listing.
pub const PAGE_SIZE: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{message}")]
    Upstream { status: u16, message: String },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl CatalogError {
    pub fn status(&self) -> u16 {
        match self {
            CatalogError::Upstream { status, .. } => *status,
            CatalogError::Http(err) => err.status().map(|s| s.as_u16()).unwrap_or(502),
        }
    }
}

/// External movie metadata source.
pub trait Catalog: Send + Sync {
    fn popular_page(
        &self,
        region: Option<&str>,
        page: u32,
    ) -> impl Future<Output = Result<Vec<PopularFilm>, CatalogError>> + Send;

    fn movie_details(
        &self,
        id: i32,
    ) -> impl Future<Output = Result<MovieDetails, CatalogError>> + Send;

    fn genres(&self) -> impl Future<Output = Result<Vec<Genre>, CatalogError>> + Send;

    fn videos(&self, id: i32) -> impl Future<Output = Result<Vec<Video>, CatalogError>> + Send;
}

pub fn page_count(amount: Option<usize>) -> u32 {
    match amount {
        Some(amount) if amount > 0 => u32::try_from(amount.div_ceil(PAGE_SIZE)).unwrap_or(u32::MAX),
        _ => 1,
    }
}

/// Fetches enough pages to cover `amount` films, all at once. One failed page
/// fails the whole listing. Pages are flattened in page order and the result
/// is not truncated to `amount`.
pub async fn fetch_popular<C: Catalog>(
    catalog: &C,
    region: Option<&str>,
    amount: Option<usize>,
) -> Result<Vec<PopularFilm>, CatalogError> {
    let pages = page_count(amount);
    debug!(pages = pages, region = ?region, "fetching popular films");

    let results = try_join_all((1..=pages).map(|page| catalog.popular_page(region, page))).await?;
    let films: Vec<PopularFilm> = results.into_iter().flatten().collect();

    debug!(films = films.len(), "fetched popular films");
    Ok(films)
}

pub async fn genre_name<C: Catalog>(catalog: &C, id: i32) -> Result<Option<String>, CatalogError> {
    let genres = catalog.genres().await?;
    Ok(genres.into_iter().find(|g| g.id == id).map(|g| g.name))
}

pub async fn trailer_key<C: Catalog>(
    catalog: &C,
    film_id: i32,
) -> Result<Option<String>, CatalogError> {
    let videos = catalog.videos(film_id).await?;
    Ok(videos.into_iter().find(Video::is_youtube_trailer).map(|v| v.key))
}

pub fn image_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

//! In-memory fixtures shared by the unit tests.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use crate::{
    catalog::{Catalog, CatalogError, PAGE_SIZE},
    db,
    models::{Genre, MovieDetails, NewFilm, PopularFilm, Video},
    store::FilmStore,
};

pub async fn memory_store() -> FilmStore {
    let db = db::connect_and_migrate("sqlite::memory:").await.unwrap();
    FilmStore::new(db)
}

pub fn new_film(id: i32) -> NewFilm {
    NewFilm {
        id,
        title: format!("Film {id}"),
        poster_path: Some(format!("/poster-{id}.jpg")),
        backdrop_path: None,
        overview: "Résumé".to_string(),
        release_date: Some(jiff::civil::date(2025, 3, 14)),
        genre_ids: vec![18],
        vote_average: 7.5,
        runtime: None,
    }
}

pub fn summary(id: i32) -> PopularFilm {
    PopularFilm {
        id,
        title: format!("Film {id}"),
        poster_path: Some(format!("/poster-{id}.jpg")),
        backdrop_path: Some(format!("/backdrop-{id}.jpg")),
        overview: "Résumé".to_string(),
        release_date: Some("2025-03-14".to_string()),
        genre_ids: vec![18, 35],
        vote_average: 7.5,
    }
}

pub fn details(id: i32) -> MovieDetails {
    MovieDetails {
        id,
        title: format!("Film {id}"),
        poster_path: Some(format!("/poster-{id}.jpg")),
        backdrop_path: Some(format!("/backdrop-{id}.jpg")),
        overview: "Résumé".to_string(),
        release_date: Some("2025-03-14".to_string()),
        genres: vec![Genre { id: 18, name: "Drame".to_string() }],
        vote_average: 7.5,
        runtime: Some(100 + id),
    }
}

/// Catalog backed by in-memory data. Every film in the popular listing has
/// a detail record unless it is registered as rejected.
#[derive(Default)]
pub struct FakeCatalog {
    popular: Mutex<Vec<PopularFilm>>,
    details: Mutex<HashMap<i32, MovieDetails>>,
    rejected: Mutex<HashMap<i32, (u16, String)>>,
    failing_pages: Mutex<HashSet<u32>>,
    videos: Mutex<HashMap<i32, Vec<Video>>>,
    pages: Mutex<Vec<u32>>,
    detail_calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_popular(&self, films: Vec<PopularFilm>) {
        *self.popular.lock().unwrap() = films;
    }

    pub fn set_details(&self, details: MovieDetails) {
        self.details.lock().unwrap().insert(details.id, details);
    }

    pub fn reject_details(&self, id: i32, status: u16, message: &str) {
        self.rejected.lock().unwrap().insert(id, (status, message.to_string()));
    }

    pub fn fail_page(&self, page: u32) {
        self.failing_pages.lock().unwrap().insert(page);
    }

    pub fn set_videos(&self, id: i32, videos: Vec<Video>) {
        self.videos.lock().unwrap().insert(id, videos);
    }

    /// Requested page numbers, sorted.
    pub fn page_requests(&self) -> Vec<u32> {
        let mut pages = self.pages.lock().unwrap().clone();
        pages.sort_unstable();
        pages
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

impl Catalog for FakeCatalog {
    async fn popular_page(
        &self,
        _region: Option<&str>,
        page: u32,
    ) -> Result<Vec<PopularFilm>, CatalogError> {
        self.pages.lock().unwrap().push(page);
        if self.failing_pages.lock().unwrap().contains(&page) {
            return Err(CatalogError::Upstream {
                status: 500,
                message: "Internal error".to_string(),
            });
        }

        let popular = self.popular.lock().unwrap();
        let start = (page as usize - 1) * PAGE_SIZE;
        Ok(popular.iter().skip(start).take(PAGE_SIZE).cloned().collect())
    }

    async fn movie_details(&self, id: i32) -> Result<MovieDetails, CatalogError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if let Some((status, message)) = self.rejected.lock().unwrap().get(&id).cloned() {
            return Err(CatalogError::Upstream { status, message });
        }
        let custom = self.details.lock().unwrap().get(&id).cloned();
        Ok(custom.unwrap_or_else(|| details(id)))
    }

    async fn genres(&self) -> Result<Vec<Genre>, CatalogError> {
        Ok(vec![
            Genre { id: 18, name: "Drame".to_string() },
            Genre { id: 35, name: "Comédie".to_string() },
        ])
    }

    async fn videos(&self, id: i32) -> Result<Vec<Video>, CatalogError> {
        Ok(self.videos.lock().unwrap().get(&id).cloned().unwrap_or_default())
    }
}

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::{
    catalog::{self, Catalog, CatalogError},
    models::{Film, NewFilm},
    store::{FilmStore, ListHandle, StoreError},
};

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("List not found: {0}")]
    ListNotFound(i32),
    #[error(transparent)]
    Store(StoreError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl From<StoreError> for SyncError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ListNotFound(id) => SyncError::ListNotFound(id),
            other => SyncError::Store(other),
        }
    }
}

impl From<EnsureError> for SyncError {
    fn from(err: EnsureError) -> Self {
        match err {
            EnsureError::Upstream { message, status } => {
                SyncError::Catalog(CatalogError::Upstream { status, message })
            },
            EnsureError::Store(err) => err.into(),
            EnsureError::Catalog(err) => SyncError::Catalog(err),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EnsureError {
    /// The catalog rejected the detail request. Message and status are the
    /// catalog's own.
    #[error("{message}")]
    Upstream { message: String, status: u16 },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Catalog(CatalogError),
}

impl From<CatalogError> for EnsureError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Upstream { status, message } => EnsureError::Upstream { message, status },
            other => EnsureError::Catalog(other),
        }
    }
}

impl EnsureError {
    pub fn status(&self) -> u16 {
        match self {
            EnsureError::Upstream { status, .. } => *status,
            EnsureError::Store(err) => err.status(),
            EnsureError::Catalog(err) => err.status(),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnsureOutcome {
    Existing,
    Created,
}

/// Where a detail lookup found its film.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilmSource {
    Cached,
    Created,
}

impl FilmSource {
    pub fn status(self) -> u16 {
        match self {
            FilmSource::Cached => 200,
            FilmSource::Created => 201,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshOutcome {
    UpToDate,
    Refreshed,
    Partial,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FilmFailure {
    pub film_id: i32,
    pub status: u16,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RefreshReport {
    pub list_id: i32,
    pub forced: bool,
    pub outcome: RefreshOutcome,
    /// Drifted films found by the detector. Always 0 for forced refreshes.
    pub missing: usize,
    pub fetched: usize,
    pub ensured: usize,
    pub failed: Vec<FilmFailure>,
    pub error: Option<String>,
}

impl RefreshReport {
    fn new(list: ListHandle, forced: bool) -> Self {
        Self {
            list_id: list.id(),
            forced,
            outcome: RefreshOutcome::Failed,
            missing: 0,
            fetched: 0,
            ensured: 0,
            failed: Vec::new(),
            error: None,
        }
    }
}

/// Keeps curated lists in line with the catalog's popular listing.
pub struct SyncEngine<C> {
    store: FilmStore,
    catalog: C,
    amount: usize,
}

impl<C: Catalog> SyncEngine<C> {
    pub fn new(store: FilmStore, catalog: C, amount: usize) -> Self {
        Self { store, catalog, amount }
    }

    pub fn store(&self) -> &FilmStore {
        &self.store
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Stored members of `list` that are no longer in the catalog's top
    /// films. Compares ids only.
    pub async fn detect_drift(
        &self,
        list: ListHandle,
        region: Option<&str>,
    ) -> Result<Vec<Film>, SyncError> {
        let stored = self.store.list_films(list).await?;
        let fetched = catalog::fetch_popular(&self.catalog, region, Some(self.amount)).await?;

        let current: HashSet<i32> = fetched.iter().map(|f| f.id).collect();
        let missing: Vec<Film> = stored.into_iter().filter(|f| !current.contains(&f.id)).collect();

        debug!(list_id = list.id(), missing = missing.len(), "compared list to catalog");
        Ok(missing)
    }

    /// Rebuilds `list` from the catalog when it has drifted, or always when
    /// `forced`. Never fails: problems are logged and reported. A failure
    /// part way through leaves the list as far as the rebuild got.
    pub async fn refresh(
        &self,
        list: ListHandle,
        region: Option<&str>,
        forced: bool,
    ) -> RefreshReport {
        let mut report = RefreshReport::new(list, forced);

        if let Err(err) = self.run_refresh(list, region, forced, &mut report).await {
            error!(list_id = list.id(), error = %err, "failed to refresh list");
            report.outcome = RefreshOutcome::Failed;
            report.error = Some(err.to_string());
        }

        info!(
            list_id = list.id(),
            forced = forced,
            outcome = ?report.outcome,
            fetched = report.fetched,
            ensured = report.ensured,
            failed = report.failed.len(),
            "list refresh finished"
        );
        report
    }

    /// Refresh run when the service boots. A list that is empty or was never
    /// refreshed has nothing to drift from, so it is rebuilt unconditionally.
    pub async fn startup_refresh(&self, list: ListHandle, region: Option<&str>) -> RefreshReport {
        let forced = match self.store.get_list(list).await {
            Ok(current) => current.refreshed_at.is_none() || current.films.is_empty(),
            Err(err) => {
                debug!(list_id = list.id(), error = %err, "could not inspect list before startup refresh");
                false
            },
        };
        self.refresh(list, region, forced).await
    }

    async fn run_refresh(
        &self,
        list: ListHandle,
        region: Option<&str>,
        forced: bool,
        report: &mut RefreshReport,
    ) -> Result<(), SyncError> {
        if !forced {
            let missing = self.detect_drift(list, region).await?;
            report.missing = missing.len();
            if missing.is_empty() {
                info!(list_id = list.id(), "list already matches the catalog");
                report.outcome = RefreshOutcome::UpToDate;
                return Ok(());
            }
        }

        self.store.clear_list(list).await?;

        let films = catalog::fetch_popular(&self.catalog, region, Some(self.amount)).await?;
        report.fetched = films.len();

        for film in &films {
            match self.ensure_film(list, film.id).await {
                Ok(outcome) => {
                    debug!(film_id = film.id, outcome = ?outcome, "film ensured");
                    report.ensured += 1;
                },
                Err(EnsureError::Upstream { message, status }) => {
                    warn!(film_id = film.id, status = status, error = %message, "catalog rejected film");
                    report.failed.push(FilmFailure { film_id: film.id, status, message });
                },
                Err(err) => return Err(err.into()),
            }
        }

        self.store.mark_refreshed(list).await?;
        report.outcome = if report.failed.is_empty() {
            RefreshOutcome::Refreshed
        } else {
            RefreshOutcome::Partial
        };
        Ok(())
    }

    /// Makes sure a film record exists, then adds it to `list`. The list is
    /// left alone when the catalog rejects the film.
    pub async fn ensure_film(
        &self,
        list: ListHandle,
        film_id: i32,
    ) -> Result<EnsureOutcome, EnsureError> {
        let (_, source) = self.film_details(film_id).await?;
        self.store.add_to_list(list, film_id).await?;

        Ok(match source {
            FilmSource::Cached => EnsureOutcome::Existing,
            FilmSource::Created => EnsureOutcome::Created,
        })
    }

    /// Looks the film up locally, falling back to the catalog and caching
    /// the result.
    pub async fn film_details(&self, film_id: i32) -> Result<(Film, FilmSource), EnsureError> {
        if let Some(film) = self.store.get_film(film_id).await? {
            return Ok((film, FilmSource::Cached));
        }

        let details = self.catalog.movie_details(film_id).await?;
        let mut new = NewFilm::from(&details);
        new.id = film_id;

        if !self.store.insert_film_if_absent(&new).await? {
            debug!(film_id = film_id, "film created concurrently");
        }

        let film = self.store.get_film(film_id).await?.ok_or(StoreError::NotFound(film_id))?;
        Ok((film, FilmSource::Created))
    }
}

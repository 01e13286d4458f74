use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    AppState,
    catalog::{self, Catalog},
    error::{AppError, AppResult},
    models::{CuratedList, Film, NewFilm},
    sync::RefreshReport,
};

pub fn router<C: Catalog + 'static>(state: Arc<AppState<C>>) -> Router {
    Router::new()
        .route("/populars", get(list_populars::<C>))
        .route("/populars/refresh", post(refresh_populars::<C>))
        .route("/populars/drift", get(populars_drift::<C>))
        .route("/populars/{id}", post(add_to_populars::<C>))
        .route("/films", post(create_film::<C>))
        .route("/films/{id}", get(film_details::<C>).delete(delete_film::<C>))
        .route("/films/{id}/exists", get(film_exists::<C>))
        .route("/films/{id}/trailer", get(film_trailer::<C>))
        .route("/genres/{id}", get(genre_name::<C>))
        .route("/images", get(image_url::<C>))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct RegionQuery {
    region: Option<String>,
    #[serde(default)]
    forced: bool,
}

/// Region from the query string, falling back to the configured one.
fn resolve_region<C>(state: &AppState<C>, requested: Option<&str>) -> AppResult<Option<String>> {
    let Some(region) = requested.map(|r| r.trim().to_uppercase()).filter(|r| !r.is_empty()) else {
        return Ok(state.config.popular_region.clone());
    };
    if region.len() != 2 || !region.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::new(400, anyhow::anyhow!("region must be a 2-letter code")));
    }
    Ok(Some(region))
}

pub async fn list_populars<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
) -> AppResult<Json<CuratedList>> {
    Ok(Json(state.engine.store().get_list(state.list).await?))
}

pub async fn refresh_populars<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
    Query(q): Query<RegionQuery>,
) -> AppResult<Json<RefreshReport>> {
    let region = resolve_region(&state, q.region.as_deref())?;
    Ok(Json(state.engine.refresh(state.list, region.as_deref(), q.forced).await))
}

pub async fn populars_drift<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
    Query(q): Query<RegionQuery>,
) -> AppResult<Json<Vec<Film>>> {
    let region = resolve_region(&state, q.region.as_deref())?;
    Ok(Json(state.engine.detect_drift(state.list, region.as_deref()).await?))
}

pub async fn add_to_populars<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
    Path(id): Path<i32>,
) -> AppResult<Json<Value>> {
    let outcome = state.engine.ensure_film(state.list, id).await?;
    Ok(Json(json!({ "message": "Film added to the populars list", "outcome": outcome })))
}

pub async fn create_film<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
    Json(new): Json<NewFilm>,
) -> AppResult<(StatusCode, Json<Film>)> {
    let film = state.engine.store().add_film(&new).await?;
    Ok((StatusCode::CREATED, Json(film)))
}

pub async fn film_details<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
    Path(id): Path<i32>,
) -> AppResult<(StatusCode, Json<Film>)> {
    let (film, source) = state.engine.film_details(id).await?;
    let status = StatusCode::from_u16(source.status()).unwrap_or(StatusCode::OK);
    Ok((status, Json(film)))
}

pub async fn delete_film<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
    Path(id): Path<i32>,
) -> AppResult<Json<Value>> {
    state.engine.store().remove_film(id).await?;
    Ok(Json(json!({ "message": "Film deleted successfully" })))
}

pub async fn film_exists<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
    Path(id): Path<i32>,
) -> AppResult<Json<Value>> {
    let exists = state.engine.store().film_exists(id).await?;
    Ok(Json(json!({ "exists": exists })))
}

pub async fn film_trailer<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
    Path(id): Path<i32>,
) -> AppResult<Json<Value>> {
    let key = catalog::trailer_key(state.engine.catalog(), id).await?;
    Ok(Json(json!({ "key": key })))
}

pub async fn genre_name<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
    Path(id): Path<i32>,
) -> AppResult<Json<Value>> {
    let name = catalog::genre_name(state.engine.catalog(), id).await?;
    Ok(Json(json!({ "name": name })))
}

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    path: String,
}

pub async fn image_url<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
    Query(q): Query<ImageQuery>,
) -> Json<Value> {
    Json(json!({ "url": catalog::image_url(&state.config.tmdb_image_base_url, &q.path) }))
}

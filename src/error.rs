use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    catalog::CatalogError,
    store::StoreError,
    sync::{EnsureError, SyncError},
};

/// Error returned by HTTP handlers, rendered as `{ "error", "status" }`.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    source: anyhow::Error,
}

impl AppError {
    pub fn new(status: u16, source: impl Into<anyhow::Error>) -> Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self { status, source: source.into() }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.source.fmt(f)
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, source: err }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::new(err.status(), err)
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        Self::new(err.status(), err)
    }
}

impl From<EnsureError> for AppError {
    fn from(err: EnsureError) -> Self {
        Self::new(err.status(), err)
    }
}

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        let status = match &err {
            SyncError::ListNotFound(_) => 404,
            SyncError::Store(err) => err.status(),
            SyncError::Catalog(err) => err.status(),
        };
        Self::new(status, err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = %self.source, "request failed");
        }
        let body = json!({ "error": self.source.to_string(), "status": self.status.as_u16() });
        (self.status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

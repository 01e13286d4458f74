mod catalog;
mod config;
mod db;
mod entities;
mod error;
mod models;
mod routes;
mod store;
mod sync;
#[cfg(test)]
mod testing;
mod tmdb;

use std::{sync::Arc, time::Duration};

use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::Config,
    store::{FilmStore, ListHandle},
    sync::SyncEngine,
    tmdb::TmdbClient,
};

pub struct AppState<C> {
    pub config: Arc<Config>,
    pub engine: SyncEngine<C>,
    /// The populars list every list endpoint works on.
    pub list: ListHandle,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,cineswipe=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    let http = reqwest::Client::builder()
        .user_agent("cineswipe/0.1")
        .timeout(Duration::from_secs(30))
        .build()?;

    let db = db::connect_and_migrate(&config.database_url).await?;
    let store = FilmStore::new(db);
    store.ensure_list(config.popular_list_id, &config.popular_list_name).await?;
    let list = store.resolve_list(config.popular_list_id).await?;

    let tmdb = TmdbClient::new(
        http,
        config.tmdb_api_key.clone(),
        config.tmdb_base_url.clone(),
        config.tmdb_language.clone(),
        config.tmdb_rps,
    );

    let engine = SyncEngine::new(store, tmdb, config.popular_amount);
    let state = Arc::new(AppState { config: config.clone(), engine, list });

    if config.refresh_on_startup {
        let state = state.clone();
        tokio::spawn(async move {
            let region = state.config.popular_region.clone();
            state.engine.startup_refresh(state.list, region.as_deref()).await;
        });
    }

    let app = routes::router(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, list_id = list.id(), "listening");
    axum::serve(listener, app).await?;

    Ok(())
}

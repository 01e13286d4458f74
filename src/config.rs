use std::net::SocketAddr;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub tmdb_api_key: String,
    pub tmdb_base_url: String,
    pub tmdb_image_base_url: String,
    pub tmdb_language: String,
    pub tmdb_rps: u32,
    pub database_url: String,
    pub popular_list_id: i32,
    pub popular_list_name: String,
    pub popular_amount: usize,
    pub popular_region: Option<String>,
    pub refresh_on_startup: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().context("PORT")?;

        let tmdb_api_key = std::env::var("TMDB_API_KEY").unwrap_or_else(|_| "".to_string());
        let tmdb_base_url = std::env::var("TMDB_BASE_URL")
            .unwrap_or_else(|_| "https://api.themoviedb.org/3".to_string());
        let tmdb_image_base_url = std::env::var("TMDB_IMAGE_BASE_URL")
            .unwrap_or_else(|_| "https://image.tmdb.org/t/p/original".to_string());
        let tmdb_language =
            std::env::var("TMDB_LANGUAGE").unwrap_or_else(|_| "fr-FR".to_string());

        let tmdb_rps: u32 =
            std::env::var("TMDB_RPS").ok().and_then(|s| s.parse().ok()).unwrap_or(4);

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://cineswipe.db?mode=rwc".to_string());

        let popular_list_id: i32 = std::env::var("POPULAR_LIST_ID")
            .unwrap_or_else(|_| "1".to_string())
            .parse()
            .context("POPULAR_LIST_ID")?;
        let popular_list_name =
            std::env::var("POPULAR_LIST_NAME").unwrap_or_else(|_| "populars".to_string());
        let popular_amount: usize =
            std::env::var("POPULAR_AMOUNT").ok().and_then(|s| s.parse().ok()).unwrap_or(40);
        let popular_region = std::env::var("POPULAR_REGION")
            .ok()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty());

        let refresh_on_startup = std::env::var("REFRESH_ON_STARTUP")
            .ok()
            .map(|s| !matches!(s.trim().to_lowercase().as_str(), "0" | "false" | "no"))
            .unwrap_or(true);

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            tmdb_api_key,
            tmdb_base_url,
            tmdb_image_base_url,
            tmdb_language,
            tmdb_rps,
            database_url,
            popular_list_id,
            popular_list_name,
            popular_amount,
            popular_region,
            refresh_on_startup,
        })
    }
}

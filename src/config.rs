use std::net::SocketAddr;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    /// Signs form tokens. Empty means a random key per process.
    pub secret_key: String,
    /// Empty key puts the search client into offline catalog mode.
    pub tmdb_api_key: String,
    pub tmdb_base_url: String,
    pub tmdb_image_base_url: String,
    pub tmdb_rps: u32,
    pub tmdb_timeout_secs: u64,
    pub tmdb_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            database_url: "sqlite://movies-collection.db?mode=rwc".to_string(),
            secret_key: String::new(),
            tmdb_api_key: String::new(),
            tmdb_base_url: "https://api.themoviedb.org/3".to_string(),
            tmdb_image_base_url: "https://image.tmdb.org/t/p/w500".to_string(),
            tmdb_rps: 4,
            tmdb_timeout_secs: 10,
            tmdb_retries: 1,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().context("PORT")?;

        let database_url = std::env::var("DATABASE_URL").unwrap_or(defaults.database_url);

        let secret_key = std::env::var("SECRET_KEY").unwrap_or_default();

        let tmdb_api_key = std::env::var("TMDB_API_KEY").unwrap_or_default();
        let tmdb_base_url = std::env::var("TMDB_BASE_URL").unwrap_or(defaults.tmdb_base_url);
        let tmdb_image_base_url =
            std::env::var("TMDB_IMAGE_BASE_URL").unwrap_or(defaults.tmdb_image_base_url);

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            secret_key,
            tmdb_api_key,
            tmdb_base_url,
            tmdb_image_base_url,
            tmdb_rps: parse_var("TMDB_RPS", defaults.tmdb_rps)?,
            tmdb_timeout_secs: parse_var("TMDB_TIMEOUT_SECS", defaults.tmdb_timeout_secs)?,
            tmdb_retries: parse_var("TMDB_RETRIES", defaults.tmdb_retries)?,
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw.trim().parse().context(name.to_string()),
        _ => Ok(default),
    }
}

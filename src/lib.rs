pub mod config;
pub mod csrf;
pub mod db;
pub mod entities;
pub mod error;
pub mod forms;
pub mod models;
pub mod ranking;
pub mod routes;
pub mod store;
pub mod templates;
pub mod tmdb;

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::{
    config::Config, csrf::CsrfSigner, error::AppResult, store::MovieStore, tmdb::TmdbClient,
};

pub struct AppState {
    pub store: MovieStore,
    pub tmdb: Arc<TmdbClient>,
    pub csrf: CsrfSigner,
}

pub async fn build_state(config: Config) -> AppResult<Arc<AppState>> {
    let http = TmdbClient::http_client(&config)?;
    let tmdb = TmdbClient::new(http, &config);
    let csrf = CsrfSigner::new(&config.secret_key)?;

    let db = db::connect_and_migrate(&config.database_url).await?;

    Ok(Arc::new(AppState {
        store: MovieStore::new(db),
        tmdb: Arc::new(tmdb),
        csrf,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/edit", get(routes::edit_page).post(routes::edit_submit))
        .route("/delete", get(routes::delete))
        .route("/add", get(routes::add_page).post(routes::add_submit))
        .route("/select", get(routes::select))
        .route("/find", get(routes::find))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

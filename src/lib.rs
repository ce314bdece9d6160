pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod resolver;
pub mod state;

use std::path::Path;

use axum::{routing::get, Router};
use tower_http::services::{ServeDir, ServeFile};

use config::Config;
use error::ConfigResult;
use state::AppState;

/// Application routes without the outer middleware stack.
///
/// Anything that is not an API route is served from `static_dir`; unknown
/// paths get `index.html` so the front-end can route client-side.
pub fn build_router(state: AppState, static_dir: &Path) -> Router {
    let assets =
        ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/links", get(handlers::links::list_links))
        .fallback_service(assets)
        .with_state(state)
}

/// The full application: routes from [`build_router`] behind
/// [`middleware::with_middleware`].
pub fn build_app(config: &Config, state: AppState) -> ConfigResult<Router> {
    middleware::with_middleware(build_router(state, &config.static_dir), config)
}

use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::SharedState;

mod error;
mod genres;
mod movies;
mod people;
mod system;
pub(crate) mod types;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,
}

impl AppState {
    #[must_use]
    pub fn store(&self) -> &Arc<crate::db::Store> {
        &self.shared.store
    }

    #[must_use]
    pub fn movie_service(&self) -> &Arc<dyn crate::services::MovieService> {
        &self.shared.movie_service
    }
}

#[must_use]
pub fn create_app_state(shared: Arc<SharedState>) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
    })
}

pub async fn create_app_state_from_config(config: Config) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let cors_origins = {
        let config = state.shared.config.read().await;
        config.server.cors_allowed_origins.clone()
    };

    let api_router = Router::new()
        .route("/movies", get(movies::list_movies))
        .route("/movies", post(movies::create_movie))
        .route("/movies/lookup", get(movies::lookup_movie))
        .route("/movies/{id}", put(movies::update_movie))
        .route("/movies/{id}", delete(movies::delete_movie))
        .route("/movies/{id}/refetch", post(movies::refetch_movie))
        .route("/movies/{id}/credits", get(movies::movie_credits))
        .route("/genres", get(genres::list_genres))
        .route("/genres/lookup", get(genres::lookup_genre))
        .route("/genres/{id}/movies", get(genres::genre_movies))
        .route("/people", get(people::list_people))
        .route("/people/lookup", get(people::lookup_person))
        .route("/people/{id}/filmography", get(people::person_filmography))
        .route("/system/status", get(system::get_status))
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

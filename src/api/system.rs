use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::api::types::SystemStatusDto;

pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SystemStatusDto>>, ApiError> {
    let store = &state.shared.store;
    store.ping().await?;

    let (movies, genres, people) =
        tokio::try_join!(store.count_movies(), store.count_genres(), store.count_people())?;

    let status = SystemStatusDto {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        movies,
        genres,
        people,
    };

    Ok(Json(ApiResponse::success(status)))
}

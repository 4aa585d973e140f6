use axum::{
    Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, ListParams, OrderParams};
use crate::api::types::{GenreDto, MovieDto};
use crate::db::MovieFilter;
use crate::models::page::{Connection, PageRequest};
use crate::services::GenreQuery;

pub async fn list_genres(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ApiResponse<Connection<GenreDto>>>, ApiError> {
    let page = PageRequest {
        limit: params.limit,
        offset: params.offset,
    };

    let connection = state
        .shared
        .genre_service
        .list_connection(params.order_by, page)
        .await?;

    Ok(Json(ApiResponse::success(connection)))
}

pub async fn lookup_genre(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GenreQuery>,
) -> Result<Json<ApiResponse<Option<GenreDto>>>, ApiError> {
    let genre = state.shared.genre_service.get(query).await?;
    Ok(Json(ApiResponse::success(genre)))
}

/// Plain movie listing scoped to one genre.
pub async fn genre_movies(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Query(params): Query<OrderParams>,
) -> Result<Json<ApiResponse<Vec<MovieDto>>>, ApiError> {
    let filter = MovieFilter {
        genre_id: Some(id),
        ..MovieFilter::default()
    };

    let movies = state
        .movie_service()
        .list_plain(filter, params.order_by)
        .await?;

    Ok(Json(ApiResponse::success(movies)))
}

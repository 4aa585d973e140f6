use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, ListParams};
use crate::api::types::{CreditDto, DeletePayload, MovieDto, MoviePayload};
use crate::db::MovieFilter;
use crate::models::page::{Connection, PageRequest};
use crate::services::{MovieQuery, MovieRefetchInput, MovieUpdateInput};

#[derive(Deserialize)]
pub struct CreateMovieRequest {
    pub tmdb: i32,
}

pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ApiResponse<Connection<MovieDto>>>, ApiError> {
    let page = PageRequest {
        limit: params.limit,
        offset: params.offset,
    };

    let connection = state
        .movie_service()
        .list_connection(MovieFilter::default(), params.order_by, page)
        .await?;

    Ok(Json(ApiResponse::success(connection)))
}

pub async fn lookup_movie(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MovieQuery>,
) -> Result<Json<ApiResponse<Option<MovieDto>>>, ApiError> {
    let movie = state.movie_service().get(query).await?;
    Ok(Json(ApiResponse::success(movie)))
}

pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateMovieRequest>,
) -> Result<Json<ApiResponse<MoviePayload>>, ApiError> {
    let payload = state.movie_service().create(request.tmdb).await?;
    Ok(Json(ApiResponse::success(payload)))
}

pub async fn update_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(input): Json<MovieUpdateInput>,
) -> Result<Json<ApiResponse<MoviePayload>>, ApiError> {
    let payload = state.movie_service().update(id, input).await?;
    Ok(Json(ApiResponse::success(payload)))
}

pub async fn refetch_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    input: Option<Json<MovieRefetchInput>>,
) -> Result<Json<ApiResponse<MoviePayload>>, ApiError> {
    let input = input.map(|Json(input)| input).unwrap_or_default();
    let payload = state.movie_service().refetch(id, input).await?;
    Ok(Json(ApiResponse::success(payload)))
}

pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<DeletePayload>>, ApiError> {
    let payload = state.movie_service().delete(id).await?;
    Ok(Json(ApiResponse::success(payload)))
}

pub async fn movie_credits(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<CreditDto>>>, ApiError> {
    let credits = state.movie_service().credits(id).await?;
    Ok(Json(ApiResponse::success(credits)))
}

use axum::{
    Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, ListParams};
use crate::api::types::{FilmographyEntryDto, PersonDto};
use crate::models::page::{Connection, PageRequest};
use crate::services::PersonQuery;

pub async fn list_people(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ApiResponse<Connection<PersonDto>>>, ApiError> {
    let page = PageRequest {
        limit: params.limit,
        offset: params.offset,
    };

    let connection = state
        .shared
        .person_service
        .list_connection(params.order_by, page)
        .await?;

    Ok(Json(ApiResponse::success(connection)))
}

pub async fn lookup_person(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PersonQuery>,
) -> Result<Json<ApiResponse<Option<PersonDto>>>, ApiError> {
    let person = state.shared.person_service.get(query).await?;
    Ok(Json(ApiResponse::success(person)))
}

pub async fn person_filmography(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<FilmographyEntryDto>>>, ApiError> {
    let filmography = state.shared.person_service.filmography(id).await?;
    Ok(Json(ApiResponse::success(filmography)))
}

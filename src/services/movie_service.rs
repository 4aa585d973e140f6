//! Domain service for movie catalog operations.
//!
//! This is the synchronization engine for the Movie aggregate: importing a
//! movie pulls its attributes, genre references and credited people from the
//! external provider and reconciles them against the local store.

use serde::Deserialize;
use thiserror::Error;

use crate::api::types::{CreditDto, DeletePayload, MovieDto, MoviePayload};
use crate::db::MovieFilter;
use crate::models::page::{Connection, PageRequest};

/// Domain errors for movie operations.
///
/// Conflicts that callers are expected to render (duplicate import,
/// missing row on update/refetch/delete) are not errors — they come back
/// as `ok: false` payloads with field-tagged messages.
#[derive(Debug, Error)]
pub enum MovieError {
    #[error("Movie not found: {0}")]
    NotFound(i32),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("External API error: {service} - {message}")]
    ExternalApi { service: String, message: String },
}

impl MovieError {
    /// Creates an external API error for TMDB.
    pub fn tmdb_error(msg: impl Into<String>) -> Self {
        Self::ExternalApi {
            service: "TMDB".to_string(),
            message: msg.into(),
        }
    }
}

impl From<sea_orm::DbErr> for MovieError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

/// Single-movie lookup arguments. Exactly one of `id` or `title` must be
/// given; anything else is a request-shape error, not a domain outcome.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieQuery {
    pub id: Option<i32>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieUpdateInput {
    pub backdrop: Option<String>,
    pub poster: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct MovieRefetchInput {
    pub with_images: bool,
}

/// Domain service trait for the movie aggregate.
///
/// Mutations return structured payloads so handlers can render field-level
/// messages; only request-shape problems and upstream failures surface as
/// [`MovieError`].
#[async_trait::async_trait]
pub trait MovieService: Send + Sync {
    /// Looks up one movie by internal ID or exact title.
    ///
    /// # Errors
    ///
    /// - Returns [`MovieError::Validation`] if both or neither key is given
    /// - Returns [`MovieError::Database`] on connection failures
    async fn get(&self, query: MovieQuery) -> Result<Option<MovieDto>, MovieError>;

    /// Lists movies as an edges/page-info connection.
    ///
    /// # Errors
    ///
    /// - Returns [`MovieError::Validation`] for an unknown order field
    /// - Returns [`MovieError::Database`] on connection failures
    async fn list_connection(
        &self,
        filter: MovieFilter,
        order_by: Option<String>,
        page: PageRequest,
    ) -> Result<Connection<MovieDto>, MovieError>;

    /// Lists movies as a bare sequence (no pagination envelope), for nested
    /// listings such as a genre's movies.
    ///
    /// # Errors
    ///
    /// Same contract as [`MovieService::list_connection`].
    async fn list_plain(
        &self,
        filter: MovieFilter,
        order_by: Option<String>,
    ) -> Result<Vec<MovieDto>, MovieError>;

    /// Imports a movie from the provider by its TMDB ID, together with its
    /// genre links and credited people. Importing an already-present movie
    /// performs no further writes and reports the conflict in the payload.
    ///
    /// # Errors
    ///
    /// - Returns [`MovieError::NotFound`] if TMDB does not know the ID
    /// - Returns [`MovieError::ExternalApi`] if the provider is unreachable
    /// - Returns [`MovieError::Database`] on connection failures
    async fn create(&self, tmdb_id: i32) -> Result<MoviePayload, MovieError>;

    /// Applies a partial image-reference edit to a movie.
    async fn update(&self, id: i32, input: MovieUpdateInput) -> Result<MoviePayload, MovieError>;

    /// Re-synchronizes a movie from the provider, replacing its genre links
    /// and credits wholesale. Stored image references survive unless
    /// `with_images` is set.
    async fn refetch(&self, id: i32, input: MovieRefetchInput)
    -> Result<MoviePayload, MovieError>;

    /// Deletes a movie; its credits go with it, shared people and genres
    /// stay.
    async fn delete(&self, id: i32) -> Result<DeletePayload, MovieError>;

    /// Cast and crew of one movie.
    async fn credits(&self, movie_id: i32) -> Result<Vec<CreditDto>, MovieError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movie_error_display() {
        let err = MovieError::NotFound(42);
        assert_eq!(err.to_string(), "Movie not found: 42");

        let err = MovieError::tmdb_error("network timeout");
        assert_eq!(err.to_string(), "External API error: TMDB - network timeout");
    }

    #[test]
    fn refetch_input_defaults_to_keeping_images() {
        let input: MovieRefetchInput = serde_json::from_str("{}").unwrap();
        assert!(!input.with_images);

        let input: MovieRefetchInput = serde_json::from_str(r#"{"with_images":true}"#).unwrap();
        assert!(input.with_images);
    }
}

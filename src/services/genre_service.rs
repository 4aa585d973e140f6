//! Read-side service for the genre reference set.
//!
//! Genres are seeded from the provider taxonomy at startup and never created
//! through the catalog write path.

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::api::types::GenreDto;
use crate::db::Store;
use crate::models::page::{Connection, OrderSpec, PageRequest};

const GENRE_SORT_FIELDS: &[&str] = &["id", "name"];

#[derive(Debug, Error)]
pub enum GenreError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Single-genre lookup arguments; exactly one of `id` or `name`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenreQuery {
    pub id: Option<i32>,
    pub name: Option<String>,
}

pub struct GenreService {
    store: Arc<Store>,
}

impl GenreService {
    #[must_use]
    pub const fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub async fn get(&self, query: GenreQuery) -> Result<Option<GenreDto>, GenreError> {
        let name = query.name.as_deref().filter(|name| !name.is_empty());

        let genre = match (query.id, name) {
            (Some(_), Some(_)) => {
                return Err(GenreError::Validation(
                    "You can only search by one attribute.".to_string(),
                ));
            }
            (None, None) => {
                return Err(GenreError::Validation(
                    "You must enter at least one attribute.".to_string(),
                ));
            }
            (Some(id), None) => self.store.get_genre(id).await,
            (None, Some(name)) => self.store.find_genre_by_name(name).await,
        }
        .map_err(|e| GenreError::Database(e.to_string()))?;

        Ok(genre.map(GenreDto::from))
    }

    pub async fn list_connection(
        &self,
        order_by: Option<String>,
        page: PageRequest,
    ) -> Result<Connection<GenreDto>, GenreError> {
        let order = order_by
            .as_deref()
            .map(|raw| OrderSpec::parse_validated(raw, GENRE_SORT_FIELDS))
            .transpose()
            .map_err(GenreError::Validation)?;

        let (rows, total) = self
            .store
            .list_genres(order.as_ref(), &page)
            .await
            .map_err(|e| GenreError::Database(e.to_string()))?;

        let nodes = rows.into_iter().map(GenreDto::from).collect();
        Ok(Connection::new(nodes, total, page.offset_or_zero()))
    }
}

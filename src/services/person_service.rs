//! Read-side service for people and their filmographies.

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::api::types::{FilmographyEntryDto, MovieDto, PersonDto};
use crate::db::Store;
use crate::models::page::{Connection, OrderSpec, PageRequest};

const PERSON_SORT_FIELDS: &[&str] = &["id", "name", "birthday", "created_at"];

#[derive(Debug, Error)]
pub enum PersonError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Single-person lookup arguments; exactly one of `id` or `name`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonQuery {
    pub id: Option<i32>,
    pub name: Option<String>,
}

pub struct PersonService {
    store: Arc<Store>,
}

impl PersonService {
    #[must_use]
    pub const fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub async fn get(&self, query: PersonQuery) -> Result<Option<PersonDto>, PersonError> {
        let name = query.name.as_deref().filter(|name| !name.is_empty());

        let person = match (query.id, name) {
            (Some(_), Some(_)) => {
                return Err(PersonError::Validation(
                    "You can only search by one attribute.".to_string(),
                ));
            }
            (None, None) => {
                return Err(PersonError::Validation(
                    "You must enter at least one attribute.".to_string(),
                ));
            }
            (Some(id), None) => self.store.get_person(id).await,
            (None, Some(name)) => self.store.find_person_by_name(name).await,
        }
        .map_err(|e| PersonError::Database(e.to_string()))?;

        Ok(person.map(PersonDto::from))
    }

    pub async fn list_connection(
        &self,
        order_by: Option<String>,
        page: PageRequest,
    ) -> Result<Connection<PersonDto>, PersonError> {
        let order = order_by
            .as_deref()
            .map(|raw| OrderSpec::parse_validated(raw, PERSON_SORT_FIELDS))
            .transpose()
            .map_err(PersonError::Validation)?;

        let (rows, total) = self
            .store
            .list_people(order.as_ref(), &page)
            .await
            .map_err(|e| PersonError::Database(e.to_string()))?;

        let nodes = rows.into_iter().map(PersonDto::from).collect();
        Ok(Connection::new(nodes, total, page.offset_or_zero()))
    }

    /// Every movie the person is credited on, one entry per credit, with the
    /// role metadata carried on the credit row.
    pub async fn filmography(
        &self,
        person_id: i32,
    ) -> Result<Vec<FilmographyEntryDto>, PersonError> {
        let rows = self
            .store
            .person_filmography(person_id)
            .await
            .map_err(|e| PersonError::Database(e.to_string()))?;

        let movie_ids: Vec<i32> = rows.iter().map(|(_, movie)| movie.id).collect();
        let genres_by_movie = self
            .store
            .genres_for_movie_ids(&movie_ids)
            .await
            .map_err(|e| PersonError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(credit, movie)| {
                let genres = genres_by_movie.get(&movie.id).cloned().unwrap_or_default();
                FilmographyEntryDto {
                    department: credit.department,
                    character: credit.character,
                    cast_order: credit.cast_order,
                    movie: MovieDto::from_model(movie, genres),
                }
            })
            .collect())
    }
}

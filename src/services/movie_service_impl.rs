//! `SeaORM`/TMDB implementation of the [`MovieService`] trait.
//!
//! Deduplication relies on the store's unique constraints rather than
//! check-then-insert: concurrent imports racing on the same movie or person
//! resolve through find-or-create, and a duplicate external credit is
//! swallowed by the `(movie_id, credit_id)` index.

use std::sync::Arc;

use tracing::info;

use crate::api::types::{CreditDto, DeletePayload, FieldError, MovieDto, MoviePayload};
use crate::clients::{CreditData, MetadataGateway};
use crate::db::{MovieFilter, Store};
use crate::entities::{movies, people};
use crate::models::page::{Connection, OrderSpec, PageRequest};
use crate::services::movie_service::{
    MovieError, MovieQuery, MovieRefetchInput, MovieService, MovieUpdateInput,
};

const MOVIE_SORT_FIELDS: &[&str] = &[
    "id",
    "title",
    "title_original",
    "release_date",
    "runtime",
    "created_at",
];

pub struct TmdbMovieService {
    store: Arc<Store>,
    gateway: Arc<dyn MetadataGateway>,
}

impl TmdbMovieService {
    #[must_use]
    pub fn new(store: Arc<Store>, gateway: Arc<dyn MetadataGateway>) -> Self {
        Self { store, gateway }
    }

    fn parse_order(order_by: Option<&str>) -> Result<Option<OrderSpec>, MovieError> {
        order_by
            .map(|raw| OrderSpec::parse_validated(raw, MOVIE_SORT_FIELDS))
            .transpose()
            .map_err(MovieError::Validation)
    }

    async fn movie_dto(&self, movie: movies::Model) -> Result<MovieDto, MovieError> {
        let genres = self
            .store
            .genres_for_movie(movie.id)
            .await
            .map_err(|e| MovieError::Database(e.to_string()))?;

        Ok(MovieDto::from_model(movie, genres))
    }

    /// Maps a page of rows to DTOs with one batched genre lookup.
    async fn movie_dtos(&self, rows: Vec<movies::Model>) -> Result<Vec<MovieDto>, MovieError> {
        let movie_ids: Vec<i32> = rows.iter().map(|movie| movie.id).collect();

        let mut genres_by_movie = self
            .store
            .genres_for_movie_ids(&movie_ids)
            .await
            .map_err(|e| MovieError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|movie| {
                let genres = genres_by_movie.remove(&movie.id).unwrap_or_default();
                MovieDto::from_model(movie, genres)
            })
            .collect())
    }

    /// Resolves local genre rows for the provider references and links them
    /// to the movie. Unknown references are dropped — the local genre set is
    /// closed and narrower than the provider taxonomy.
    async fn attach_genres(&self, movie_id: i32, genre_tmdb_ids: &[i32]) -> Result<(), MovieError> {
        let genre_models = self
            .store
            .genres_by_tmdb_ids(genre_tmdb_ids)
            .await
            .map_err(|e| MovieError::Database(e.to_string()))?;

        let genre_ids: Vec<i32> = genre_models.iter().map(|genre| genre.id).collect();

        self.store
            .attach_movie_genres(movie_id, &genre_ids)
            .await
            .map_err(|e| MovieError::Database(e.to_string()))
    }

    /// Returns the local person row for a provider ID, importing attributes
    /// on first sight. Existing rows are never refreshed here.
    async fn resolve_person(&self, person_tmdb_id: i32) -> Result<people::Model, MovieError> {
        if let Some(person) = self
            .store
            .find_person_by_tmdb(person_tmdb_id)
            .await
            .map_err(|e| MovieError::Database(e.to_string()))?
        {
            return Ok(person);
        }

        let data = self
            .gateway
            .fetch_person(person_tmdb_id)
            .await
            .map_err(|e| MovieError::tmdb_error(e.to_string()))?
            .ok_or_else(|| {
                MovieError::tmdb_error(format!(
                    "credited person {person_tmdb_id} is unknown to the provider"
                ))
            })?;

        let (person, _) = self
            .store
            .find_or_create_person(&data)
            .await
            .map_err(|e| MovieError::Database(e.to_string()))?;

        Ok(person)
    }

    async fn sync_credit(&self, movie_id: i32, credit: &CreditData) -> Result<(), MovieError> {
        let person = self.resolve_person(credit.person_tmdb_id).await?;

        self.store
            .insert_credit(movie_id, person.id, credit)
            .await
            .map_err(|e| MovieError::Database(e.to_string()))
    }

    /// Imports all credits for a movie. Ordering across people is not
    /// significant, so the per-person work runs concurrently.
    async fn sync_credits(&self, movie_id: i32, tmdb_id: i32) -> Result<(), MovieError> {
        let credits = self
            .gateway
            .fetch_movie_credits(tmdb_id)
            .await
            .map_err(|e| MovieError::tmdb_error(e.to_string()))?;

        futures::future::try_join_all(
            credits
                .iter()
                .map(|credit| self.sync_credit(movie_id, credit)),
        )
        .await?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl MovieService for TmdbMovieService {
    async fn get(&self, query: MovieQuery) -> Result<Option<MovieDto>, MovieError> {
        let title = query.title.as_deref().filter(|title| !title.is_empty());

        let movie = match (query.id, title) {
            (Some(_), Some(_)) => {
                return Err(MovieError::Validation(
                    "You can only search by one attribute.".to_string(),
                ));
            }
            (None, None) => {
                return Err(MovieError::Validation(
                    "You must enter at least one attribute.".to_string(),
                ));
            }
            (Some(id), None) => self.store.get_movie(id).await,
            (None, Some(title)) => self.store.find_movie_by_title(title).await,
        }
        .map_err(|e| MovieError::Database(e.to_string()))?;

        match movie {
            Some(movie) => Ok(Some(self.movie_dto(movie).await?)),
            None => Ok(None),
        }
    }

    async fn list_connection(
        &self,
        filter: MovieFilter,
        order_by: Option<String>,
        page: PageRequest,
    ) -> Result<Connection<MovieDto>, MovieError> {
        let order = Self::parse_order(order_by.as_deref())?;

        let (rows, total) = self
            .store
            .list_movies(&filter, order.as_ref(), &page)
            .await
            .map_err(|e| MovieError::Database(e.to_string()))?;

        let nodes = self.movie_dtos(rows).await?;
        Ok(Connection::new(nodes, total, page.offset_or_zero()))
    }

    async fn list_plain(
        &self,
        filter: MovieFilter,
        order_by: Option<String>,
    ) -> Result<Vec<MovieDto>, MovieError> {
        let order = Self::parse_order(order_by.as_deref())?;

        let (rows, _) = self
            .store
            .list_movies(&filter, order.as_ref(), &PageRequest::default())
            .await
            .map_err(|e| MovieError::Database(e.to_string()))?;

        self.movie_dtos(rows).await
    }

    async fn create(&self, tmdb_id: i32) -> Result<MoviePayload, MovieError> {
        let data = self
            .gateway
            .fetch_movie(tmdb_id)
            .await
            .map_err(|e| MovieError::tmdb_error(e.to_string()))?
            .ok_or(MovieError::NotFound(tmdb_id))?;

        let (movie, created) = self
            .store
            .find_or_create_movie(&data)
            .await
            .map_err(|e| MovieError::Database(e.to_string()))?;

        if !created {
            let dto = self.movie_dto(movie).await?;
            return Ok(MoviePayload::failure(
                Some(dto),
                FieldError::new("id", "This Movie already exists."),
            ));
        }

        let genre_refs: Vec<i32> = data.genres.iter().map(|genre| genre.id).collect();
        self.attach_genres(movie.id, &genre_refs).await?;

        self.sync_credits(movie.id, tmdb_id).await?;

        info!("Imported movie: {} (tmdb {})", movie.title, movie.tmdb_id);

        let dto = self.movie_dto(movie).await?;
        Ok(MoviePayload::success(dto))
    }

    async fn update(&self, id: i32, input: MovieUpdateInput) -> Result<MoviePayload, MovieError> {
        let Some(movie) = self
            .store
            .get_movie(id)
            .await
            .map_err(|e| MovieError::Database(e.to_string()))?
        else {
            return Ok(MoviePayload::failure(
                None,
                FieldError::new("id", "Movie not found."),
            ));
        };

        // An explicitly empty value counts as "not supplied".
        let backdrop = input.backdrop.as_deref().filter(|value| !value.is_empty());
        let poster = input.poster.as_deref().filter(|value| !value.is_empty());

        let updated = self
            .store
            .update_movie_images(movie, backdrop, poster)
            .await
            .map_err(|e| MovieError::Database(e.to_string()))?;

        let dto = self.movie_dto(updated).await?;
        Ok(MoviePayload::success(dto))
    }

    async fn refetch(
        &self,
        id: i32,
        input: MovieRefetchInput,
    ) -> Result<MoviePayload, MovieError> {
        let Some(movie) = self
            .store
            .get_movie(id)
            .await
            .map_err(|e| MovieError::Database(e.to_string()))?
        else {
            return Ok(MoviePayload::failure(
                None,
                FieldError::new("id", "Movie not found."),
            ));
        };

        // Full replace: relations from the previous import must not survive.
        self.store
            .clear_movie_genres(movie.id)
            .await
            .map_err(|e| MovieError::Database(e.to_string()))?;
        self.store
            .clear_movie_credits(movie.id)
            .await
            .map_err(|e| MovieError::Database(e.to_string()))?;

        let data = self
            .gateway
            .fetch_movie(movie.tmdb_id)
            .await
            .map_err(|e| MovieError::tmdb_error(e.to_string()))?
            .ok_or(MovieError::NotFound(movie.tmdb_id))?;

        let movie = self
            .store
            .apply_movie_refresh(movie, &data, input.with_images)
            .await
            .map_err(|e| MovieError::Database(e.to_string()))?;

        let genre_refs: Vec<i32> = data.genres.iter().map(|genre| genre.id).collect();
        self.attach_genres(movie.id, &genre_refs).await?;

        self.sync_credits(movie.id, movie.tmdb_id).await?;

        info!("Refetched movie: {} (tmdb {})", movie.title, movie.tmdb_id);

        let dto = self.movie_dto(movie).await?;
        Ok(MoviePayload::success(dto))
    }

    async fn delete(&self, id: i32) -> Result<DeletePayload, MovieError> {
        let deleted = self
            .store
            .delete_movie(id)
            .await
            .map_err(|e| MovieError::Database(e.to_string()))?;

        if deleted == 1 {
            Ok(DeletePayload::success())
        } else {
            Ok(DeletePayload::failure(FieldError::new(
                "id",
                "Error during movie delete.",
            )))
        }
    }

    async fn credits(&self, movie_id: i32) -> Result<Vec<CreditDto>, MovieError> {
        let rows = self
            .store
            .credits_for_movie(movie_id)
            .await
            .map_err(|e| MovieError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(credit, person)| CreditDto::from_models(credit, person))
            .collect())
    }
}

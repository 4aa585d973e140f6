use std::collections::HashMap;

use anyhow::Result;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use tracing::info;

use crate::clients::{CreditData, MovieData};
use crate::entities::{credits, genres, movie_genres, movies, people, prelude::*};
use crate::models::page::{OrderSpec, PageRequest, SortDirection};

/// Optional constraints applied to movie list queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct MovieFilter {
    pub genre_id: Option<i32>,
    pub person_id: Option<i32>,
}

impl MovieFilter {
    const fn is_empty(&self) -> bool {
        self.genre_id.is_none() && self.person_id.is_none()
    }
}

pub struct MovieRepository {
    conn: DatabaseConnection,
}

impl MovieRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn sort_column(field: &str) -> movies::Column {
        match field {
            "title" => movies::Column::Title,
            "title_original" => movies::Column::TitleOriginal,
            "release_date" => movies::Column::ReleaseDate,
            "runtime" => movies::Column::Runtime,
            "created_at" => movies::Column::CreatedAt,
            _ => movies::Column::Id,
        }
    }

    pub async fn get(&self, id: i32) -> Result<Option<movies::Model>> {
        Ok(Movies::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn find_by_title(&self, title: &str) -> Result<Option<movies::Model>> {
        Ok(Movies::find()
            .filter(movies::Column::Title.eq(title))
            .one(&self.conn)
            .await?)
    }

    pub async fn find_by_tmdb(&self, tmdb_id: i32) -> Result<Option<movies::Model>> {
        Ok(Movies::find()
            .filter(movies::Column::TmdbId.eq(tmdb_id))
            .one(&self.conn)
            .await?)
    }

    /// Returns the movie row for this provider ID, creating it when absent.
    ///
    /// The unique constraint on `tmdb_id` arbitrates concurrent creates:
    /// a losing insert affects zero rows and the winner's row is re-read.
    pub async fn find_or_create(&self, data: &MovieData) -> Result<(movies::Model, bool)> {
        if let Some(existing) = self.find_by_tmdb(data.tmdb_id).await? {
            return Ok((existing, false));
        }

        let active_model = movies::ActiveModel {
            tmdb_id: Set(data.tmdb_id),
            imdb_id: Set(data.imdb_id.clone()),
            title: Set(data.title.clone()),
            title_original: Set(data.title_original.clone()),
            release_date: Set(data.release_date.clone()),
            runtime: Set(data.runtime),
            overview: Set(data.overview.clone()),
            backdrop: Set(data.backdrop.clone()),
            poster: Set(data.poster.clone()),
            created_at: Set(Some(Utc::now().to_rfc3339())),
            ..Default::default()
        };

        let inserted = Movies::insert(active_model)
            .on_conflict(
                OnConflict::column(movies::Column::TmdbId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        let model = self.find_by_tmdb(data.tmdb_id).await?.ok_or_else(|| {
            anyhow::anyhow!("movie row missing after insert (tmdb {})", data.tmdb_id)
        })?;

        if inserted > 0 {
            info!("Created movie: {} (tmdb {})", model.title, model.tmdb_id);
        }

        Ok((model, inserted > 0))
    }

    pub async fn list(
        &self,
        filter: &MovieFilter,
        order: Option<&OrderSpec>,
        page: &PageRequest,
    ) -> Result<(Vec<movies::Model>, u64)> {
        let mut query = Movies::find();

        if let Some(genre_id) = filter.genre_id {
            query = query
                .join(JoinType::InnerJoin, movies::Relation::MovieGenres.def())
                .filter(movie_genres::Column::GenreId.eq(genre_id));
        }

        if let Some(person_id) = filter.person_id {
            query = query
                .join(JoinType::InnerJoin, movies::Relation::Credits.def())
                .filter(credits::Column::PersonId.eq(person_id));
        }

        if !filter.is_empty() {
            query = query.distinct();
        }

        let total = query.clone().count(&self.conn).await?;

        if let Some(spec) = order {
            let column = Self::sort_column(&spec.field);
            query = match spec.direction {
                SortDirection::Ascending => query.order_by_asc(column),
                SortDirection::Descending => query.order_by_desc(column),
            };
        }

        if let Some(offset) = page.offset {
            query = query.offset(offset);
        }
        if let Some(limit) = page.limit {
            query = query.limit(limit);
        }

        let rows = query.all(&self.conn).await?;
        Ok((rows, total))
    }

    /// Applies provider attributes to an existing row. Image references are
    /// only overwritten when `with_images` is set.
    pub async fn apply_refresh(
        &self,
        movie: movies::Model,
        data: &MovieData,
        with_images: bool,
    ) -> Result<movies::Model> {
        let mut active_model: movies::ActiveModel = movie.into();

        active_model.imdb_id = Set(data.imdb_id.clone());
        active_model.title = Set(data.title.clone());
        active_model.title_original = Set(data.title_original.clone());
        active_model.release_date = Set(data.release_date.clone());
        active_model.runtime = Set(data.runtime);
        active_model.overview = Set(data.overview.clone());

        if with_images {
            active_model.backdrop = Set(data.backdrop.clone());
            active_model.poster = Set(data.poster.clone());
        }

        Ok(active_model.update(&self.conn).await?)
    }

    /// Partial image-reference update; `None` fields are left untouched.
    pub async fn update_images(
        &self,
        movie: movies::Model,
        backdrop: Option<&str>,
        poster: Option<&str>,
    ) -> Result<movies::Model> {
        if backdrop.is_none() && poster.is_none() {
            return Ok(movie);
        }

        let mut active_model: movies::ActiveModel = movie.into();

        if let Some(backdrop) = backdrop {
            active_model.backdrop = Set(Some(backdrop.to_string()));
        }
        if let Some(poster) = poster {
            active_model.poster = Set(Some(poster.to_string()));
        }

        Ok(active_model.update(&self.conn).await?)
    }

    /// Deletes the movie row; credit and genre links go with it via cascade.
    pub async fn delete(&self, id: i32) -> Result<u64> {
        let result = Movies::delete_by_id(id).exec(&self.conn).await?;

        if result.rows_affected > 0 {
            info!("Deleted movie with ID: {}", id);
        }
        Ok(result.rows_affected)
    }

    pub async fn attach_genres(&self, movie_id: i32, genre_ids: &[i32]) -> Result<()> {
        if genre_ids.is_empty() {
            return Ok(());
        }

        let links = genre_ids.iter().map(|genre_id| movie_genres::ActiveModel {
            movie_id: Set(movie_id),
            genre_id: Set(*genre_id),
        });

        MovieGenres::insert_many(links)
            .on_conflict(
                OnConflict::columns([
                    movie_genres::Column::MovieId,
                    movie_genres::Column::GenreId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(())
    }

    pub async fn clear_genres(&self, movie_id: i32) -> Result<()> {
        MovieGenres::delete_many()
            .filter(movie_genres::Column::MovieId.eq(movie_id))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    /// Inserts one credit row; a replayed external credit ID for the same
    /// movie is dropped by the unique index instead of duplicated.
    pub async fn insert_credit(
        &self,
        movie_id: i32,
        person_id: i32,
        data: &CreditData,
    ) -> Result<()> {
        let active_model = credits::ActiveModel {
            movie_id: Set(movie_id),
            person_id: Set(person_id),
            credit_id: Set(data.credit_id.clone()),
            department: Set(data.department.clone()),
            character: Set(data.character.clone()),
            cast_order: Set(data.cast_order),
            ..Default::default()
        };

        Credits::insert(active_model)
            .on_conflict(
                OnConflict::columns([credits::Column::MovieId, credits::Column::CreditId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(())
    }

    pub async fn clear_credits(&self, movie_id: i32) -> Result<()> {
        Credits::delete_many()
            .filter(credits::Column::MovieId.eq(movie_id))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    pub async fn genres_for(&self, movie_id: i32) -> Result<Vec<genres::Model>> {
        let rows = MovieGenres::find()
            .filter(movie_genres::Column::MovieId.eq(movie_id))
            .find_also_related(Genres)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().filter_map(|(_, genre)| genre).collect())
    }

    /// Batched genre lookup for a page of movies, keyed by movie ID.
    pub async fn genres_for_movie_ids(
        &self,
        movie_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<genres::Model>>> {
        if movie_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = MovieGenres::find()
            .filter(movie_genres::Column::MovieId.is_in(movie_ids.iter().copied()))
            .find_also_related(Genres)
            .all(&self.conn)
            .await?;

        let mut by_movie: HashMap<i32, Vec<genres::Model>> = HashMap::new();
        for (link, genre) in rows {
            if let Some(genre) = genre {
                by_movie.entry(link.movie_id).or_default().push(genre);
            }
        }
        Ok(by_movie)
    }

    pub async fn credits_for(
        &self,
        movie_id: i32,
    ) -> Result<Vec<(credits::Model, people::Model)>> {
        let rows = Credits::find()
            .filter(credits::Column::MovieId.eq(movie_id))
            .order_by_asc(credits::Column::Id)
            .find_also_related(People)
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(credit, person)| person.map(|person| (credit, person)))
            .collect())
    }

    pub async fn count_all(&self) -> Result<u64> {
        Ok(Movies::find().count(&self.conn).await?)
    }
}

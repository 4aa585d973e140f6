use anyhow::Result;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use tracing::info;

use crate::clients::PersonData;
use crate::entities::{credits, movies, people, prelude::*};
use crate::models::page::{OrderSpec, PageRequest, SortDirection};

pub struct PersonRepository {
    conn: DatabaseConnection,
}

impl PersonRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn sort_column(field: &str) -> people::Column {
        match field {
            "name" => people::Column::Name,
            "birthday" => people::Column::Birthday,
            "created_at" => people::Column::CreatedAt,
            _ => people::Column::Id,
        }
    }

    pub async fn get(&self, id: i32) -> Result<Option<people::Model>> {
        Ok(People::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<people::Model>> {
        Ok(People::find()
            .filter(people::Column::Name.eq(name))
            .one(&self.conn)
            .await?)
    }

    pub async fn find_by_tmdb(&self, tmdb_id: i32) -> Result<Option<people::Model>> {
        Ok(People::find()
            .filter(people::Column::TmdbId.eq(tmdb_id))
            .one(&self.conn)
            .await?)
    }

    /// Returns the person row for this provider ID, creating it when absent.
    /// An existing row is returned as-is, with no attribute refresh.
    ///
    /// Two imports crediting the same person may race here; the unique
    /// constraint on `tmdb_id` keeps a single row and the losing insert
    /// recovers by re-reading it.
    pub async fn find_or_create(&self, data: &PersonData) -> Result<(people::Model, bool)> {
        if let Some(existing) = self.find_by_tmdb(data.tmdb_id).await? {
            return Ok((existing, false));
        }

        let active_model = people::ActiveModel {
            tmdb_id: Set(data.tmdb_id),
            imdb_id: Set(data.imdb_id.clone()),
            name: Set(data.name.clone()),
            biography: Set(data.biography.clone()),
            birthday: Set(data.birthday.clone()),
            deathday: Set(data.deathday.clone()),
            place_of_birth: Set(data.place_of_birth.clone()),
            image: Set(data.image.clone()),
            created_at: Set(Some(Utc::now().to_rfc3339())),
            ..Default::default()
        };

        let inserted = People::insert(active_model)
            .on_conflict(
                OnConflict::column(people::Column::TmdbId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        let model = self.find_by_tmdb(data.tmdb_id).await?.ok_or_else(|| {
            anyhow::anyhow!("person row missing after insert (tmdb {})", data.tmdb_id)
        })?;

        if inserted > 0 {
            info!("Created person: {} (tmdb {})", model.name, model.tmdb_id);
        }

        Ok((model, inserted > 0))
    }

    pub async fn list(
        &self,
        order: Option<&OrderSpec>,
        page: &PageRequest,
    ) -> Result<(Vec<people::Model>, u64)> {
        let mut query = People::find();

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

    /// All credits held by a person together with the credited movie.
    pub async fn filmography(
        &self,
        person_id: i32,
    ) -> Result<Vec<(credits::Model, movies::Model)>> {
        let rows = Credits::find()
            .filter(credits::Column::PersonId.eq(person_id))
            .order_by_asc(credits::Column::MovieId)
            .find_also_related(Movies)
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(credit, movie)| movie.map(|movie| (credit, movie)))
            .collect())
    }

    pub async fn count_all(&self) -> Result<u64> {
        Ok(People::find().count(&self.conn).await?)
    }
}

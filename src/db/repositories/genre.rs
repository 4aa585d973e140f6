use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use tracing::info;

use crate::clients::GenreData;
use crate::entities::{genres, prelude::*};
use crate::models::page::{OrderSpec, PageRequest, SortDirection};

pub struct GenreRepository {
    conn: DatabaseConnection,
}

impl GenreRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn sort_column(field: &str) -> genres::Column {
        match field {
            "name" => genres::Column::Name,
            _ => genres::Column::Id,
        }
    }

    pub async fn get(&self, id: i32) -> Result<Option<genres::Model>> {
        Ok(Genres::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<genres::Model>> {
        Ok(Genres::find()
            .filter(genres::Column::Name.eq(name))
            .one(&self.conn)
            .await?)
    }

    /// Resolves provider genre references to local rows in one `IN` query.
    /// References with no local counterpart are dropped.
    pub async fn find_by_tmdb_ids(&self, tmdb_ids: &[i32]) -> Result<Vec<genres::Model>> {
        if tmdb_ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(Genres::find()
            .filter(genres::Column::TmdbId.is_in(tmdb_ids.iter().copied()))
            .all(&self.conn)
            .await?)
    }

    pub async fn list(
        &self,
        order: Option<&OrderSpec>,
        page: &PageRequest,
    ) -> Result<(Vec<genres::Model>, u64)> {
        let mut query = Genres::find();

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

    /// Upserts the provider genre taxonomy. Existing rows are left alone;
    /// reconciliation during movie sync never creates genres.
    pub async fn seed(&self, entries: &[GenreData]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let active_models = entries.iter().map(|genre| genres::ActiveModel {
            tmdb_id: Set(genre.id),
            name: Set(genre.name.clone()),
            ..Default::default()
        });

        Genres::insert_many(active_models)
            .on_conflict(
                OnConflict::column(genres::Column::TmdbId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        info!("Seeded genre taxonomy ({} entries)", entries.len());
        Ok(())
    }

    pub async fn count_all(&self) -> Result<u64> {
        Ok(Genres::find().count(&self.conn).await?)
    }
}

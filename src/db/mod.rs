use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use tracing::info;

use crate::clients::{CreditData, GenreData, MovieData, PersonData};
use crate::entities::{credits, genres, movies, people};
use crate::models::page::{OrderSpec, PageRequest};

pub mod migrator;
pub mod repositories;

pub use repositories::movie::MovieFilter;

/// Durable relational store behind the catalog: owns the connection pool
/// and hands out per-aggregate repositories.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn movie_repo(&self) -> repositories::movie::MovieRepository {
        repositories::movie::MovieRepository::new(self.conn.clone())
    }

    fn genre_repo(&self) -> repositories::genre::GenreRepository {
        repositories::genre::GenreRepository::new(self.conn.clone())
    }

    fn person_repo(&self) -> repositories::person::PersonRepository {
        repositories::person::PersonRepository::new(self.conn.clone())
    }

    // ========== Movies ==========

    pub async fn find_or_create_movie(&self, data: &MovieData) -> Result<(movies::Model, bool)> {
        self.movie_repo().find_or_create(data).await
    }

    pub async fn get_movie(&self, id: i32) -> Result<Option<movies::Model>> {
        self.movie_repo().get(id).await
    }

    pub async fn find_movie_by_title(&self, title: &str) -> Result<Option<movies::Model>> {
        self.movie_repo().find_by_title(title).await
    }

    pub async fn list_movies(
        &self,
        filter: &MovieFilter,
        order: Option<&OrderSpec>,
        page: &PageRequest,
    ) -> Result<(Vec<movies::Model>, u64)> {
        self.movie_repo().list(filter, order, page).await
    }

    pub async fn apply_movie_refresh(
        &self,
        movie: movies::Model,
        data: &MovieData,
        with_images: bool,
    ) -> Result<movies::Model> {
        self.movie_repo()
            .apply_refresh(movie, data, with_images)
            .await
    }

    pub async fn update_movie_images(
        &self,
        movie: movies::Model,
        backdrop: Option<&str>,
        poster: Option<&str>,
    ) -> Result<movies::Model> {
        self.movie_repo()
            .update_images(movie, backdrop, poster)
            .await
    }

    pub async fn delete_movie(&self, id: i32) -> Result<u64> {
        self.movie_repo().delete(id).await
    }

    pub async fn attach_movie_genres(&self, movie_id: i32, genre_ids: &[i32]) -> Result<()> {
        self.movie_repo().attach_genres(movie_id, genre_ids).await
    }

    pub async fn clear_movie_genres(&self, movie_id: i32) -> Result<()> {
        self.movie_repo().clear_genres(movie_id).await
    }

    pub async fn insert_credit(
        &self,
        movie_id: i32,
        person_id: i32,
        data: &CreditData,
    ) -> Result<()> {
        self.movie_repo()
            .insert_credit(movie_id, person_id, data)
            .await
    }

    pub async fn clear_movie_credits(&self, movie_id: i32) -> Result<()> {
        self.movie_repo().clear_credits(movie_id).await
    }

    pub async fn genres_for_movie(&self, movie_id: i32) -> Result<Vec<genres::Model>> {
        self.movie_repo().genres_for(movie_id).await
    }

    pub async fn genres_for_movie_ids(
        &self,
        movie_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<genres::Model>>> {
        self.movie_repo().genres_for_movie_ids(movie_ids).await
    }

    pub async fn credits_for_movie(
        &self,
        movie_id: i32,
    ) -> Result<Vec<(credits::Model, people::Model)>> {
        self.movie_repo().credits_for(movie_id).await
    }

    pub async fn count_movies(&self) -> Result<u64> {
        self.movie_repo().count_all().await
    }

    // ========== Genres ==========

    pub async fn get_genre(&self, id: i32) -> Result<Option<genres::Model>> {
        self.genre_repo().get(id).await
    }

    pub async fn find_genre_by_name(&self, name: &str) -> Result<Option<genres::Model>> {
        self.genre_repo().find_by_name(name).await
    }

    pub async fn genres_by_tmdb_ids(&self, tmdb_ids: &[i32]) -> Result<Vec<genres::Model>> {
        self.genre_repo().find_by_tmdb_ids(tmdb_ids).await
    }

    pub async fn list_genres(
        &self,
        order: Option<&OrderSpec>,
        page: &PageRequest,
    ) -> Result<(Vec<genres::Model>, u64)> {
        self.genre_repo().list(order, page).await
    }

    pub async fn seed_genres(&self, entries: &[GenreData]) -> Result<()> {
        self.genre_repo().seed(entries).await
    }

    pub async fn count_genres(&self) -> Result<u64> {
        self.genre_repo().count_all().await
    }

    // ========== People ==========

    pub async fn get_person(&self, id: i32) -> Result<Option<people::Model>> {
        self.person_repo().get(id).await
    }

    pub async fn find_person_by_name(&self, name: &str) -> Result<Option<people::Model>> {
        self.person_repo().find_by_name(name).await
    }

    pub async fn find_person_by_tmdb(&self, tmdb_id: i32) -> Result<Option<people::Model>> {
        self.person_repo().find_by_tmdb(tmdb_id).await
    }

    pub async fn find_or_create_person(&self, data: &PersonData) -> Result<(people::Model, bool)> {
        self.person_repo().find_or_create(data).await
    }

    pub async fn list_people(
        &self,
        order: Option<&OrderSpec>,
        page: &PageRequest,
    ) -> Result<(Vec<people::Model>, u64)> {
        self.person_repo().list(order, page).await
    }

    pub async fn person_filmography(
        &self,
        person_id: i32,
    ) -> Result<Vec<(credits::Model, movies::Model)>> {
        self.person_repo().filmography(person_id).await
    }

    pub async fn count_people(&self) -> Result<u64> {
        self.person_repo().count_all().await
    }
}

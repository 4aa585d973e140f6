//! TMDB (The Movie Database) API client.
//!
//! All catalog imports and refreshes go through the [`MetadataGateway`]
//! trait, so the sync engine can be exercised against an in-process fake.

use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;

use crate::config::TmdbConfig;

pub const TMDB_API: &str = "https://api.themoviedb.org/3";

/// Movie attributes as fetched from the provider, including genre references.
#[derive(Debug, Clone, Deserialize)]
pub struct MovieData {
    #[serde(rename = "id")]
    pub tmdb_id: i32,
    pub imdb_id: Option<String>,
    pub title: String,
    #[serde(rename = "original_title")]
    pub title_original: Option<String>,
    pub release_date: Option<String>,
    pub runtime: Option<i32>,
    pub overview: Option<String>,
    #[serde(rename = "backdrop_path")]
    pub backdrop: Option<String>,
    #[serde(rename = "poster_path")]
    pub poster: Option<String>,
    #[serde(default)]
    pub genres: Vec<GenreRef>,
}

/// Reference to a provider genre, as embedded in a movie payload.
#[derive(Debug, Clone, Deserialize)]
pub struct GenreRef {
    pub id: i32,
}

/// A provider genre with its display name (genre taxonomy endpoint).
#[derive(Debug, Clone, Deserialize)]
pub struct GenreData {
    pub id: i32,
    pub name: String,
}

/// One credited role on a movie, normalized across cast and crew entries.
#[derive(Debug, Clone)]
pub struct CreditData {
    pub person_tmdb_id: i32,
    pub credit_id: String,
    pub department: String,
    pub character: Option<String>,
    pub cast_order: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersonData {
    #[serde(rename = "id")]
    pub tmdb_id: i32,
    pub imdb_id: Option<String>,
    pub name: String,
    pub biography: Option<String>,
    pub birthday: Option<String>,
    pub deathday: Option<String>,
    pub place_of_birth: Option<String>,
    #[serde(rename = "profile_path")]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenreListResponse {
    genres: Vec<GenreData>,
}

#[derive(Debug, Deserialize)]
struct CreditsResponse {
    #[serde(default)]
    cast: Vec<CastMember>,
    #[serde(default)]
    crew: Vec<CrewMember>,
}

#[derive(Debug, Deserialize)]
struct CastMember {
    id: i32,
    credit_id: String,
    character: Option<String>,
    order: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct CrewMember {
    id: i32,
    credit_id: String,
    department: String,
}

/// External metadata source for movies, credits, people and the genre
/// taxonomy. Fetch-only; never touches the local store.
#[async_trait::async_trait]
pub trait MetadataGateway: Send + Sync {
    /// Movie attributes plus genre references; `None` if the provider does
    /// not know the ID.
    async fn fetch_movie(&self, tmdb_id: i32) -> Result<Option<MovieData>>;

    /// All credited people for a movie (cast and crew flattened).
    async fn fetch_movie_credits(&self, tmdb_id: i32) -> Result<Vec<CreditData>>;

    /// Person attributes; `None` if the provider does not know the ID.
    async fn fetch_person(&self, tmdb_id: i32) -> Result<Option<PersonData>>;

    /// The provider's full movie genre taxonomy.
    async fn fetch_genres(&self) -> Result<Vec<GenreData>>;
}

#[derive(Clone)]
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    #[must_use]
    pub fn new(config: &TmdbConfig) -> Self {
        Self::with_shared_client(Client::new(), config)
    }

    #[must_use]
    pub fn with_shared_client(client: Client, config: &TmdbConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}{}?api_key={}",
            self.base_url,
            path,
            urlencoding::encode(&self.api_key)
        )
    }

    async fn get_optional<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let response = self.client.get(self.url(path)).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("TMDB API error: {} - {}", status, body));
        }

        Ok(Some(response.json().await?))
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get_optional(path)
            .await?
            .ok_or_else(|| anyhow::anyhow!("TMDB API error: unexpected 404 for {path}"))
    }
}

#[async_trait::async_trait]
impl MetadataGateway for TmdbClient {
    async fn fetch_movie(&self, tmdb_id: i32) -> Result<Option<MovieData>> {
        self.get_optional(&format!("/movie/{tmdb_id}")).await
    }

    async fn fetch_movie_credits(&self, tmdb_id: i32) -> Result<Vec<CreditData>> {
        let response: CreditsResponse = self.get(&format!("/movie/{tmdb_id}/credits")).await?;

        let cast = response.cast.into_iter().map(|member| CreditData {
            person_tmdb_id: member.id,
            credit_id: member.credit_id,
            department: "Acting".to_string(),
            character: member.character,
            cast_order: member.order,
        });

        let crew = response.crew.into_iter().map(|member| CreditData {
            person_tmdb_id: member.id,
            credit_id: member.credit_id,
            department: member.department,
            character: None,
            cast_order: None,
        });

        Ok(cast.chain(crew).collect())
    }

    async fn fetch_person(&self, tmdb_id: i32) -> Result<Option<PersonData>> {
        self.get_optional(&format!("/person/{tmdb_id}")).await
    }

    async fn fetch_genres(&self) -> Result<Vec<GenreData>> {
        let response: GenreListResponse = self.get("/genre/movie/list").await?;
        Ok(response.genres)
    }
}

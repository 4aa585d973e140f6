//! Shared fixtures: an in-process metadata gateway backed by hash maps and
//! a throwaway on-disk store per test.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use filmarr::Store;
use filmarr::clients::{CreditData, GenreData, GenreRef, MetadataGateway, MovieData, PersonData};

#[derive(Default)]
pub struct FakeGateway {
    pub movies: Mutex<HashMap<i32, MovieData>>,
    pub credits: Mutex<HashMap<i32, Vec<CreditData>>>,
    pub people: Mutex<HashMap<i32, PersonData>>,
    pub genres: Mutex<Vec<GenreData>>,
    pub person_fetches: AtomicUsize,
}

impl FakeGateway {
    pub fn set_movie(&self, data: MovieData) {
        self.movies.lock().unwrap().insert(data.tmdb_id, data);
    }

    pub fn set_credits(&self, tmdb_id: i32, credits: Vec<CreditData>) {
        self.credits.lock().unwrap().insert(tmdb_id, credits);
    }

    pub fn set_person(&self, data: PersonData) {
        self.people.lock().unwrap().insert(data.tmdb_id, data);
    }

    pub fn person_fetch_count(&self) -> usize {
        self.person_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl MetadataGateway for FakeGateway {
    async fn fetch_movie(&self, tmdb_id: i32) -> Result<Option<MovieData>> {
        Ok(self.movies.lock().unwrap().get(&tmdb_id).cloned())
    }

    async fn fetch_movie_credits(&self, tmdb_id: i32) -> Result<Vec<CreditData>> {
        Ok(self
            .credits
            .lock()
            .unwrap()
            .get(&tmdb_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_person(&self, tmdb_id: i32) -> Result<Option<PersonData>> {
        self.person_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.people.lock().unwrap().get(&tmdb_id).cloned())
    }

    async fn fetch_genres(&self) -> Result<Vec<GenreData>> {
        Ok(self.genres.lock().unwrap().clone())
    }
}

pub fn movie_data(tmdb_id: i32, title: &str, genre_refs: &[i32]) -> MovieData {
    MovieData {
        tmdb_id,
        imdb_id: Some(format!("tt{tmdb_id}")),
        title: title.to_string(),
        title_original: Some(title.to_string()),
        release_date: Some("2022-01-01".to_string()),
        runtime: Some(120),
        overview: None,
        backdrop: None,
        poster: None,
        genres: genre_refs.iter().map(|id| GenreRef { id: *id }).collect(),
    }
}

pub fn person_data(tmdb_id: i32, name: &str) -> PersonData {
    PersonData {
        tmdb_id,
        imdb_id: Some(format!("nm{tmdb_id}")),
        name: name.to_string(),
        biography: None,
        birthday: None,
        deathday: None,
        place_of_birth: None,
        image: None,
    }
}

pub fn credit(
    person_tmdb_id: i32,
    credit_id: &str,
    department: &str,
    character: Option<&str>,
    cast_order: Option<i32>,
) -> CreditData {
    CreditData {
        person_tmdb_id,
        credit_id: credit_id.to_string(),
        department: department.to_string(),
        character: character.map(str::to_string),
        cast_order,
    }
}

pub fn temp_db_url(prefix: &str) -> String {
    let path = std::env::temp_dir().join(format!("{prefix}-{}.db", uuid::Uuid::new_v4()));
    format!("sqlite:{}", path.display())
}

pub async fn test_store(prefix: &str) -> Store {
    Store::new(&temp_db_url(prefix))
        .await
        .expect("failed to open test store")
}

/// The reference genre set most tests assume: Foo/Bar/Baz with tmdb 1/2/3.
pub async fn seed_default_genres(store: &Store) {
    let entries = vec![
        GenreData {
            id: 1,
            name: "Foo".to_string(),
        },
        GenreData {
            id: 2,
            name: "Bar".to_string(),
        },
        GenreData {
            id: 3,
            name: "Baz".to_string(),
        },
    ];
    store.seed_genres(&entries).await.expect("seeding genres");
}

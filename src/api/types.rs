use serde::{Deserialize, Serialize};

use crate::entities::{credits, genres, movies, people};

/// Query parameters accepted by connection list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub order_by: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Query parameters accepted by plain (unpaginated) list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderParams {
    pub order_by: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenreDto {
    pub id: i32,
    pub tmdb: i32,
    pub name: String,
}

impl From<genres::Model> for GenreDto {
    fn from(model: genres::Model) -> Self {
        Self {
            id: model.id,
            tmdb: model.tmdb_id,
            name: model.name,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MovieDto {
    pub id: i32,
    pub tmdb: i32,
    pub imdb: Option<String>,
    pub title: String,
    pub title_original: Option<String>,
    pub release_date: Option<String>,
    pub runtime: Option<i32>,
    pub overview: Option<String>,
    pub backdrop: Option<String>,
    pub poster: Option<String>,
    pub genres: Vec<GenreDto>,
}

impl MovieDto {
    #[must_use]
    pub fn from_model(model: movies::Model, genres: Vec<genres::Model>) -> Self {
        Self {
            id: model.id,
            tmdb: model.tmdb_id,
            imdb: model.imdb_id,
            title: model.title,
            title_original: model.title_original,
            release_date: model.release_date,
            runtime: model.runtime,
            overview: model.overview,
            backdrop: model.backdrop,
            poster: model.poster,
            genres: genres.into_iter().map(GenreDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PersonDto {
    pub id: i32,
    pub tmdb: i32,
    pub imdb: Option<String>,
    pub name: String,
    pub biography: Option<String>,
    pub birthday: Option<String>,
    pub deathday: Option<String>,
    pub place_of_birth: Option<String>,
    pub image: Option<String>,
}

impl From<people::Model> for PersonDto {
    fn from(model: people::Model) -> Self {
        Self {
            id: model.id,
            tmdb: model.tmdb_id,
            imdb: model.imdb_id,
            name: model.name,
            biography: model.biography,
            birthday: model.birthday,
            deathday: model.deathday,
            place_of_birth: model.place_of_birth,
            image: model.image,
        }
    }
}

/// One credited role on a movie, with the credited person inlined.
#[derive(Debug, Clone, Serialize)]
pub struct CreditDto {
    pub credit_id: String,
    pub department: String,
    pub character: Option<String>,
    pub cast_order: Option<i32>,
    pub person: PersonDto,
}

impl CreditDto {
    #[must_use]
    pub fn from_models(credit: credits::Model, person: people::Model) -> Self {
        Self {
            credit_id: credit.credit_id,
            department: credit.department,
            character: credit.character,
            cast_order: credit.cast_order,
            person: PersonDto::from(person),
        }
    }
}

/// One entry in a person's filmography: the movie plus the role metadata
/// carried on the credit.
#[derive(Debug, Clone, Serialize)]
pub struct FilmographyEntryDto {
    pub department: String,
    pub character: Option<String>,
    pub cast_order: Option<i32>,
    pub movie: MovieDto,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Result of a movie mutation: either a success payload carrying the movie,
/// or a failure payload with field-tagged messages — never both.
#[derive(Debug, Serialize)]
pub struct MoviePayload {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movie: Option<MovieDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl MoviePayload {
    #[must_use]
    pub const fn success(movie: MovieDto) -> Self {
        Self {
            ok: true,
            movie: Some(movie),
            errors: None,
        }
    }

    #[must_use]
    pub fn failure(movie: Option<MovieDto>, error: FieldError) -> Self {
        Self {
            ok: false,
            movie,
            errors: Some(vec![error]),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeletePayload {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl DeletePayload {
    #[must_use]
    pub const fn success() -> Self {
        Self {
            ok: true,
            errors: None,
        }
    }

    #[must_use]
    pub fn failure(error: FieldError) -> Self {
        Self {
            ok: false,
            errors: Some(vec![error]),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SystemStatusDto {
    pub version: String,
    pub uptime_seconds: u64,
    pub movies: u64,
    pub genres: u64,
    pub people: u64,
}

pub mod movie_service;
pub use movie_service::{
    MovieError, MovieQuery, MovieRefetchInput, MovieService, MovieUpdateInput,
};

pub mod movie_service_impl;
pub use movie_service_impl::TmdbMovieService;

pub mod genre_service;
pub use genre_service::{GenreError, GenreQuery, GenreService};

pub mod person_service;
pub use person_service::{PersonError, PersonQuery, PersonService};

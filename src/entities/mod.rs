pub mod prelude;

pub mod credits;
pub mod genres;
pub mod movie_genres;
pub mod movies;
pub mod people;

pub use super::credits::Entity as Credits;
pub use super::genres::Entity as Genres;
pub use super::movie_genres::Entity as MovieGenres;
pub use super::movies::Entity as Movies;
pub use super::people::Entity as People;

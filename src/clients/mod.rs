pub mod tmdb;

pub use tmdb::{
    CreditData, GenreData, GenreRef, MetadataGateway, MovieData, PersonData, TmdbClient,
};

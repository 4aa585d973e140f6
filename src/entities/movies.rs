use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "movies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub tmdb_id: i32,
    pub imdb_id: Option<String>,
    pub title: String,
    pub title_original: Option<String>,
    pub release_date: Option<String>,
    pub runtime: Option<i32>,
    pub overview: Option<String>,
    pub backdrop: Option<String>,
    pub poster: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::credits::Entity")]
    Credits,
    #[sea_orm(has_many = "super::movie_genres::Entity")]
    MovieGenres,
}

impl Related<super::credits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Credits.def()
    }
}

impl Related<super::genres::Entity> for Entity {
    fn to() -> RelationDef {
        super::movie_genres::Relation::Genres.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::movie_genres::Relation::Movies.def().rev())
    }
}

impl Related<super::people::Entity> for Entity {
    fn to() -> RelationDef {
        super::credits::Relation::People.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::credits::Relation::Movies.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

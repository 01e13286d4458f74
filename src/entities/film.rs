use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "film")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub title: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub overview: String,
    pub release_date: Option<String>,
    /// JSON array of catalog genre ids.
    #[sea_orm(column_type = "Text")]
    pub genre_ids: String,
    #[sea_orm(column_type = "Double")]
    pub vote_average: f64,
    pub runtime: Option<i32>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

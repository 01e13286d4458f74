use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Film::Table)
                    .if_not_exists()
                    .col(integer(Film::Id).primary_key())
                    .col(string(Film::Title))
                    .col(string_null(Film::PosterPath))
                    .col(string_null(Film::BackdropPath))
                    .col(text(Film::Overview))
                    .col(string_null(Film::ReleaseDate))
                    .col(text(Film::GenreIds))
                    .col(double(Film::VoteAverage))
                    .col(integer_null(Film::Runtime))
                    .col(big_integer(Film::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_film_created_at")
                    .table(Film::Table)
                    .col(Film::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Film::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Film {
    Table,
    Id,
    Title,
    PosterPath,
    BackdropPath,
    Overview,
    ReleaseDate,
    GenreIds,
    VoteAverage,
    Runtime,
    CreatedAt,
}

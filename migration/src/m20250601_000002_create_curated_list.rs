use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CuratedList::Table)
                    .if_not_exists()
                    .col(integer(CuratedList::Id).primary_key())
                    .col(string(CuratedList::Name))
                    .col(big_integer(CuratedList::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CuratedListFilm::Table)
                    .if_not_exists()
                    .col(pk_auto(CuratedListFilm::Id))
                    .col(integer(CuratedListFilm::ListId))
                    .col(integer(CuratedListFilm::FilmId))
                    .col(big_integer(CuratedListFilm::AddedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_curated_list_film_unique")
                    .table(CuratedListFilm::Table)
                    .col(CuratedListFilm::ListId)
                    .col(CuratedListFilm::FilmId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_curated_list_film_film")
                    .table(CuratedListFilm::Table)
                    .col(CuratedListFilm::FilmId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(CuratedListFilm::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(CuratedList::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum CuratedList {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum CuratedListFilm {
    Table,
    Id,
    ListId,
    FilmId,
    AddedAt,
}

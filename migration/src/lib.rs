pub use sea_orm_migration::prelude::*;

mod m20250601_000001_create_film;
mod m20250601_000002_create_curated_list;
mod m20250612_000001_add_list_refreshed_at;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_film::Migration),
            Box::new(m20250601_000002_create_curated_list::Migration),
            Box::new(m20250612_000001_add_list_refreshed_at::Migration),
        ]
    }
}

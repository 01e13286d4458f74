pub mod curated_list;
pub mod curated_list_film;
pub mod film;

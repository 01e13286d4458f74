use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait, sea_query::{Expr, OnConflict},
};
use serde::Serialize;

use crate::{
    entities::{curated_list, curated_list_film, film},
    models::{CuratedList, Film, NewFilm, parse_release_date},
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Film already exists")]
    Conflict(i32),
    #[error("Film not found")]
    NotFound(i32),
    #[error("List not found")]
    ListNotFound(i32),
    #[error(transparent)]
    Db(#[from] DbErr),
    #[error("invalid genre ids: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StoreError {
    pub fn status(&self) -> u16 {
        match self {
            StoreError::Conflict(_) => 409,
            StoreError::NotFound(_) | StoreError::ListNotFound(_) => 404,
            StoreError::Db(_) | StoreError::Encode(_) => 500,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A list id that existed when it was resolved. Operations still report
/// `ListNotFound` if the row has been removed since.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ListHandle(i32);

impl ListHandle {
    pub fn id(self) -> i32 {
        self.0
    }
}

#[derive(Clone)]
pub struct FilmStore {
    db: DatabaseConnection,
}

impl FilmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn get_film(&self, id: i32) -> StoreResult<Option<Film>> {
        let film = film::Entity::find_by_id(id).one(&self.db).await?;
        film.map(film_from_model).transpose()
    }

    pub async fn film_exists(&self, id: i32) -> StoreResult<bool> {
        Ok(film::Entity::find_by_id(id).one(&self.db).await?.is_some())
    }

    /// Inserts the film unless a record with the same id exists. Returns
    /// whether a row was written.
    pub async fn insert_film_if_absent(&self, new: &NewFilm) -> StoreResult<bool> {
        let model = film::ActiveModel {
            id: Set(new.id),
            title: Set(new.title.clone()),
            poster_path: Set(new.poster_path.clone()),
            backdrop_path: Set(new.backdrop_path.clone()),
            overview: Set(new.overview.clone()),
            release_date: Set(new.release_date.map(|d| d.to_string())),
            genre_ids: Set(serde_json::to_string(&new.genre_ids)?),
            vote_average: Set(new.vote_average),
            runtime: Set(new.runtime),
            created_at: Set(now_sec()),
        };

        let rows = film::Entity::insert(model)
            .on_conflict(OnConflict::column(film::Column::Id).do_nothing().to_owned())
            .exec_without_returning(&self.db)
            .await?;

        Ok(rows > 0)
    }

    pub async fn add_film(&self, new: &NewFilm) -> StoreResult<Film> {
        if !self.insert_film_if_absent(new).await? {
            return Err(StoreError::Conflict(new.id));
        }
        self.get_film(new.id).await?.ok_or(StoreError::NotFound(new.id))
    }

    /// Deletes the film and drops it from every list.
    pub async fn remove_film(&self, id: i32) -> StoreResult<()> {
        let txn = self.db.begin().await?;

        if film::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Err(StoreError::NotFound(id));
        }

        curated_list_film::Entity::delete_many()
            .filter(curated_list_film::Column::FilmId.eq(id))
            .exec(&txn)
            .await?;
        film::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    /// Creates the list row if it is missing.
    pub async fn ensure_list(&self, id: i32, name: &str) -> StoreResult<ListHandle> {
        let model = curated_list::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            created_at: Set(now_sec()),
            refreshed_at: Set(None),
        };

        curated_list::Entity::insert(model)
            .on_conflict(OnConflict::column(curated_list::Column::Id).do_nothing().to_owned())
            .exec_without_returning(&self.db)
            .await?;

        Ok(ListHandle(id))
    }

    pub async fn resolve_list(&self, id: i32) -> StoreResult<ListHandle> {
        self.require_list(id).await?;
        Ok(ListHandle(id))
    }

    pub async fn get_list(&self, list: ListHandle) -> StoreResult<CuratedList> {
        let row = self.require_list(list.id()).await?;
        let films = self.list_films(list).await?;
        Ok(CuratedList {
            id: row.id,
            name: row.name,
            refreshed_at: row.refreshed_at.and_then(|s| jiff::Timestamp::from_second(s).ok()),
            films,
        })
    }

    /// Member ids in insertion order.
    pub async fn list_film_ids(&self, list: ListHandle) -> StoreResult<Vec<i32>> {
        self.require_list(list.id()).await?;

        let rows = curated_list_film::Entity::find()
            .filter(curated_list_film::Column::ListId.eq(list.id()))
            .order_by_asc(curated_list_film::Column::Id)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(|r| r.film_id).collect())
    }

    pub async fn list_films(&self, list: ListHandle) -> StoreResult<Vec<Film>> {
        let ids = self.list_film_ids(list).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut by_id: HashMap<i32, film::Model> = film::Entity::find()
            .filter(film::Column::Id.is_in(ids.clone()))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        ids.into_iter().filter_map(|id| by_id.remove(&id)).map(film_from_model).collect()
    }

    /// Removes every member. Returns the number of memberships dropped.
    pub async fn clear_list(&self, list: ListHandle) -> StoreResult<u64> {
        self.require_list(list.id()).await?;

        let res = curated_list_film::Entity::delete_many()
            .filter(curated_list_film::Column::ListId.eq(list.id()))
            .exec(&self.db)
            .await?;

        Ok(res.rows_affected)
    }

    /// Adds the film to the list. Returns false if it was already a member.
    pub async fn add_to_list(&self, list: ListHandle, film_id: i32) -> StoreResult<bool> {
        self.require_list(list.id()).await?;
        if !self.film_exists(film_id).await? {
            return Err(StoreError::NotFound(film_id));
        }

        let model = curated_list_film::ActiveModel {
            id: Default::default(),
            list_id: Set(list.id()),
            film_id: Set(film_id),
            added_at: Set(now_sec()),
        };

        let rows = curated_list_film::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    curated_list_film::Column::ListId,
                    curated_list_film::Column::FilmId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        Ok(rows > 0)
    }

    pub async fn mark_refreshed(&self, list: ListHandle) -> StoreResult<()> {
        let res = curated_list::Entity::update_many()
            .col_expr(curated_list::Column::RefreshedAt, Expr::value(now_sec()))
            .filter(curated_list::Column::Id.eq(list.id()))
            .exec(&self.db)
            .await?;

        if res.rows_affected == 0 {
            return Err(StoreError::ListNotFound(list.id()));
        }
        Ok(())
    }

    async fn require_list(&self, id: i32) -> StoreResult<curated_list::Model> {
        curated_list::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(StoreError::ListNotFound(id))
    }
}

fn film_from_model(model: film::Model) -> StoreResult<Film> {
    Ok(Film {
        id: model.id,
        title: model.title,
        poster_path: model.poster_path,
        backdrop_path: model.backdrop_path,
        overview: model.overview,
        release_date: parse_release_date(model.release_date.as_deref()),
        genre_ids: serde_json::from_str(&model.genre_ids)?,
        vote_average: model.vote_average,
        runtime: model.runtime,
    })
}

fn now_sec() -> i64 {
    jiff::Timestamp::now().as_second()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{memory_store, new_film};

    #[tokio::test]
    async fn test_add_film_twice_conflicts() {
        let store = memory_store().await;

        let film = store.add_film(&new_film(10)).await.unwrap();
        assert_eq!(film.id, 10);

        let err = store.add_film(&new_film(10)).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(10)));
        assert_eq!(err.status(), 409);

        let count = film::Entity::find().all(store.db()).await.unwrap().len();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_insert_if_absent_keeps_first_record() {
        let store = memory_store().await;

        assert!(store.insert_film_if_absent(&new_film(3)).await.unwrap());

        let mut other = new_film(3);
        other.title = "Autre titre".to_string();
        assert!(!store.insert_film_if_absent(&other).await.unwrap());

        let film = store.get_film(3).await.unwrap().unwrap();
        assert_eq!(film.title, new_film(3).title);
    }

    #[tokio::test]
    async fn test_film_round_trips_fields() {
        let store = memory_store().await;
        let mut new = new_film(8);
        new.runtime = Some(121);
        new.genre_ids = vec![28, 12];

        store.add_film(&new).await.unwrap();
        let film = store.get_film(8).await.unwrap().unwrap();

        assert_eq!(film.runtime, Some(121));
        assert_eq!(film.genre_ids, vec![28, 12]);
        assert_eq!(film.release_date, new.release_date);
        assert_eq!(film.backdrop_path, None);
    }

    #[tokio::test]
    async fn test_remove_film() {
        let store = memory_store().await;
        let list = store.ensure_list(1, "populars").await.unwrap();
        store.add_film(&new_film(5)).await.unwrap();
        store.add_to_list(list, 5).await.unwrap();

        store.remove_film(5).await.unwrap();

        assert!(!store.film_exists(5).await.unwrap());
        assert!(store.list_film_ids(list).await.unwrap().is_empty());

        let err = store.remove_film(5).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(5)));
        assert_eq!(err.status(), 404);
    }

    #[tokio::test]
    async fn test_resolve_missing_list() {
        let store = memory_store().await;
        let err = store.resolve_list(99).await.unwrap_err();
        assert!(matches!(err, StoreError::ListNotFound(99)));
    }

    #[tokio::test]
    async fn test_ensure_list_is_idempotent() {
        let store = memory_store().await;
        let first = store.ensure_list(1, "populars").await.unwrap();
        let second = store.ensure_list(1, "renamed").await.unwrap();
        assert_eq!(first, second);

        let list = store.get_list(first).await.unwrap();
        assert_eq!(list.name, "populars");
        assert_eq!(list.refreshed_at, None);
    }

    #[tokio::test]
    async fn test_membership_is_a_set_in_insertion_order() {
        let store = memory_store().await;
        let list = store.ensure_list(1, "populars").await.unwrap();
        for id in [30, 10, 20] {
            store.add_film(&new_film(id)).await.unwrap();
        }

        assert!(store.add_to_list(list, 30).await.unwrap());
        assert!(store.add_to_list(list, 10).await.unwrap());
        assert!(!store.add_to_list(list, 30).await.unwrap());
        assert!(store.add_to_list(list, 20).await.unwrap());

        assert_eq!(store.list_film_ids(list).await.unwrap(), vec![30, 10, 20]);
        let films = store.list_films(list).await.unwrap();
        assert_eq!(films.iter().map(|f| f.id).collect::<Vec<_>>(), vec![30, 10, 20]);
    }

    #[tokio::test]
    async fn test_add_unknown_film_to_list() {
        let store = memory_store().await;
        let list = store.ensure_list(1, "populars").await.unwrap();
        let err = store.add_to_list(list, 404).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(404)));
    }

    #[tokio::test]
    async fn test_clear_list_leaves_films() {
        let store = memory_store().await;
        let list = store.ensure_list(1, "populars").await.unwrap();
        for id in [1, 2] {
            store.add_film(&new_film(id)).await.unwrap();
            store.add_to_list(list, id).await.unwrap();
        }

        assert_eq!(store.clear_list(list).await.unwrap(), 2);
        assert!(store.list_film_ids(list).await.unwrap().is_empty());
        assert!(store.film_exists(1).await.unwrap());
    }

    #[tokio::test]
    async fn test_mark_refreshed() {
        let store = memory_store().await;
        let list = store.ensure_list(1, "populars").await.unwrap();
        store.mark_refreshed(list).await.unwrap();
        assert!(store.get_list(list).await.unwrap().refreshed_at.is_some());
    }
}

//! Movie persistence.
//!
//! Every function takes any SQLite executor, so handlers can run reads on
//! the pool and writes inside the request's transaction (`&mut *tx`).
//! Lookups by id return `Option`; updates and deletes of a missing id
//! return [`StoreError::NotFound`].

use sqlx::{Executor, Sqlite};
use thiserror::Error;

use crate::models::{Movie, NewMovie};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("movie not found: {0}")]
    NotFound(i64),

    #[error("a movie titled '{0}' is already in the collection")]
    DuplicateTitle(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

const MOVIE_COLUMNS: &str = "id, title, year, description, rating, ranking, review, img_url";

/// All movies in id order.
pub async fn list_movies<'e, E>(executor: E) -> Result<Vec<Movie>, StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {} FROM movies ORDER BY id ASC", MOVIE_COLUMNS);
    let movies = sqlx::query_as::<_, Movie>(&sql)
        .fetch_all(executor)
        .await?;
    Ok(movies)
}

pub async fn get_movie<'e, E>(executor: E, id: i64) -> Result<Option<Movie>, StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {} FROM movies WHERE id = ?", MOVIE_COLUMNS);
    let movie = sqlx::query_as::<_, Movie>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(movie)
}

/// Insert a record and return its store-assigned id.
pub async fn insert_movie<'e, E>(executor: E, movie: &NewMovie) -> Result<i64, StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO movies (title, year, description, rating, ranking, review, img_url)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&movie.title)
    .bind(movie.year)
    .bind(&movie.description)
    .bind(movie.rating)
    .bind(movie.ranking)
    .bind(&movie.review)
    .bind(&movie.img_url)
    .execute(executor)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            StoreError::DuplicateTitle(movie.title.clone())
        }
        other => StoreError::Database(other),
    })?;

    Ok(result.last_insert_rowid())
}

/// Overwrite rating and review; every other column is left alone.
pub async fn update_review<'e, E>(
    executor: E,
    id: i64,
    rating: f64,
    review: &str,
) -> Result<(), StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("UPDATE movies SET rating = ?, review = ? WHERE id = ?")
        .bind(rating)
        .bind(review)
        .bind(id)
        .execute(executor)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound(id));
    }
    Ok(())
}

pub async fn delete_movie<'e, E>(executor: E, id: i64) -> Result<(), StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM movies WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound(id));
    }
    Ok(())
}

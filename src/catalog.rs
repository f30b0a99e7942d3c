//! Collection operations.
//!
//! Each mutating operation is one unit of work: it opens a transaction,
//! commits on success, and rolls back (by dropping the transaction) on any
//! error, so a failed request never leaves a partial write behind.
//!
//! # Field mapping on create
//!
//! | Local | TMDB detail field |
//! |-------|-------------------|
//! | `title` | `title` |
//! | `year` | leading segment of `release_date` (`"1999-03-05"` → 1999) |
//! | `description` | `overview` |
//! | `rating` | `popularity` |
//! | `ranking` | `vote_average` |
//! | `review` | `tagline` |
//! | `img_url` | image base URL + `poster_path` |
//!
//! `popularity` landing in `rating` is kept for compatibility with existing
//! collections even though it is not on the 0–10 scale the edit form uses.

use sqlx::SqlitePool;
use thiserror::Error;

use crate::models::{NewMovie, RankedMovie};
use crate::ranking::rank_movies;
use crate::store::{self, StoreError};
use crate::tmdb::{MovieDetails, TmdbError};
use crate::traits::MovieSource;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Source(#[from] TmdbError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// TMDB knows the movie but has no usable release date for it yet.
    #[error("cannot add '{title}': no release year (release_date '{release_date}')")]
    NoReleaseYear { title: String, release_date: String },
}

/// Year from a hyphen-delimited date. `None` when the leading segment is
/// empty or not a number.
pub fn parse_year(release_date: &str) -> Option<i64> {
    release_date.split('-').next()?.trim().parse().ok()
}

/// Build the record to insert from a TMDB detail payload.
pub fn new_movie_from_details(
    details: &MovieDetails,
    image_base_url: &str,
) -> Result<NewMovie, CatalogError> {
    let release_date = details.release_date.as_deref().unwrap_or_default();
    let year = parse_year(release_date).ok_or_else(|| CatalogError::NoReleaseYear {
        title: details.title.clone(),
        release_date: release_date.to_string(),
    })?;

    Ok(NewMovie {
        title: details.title.clone(),
        year,
        description: details.overview.clone().unwrap_or_default(),
        rating: details.popularity,
        ranking: details.vote_average,
        review: details.tagline.clone(),
        img_url: format!(
            "{}{}",
            image_base_url,
            details.poster_path.as_deref().unwrap_or_default()
        ),
    })
}

/// The whole collection with ranks for this read.
pub async fn list_ranked(pool: &SqlitePool) -> Result<Vec<RankedMovie>, StoreError> {
    let movies = store::list_movies(pool).await?;
    Ok(rank_movies(movies))
}

/// Fetch `external_id` from `source` and insert it. Returns the new id.
pub async fn add_from_source(
    pool: &SqlitePool,
    source: &dyn MovieSource,
    image_base_url: &str,
    external_id: i64,
) -> Result<i64, CatalogError> {
    let details = source.details(external_id).await?;
    let movie = new_movie_from_details(&details, image_base_url)?;

    let mut tx = pool.begin().await.map_err(StoreError::from)?;
    let id = store::insert_movie(&mut *tx, &movie).await?;
    tx.commit().await.map_err(StoreError::from)?;

    tracing::info!(id, external_id, title = %movie.title, "movie added");
    Ok(id)
}

pub async fn rate(pool: &SqlitePool, id: i64, rating: f64, review: &str) -> Result<(), StoreError> {
    let mut tx = pool.begin().await?;
    store::update_review(&mut *tx, id, rating, review).await?;
    tx.commit().await?;

    tracing::info!(id, rating, "movie rated");
    Ok(())
}

pub async fn remove(pool: &SqlitePool, id: i64) -> Result<(), StoreError> {
    let mut tx = pool.begin().await?;
    store::delete_movie(&mut *tx, id).await?;
    tx.commit().await?;

    tracing::info!(id, "movie deleted");
    Ok(())
}

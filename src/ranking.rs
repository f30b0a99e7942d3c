//! Listing rank.
//!
//! Ranks are derived on every read and never written back. Movies are
//! ordered ascending by rating (unrated first) and numbered from the bottom
//! of that order: `rank = n - index`. The best-rated movie ends the list as
//! rank 1 and the first entry (lowest or unrated) carries rank `n`.

use std::cmp::Ordering;

use crate::models::{Movie, RankedMovie};

/// Order `movies` ascending by rating and attach `rank = n - index`.
///
/// The sort is stable: ties keep their input order, which is id order when
/// the input comes from [`crate::store::list_movies`].
pub fn rank_movies(mut movies: Vec<Movie>) -> Vec<RankedMovie> {
    movies.sort_by(|a, b| compare_ratings(a.rating, b.rating));

    let count = movies.len();
    movies
        .into_iter()
        .enumerate()
        .map(|(index, movie)| RankedMovie {
            rank: count - index,
            movie,
        })
        .collect()
}

/// `None` sorts before every rating.
fn compare_ratings(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.total_cmp(&b),
    }
}

//! Core data models.
//!
//! [`Movie`] is the stored record. [`NewMovie`] is what the create step
//! inserts, and [`RankedMovie`] pairs a record with the rank computed for a
//! single listing.

/// A movie in the collection, as stored in the `movies` table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub year: i64,
    pub description: String,
    /// User rating on a 0–10 scale once edited.
    pub rating: Option<f64>,
    /// Value written at creation time. The listing never reads it; see
    /// [`RankedMovie::rank`].
    pub ranking: Option<f64>,
    pub review: Option<String>,
    pub img_url: String,
}

/// Fields for a record that does not exist yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMovie {
    pub title: String,
    pub year: i64,
    pub description: String,
    pub rating: Option<f64>,
    pub ranking: Option<f64>,
    pub review: Option<String>,
    pub img_url: String,
}

/// A movie paired with its position in the current listing.
#[derive(Debug, Clone)]
pub struct RankedMovie {
    /// `n - index` in ascending rating order: 1 for the best-rated movie.
    pub rank: usize,
    pub movie: Movie,
}

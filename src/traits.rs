//! Seam between the web layer and the external movie database.
//!
//! Handlers only see [`MovieSource`], so the server can run against
//! [`TmdbClient`](crate::tmdb::TmdbClient) in production and against an
//! in-process fake in tests.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use reel_rank::tmdb::{MovieDetails, SearchCandidate, TmdbError};
//! use reel_rank::traits::MovieSource;
//!
//! struct Offline;
//!
//! #[async_trait]
//! impl MovieSource for Offline {
//!     async fn search(&self, _title: &str) -> Result<Vec<SearchCandidate>, TmdbError> {
//!         Ok(vec![])
//!     }
//!
//!     async fn details(&self, id: i64) -> Result<MovieDetails, TmdbError> {
//!         Err(TmdbError::Api { status_code: 404, message: format!("no movie {}", id) })
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::tmdb::{MovieDetails, SearchCandidate, TmdbError};

/// A searchable catalogue of movies keyed by an external numeric id.
#[async_trait]
pub trait MovieSource: Send + Sync {
    /// Candidates whose title matches `title`, in upstream order.
    async fn search(&self, title: &str) -> Result<Vec<SearchCandidate>, TmdbError>;

    /// Full details for one candidate.
    async fn details(&self, id: i64) -> Result<MovieDetails, TmdbError>;
}

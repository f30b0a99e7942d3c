//! Ranked collection on the command line.
//!
//! Used by `reel-rank list`. Shares [`catalog::list_ranked`] with the `/`
//! page, so both show the same ranks.

use anyhow::Result;
use std::fmt::Write;

use crate::catalog;
use crate::config::Config;
use crate::db;
use crate::models::RankedMovie;

/// CLI entry point: print the ranked collection to stdout.
pub async fn run_list(config: &Config) -> Result<()> {
    let pool = db::open(&config.db).await?;
    let movies = catalog::list_ranked(&pool).await?;
    pool.close().await;

    print!("{}", format_listing(&movies));
    Ok(())
}

/// One line per movie, best rank first.
pub fn format_listing(movies: &[RankedMovie]) -> String {
    if movies.is_empty() {
        return "No movies.\n".to_string();
    }

    let mut out = String::new();
    for ranked in movies.iter().rev() {
        let m = &ranked.movie;
        let rating = m
            .rating
            .map(|r| format!("{:.1}", r))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:>3}. {} ({})  rating: {}  [id {}]",
            ranked.rank, m.title, m.year, rating, m.id
        );
        if let Some(review) = m.review.as_deref().filter(|r| !r.is_empty()) {
            let _ = writeln!(out, "     \"{}\"", review);
        }
    }
    out
}

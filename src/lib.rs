//! # Reel Rank
//!
//! A personal movie collection. Search TMDB for a title, add it, give it a
//! rating and a review, and browse the collection ranked by rating.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────┐   ┌──────────┐   ┌──────────┐
//! │ Browser │──▶│  server  │──▶│  SQLite   │
//! └─────────┘   │  (axum)  │   │ (movies)  │
//!               └────┬─────┘   └──────────┘
//!                    ▼
//!               ┌──────────┐
//!               │   TMDB   │
//!               └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! export TMDB_API_KEY=...   TMDB_API_TOKEN=...
//! reel-rank init            # create database
//! reel-rank serve           # start the web server
//! reel-rank list            # print the ranked collection
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection and schema |
//! | [`models`] | Core data types |
//! | [`store`] | Movie persistence |
//! | [`ranking`] | Rank derivation for listings |
//! | [`tmdb`] | TMDB API client |
//! | [`traits`] | Movie source abstraction |
//! | [`catalog`] | Collection operations |
//! | [`listing`] | `reel-rank list` output |
//! | [`forms`] | Form validation |
//! | [`csrf`] | CSRF tokens |
//! | [`views`] | HTML pages |
//! | [`server`] | HTTP server |

pub mod catalog;
pub mod config;
pub mod csrf;
pub mod db;
pub mod forms;
pub mod listing;
pub mod models;
pub mod ranking;
pub mod server;
pub mod store;
pub mod tmdb;
pub mod traits;
pub mod views;

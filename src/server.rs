//! HTML web server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`/`POST` | `/` | Ranked collection |
//! | `GET` | `/add` | Search form |
//! | `POST` | `/add` | Search TMDB, render the candidates |
//! | `GET` | `/find?id=<tmdb id>` | Add a candidate, redirect to its edit page |
//! | `GET` | `/edit?id=<id>` | Rating form |
//! | `POST` | `/edit?id=<id>` | Save rating and review, redirect to `/` |
//! | `GET` | `/delete?id=<id>` | Delete, redirect to `/` |
//! | `GET` | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! Failures render an HTML error page:
//!
//! | Status | Code | Cause |
//! |--------|------|-------|
//! | 400 | `bad_request` | CSRF token rejected, malformed external id |
//! | 400, 415 | `bad_request` | unreadable query string or form body |
//! | 404 | `not_found` | missing, malformed or unknown record id |
//! | 422 | `no_release_year` | TMDB has no release year for the movie yet |
//! | 500 | `duplicate_title` | title already in the collection |
//! | 500 | `internal` | database failure |
//! | 502 | `upstream` | TMDB failed or answered with an unreadable payload |
//!
//! Form validation failures are not errors: the form is rendered again with
//! inline messages and status 422.

use axum::{
    extract::{
        rejection::{FormRejection, QueryRejection},
        Form, Query, State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::catalog::{self, CatalogError};
use crate::config::Config;
use crate::csrf::{CsrfError, CsrfGuard};
use crate::db;
use crate::forms::{AddMovieForm, EditMovieForm, FieldErrors};
use crate::models::Movie;
use crate::store::{self, StoreError};
use crate::tmdb::{TmdbClient, TmdbError};
use crate::traits::MovieSource;
use crate::views;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    pool: SqlitePool,
    source: Arc<dyn MovieSource>,
    csrf: CsrfGuard,
}

impl AppState {
    pub fn new(config: Config, pool: SqlitePool, source: Arc<dyn MovieSource>) -> Self {
        let csrf = CsrfGuard::from_config(&config.server);
        Self {
            config: Arc::new(config),
            pool,
            source,
            csrf,
        }
    }

    pub fn csrf(&self) -> &CsrfGuard {
        &self.csrf
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_home).post(handle_home))
        .route("/add", get(handle_add_form).post(handle_add_submit))
        .route("/find", get(handle_find))
        .route("/edit", get(handle_edit_form).post(handle_edit_submit))
        .route("/delete", get(handle_delete))
        .route("/health", get(handle_health))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Open the database, build the TMDB client and assemble the router.
pub async fn build_app(config: &Config) -> anyhow::Result<Router> {
    let client = TmdbClient::new(&config.tmdb)?;
    build_app_with_source(config, Arc::new(client)).await
}

/// Like [`build_app`], with a caller-supplied movie source.
pub async fn build_app_with_source(
    config: &Config,
    source: Arc<dyn MovieSource>,
) -> anyhow::Result<Router> {
    let pool = db::open(&config.db).await?;
    Ok(router(AppState::new(config.clone(), pool, source)))
}

/// Starts the web server on `[server].bind` and runs until the process ends.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    if config.tmdb.api_key.is_none() && config.tmdb.api_token.is_none() {
        tracing::warn!("no TMDB credentials configured; searching and adding movies will fail");
    }

    let app = build_app(config).await?;
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!("reel-rank listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

// ============ Error response ============

/// Internal error type that converts into an HTML error page.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, code = self.code, "{}", self.message);
        } else {
            tracing::warn!(status = %self.status, code = self.code, "{}", self.message);
        }

        let page = views::error(
            self.status.as_u16(),
            self.status.canonical_reason().unwrap_or("Error"),
            &self.message,
        );
        (self.status, Html(page)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found",
        message: message.into(),
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        let (status, code) = match err {
            StoreError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            StoreError::DuplicateTitle(_) => (StatusCode::INTERNAL_SERVER_ERROR, "duplicate_title"),
            StoreError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };
        AppError {
            status,
            code,
            message: err.to_string(),
        }
    }
}

impl From<TmdbError> for AppError {
    fn from(err: TmdbError) -> Self {
        AppError {
            status: StatusCode::BAD_GATEWAY,
            code: "upstream",
            message: err.to_string(),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Source(e) => e.into(),
            CatalogError::Store(e) => e.into(),
            CatalogError::NoReleaseYear { .. } => AppError {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                code: "no_release_year",
                message: err.to_string(),
            },
        }
    }
}

impl From<CsrfError> for AppError {
    fn from(err: CsrfError) -> Self {
        bad_request(err.to_string())
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        AppError {
            status: rejection.status(),
            code: "bad_request",
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError {
            status: rejection.status(),
            code: "bad_request",
            message: rejection.body_text(),
        }
    }
}

// ============ Query parameters ============

#[derive(Debug, Deserialize)]
struct IdQuery {
    id: Option<String>,
}

impl IdQuery {
    /// The local record id. Absent and malformed ids are both "not found".
    fn record_id(&self) -> Result<i64, AppError> {
        let raw = self.id.as_deref().unwrap_or_default();
        raw.trim()
            .parse()
            .map_err(|_| not_found(format!("no movie with id '{}'", raw)))
    }
}

async fn find_movie(state: &AppState, id: i64) -> Result<Movie, AppError> {
    store::get_movie(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(format!("no movie with id '{}'", id)))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ / ============

async fn handle_home(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let movies = catalog::list_ranked(&state.pool).await?;
    Ok(Html(views::index(&movies)))
}

// ============ /add ============

async fn handle_add_form(State(state): State<AppState>) -> Html<String> {
    Html(views::add(
        &AddMovieForm::default(),
        &FieldErrors::default(),
        &state.csrf.issue(),
    ))
}

async fn handle_add_submit(
    State(state): State<AppState>,
    form: Result<Form<AddMovieForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(form) = form?;
    state.csrf.verify(&form.csrf_token)?;

    let title = match form.validate() {
        Ok(title) => title,
        Err(errors) => {
            tracing::warn!(fields = ?errors.fields(), "search form rejected");
            let page = views::add(&form, &errors, &state.csrf.issue());
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response());
        }
    };

    let candidates = state.source.search(&title).await?;
    tracing::info!(%title, results = candidates.len(), "search completed");
    Ok(Html(views::select(&candidates)).into_response())
}

// ============ GET /find ============

async fn handle_find(
    State(state): State<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query?;
    let raw = match query.id.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Ok(StatusCode::NO_CONTENT.into_response()),
    };
    let external_id: i64 = raw
        .parse()
        .map_err(|_| bad_request(format!("invalid TMDB id '{}'", raw)))?;

    let id = catalog::add_from_source(
        &state.pool,
        state.source.as_ref(),
        &state.config.tmdb.image_base_url,
        external_id,
    )
    .await?;

    Ok(Redirect::to(&format!("/edit?id={}", id)).into_response())
}

// ============ /edit ============

async fn handle_edit_form(
    State(state): State<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> Result<Html<String>, AppError> {
    let Query(query) = query?;
    let movie = find_movie(&state, query.record_id()?).await?;
    Ok(Html(views::edit(
        &movie,
        &EditMovieForm::default(),
        &FieldErrors::default(),
        &state.csrf.issue(),
    )))
}

async fn handle_edit_submit(
    State(state): State<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
    form: Result<Form<EditMovieForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query?;
    let movie = find_movie(&state, query.record_id()?).await?;
    let Form(form) = form?;
    state.csrf.verify(&form.csrf_token)?;

    let update = match form.validate() {
        Ok(update) => update,
        Err(errors) => {
            tracing::warn!(id = movie.id, fields = ?errors.fields(), "rating form rejected");
            let page = views::edit(&movie, &form, &errors, &state.csrf.issue());
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response());
        }
    };

    catalog::rate(&state.pool, movie.id, update.rating, &update.review).await?;
    Ok(Redirect::to("/").into_response())
}

// ============ GET /delete ============

async fn handle_delete(
    State(state): State<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> Result<Redirect, AppError> {
    let Query(query) = query?;
    catalog::remove(&state.pool, query.record_id()?).await?;
    Ok(Redirect::to("/"))
}

//! HTTP transport for roster. Uses axum for routing.
//!
//! ## Routes
//!
//! - `GET /person/{id}`: the person, or `{}` when absent.
//! - `PUT /person/{id}`: replace; a body `id`, if any, must match the path.
//! - `GET /people`: everyone, in store order.
//! - `GET /search?age=&name=`: filtered people or a diagnostic string.
//! - `POST /addperson`: add a person, responds 201.
//! - `PUT /changeperson`: replace the person named by the body `id`.
//! - `DELETE /deleteperson/{id}`: remove, responds with a confirmation string.
//! - `GET /health` and `GET /status`.
//!
//! Errors are `{"detail": "..."}` with the status from [`Error::status_code`].
//! That includes requests axum cannot decode: a malformed path, query string
//! or body is answered with 422 in the same shape.
//!
//! Ids and the `age` query parameter are plain signed integers. A negative id
//! names no one, so it reads as absent or `NotFound`; a negative age matches
//! no one.
//!
//! The store sits behind one `RwLock`: mutations take the write lock and are
//! serialized, reads share the read lock.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::error::{Error, Result};
use crate::person::{NewPerson, PersonUpdate};
use crate::query::{self, SearchFilter};
use crate::storage::PersonStore;

/// Shared state handed to every handler.
#[derive(Debug)]
pub struct AppState {
    store: RwLock<PersonStore>,
    started: Instant,
}

impl AppState {
    /// Wrap a loaded store.
    #[must_use]
    pub fn new(store: PersonStore) -> Self {
        Self {
            store: RwLock::new(store),
            started: Instant::now(),
        }
    }
}

/// Service status as reported by `GET /status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    /// Always true while the server answers.
    pub running: bool,
    /// Seconds since the state was created.
    pub uptime_secs: u64,
    /// Number of people in the store.
    pub total_people: usize,
    /// Id the next added person would receive.
    pub next_id: Option<i64>,
    /// Backing file path.
    pub data_path: PathBuf,
    /// Backing file size in bytes.
    pub file_size_bytes: u64,
}

/// An [`Error`] rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn rejected(message: String) -> Self {
        Self(Error::InvalidRequest { message })
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::rejected(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::rejected(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::rejected(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if self.0.is_client_error() {
            debug!(error = %self.0, "Request rejected");
        } else {
            error!(error = %self.0, "Request failed");
        }
        (status, Json(json!({ "detail": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

type PathId = std::result::Result<Path<i64>, PathRejection>;
type JsonBody<T> = std::result::Result<Json<T>, JsonRejection>;

/// Build the axum `Router` over the given state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/person/:id", get(get_person).put(replace_person))
        .route("/people", get(list_people))
        .route("/search", get(search_people))
        .route("/search/", get(search_people))
        .route("/addperson", post(add_person))
        .route("/changeperson", put(change_person))
        .route("/deleteperson/:id", delete(delete_person))
        .route("/health", get(health))
        .route("/status", get(status))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Serve the API at `addr` (e.g. `"127.0.0.1:8000"`) until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(state: Arc<AppState>, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("roster listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("roster stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

// GET /person/:id
async fn get_person(State(state): State<Arc<AppState>>, id: PathId) -> ApiResult<Response> {
    let Path(id) = id?;
    let store = state.store.read().await;
    Ok(match store.find_by_id(id) {
        Some(person) => Json(person).into_response(),
        None => Json(json!({})).into_response(),
    })
}

// GET /people
async fn list_people(State(state): State<Arc<AppState>>) -> Response {
    let store = state.store.read().await;
    Json(store.people()).into_response()
}

// GET /search
async fn search_people(
    State(state): State<Arc<AppState>>,
    filter: std::result::Result<Query<SearchFilter>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(filter) = filter?;
    let store = state.store.read().await;
    Ok(Json(query::search(store.people(), &filter)).into_response())
}

// POST /addperson
async fn add_person(
    State(state): State<Arc<AppState>>,
    candidate: JsonBody<NewPerson>,
) -> ApiResult<Response> {
    let Json(candidate) = candidate?;
    let person = state.store.write().await.add(candidate)?;
    info!(id = person.id, "Added person");
    Ok((StatusCode::CREATED, Json(person)).into_response())
}

// PUT /changeperson
async fn change_person(
    State(state): State<Arc<AppState>>,
    update: JsonBody<PersonUpdate>,
) -> ApiResult<Response> {
    let Json(update) = update?;
    let id = update.id.ok_or(Error::MissingId)?;
    let person = state.store.write().await.replace(id, update.person)?;
    info!(id, "Replaced person");
    Ok(Json(person).into_response())
}

// PUT /person/:id
async fn replace_person(
    State(state): State<Arc<AppState>>,
    id: PathId,
    update: JsonBody<PersonUpdate>,
) -> ApiResult<Response> {
    let Path(id) = id?;
    let Json(update) = update?;
    if let Some(body_id) = update.id.filter(|&body_id| body_id != id) {
        return Err(Error::IdMismatch {
            path_id: id,
            body_id,
        }
        .into());
    }
    let person = state.store.write().await.replace(id, update.person)?;
    info!(id, "Replaced person");
    Ok(Json(person).into_response())
}

// DELETE /deleteperson/:id
async fn delete_person(
    State(state): State<Arc<AppState>>,
    id: PathId,
) -> ApiResult<Response> {
    let Path(id) = id?;
    state.store.write().await.remove(id)?;
    info!(id, "Deleted person");
    Ok(Json(format!("Successfully deleted a person with id {id}")).into_response())
}

// GET /health
async fn health(State(state): State<Arc<AppState>>) -> Response {
    let people = state.store.read().await.len();
    Json(json!({ "ok": true, "people": people })).into_response()
}

// GET /status
async fn status(State(state): State<Arc<AppState>>) -> Response {
    let store = state.store.read().await;
    let stats = store.stats();
    Json(StatusReport {
        running: true,
        uptime_secs: state.started.elapsed().as_secs(),
        total_people: stats.total_people,
        next_id: stats.next_id,
        data_path: store.path().to_path_buf(),
        file_size_bytes: stats.file_size_bytes,
    })
    .into_response()
}

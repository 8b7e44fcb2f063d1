#![forbid(unsafe_code)]
//! The taskdeck HTTP application.
//!
//! One shared SQLite store behind a tokio mutex, a handful of form-driven
//! routes, HTML out. Mutations redirect back to the list (303) so a browser
//! refresh never replays a POST.

use axum::extract::{Form, Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use taskdeck_model::{Title, TodoId};
use taskdeck_store::{SqliteStore, StoreError, TodoStore};
use tokio::sync::Mutex;
use tracing::{info, warn};

mod config;
mod views;

pub use config::ServerConfig;

pub const CRATE_NAME: &str = "taskdeck-server";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<SqliteStore>>,
}

impl AppState {
    #[must_use]
    pub fn new(store: SqliteStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_todos))
        .route("/todos", post(create_todo))
        .route("/todos/{id}/toggle", post(toggle_todo))
        .route("/todos/{id}/edit", post(edit_todo))
        .route("/todos/{id}/delete", post(delete_todo))
        .route("/healthz", get(healthz))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct TitleForm {
    #[serde(default)]
    title: String,
}

fn store_error_response(err: &StoreError) -> Response {
    match err {
        StoreError::NotFound(id) => {
            warn!(id = %id, "request for missing to-do item");
            (StatusCode::NOT_FOUND, "no such to-do item").into_response()
        }
        StoreError::Backend(msg) => {
            warn!(error = %msg, "store failure");
            (StatusCode::INTERNAL_SERVER_ERROR, "storage failure").into_response()
        }
    }
}

async fn render_list(state: &AppState, error: Option<&str>) -> Response {
    let mut store = state.store.lock().await;
    match store.list() {
        Ok(items) => {
            let page = views::list_page(&items, error);
            if error.is_some() {
                (StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response()
            } else {
                Html(page).into_response()
            }
        }
        Err(e) => store_error_response(&e),
    }
}

async fn list_todos(State(state): State<AppState>) -> Response {
    render_list(&state, None).await
}

async fn create_todo(State(state): State<AppState>, Form(form): Form<TitleForm>) -> Response {
    let title = match Title::parse(&form.title) {
        Ok(title) => title,
        Err(e) => return render_list(&state, Some(&e.to_string())).await,
    };
    let created = {
        let mut store = state.store.lock().await;
        store.insert(&title)
    };
    match created {
        Ok(item) => {
            info!(id = %item.id, "created to-do item");
            Redirect::to("/").into_response()
        }
        Err(e) => store_error_response(&e),
    }
}

async fn toggle_todo(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let toggled = {
        let mut store = state.store.lock().await;
        store.toggle(TodoId(id))
    };
    match toggled {
        Ok(done) => {
            info!(id, done, "toggled to-do item");
            Redirect::to("/").into_response()
        }
        Err(e) => store_error_response(&e),
    }
}

async fn edit_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<TitleForm>,
) -> Response {
    let title = match Title::parse(&form.title) {
        Ok(title) => title,
        Err(e) => return render_list(&state, Some(&e.to_string())).await,
    };
    let renamed = {
        let mut store = state.store.lock().await;
        store.rename(TodoId(id), &title)
    };
    match renamed {
        Ok(()) => {
            info!(id, "renamed to-do item");
            Redirect::to("/").into_response()
        }
        Err(e) => store_error_response(&e),
    }
}

async fn delete_todo(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let deleted = {
        let mut store = state.store.lock().await;
        store.delete(TodoId(id))
    };
    match deleted {
        Ok(()) => {
            info!(id, "deleted to-do item");
            Redirect::to("/").into_response()
        }
        Err(e) => store_error_response(&e),
    }
}

async fn healthz(State(state): State<AppState>) -> Response {
    let mut store = state.store.lock().await;
    match store.ping() {
        Ok(()) => Json(json!({ "status": "ok" })).into_response(),
        Err(e) => {
            warn!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
                .into_response()
        }
    }
}

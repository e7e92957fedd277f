use std::collections::BTreeMap;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use tracing::info;

use crate::db::TodoFilter;
use crate::error::AppError;
use crate::models::*;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/todos", get(search_todos).post(insert_todo))
        .route(
            "/todos/{id}",
            get(get_todo).patch(update_todo).delete(delete_todo),
        )
        .with_state(state)
}

async fn search_todos(
    State(state): State<AppState>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<Json<Vec<Todo>>, AppError> {
    let filter = TodoFilter::from_query(&params)?;
    let todos = state.store.search(filter).await?;
    Ok(Json(todos))
}

async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, AppError> {
    let todo = state.store.get(&id).await?;
    Ok(Json(todo))
}

async fn insert_todo(
    State(state): State<AppState>,
    payload: Result<Json<Todo>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), AppError> {
    let Json(todo) = payload?;
    let todo = state.store.insert(todo).await?;
    info!("created todo {:?}", todo.id);
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Changes>, JsonRejection>,
) -> Result<Json<TodoUpdate>, AppError> {
    let Json(changes) = payload?;
    let update = state.store.update(&id, changes).await?;
    Ok(Json(update))
}

async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TodoDelete>, AppError> {
    let deleted = state.store.delete(&id).await?;
    Ok(Json(deleted))
}

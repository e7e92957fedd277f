#![allow(dead_code)]

use std::sync::Arc;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use todo_service::api::router;
use todo_service::db::{self, SqliteTodoStore};
use todo_service::state::AppState;

/// In-memory database with the schema applied. A single long-lived connection
/// keeps every query on the same in-memory database.
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create database");

    db::migrate(&pool).await.expect("Failed to run migrations");
    pool
}

pub async fn memory_store() -> SqliteTodoStore {
    SqliteTodoStore::new(memory_pool().await, "todos")
}

pub async fn app() -> axum::Router {
    let store = memory_store().await;
    router(AppState {
        store: Arc::new(store),
    })
}

/// File-backed database shared by several connections, so writes really interleave.
pub async fn file_pool(dir: &tempfile::TempDir) -> SqlitePool {
    let options = SqliteConnectOptions::new()
        .filename(dir.path().join("todos.db"))
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await
        .expect("Failed to create database");

    db::migrate(&pool).await.expect("Failed to run migrations");
    pool
}

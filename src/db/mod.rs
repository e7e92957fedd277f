pub mod diff;
pub mod filter;
pub mod repository;

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::{Changes, Todo, TodoDelete, TodoUpdate};

pub use filter::TodoFilter;
pub use repository::SqliteTodoStore;

/// Operations against a single collection of todos.
#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn insert(&self, todo: Todo) -> Result<Todo, AppError>;
    async fn get(&self, id: &str) -> Result<Todo, AppError>;
    async fn update(&self, id: &str, changes: Changes) -> Result<TodoUpdate, AppError>;
    async fn delete(&self, id: &str) -> Result<TodoDelete, AppError>;
    async fn search(&self, filter: Option<TodoFilter>) -> Result<Vec<Todo>, AppError>;
}

/// Opens the process-wide pool and brings the schema up to date.
pub async fn connect(config: &AppConfig) -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);

    info!("connecting to document store at {}", config.database_url);
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::db::diff::{normalize_integral, prune_unchanged};
use crate::db::filter::is_field_name;
use crate::db::{TodoFilter, TodoStore};
use crate::error::AppError;
use crate::models::{Changes, Todo, TodoDelete, TodoUpdate, parse_id};

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: String,
    body: String,
}

impl DocumentRow {
    fn into_parts(self) -> Result<(Uuid, Changes), AppError> {
        let id = parse_id(&self.id)?;
        let body: Changes = serde_json::from_str(&self.body)?;
        Ok((id, body))
    }

    fn into_todo(self) -> Result<Todo, AppError> {
        let (id, body) = self.into_parts()?;
        Ok(Todo::from_document(id, body)?)
    }
}

/// Todo collection stored as JSON documents in SQLite.
#[derive(Clone)]
pub struct SqliteTodoStore {
    db: SqlitePool,
    collection: String,
}

impl SqliteTodoStore {
    pub fn new(db: SqlitePool, collection: impl Into<String>) -> Self {
        Self {
            db,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    async fn fetch_document(&self, id: Uuid) -> Result<Option<DocumentRow>, AppError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            "SELECT id, body FROM documents WHERE collection = ? AND id = ?",
        )
        .bind(&self.collection)
        .bind(id.to_string())
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn find(&self, id: Uuid) -> Result<Todo, AppError> {
        self.fetch_document(id)
            .await?
            .ok_or(AppError::NotFound)?
            .into_todo()
    }
}

fn push_value(query: &mut QueryBuilder<'_, Sqlite>, value: &Value) {
    match value {
        Value::Null => {
            query.push(" IS NULL");
        }
        Value::Bool(b) => {
            query.push(" = ").push_bind(*b);
        }
        Value::Number(n) => match n.as_i64() {
            Some(i) => {
                query.push(" = ").push_bind(i);
            }
            None => {
                query.push(" = ").push_bind(n.as_f64().unwrap_or(f64::NAN));
            }
        },
        Value::String(s) => {
            query.push(" = ").push_bind(s.clone());
        }
        Value::Array(_) | Value::Object(_) => {
            query.push(" = json(").push_bind(value.to_string()).push(")");
        }
    }
}

#[async_trait]
impl TodoStore for SqliteTodoStore {
    async fn insert(&self, todo: Todo) -> Result<Todo, AppError> {
        let id = Uuid::new_v4();
        let body = serde_json::to_string(&todo.document_body()?)?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO documents (id, collection, body, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            "#,
        )
        .bind(id.to_string())
        .bind(&self.collection)
        .bind(body)
        .bind(now)
        .execute(&self.db)
        .await?;

        debug!("inserted todo {} into {}", id, self.collection);
        self.find(id).await
    }

    async fn get(&self, id: &str) -> Result<Todo, AppError> {
        let id = parse_id(id)?;
        self.find(id).await
    }

    async fn update(&self, id: &str, mut changes: Changes) -> Result<TodoUpdate, AppError> {
        let id = parse_id(id)?;
        let (_, document) = self
            .fetch_document(id)
            .await?
            .ok_or(AppError::NotFound)?
            .into_parts()?;
        let current = Todo::from_document(id, document.clone())?;

        let mut existing = document.clone();
        existing.extend(current.to_fields()?);

        normalize_integral(&mut changes, Todo::INTEGER_FIELDS);
        let changed = prune_unchanged(&existing, changes);
        if changed.is_empty() {
            debug!("update of {} changed nothing, skipping write", id);
            return Ok(TodoUpdate {
                modified_count: 0,
                result: current,
            });
        }
        if changed.contains_key("id") {
            return Err(AppError::BadRequest("id cannot be changed".to_string()));
        }
        if let Some(field) = changed.keys().find(|field| !is_field_name(field)) {
            return Err(AppError::BadRequest(format!("invalid field name '{}'", field)));
        }

        let mut merged = document;
        merged.extend(changed.clone());
        Todo::from_document(id, merged)
            .map_err(|e| AppError::BadRequest(format!("update does not produce a valid todo: {}", e)))?;

        // Sets only the changed paths; fields not sent keep their stored values.
        let mut query = QueryBuilder::<Sqlite>::new("UPDATE documents SET body = json_set(body");
        for (field, value) in &changed {
            query
                .push(", ")
                .push_bind(format!("$.{}", field))
                .push(", json(")
                .push_bind(value.to_string())
                .push(")");
        }
        query.push("), updated_at = ").push_bind(Utc::now().to_rfc3339());
        query.push(" WHERE collection = ").push_bind(self.collection.clone());
        query.push(" AND id = ").push_bind(id.to_string());

        let modified_count = query.build().execute(&self.db).await?.rows_affected();

        debug!("updated todo {} ({} modified)", id, modified_count);
        let result = self.find(id).await?;
        Ok(TodoUpdate {
            modified_count,
            result,
        })
    }

    async fn delete(&self, id: &str) -> Result<TodoDelete, AppError> {
        let id = parse_id(id)?;

        let deleted_count = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(&self.collection)
            .bind(id.to_string())
            .execute(&self.db)
            .await?
            .rows_affected();

        debug!("deleted todo {} ({} deleted)", id, deleted_count);
        Ok(TodoDelete { deleted_count })
    }

    async fn search(&self, filter: Option<TodoFilter>) -> Result<Vec<Todo>, AppError> {
        let filter = filter.unwrap_or_default();

        let mut query = QueryBuilder::<Sqlite>::new("SELECT id, body FROM documents WHERE collection = ");
        query.push_bind(self.collection.clone());
        for (field, value) in filter.clauses() {
            query
                .push(" AND json_extract(body, ")
                .push_bind(format!("$.{}", field))
                .push(")");
            push_value(&mut query, value);
        }
        query.push(" ORDER BY rowid");

        let rows = query
            .build_query_as::<DocumentRow>()
            .fetch_all(&self.db)
            .await?;

        rows.into_iter().map(DocumentRow::into_todo).collect()
    }
}

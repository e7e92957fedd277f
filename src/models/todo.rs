use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::AppError;

/// Field-keyed view of a document, used for partial updates.
pub type Changes = Map<String, Value>;

/// Identifier of a stored todo. `Unset` until the store assigns one on insert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<Uuid>", into = "Option<Uuid>")]
pub enum TodoId {
    #[default]
    Unset,
    Present(Uuid),
}

/// Parses an id in the store's native format without touching the store.
pub fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::try_parse(raw).map_err(|_| AppError::InvalidId(raw.to_string()))
}

impl TodoId {
    pub fn is_unset(&self) -> bool {
        matches!(self, TodoId::Unset)
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            TodoId::Unset => None,
            TodoId::Present(id) => Some(*id),
        }
    }
}

impl From<Option<Uuid>> for TodoId {
    fn from(id: Option<Uuid>) -> Self {
        id.map_or(TodoId::Unset, TodoId::Present)
    }
}

impl From<TodoId> for Option<Uuid> {
    fn from(id: TodoId) -> Self {
        id.as_uuid()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub user_id: i64,
    #[serde(default, skip_serializing_if = "TodoId::is_unset")]
    pub id: TodoId,
    pub title: String,
    pub completed: bool,
}

impl Todo {
    pub fn new(user_id: i64, title: impl Into<String>, completed: bool) -> Self {
        Self {
            user_id,
            id: TodoId::Unset,
            title: title.into(),
            completed,
        }
    }

    /// Fields stored as integers. Integral floats sent for them are narrowed before writing.
    pub const INTEGER_FIELDS: &'static [&'static str] = &["userId"];

    /// The record as it appears on the wire, keyed by field name.
    pub fn to_fields(&self) -> Result<Changes, serde_json::Error> {
        serde_json::from_value(serde_json::to_value(self)?)
    }

    /// The stored body of the record. The id lives outside the document.
    pub fn document_body(&self) -> Result<Changes, serde_json::Error> {
        let mut fields = self.to_fields()?;
        fields.remove("id");
        Ok(fields)
    }

    /// Rebuilds a record from a stored body. Keys that are not part of a todo are ignored.
    pub fn from_document(id: Uuid, mut body: Changes) -> Result<Self, serde_json::Error> {
        body.insert("id".to_string(), Value::String(id.to_string()));
        serde_json::from_value(Value::Object(body))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoUpdate {
    pub modified_count: u64,
    pub result: Todo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoDelete {
    pub deleted_count: u64,
}

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::Patch;
use crate::db::entities::todo;

/// A todo as it travels over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i32,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<FixedOffset>,
}

impl From<todo::Model> for Todo {
    fn from(model: todo::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            completed: model.completed,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodoRequest {
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTodoRequest {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub title: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub completed: Patch<bool>,
}

impl UpdateTodoRequest {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Patch::Value(title.into()),
            ..Default::default()
        }
    }

    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Patch::Value(completed),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

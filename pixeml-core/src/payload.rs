//! Request bodies for the mutation endpoints, and the form logic that builds
//! them from type templates and resolved tasks.

use crate::model::{ResolvedTask, TaskType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("task name must not be empty")]
    EmptyName,

    #[error("'{setting}' is not a setting of {owner}")]
    UnknownSetting { setting: String, owner: String },
}

/// Body of `POST /api/new_task`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTaskRequest {
    pub task_type_id: i64,
    pub task_name: String,
    pub settings: Vec<(String, String)>,
}

impl NewTaskRequest {
    /// Fill a template: every declared setting, in declaration order, takes
    /// its value from `values` or the empty string.
    pub fn from_template(
        task_type: &TaskType,
        task_name: &str,
        values: &[(String, String)],
    ) -> Result<Self, FormError> {
        let task_name = non_blank(task_name)?;

        if let Some((unknown, _)) = values
            .iter()
            .find(|(n, _)| task_type.position_of(n).is_none())
        {
            return Err(FormError::UnknownSetting {
                setting: unknown.clone(),
                owner: format!("task type '{}'", task_type.name),
            });
        }

        let settings = task_type
            .settings
            .iter()
            .map(|(name, _)| {
                // Last supplied value wins.
                let value = values
                    .iter()
                    .rev()
                    .find(|(n, _)| n == name)
                    .map(|(_, v)| v.clone())
                    .unwrap_or_default();
                (name.clone(), value)
            })
            .collect();

        Ok(Self {
            task_type_id: task_type.id,
            task_name,
            settings,
        })
    }
}

/// Body of `POST /api/modify_task`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyTaskRequest {
    pub task_id: i64,
    pub settings: Vec<(String, String)>,
}

impl ModifyTaskRequest {
    /// The task's full current settings with `updates` substituted in place.
    pub fn from_resolved(
        task: &ResolvedTask,
        updates: &[(String, String)],
    ) -> Result<Self, FormError> {
        let mut settings = task.pairs();

        for (name, value) in updates {
            let Some(slot) = settings.iter_mut().find(|(n, _)| n == name) else {
                return Err(FormError::UnknownSetting {
                    setting: name.clone(),
                    owner: format!("task '{}'", task.name),
                });
            };
            slot.1 = value.clone();
        }

        Ok(Self {
            task_id: task.id,
            settings,
        })
    }
}

/// Body of `POST /api/rename_task`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameTaskRequest {
    pub task_id: i64,
    pub name: String,
}

impl RenameTaskRequest {
    pub fn new(task_id: i64, name: &str) -> Result<Self, FormError> {
        Ok(Self {
            task_id,
            name: non_blank(name)?,
        })
    }
}

/// Body of `POST /api/delete_task`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteTaskRequest {
    pub task_id: i64,
}

/// Any request the client can send to change server state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Create(NewTaskRequest),
    Modify(ModifyTaskRequest),
    Rename(RenameTaskRequest),
    Delete(DeleteTaskRequest),
}

impl Mutation {
    /// Path segment under `/api/`.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Mutation::Create(_) => "new_task",
            Mutation::Modify(_) => "modify_task",
            Mutation::Rename(_) => "rename_task",
            Mutation::Delete(_) => "delete_task",
        }
    }
}

impl Serialize for Mutation {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Mutation::Create(r) => r.serialize(s),
            Mutation::Modify(r) => r.serialize(s),
            Mutation::Rename(r) => r.serialize(s),
            Mutation::Delete(r) => r.serialize(s),
        }
    }
}

impl From<NewTaskRequest> for Mutation {
    fn from(r: NewTaskRequest) -> Self {
        Mutation::Create(r)
    }
}

impl From<ModifyTaskRequest> for Mutation {
    fn from(r: ModifyTaskRequest) -> Self {
        Mutation::Modify(r)
    }
}

impl From<RenameTaskRequest> for Mutation {
    fn from(r: RenameTaskRequest) -> Self {
        Mutation::Rename(r)
    }
}

impl From<DeleteTaskRequest> for Mutation {
    fn from(r: DeleteTaskRequest) -> Self {
        Mutation::Delete(r)
    }
}

fn non_blank(name: &str) -> Result<String, FormError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(FormError::EmptyName);
    }
    Ok(trimmed.to_string())
}

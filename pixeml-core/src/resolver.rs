//! Resolver: reconcile a raw task record against its declared task type.
//!
//! Both lookups have a cheap positional path and a linear-scan fallback:
//! - type lookup: `types[type_id]` when that entry's id really is `type_id`
//! - setting lookup: the declared setting at the same position, when the names agree
//!
//! Resolution is all-or-nothing per task. A missing type or a single
//! undeclared setting fails the whole task.

use crate::model::{ResolvedSetting, ResolvedTask, TaskType, UnresolvedTask};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("task {task_id}: no task type with id {type_id}")]
    TypeNotFound { task_id: i64, type_id: i64 },

    #[error("task {task_id}: settings not declared by type {type_id}: {}", names.join(", "))]
    UnresolvedSettings {
        task_id: i64,
        type_id: i64,
        /// Every unmatched name, in input order.
        names: Vec<String>,
    },
}

/// Which path a lookup took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupPath {
    Indexed,
    Scanned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMatch<'a> {
    pub task_type: &'a TaskType,
    pub index: usize,
    pub path: LookupPath,
}

/// Find the task type with `id == type_id`.
///
/// Tries `types[type_id]` first; negative or out-of-range ids go straight to the scan.
pub fn find_task_type(types: &[TaskType], type_id: i64) -> Option<TypeMatch<'_>> {
    if let Some(index) = usize::try_from(type_id).ok().filter(|&i| i < types.len()) {
        let candidate = &types[index];
        if candidate.id == type_id {
            return Some(TypeMatch {
                task_type: candidate,
                index,
                path: LookupPath::Indexed,
            });
        }
    }

    debug!(type_id, "task type not at its index, scanning");
    types
        .iter()
        .position(|t| t.id == type_id)
        .map(|index| TypeMatch {
            task_type: &types[index],
            index,
            path: LookupPath::Scanned,
        })
}

/// Declared type for the stored setting at `position` named `name`.
fn declared_setting_type<'a>(
    task_type: &'a TaskType,
    position: usize,
    name: &str,
) -> Option<&'a str> {
    if let Some((declared, ty)) = task_type.settings.get(position) {
        if declared == name {
            return Some(ty.as_str());
        }
    }

    debug!(setting = name, position, "setting not at its declared position, scanning");
    task_type.declared_type(name)
}

/// Resolve one task against the supplied type list.
pub fn resolve(task: &UnresolvedTask, types: &[TaskType]) -> Result<ResolvedTask, ResolveError> {
    let Some(found) = find_task_type(types, task.type_id) else {
        debug!(task_id = task.id, type_id = task.type_id, "task type not found");
        return Err(ResolveError::TypeNotFound {
            task_id: task.id,
            type_id: task.type_id,
        });
    };
    let task_type = found.task_type;

    let mut settings = Vec::with_capacity(task.settings.len());
    let mut unresolved = Vec::new();

    // No short-circuit: collect every unmatched name before failing.
    for (i, (name, value)) in task.settings.iter().enumerate() {
        match declared_setting_type(task_type, i, name) {
            Some(setting_type) => settings.push(ResolvedSetting {
                name: name.clone(),
                setting_type: setting_type.to_string(),
                value: value.clone(),
            }),
            None => unresolved.push(name.clone()),
        }
    }

    if !unresolved.is_empty() {
        debug!(task_id = task.id, ?unresolved, "task has undeclared settings");
        return Err(ResolveError::UnresolvedSettings {
            task_id: task.id,
            type_id: task.type_id,
            names: unresolved,
        });
    }

    Ok(ResolvedTask {
        id: task.id,
        name: task.name.clone(),
        type_id: task.type_id,
        type_name: task_type.name.clone(),
        settings,
    })
}

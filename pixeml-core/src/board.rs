//! Board: one fetch snapshot, resolved.
//!
//! Tasks that fail resolution are kept aside as [`ResolutionFailure`]s so the
//! caller can show a placeholder row for each. They never reach the task list.

use crate::model::{ResolvedTask, TaskType, UnresolvedTask};
use crate::resolver::{find_task_type, resolve, ResolveError};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionFailure {
    pub task_id: i64,
    pub task_name: String,
    #[serde(serialize_with = "error_as_string")]
    pub error: ResolveError,
}

fn error_as_string<S: serde::Serializer>(e: &ResolveError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(e)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Board {
    pub task_types: Vec<TaskType>,

    /// Successfully resolved tasks, in fetch order.
    pub tasks: Vec<ResolvedTask>,

    pub failures: Vec<ResolutionFailure>,
}

impl Board {
    pub fn resolve(task_types: Vec<TaskType>, unresolved: &[UnresolvedTask]) -> Self {
        let mut tasks = Vec::with_capacity(unresolved.len());
        let mut failures = Vec::new();

        for u in unresolved {
            match resolve(u, &task_types) {
                Ok(t) => tasks.push(t),
                Err(error) => {
                    warn!(task_id = u.id, %error, "dropping task from board");
                    failures.push(ResolutionFailure {
                        task_id: u.id,
                        task_name: u.name.clone(),
                        error,
                    });
                }
            }
        }

        Self {
            task_types,
            tasks,
            failures,
        }
    }

    pub fn task(&self, id: i64) -> Option<&ResolvedTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn task_type(&self, id: i64) -> Option<&TaskType> {
        find_task_type(&self.task_types, id).map(|m| m.task_type)
    }

    pub fn failure(&self, task_id: i64) -> Option<&ResolutionFailure> {
        self.failures.iter().find(|f| f.task_id == task_id)
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

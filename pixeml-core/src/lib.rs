//! pixeml-core: task records, the type resolver, and request payloads for the
//! Pixeml task manager. No I/O lives here.

pub mod board;
pub mod model;
pub mod payload;
pub mod resolver;

pub use board::{Board, ResolutionFailure};
pub use model::{ResolvedSetting, ResolvedTask, TaskType, UnresolvedTask};
pub use payload::{
    DeleteTaskRequest, FormError, ModifyTaskRequest, Mutation, NewTaskRequest, RenameTaskRequest,
};
pub use resolver::{find_task_type, resolve, LookupPath, ResolveError, TypeMatch};

//! Plain-text rendering of type templates and tasks.

use pixeml_core::{Board, ResolutionFailure, ResolvedTask, TaskType};
use std::fmt::Write;

pub fn render_task_type(tt: &TaskType) -> String {
    let mut s = format!("[{}] {}\n", tt.id, tt.name);
    if tt.settings.is_empty() {
        s.push_str("    (no settings)\n");
    }
    for (name, ty) in &tt.settings {
        let _ = writeln!(s, "    {name}: {ty}");
    }
    s
}

pub fn render_task(task: &ResolvedTask) -> String {
    let mut s = format!("#{} {}\n", task.id, task.name);
    let _ = writeln!(s, "    type: {} [{}]", task.type_name, task.type_id);
    for setting in &task.settings {
        let _ = writeln!(
            s,
            "    {} ({}) = {}",
            setting.name, setting.setting_type, setting.value
        );
    }
    s
}

/// Placeholder row for a task that could not be resolved.
pub fn render_failure(f: &ResolutionFailure) -> String {
    format!("#{} {}\n    !! unavailable: {}\n", f.task_id, f.task_name, f.error)
}

pub fn render_types(types: &[TaskType]) -> String {
    if types.is_empty() {
        return "No task types.\n".to_string();
    }
    types.iter().map(render_task_type).collect()
}

pub fn render_board(board: &Board, show_failures: bool) -> String {
    let mut s = String::new();

    if board.tasks.is_empty() {
        s.push_str("No tasks.\n");
    }
    for t in &board.tasks {
        s.push_str(&render_task(t));
    }

    if !board.failures.is_empty() {
        if show_failures {
            s.push('\n');
            for f in &board.failures {
                s.push_str(&render_failure(f));
            }
        } else {
            let _ = writeln!(
                s,
                "\n({} task(s) could not be displayed)",
                board.failures.len()
            );
        }
    }

    s
}

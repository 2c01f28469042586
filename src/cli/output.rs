use serde::Serialize;

use crate::backend::memory::RecordedCall;
use crate::dnd::notify::Notification;
use crate::dnd::transition::Transition;
use crate::model::registry::RegistrySnapshot;
use crate::model::task::{Task, TaskStatus};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct StepJson {
    pub index: usize,
    /// What happened: the transition, "click", "cancelled" or "flush"
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition: Option<Transition>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayJson {
    pub steps: Vec<StepJson>,
    pub calls: Vec<RecordedCall>,
    pub failures: Vec<String>,
    pub notifications: Vec<Notification>,
    pub final_state: RegistrySnapshot,
}

#[derive(Debug, Serialize)]
pub struct SidebarJson {
    pub order: Vec<String>,
    /// Whether reconciling altered the stored order
    pub changed: bool,
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

fn status_char(status: TaskStatus) -> char {
    match status {
        TaskStatus::Active => ' ',
        TaskStatus::Closed => 'x',
        TaskStatus::Deleted => '-',
    }
}

/// Format a single task as a one-line summary
pub fn format_task_line(task: &Task) -> String {
    let labels_str = if task.labels.is_empty() {
        String::new()
    } else {
        format!(
            " {}",
            task.labels
                .iter()
                .map(|l| format!("#{}", l))
                .collect::<Vec<_>>()
                .join(" ")
        )
    };
    let folder_str = task
        .folder_id
        .as_ref()
        .map(|f| format!(" (folder {})", f))
        .unwrap_or_default();
    let attached_str = if task.attachments.is_empty() {
        String::new()
    } else {
        format!(
            " +[{}]",
            task.attachments
                .iter()
                .map(|a| a.id.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    };
    format!(
        "[{}] {} {}{}{}{}",
        status_char(task.status),
        task.id,
        task.title,
        labels_str,
        folder_str,
        attached_str
    )
}

pub fn format_call_line(call: &RecordedCall) -> String {
    let marker = if call.ok { "ok  " } else { "FAIL" };
    if call.body.is_null() {
        format!("{} {}", marker, call.kind)
    } else {
        format!("{} {} {}", marker, call.kind, call.body)
    }
}

/// Final registry state: main list, workarea, then the sidebar order
pub fn format_snapshot(snapshot: &RegistrySnapshot) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push("tasks:".to_string());
    for task in &snapshot.tasks {
        let focus = if snapshot.workarea.as_deref() == Some(task.id.as_str()) {
            "* "
        } else {
            "  "
        };
        lines.push(format!("{}{}", focus, format_task_line(task)));
    }
    if !snapshot.labels.is_empty() {
        let names: Vec<&str> = snapshot.labels.iter().map(|l| l.name.as_str()).collect();
        lines.push(format!("labels: {}", names.join(", ")));
    }
    lines.push(format!("sidebar: {}", snapshot.sidebar.join(", ")));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CallKind;
    use insta::assert_snapshot;
    use serde_json::json;

    #[test]
    fn task_line_shows_labels_folder_and_attachments() {
        let mut task = Task::new("t2", "Call bank");
        task.labels = vec!["work".into(), "urgent".into()];
        task.folder_id = Some("f1".into());
        task.attachments
            .push(Task::new("t5", "Find statement").attachment_snapshot());
        assert_snapshot!(format_task_line(&task), @"[ ] t2 Call bank #work #urgent (folder f1) +[t5]");

        task.status = TaskStatus::Closed;
        task.labels.clear();
        task.folder_id = None;
        task.attachments.clear();
        assert_snapshot!(format_task_line(&task), @"[x] t2 Call bank");
    }

    #[test]
    fn call_line_marks_failures() {
        let call = RecordedCall {
            kind: CallKind::ReorderFolders,
            body: json!({ "folderIds": ["f3", "f1"] }),
            ok: false,
        };
        assert_snapshot!(format_call_line(&call), @r#"FAIL reorderFolders {"folderIds":["f3","f1"]}"#);
    }
}

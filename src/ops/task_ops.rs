use crate::model::folder::FolderId;
use crate::model::task::{Attachment, Task, TaskStatus};

/// Error type for task operations
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("task {0} cannot be attached to itself")]
    SelfAttachment(String),
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// Append `name` to the task's label sequence. No-op if already present.
/// Returns true if the task changed.
pub fn add_label(task: &mut Task, name: &str) -> bool {
    if task.has_label(name) {
        return false;
    }
    task.labels.push(name.to_string());
    true
}

pub fn remove_label(task: &mut Task, name: &str) -> bool {
    let before = task.labels.len();
    task.labels.retain(|l| l != name);
    task.labels.len() != before
}

/// Rename a label in place, keeping its slot in the sequence. If the task
/// already carries `new_name`, the old entry is dropped instead.
pub fn rename_label(task: &mut Task, old_name: &str, new_name: &str) -> bool {
    let Some(idx) = task.labels.iter().position(|l| l == old_name) else {
        return false;
    };
    if task.has_label(new_name) {
        task.labels.remove(idx);
    } else {
        task.labels[idx] = new_name.to_string();
    }
    true
}

// ---------------------------------------------------------------------------
// Status and folder
// ---------------------------------------------------------------------------

pub fn set_status(task: &mut Task, status: TaskStatus) -> bool {
    if task.status == status {
        return false;
    }
    task.status = status;
    true
}

pub fn set_folder(task: &mut Task, folder_id: Option<FolderId>) -> bool {
    if task.folder_id == folder_id {
        return false;
    }
    task.folder_id = folder_id;
    true
}

/// Status change from a sidebar drop. Moving to `Active` also severs folder
/// membership (the unfiled view is the active view).
pub fn change_status(task: &mut Task, status: TaskStatus) -> bool {
    let mut changed = set_status(task, status);
    if status == TaskStatus::Active {
        changed |= set_folder(task, None);
    }
    changed
}

/// File a task into a folder. A filed task is always active.
pub fn reparent(task: &mut Task, folder_id: &str) -> bool {
    let moved = set_folder(task, Some(folder_id.to_string()));
    let reactivated = set_status(task, TaskStatus::Active);
    moved || reactivated
}

// ---------------------------------------------------------------------------
// Attachments
// ---------------------------------------------------------------------------

/// Attach a snapshot of another task. Returns Ok(false) if it is already
/// attached.
pub fn attach(task: &mut Task, attachment: Attachment) -> Result<bool, TaskError> {
    if attachment.id == task.id {
        return Err(TaskError::SelfAttachment(task.id.clone()));
    }
    if task.is_attached(&attachment.id) {
        return Ok(false);
    }
    task.attachments.push(attachment);
    Ok(true)
}

pub fn detach(task: &mut Task, attachment_id: &str) -> bool {
    let before = task.attachments.len();
    task.attachments.retain(|a| a.id != attachment_id);
    task.attachments.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_task() -> Task {
        let mut task = Task::new("t1", "Draft proposal");
        task.labels = vec!["work".into(), "q3".into()];
        task.folder_id = Some("f1".into());
        task
    }

    #[test]
    fn add_label_is_idempotent() {
        let mut task = sample_task();
        assert!(add_label(&mut task, "urgent"));
        let once = task.labels.clone();
        assert!(!add_label(&mut task, "urgent"));
        assert_eq!(task.labels, once);
        assert_eq!(task.labels, vec!["work", "q3", "urgent"]);
    }

    #[test]
    fn remove_label_only_touches_named_label() {
        let mut task = sample_task();
        assert!(remove_label(&mut task, "work"));
        assert_eq!(task.labels, vec!["q3"]);
        assert!(!remove_label(&mut task, "missing"));
    }

    #[test]
    fn rename_label_keeps_slot_and_dedupes() {
        let mut task = sample_task();
        assert!(rename_label(&mut task, "work", "job"));
        assert_eq!(task.labels, vec!["job", "q3"]);
        assert!(rename_label(&mut task, "job", "q3"));
        assert_eq!(task.labels, vec!["q3"]);
        assert!(!rename_label(&mut task, "nope", "x"));
    }

    #[test]
    fn change_status_to_active_clears_folder() {
        let mut task = sample_task();
        assert_eq!(task.status, TaskStatus::Active);
        assert!(change_status(&mut task, TaskStatus::Active));
        assert_eq!(task.folder_id, None);
        assert!(!change_status(&mut task, TaskStatus::Active));
    }

    #[test]
    fn change_status_to_closed_keeps_folder() {
        let mut task = sample_task();
        assert!(change_status(&mut task, TaskStatus::Closed));
        assert_eq!(task.status, TaskStatus::Closed);
        assert_eq!(task.folder_id.as_deref(), Some("f1"));
    }

    #[test]
    fn reparent_reactivates() {
        let mut task = sample_task();
        task.status = TaskStatus::Deleted;
        assert!(reparent(&mut task, "f1"));
        assert_eq!(task.status, TaskStatus::Active);
        assert!(!reparent(&mut task, "f1"));
        assert!(reparent(&mut task, "f2"));
        assert_eq!(task.folder_id.as_deref(), Some("f2"));
    }

    #[test]
    fn attach_rejects_self_and_duplicates() {
        let mut host = sample_task();
        let other = Task::new("t2", "Collect numbers");
        let own = host.attachment_snapshot();
        assert!(matches!(
            attach(&mut host, own),
            Err(TaskError::SelfAttachment(_))
        ));
        assert!(attach(&mut host, other.attachment_snapshot()).unwrap());
        assert!(!attach(&mut host, other.attachment_snapshot()).unwrap());
        assert_eq!(host.attachments.len(), 1);
        assert!(detach(&mut host, "t2"));
        assert!(!detach(&mut host, "t2"));
    }
}

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{Value, json};

use super::{BackendError, CallKind, Persistence};
use crate::model::folder::{Folder, FolderId};
use crate::model::label::{Label, LabelId, LabelPatch};
use crate::model::task::{Task, TaskId, TaskPatch};

/// One call received by the backend, with its JSON body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedCall {
    pub kind: CallKind,
    pub body: Value,
    pub ok: bool,
}

/// In-process backend that records every call and can be told to reject
/// calls of given kinds.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    calls: Vec<RecordedCall>,
    failing: HashSet<CallKind>,
    fail_next: usize,
    next_id: usize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every future call of `kind`
    pub fn fail_on(&mut self, kind: CallKind) {
        self.failing.insert(kind);
    }

    pub fn stop_failing(&mut self, kind: CallKind) {
        self.failing.remove(&kind);
    }

    /// Reject the next `n` calls regardless of kind
    pub fn fail_next(&mut self, n: usize) {
        self.fail_next = n;
    }

    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }

    /// Bodies of the calls of one kind, in arrival order
    pub fn bodies(&self, kind: CallKind) -> Vec<&Value> {
        self.calls
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| &c.body)
            .collect()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    fn record(&mut self, kind: CallKind, body: Value) -> Result<(), BackendError> {
        let fail = if self.fail_next > 0 {
            self.fail_next -= 1;
            true
        } else {
            self.failing.contains(&kind)
        };
        self.calls.push(RecordedCall {
            kind,
            body,
            ok: !fail,
        });
        if fail {
            return Err(BackendError::Rejected {
                call: kind,
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }

    fn fresh_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{}", prefix, self.next_id)
    }
}

impl Persistence for MemoryBackend {
    fn create_task(&mut self, title: &str, labels: &[String]) -> Result<Task, BackendError> {
        self.record(
            CallKind::CreateTask,
            json!({ "title": title, "labels": labels }),
        )?;
        let mut task = Task::new(self.fresh_id("t-"), title);
        task.labels = labels.to_vec();
        Ok(task)
    }

    fn update_task(&mut self, id: &str, patch: &TaskPatch) -> Result<(), BackendError> {
        self.record(CallKind::UpdateTask, json!({ "id": id, "patch": patch }))
    }

    fn delete_task(&mut self, id: &str) -> Result<(), BackendError> {
        self.record(CallKind::DeleteTask, json!({ "id": id }))
    }

    fn reorder_tasks(&mut self, ids: &[TaskId]) -> Result<(), BackendError> {
        self.record(CallKind::ReorderTasks, json!({ "taskIds": ids }))
    }

    fn empty_trash(&mut self) -> Result<(), BackendError> {
        self.record(CallKind::EmptyTrash, Value::Null)
    }

    fn create_label(&mut self, name: &str, color: &str) -> Result<Label, BackendError> {
        self.record(
            CallKind::CreateLabel,
            json!({ "name": name, "color": color }),
        )?;
        Ok(Label::new(self.fresh_id("l-"), name, color))
    }

    fn update_label(&mut self, id: &str, patch: &LabelPatch) -> Result<(), BackendError> {
        self.record(CallKind::UpdateLabel, json!({ "id": id, "patch": patch }))
    }

    fn delete_label(&mut self, id: &str) -> Result<(), BackendError> {
        self.record(CallKind::DeleteLabel, json!({ "id": id }))
    }

    fn reorder_labels(&mut self, ids: &[LabelId]) -> Result<(), BackendError> {
        self.record(CallKind::ReorderLabels, json!({ "labelIds": ids }))
    }

    fn create_folder(&mut self, name: &str) -> Result<Folder, BackendError> {
        self.record(CallKind::CreateFolder, json!({ "name": name }))?;
        Ok(Folder::new(self.fresh_id("f-"), name))
    }

    fn rename_folder(&mut self, id: &str, name: &str) -> Result<(), BackendError> {
        self.record(CallKind::RenameFolder, json!({ "id": id, "name": name }))
    }

    fn delete_folder(&mut self, id: &str) -> Result<(), BackendError> {
        self.record(CallKind::DeleteFolder, json!({ "id": id }))
    }

    fn reorder_folders(&mut self, ids: &[FolderId]) -> Result<(), BackendError> {
        self.record(CallKind::ReorderFolders, json!({ "folderIds": ids }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::TaskStatus;
    use pretty_assertions::assert_eq;

    #[test]
    fn records_update_body() {
        let mut backend = MemoryBackend::new();
        let patch = TaskPatch {
            status: Some(TaskStatus::Closed),
            ..Default::default()
        };
        backend.update_task("t1", &patch).unwrap();
        assert_eq!(
            backend.bodies(CallKind::UpdateTask),
            vec![&json!({ "id": "t1", "patch": { "status": "Closed" } })]
        );
    }

    #[test]
    fn failure_injection_by_kind_and_count() {
        let mut backend = MemoryBackend::new();
        backend.fail_on(CallKind::ReorderTasks);
        assert!(backend.reorder_tasks(&["t1".to_string()]).is_err());
        assert!(backend.reorder_labels(&[]).is_ok());

        backend.fail_next(1);
        assert!(backend.delete_task("t1").is_err());
        assert!(backend.delete_task("t1").is_ok());

        let oks: Vec<bool> = backend.calls().iter().map(|c| c.ok).collect();
        assert_eq!(oks, vec![false, true, false, true]);
    }

    #[test]
    fn creates_assign_fresh_ids() {
        let mut backend = MemoryBackend::new();
        let a = backend.create_folder("Work").unwrap();
        let b = backend.create_label("urgent", "red").unwrap();
        assert_eq!(a.id, "f-1");
        assert_eq!(b.id, "l-2");
        assert!(backend.create_folder("x").is_ok());
    }
}

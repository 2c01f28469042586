//! Persistence seam.
//!
//! The engine never talks to a transport directly. Hosts implement
//! [`Persistence`] over whatever backend they have; [`memory::MemoryBackend`]
//! is the in-process implementation used by the replay CLI and the tests.

pub mod memory;

use serde::{Deserialize, Serialize};

use crate::model::folder::{Folder, FolderId};
use crate::model::label::{Label, LabelId, LabelPatch};
use crate::model::task::{Task, TaskId, TaskPatch};

/// Error type for persistence calls
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("backend rejected {call}: {message}")]
    Rejected { call: CallKind, message: String },
    #[error("backend unreachable: {0}")]
    Unreachable(String),
    #[error("not found on backend: {0}")]
    NotFound(String),
}

/// Operations the engine consumes from its persistence collaborator
pub trait Persistence {
    fn create_task(&mut self, title: &str, labels: &[String]) -> Result<Task, BackendError>;
    fn update_task(&mut self, id: &str, patch: &TaskPatch) -> Result<(), BackendError>;
    fn delete_task(&mut self, id: &str) -> Result<(), BackendError>;
    fn reorder_tasks(&mut self, ids: &[TaskId]) -> Result<(), BackendError>;
    /// Permanently delete every task with status `Deleted`
    fn empty_trash(&mut self) -> Result<(), BackendError>;

    fn create_label(&mut self, name: &str, color: &str) -> Result<Label, BackendError>;
    fn update_label(&mut self, id: &str, patch: &LabelPatch) -> Result<(), BackendError>;
    fn delete_label(&mut self, id: &str) -> Result<(), BackendError>;
    fn reorder_labels(&mut self, ids: &[LabelId]) -> Result<(), BackendError>;

    fn create_folder(&mut self, name: &str) -> Result<Folder, BackendError>;
    fn rename_folder(&mut self, id: &str, name: &str) -> Result<(), BackendError>;
    fn delete_folder(&mut self, id: &str) -> Result<(), BackendError>;
    fn reorder_folders(&mut self, ids: &[FolderId]) -> Result<(), BackendError>;
}

/// Name of a persistence operation, used for logging and failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CallKind {
    CreateTask,
    UpdateTask,
    DeleteTask,
    ReorderTasks,
    EmptyTrash,
    CreateLabel,
    UpdateLabel,
    DeleteLabel,
    ReorderLabels,
    CreateFolder,
    RenameFolder,
    DeleteFolder,
    ReorderFolders,
}

impl std::fmt::Display for CallKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CallKind::CreateTask => "createTask",
            CallKind::UpdateTask => "updateTask",
            CallKind::DeleteTask => "deleteTask",
            CallKind::ReorderTasks => "reorderTasks",
            CallKind::EmptyTrash => "emptyTrash",
            CallKind::CreateLabel => "createLabel",
            CallKind::UpdateLabel => "updateLabel",
            CallKind::DeleteLabel => "deleteLabel",
            CallKind::ReorderLabels => "reorderLabels",
            CallKind::CreateFolder => "createFolder",
            CallKind::RenameFolder => "renameFolder",
            CallKind::DeleteFolder => "deleteFolder",
            CallKind::ReorderFolders => "reorderFolders",
        };
        write!(f, "{}", name)
    }
}

/// A deferred write issued by an optimistic transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum BackendCall {
    UpdateTask { id: TaskId, patch: TaskPatch },
    ReorderTasks { ids: Vec<TaskId> },
    ReorderLabels { ids: Vec<LabelId> },
    ReorderFolders { ids: Vec<FolderId> },
}

impl BackendCall {
    pub fn kind(&self) -> CallKind {
        match self {
            BackendCall::UpdateTask { .. } => CallKind::UpdateTask,
            BackendCall::ReorderTasks { .. } => CallKind::ReorderTasks,
            BackendCall::ReorderLabels { .. } => CallKind::ReorderLabels,
            BackendCall::ReorderFolders { .. } => CallKind::ReorderFolders,
        }
    }

    pub fn send(&self, backend: &mut dyn Persistence) -> Result<(), BackendError> {
        match self {
            BackendCall::UpdateTask { id, patch } => backend.update_task(id, patch),
            BackendCall::ReorderTasks { ids } => backend.reorder_tasks(ids),
            BackendCall::ReorderLabels { ids } => backend.reorder_labels(ids),
            BackendCall::ReorderFolders { ids } => backend.reorder_folders(ids),
        }
    }
}

impl std::fmt::Display for BackendCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendCall::UpdateTask { id, patch } => {
                let body = serde_json::to_string(patch).map_err(|_| std::fmt::Error)?;
                write!(f, "updateTask({}, {})", id, body)
            }
            BackendCall::ReorderTasks { ids } => write!(f, "reorderTasks({:?})", ids),
            BackendCall::ReorderLabels { ids } => write!(f, "reorderLabels({:?})", ids),
            BackendCall::ReorderFolders { ids } => write!(f, "reorderFolders({:?})", ids),
        }
    }
}

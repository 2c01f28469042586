use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::folder::FolderId;

pub type TaskId = String;

/// Task lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Active,
    Closed,
    Deleted,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Active => write!(f, "active"),
            TaskStatus::Closed => write!(f, "closed"),
            TaskStatus::Deleted => write!(f, "deleted"),
        }
    }
}

/// A denormalized reference to another task, stored on the task it is
/// attached to. The snapshot is taken at attach time and is not kept in sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: TaskId,
    pub title: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub labels: Vec<String>,
}

/// A task row as held by the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    /// Label names, unique, in the order they were added to this task
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub folder_id: Option<FolderId>,
    pub status: TaskStatus,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub assigned_agent_ids: BTreeSet<String>,
    /// Ordinal among siblings in the main list
    #[serde(default)]
    pub position: usize,
}

impl Task {
    /// Create an active, unfiled task with no labels
    pub fn new(id: impl Into<TaskId>, title: impl Into<String>) -> Self {
        Task {
            id: id.into(),
            title: title.into(),
            labels: Vec::new(),
            folder_id: None,
            status: TaskStatus::Active,
            attachments: Vec::new(),
            assigned_agent_ids: BTreeSet::new(),
            position: 0,
        }
    }

    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l == name)
    }

    pub fn is_attached(&self, task_id: &str) -> bool {
        self.attachments.iter().any(|a| a.id == task_id)
    }

    /// Snapshot used when this task is attached under another one
    pub fn attachment_snapshot(&self) -> Attachment {
        Attachment {
            id: self.id.clone(),
            title: self.title.clone(),
            status: self.status,
            labels: self.labels.clone(),
        }
    }
}

/// Partial field update sent to the backend with `update_task`.
///
/// Only `Some` fields are serialized. `folder_id: Some(None)` serializes as
/// an explicit `null`, which the backend reads as "clear the folder".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "double_option"
    )]
    pub folder_id: Option<Option<FolderId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.labels.is_none()
            && self.folder_id.is_none()
            && self.status.is_none()
            && self.attachments.is_none()
    }

    /// Write the patched fields into `task`
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(labels) = &self.labels {
            task.labels = labels.clone();
        }
        if let Some(folder_id) = &self.folder_id {
            task.folder_id = folder_id.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(attachments) = &self.attachments {
            task.attachments = attachments.clone();
        }
    }
}

/// Distinguishes an absent field from an explicit `null` on deserialize.
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

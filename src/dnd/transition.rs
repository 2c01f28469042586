//! Transition classification.
//!
//! [`classify`] maps a drag source and the resolved drop target onto one
//! [`Transition`]. Rules are checked in a fixed precedence order and the first
//! match wins; a pair no rule covers becomes [`Transition::Noop`]. Reorder
//! indices are read from the registry at classification time, nothing is
//! mutated here.

use serde::Serialize;

use crate::model::entity::{Container, DragSource, DropTarget};
use crate::model::folder::FolderId;
use crate::model::registry::Registry;
use crate::model::sidebar::SidebarItem;
use crate::model::task::{TaskId, TaskStatus};

/// What dropping outside every zone means for the dragged entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "detach", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Detach {
    /// A label chip dragged off its task
    RemoveLabel { task_id: TaskId, name: String },
    /// An attachment chip dragged off its owner
    Unlink { owner: TaskId, attachment: TaskId },
    /// The workarea occupant dragged out of the workarea
    Unassign { task_id: TaskId },
    Nothing,
}

/// A named state mutation fired by a completed drop
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "transition", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Transition {
    Detach(Detach),
    Retag {
        task_id: TaskId,
        label: String,
    },
    ChangeStatus {
        task_id: TaskId,
        status: TaskStatus,
    },
    Reparent {
        task_id: TaskId,
        folder_id: FolderId,
    },
    /// Drop into the workarea: occupy it when empty, attach to the occupant
    /// otherwise
    Focus {
        task_id: TaskId,
    },
    Reorder {
        container: Container,
        old_index: usize,
        new_index: usize,
    },
    ReorderLabels {
        old_index: usize,
        new_index: usize,
    },
    ReorderSidebar {
        old_index: usize,
        new_index: usize,
    },
    Noop,
}

impl Transition {
    pub fn is_noop(&self) -> bool {
        matches!(self, Transition::Noop | Transition::Detach(Detach::Nothing))
    }

    /// The task whose fields this transition writes, if any
    pub fn task_id(&self) -> Option<&str> {
        match self {
            Transition::Detach(Detach::RemoveLabel { task_id, .. })
            | Transition::Detach(Detach::Unassign { task_id })
            | Transition::Retag { task_id, .. }
            | Transition::ChangeStatus { task_id, .. }
            | Transition::Reparent { task_id, .. }
            | Transition::Focus { task_id } => Some(task_id),
            Transition::Detach(Detach::Unlink { owner, .. }) => Some(owner),
            _ => None,
        }
    }
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transition::Detach(Detach::RemoveLabel { task_id, name }) => {
                write!(f, "remove-label {} from {}", name, task_id)
            }
            Transition::Detach(Detach::Unlink { owner, attachment }) => {
                write!(f, "unlink {} from {}", attachment, owner)
            }
            Transition::Detach(Detach::Unassign { task_id }) => {
                write!(f, "unassign {}", task_id)
            }
            Transition::Detach(Detach::Nothing) => write!(f, "detach (no-op)"),
            Transition::Retag { task_id, label } => write!(f, "retag {} +{}", task_id, label),
            Transition::ChangeStatus { task_id, status } => {
                write!(f, "status {} -> {}", task_id, status)
            }
            Transition::Reparent { task_id, folder_id } => {
                write!(f, "reparent {} -> folder {}", task_id, folder_id)
            }
            Transition::Focus { task_id } => write!(f, "focus {}", task_id),
            Transition::Reorder {
                container,
                old_index,
                new_index,
            } => {
                let list = match container {
                    Container::Main => "main".to_string(),
                    Container::Workarea => "workarea".to_string(),
                    Container::Folder(id) => format!("folder {}", id),
                };
                write!(f, "reorder {} {} -> {}", list, old_index, new_index)
            }
            Transition::ReorderLabels {
                old_index,
                new_index,
            } => write!(f, "reorder labels {} -> {}", old_index, new_index),
            Transition::ReorderSidebar {
                old_index,
                new_index,
            } => write!(f, "reorder sidebar {} -> {}", old_index, new_index),
            Transition::Noop => write!(f, "noop"),
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

pub fn classify(
    source: &DragSource,
    target: Option<&DropTarget>,
    registry: &Registry,
) -> Transition {
    let Some(target) = target else {
        return Transition::Detach(detach_for(source));
    };

    retag(source, target)
        .or_else(|| change_status(source, target))
        .or_else(|| reparent(source, target))
        .or_else(|| focus(source, target))
        .or_else(|| reorder_tasks(source, target, registry))
        .or_else(|| reorder_labels(source, target, registry))
        .or_else(|| reorder_sidebar(source, target, registry))
        .unwrap_or(Transition::Noop)
}

fn detach_for(source: &DragSource) -> Detach {
    match source {
        DragSource::TaskLabel { task_id, name } => Detach::RemoveLabel {
            task_id: task_id.clone(),
            name: name.clone(),
        },
        DragSource::Attachment { owner, id } => Detach::Unlink {
            owner: owner.clone(),
            attachment: id.clone(),
        },
        DragSource::Task {
            id,
            container: Container::Workarea,
        } => Detach::Unassign { task_id: id.clone() },
        _ => Detach::Nothing,
    }
}

fn retag(source: &DragSource, target: &DropTarget) -> Option<Transition> {
    match (source, target) {
        (DragSource::SidebarLabel { name, .. }, DropTarget::Task { id, .. })
        | (DragSource::Task { id, .. }, DropTarget::Label { name, .. }) => {
            Some(Transition::Retag {
                task_id: id.clone(),
                label: name.clone(),
            })
        }
        _ => None,
    }
}

fn change_status(source: &DragSource, target: &DropTarget) -> Option<Transition> {
    let (DragSource::Task { id, .. }, DropTarget::SystemTarget { target }) = (source, target)
    else {
        return None;
    };
    target.status().map(|status| Transition::ChangeStatus {
        task_id: id.clone(),
        status,
    })
}

fn reparent(source: &DragSource, target: &DropTarget) -> Option<Transition> {
    match (source, target) {
        (DragSource::Task { id, .. }, DropTarget::Folder { id: folder_id }) => {
            Some(Transition::Reparent {
                task_id: id.clone(),
                folder_id: folder_id.clone(),
            })
        }
        _ => None,
    }
}

fn focus(source: &DragSource, target: &DropTarget) -> Option<Transition> {
    match source {
        DragSource::Task { id, container }
            if *container != Container::Workarea && target.is_workarea() =>
        {
            Some(Transition::Focus { task_id: id.clone() })
        }
        _ => None,
    }
}

fn reorder_tasks(
    source: &DragSource,
    target: &DropTarget,
    registry: &Registry,
) -> Option<Transition> {
    let (
        DragSource::Task { id, container },
        DropTarget::Task {
            id: over,
            container: over_container,
        },
    ) = (source, target)
    else {
        return None;
    };
    if container != over_container || id == over {
        return None;
    }
    let old_index = registry.index_in_container(container, id)?;
    let new_index = registry.index_in_container(container, over)?;
    Some(Transition::Reorder {
        container: container.clone(),
        old_index,
        new_index,
    })
}

fn reorder_labels(
    source: &DragSource,
    target: &DropTarget,
    registry: &Registry,
) -> Option<Transition> {
    let (DragSource::SidebarLabel { id, .. }, DropTarget::Label { id: over, .. }) = (source, target)
    else {
        return None;
    };
    if id == over {
        return None;
    }
    Some(Transition::ReorderLabels {
        old_index: registry.label_index(id)?,
        new_index: registry.label_index(over)?,
    })
}

fn reorder_sidebar(
    source: &DragSource,
    target: &DropTarget,
    registry: &Registry,
) -> Option<Transition> {
    let from: SidebarItem = source.sidebar_item()?;
    let to: SidebarItem = target.sidebar_item()?;
    if from == to {
        return None;
    }
    Some(Transition::ReorderSidebar {
        old_index: registry.sidebar().position(&from)?,
        new_index: registry.sidebar().position(&to)?,
    })
}

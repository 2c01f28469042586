use serde::{Deserialize, Serialize};

use super::folder::FolderId;
use super::label::LabelId;
use super::sidebar::{SidebarItem, SystemTarget};
use super::task::TaskId;

/// Coarse kind of a draggable or droppable entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Task,
    Label,
    Folder,
    SidebarSystemTarget,
    WorkareaSlot,
}

/// Which list currently renders a task
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "list", content = "folder", rename_all = "camelCase")]
pub enum Container {
    /// The main task list
    Main,
    /// The single-slot focus workarea
    Workarea,
    /// A folder's task sub-list in the sidebar
    Folder(FolderId),
}

/// The entity picked up by a gesture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DragSource {
    Task {
        id: TaskId,
        container: Container,
    },
    /// A label's drag handle in the sidebar label list
    SidebarLabel { id: LabelId, name: String },
    /// A label chip rendered on a task row
    TaskLabel { task_id: TaskId, name: String },
    /// An attachment chip rendered under its owning task
    Attachment { owner: TaskId, id: TaskId },
    Folder { id: FolderId },
    SystemTarget { target: SystemTarget },
}

impl DragSource {
    pub fn kind(&self) -> EntityKind {
        match self {
            DragSource::Task { .. } | DragSource::Attachment { .. } => EntityKind::Task,
            DragSource::SidebarLabel { .. } | DragSource::TaskLabel { .. } => EntityKind::Label,
            DragSource::Folder { .. } => EntityKind::Folder,
            DragSource::SystemTarget { .. } => EntityKind::SidebarSystemTarget,
        }
    }

    pub fn is_label(&self) -> bool {
        self.kind() == EntityKind::Label
    }

    pub fn is_workarea_task(&self) -> bool {
        matches!(
            self,
            DragSource::Task {
                container: Container::Workarea,
                ..
            }
        )
    }

    /// The sidebar order entry this source occupies, if it is a sidebar item
    pub fn sidebar_item(&self) -> Option<SidebarItem> {
        match self {
            DragSource::Folder { id } => Some(SidebarItem::Folder(id.clone())),
            DragSource::SystemTarget { target } => Some(SidebarItem::System(*target)),
            _ => None,
        }
    }

    /// True if `target` is the drop zone of the dragged entity itself
    pub fn is_own_zone(&self, target: &DropTarget) -> bool {
        match (self, target) {
            (DragSource::Task { id, .. }, DropTarget::Task { id: tid, .. }) => id == tid,
            (DragSource::SidebarLabel { id, .. }, DropTarget::Label { id: lid, .. }) => id == lid,
            (DragSource::Folder { id }, DropTarget::Folder { id: fid }) => id == fid,
            (DragSource::SystemTarget { target: a }, DropTarget::SystemTarget { target: b }) => {
                a == b
            }
            _ => false,
        }
    }
}

/// What a drop zone stands for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DropTarget {
    Task {
        id: TaskId,
        container: Container,
    },
    /// A label chip in the sidebar label list
    Label { id: LabelId, name: String },
    Folder { id: FolderId },
    SystemTarget { target: SystemTarget },
    WorkareaSlot,
}

impl DropTarget {
    pub fn kind(&self) -> EntityKind {
        match self {
            DropTarget::Task { .. } => EntityKind::Task,
            DropTarget::Label { .. } => EntityKind::Label,
            DropTarget::Folder { .. } => EntityKind::Folder,
            DropTarget::SystemTarget { .. } => EntityKind::SidebarSystemTarget,
            DropTarget::WorkareaSlot => EntityKind::WorkareaSlot,
        }
    }

    /// Sidebar kinds get no snap-back drop animation
    pub fn is_sidebar(&self) -> bool {
        matches!(
            self,
            DropTarget::Label { .. } | DropTarget::Folder { .. } | DropTarget::SystemTarget { .. }
        )
    }

    pub fn is_workarea(&self) -> bool {
        matches!(
            self,
            DropTarget::WorkareaSlot
                | DropTarget::Task {
                    container: Container::Workarea,
                    ..
                }
        )
    }

    pub fn sidebar_item(&self) -> Option<SidebarItem> {
        match self {
            DropTarget::Folder { id } => Some(SidebarItem::Folder(id.clone())),
            DropTarget::SystemTarget { target } => Some(SidebarItem::System(*target)),
            _ => None,
        }
    }
}

impl std::fmt::Display for DropTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropTarget::Task { id, .. } => write!(f, "task:{}", id),
            DropTarget::Label { name, .. } => write!(f, "label:{}", name),
            DropTarget::Folder { id } => write!(f, "folder:{}", id),
            DropTarget::SystemTarget { target } => write!(f, "system:{}", target.name()),
            DropTarget::WorkareaSlot => write!(f, "workarea"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidebar_targets_are_flagged_for_no_animation() {
        assert!(DropTarget::Folder { id: "f1".into() }.is_sidebar());
        assert!(
            DropTarget::SystemTarget {
                target: SystemTarget::Closed
            }
            .is_sidebar()
        );
        assert!(!DropTarget::WorkareaSlot.is_sidebar());
        assert!(
            !DropTarget::Task {
                id: "t1".into(),
                container: Container::Main
            }
            .is_sidebar()
        );
    }

    #[test]
    fn own_zone_matches_same_entity_only() {
        let src = DragSource::Task {
            id: "t1".into(),
            container: Container::Main,
        };
        assert!(src.is_own_zone(&DropTarget::Task {
            id: "t1".into(),
            container: Container::Main
        }));
        assert!(!src.is_own_zone(&DropTarget::Task {
            id: "t2".into(),
            container: Container::Main
        }));
        assert!(!src.is_own_zone(&DropTarget::WorkareaSlot));
    }

    #[test]
    fn source_deserializes_from_tagged_json() {
        let src: DragSource = serde_json::from_str(
            r#"{"kind":"task","id":"t1","container":{"list":"workarea"}}"#,
        )
        .unwrap();
        assert!(src.is_workarea_task());
        let label: DragSource =
            serde_json::from_str(r#"{"kind":"sidebarLabel","id":"l1","name":"urgent"}"#)
                .unwrap();
        assert_eq!(label.kind(), EntityKind::Label);
    }
}

//! Optimistic transition execution.
//!
//! [`execute`] applies a transition to the registry immediately and returns a
//! [`Command`] describing what it wrote: one [`Effect`] per touched field or
//! list, each holding the value before and after, plus the persistence call
//! still owed to the backend. Commands wait in the [`Outbox`] until the host
//! flushes them.
//!
//! Rolling a command back restores only the values it wrote, and only where
//! no later command wrote the same [`Slot`] and the registry still holds
//! exactly what it wrote. Anything else is left alone and its view is
//! reported as needing a re-fetch.

use std::collections::{HashSet, VecDeque};

use super::fetch::ListingView;
use super::transition::{Detach, Transition};
use crate::backend::BackendCall;
use crate::model::entity::Container;
use crate::model::label::LabelId;
use crate::model::registry::Registry;
use crate::model::sidebar::SidebarOrder;
use crate::model::task::{Task, TaskId, TaskPatch, TaskStatus};
use crate::ops::task_ops;

/// A single place in the registry a command can write
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Slot {
    Labels(TaskId),
    Folder(TaskId),
    Status(TaskId),
    Attachments(TaskId),
    TaskOrder,
    LabelOrder,
    Sidebar,
    Workarea,
}

/// One value a command overwrote
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Fields of one task. Both patches carry the same set of fields.
    TaskFields {
        id: TaskId,
        before: TaskPatch,
        after: TaskPatch,
    },
    TaskOrder {
        before: Vec<TaskId>,
        after: Vec<TaskId>,
    },
    LabelOrder {
        before: Vec<LabelId>,
        after: Vec<LabelId>,
    },
    Sidebar {
        before: SidebarOrder,
        after: SidebarOrder,
    },
    Workarea {
        before: Option<TaskId>,
        after: Option<TaskId>,
    },
}

impl Effect {
    pub fn view(&self) -> ListingView {
        match self {
            Effect::TaskFields { .. } | Effect::TaskOrder { .. } | Effect::Workarea { .. } => {
                ListingView::Tasks
            }
            Effect::LabelOrder { .. } => ListingView::Labels,
            Effect::Sidebar { .. } => ListingView::Folders,
        }
    }

    /// Slots this effect wrote
    pub fn slots(&self) -> Vec<Slot> {
        match self {
            Effect::TaskFields { id, after, .. } => {
                let mut slots = Vec::new();
                if after.labels.is_some() {
                    slots.push(Slot::Labels(id.clone()));
                }
                if after.folder_id.is_some() {
                    slots.push(Slot::Folder(id.clone()));
                }
                if after.status.is_some() {
                    slots.push(Slot::Status(id.clone()));
                }
                if after.attachments.is_some() {
                    slots.push(Slot::Attachments(id.clone()));
                }
                slots
            }
            Effect::TaskOrder { .. } => vec![Slot::TaskOrder],
            Effect::LabelOrder { .. } => vec![Slot::LabelOrder],
            Effect::Sidebar { .. } => vec![Slot::Sidebar],
            Effect::Workarea { .. } => vec![Slot::Workarea],
        }
    }

    /// Put back the pre-command value. Slots in `later` belong to commands
    /// queued after this one and are never reverted. Returns false if any
    /// part was left in place.
    fn revert(&self, registry: &mut Registry, later: &HashSet<Slot>) -> bool {
        let superseded = self.slots().iter().any(|slot| later.contains(slot));
        match self {
            Effect::TaskFields { id, before, after } => {
                let Some(task) = registry.task_mut(id) else {
                    return false;
                };
                revert_fields(task, before, after, |slot| !later.contains(&slot))
            }
            _ if superseded => false,
            Effect::TaskOrder { before, after } => {
                if registry.task_order() != after.as_slice() {
                    return false;
                }
                registry.restore_task_order(before);
                true
            }
            Effect::LabelOrder { before, after } => {
                if registry.label_order() != after.as_slice() {
                    return false;
                }
                registry.restore_label_order(before);
                true
            }
            Effect::Sidebar { before, after } => {
                if registry.sidebar() != after {
                    return false;
                }
                registry.restore_sidebar(before.clone());
                true
            }
            Effect::Workarea { before, after } => {
                if registry.workarea() != after.as_ref() {
                    return false;
                }
                registry.set_workarea(before.clone());
                true
            }
        }
    }
}

fn revert_fields(
    task: &mut Task,
    before: &TaskPatch,
    after: &TaskPatch,
    free: impl Fn(Slot) -> bool,
) -> bool {
    let id = task.id.clone();
    let mut clean = true;
    clean &= restore(
        &mut task.labels,
        &before.labels,
        &after.labels,
        free(Slot::Labels(id.clone())),
    );
    clean &= restore(
        &mut task.folder_id,
        &before.folder_id,
        &after.folder_id,
        free(Slot::Folder(id.clone())),
    );
    clean &= restore(
        &mut task.status,
        &before.status,
        &after.status,
        free(Slot::Status(id.clone())),
    );
    clean &= restore(
        &mut task.attachments,
        &before.attachments,
        &after.attachments,
        free(Slot::Attachments(id)),
    );
    clean
}

/// Revert one field. A field the command did not write is trivially clean;
/// one that is not `free` or no longer holds `after` is left in place.
fn restore<T: PartialEq + Clone>(
    field: &mut T,
    before: &Option<T>,
    after: &Option<T>,
    free: bool,
) -> bool {
    let (Some(before), Some(after)) = (before, after) else {
        return true;
    };
    if !free || *field != *after {
        return false;
    }
    *field = before.clone();
    true
}

/// Current values of exactly the fields `fields` sets
fn capture(task: &Task, fields: &TaskPatch) -> TaskPatch {
    TaskPatch {
        labels: fields.labels.as_ref().map(|_| task.labels.clone()),
        folder_id: fields.folder_id.as_ref().map(|_| task.folder_id.clone()),
        status: fields.status.map(|_| task.status),
        attachments: fields.attachments.as_ref().map(|_| task.attachments.clone()),
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// An applied transition and the write it still owes the backend
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    /// Position in gesture order, assigned by the outbox
    pub seq: u64,
    pub transition: Transition,
    pub effects: Vec<Effect>,
    /// None for commands that only touch transient state
    pub call: Option<BackendCall>,
    /// Task whose agent-relevant fields (labels, folder, attachments) changed
    pub agent_change: Option<TaskId>,
}

impl Command {
    fn new(transition: &Transition, effect: Effect, call: Option<BackendCall>) -> Self {
        Command {
            seq: 0,
            transition: transition.clone(),
            effects: vec![effect],
            call,
            agent_change: None,
        }
    }

    fn with_agent_change(mut self, id: &str) -> Self {
        self.agent_change = Some(id.to_string());
        self
    }

    pub fn touches_sidebar(&self) -> bool {
        self.effects
            .iter()
            .any(|e| matches!(e, Effect::Sidebar { .. }))
    }

    /// Every slot this command wrote
    pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        self.effects.iter().flat_map(Effect::slots)
    }

    /// Undo this command's effects, newest first, leaving alone any slot in
    /// `later` (written by commands still queued behind this one). Returns
    /// the views that could not be restored cleanly.
    pub fn rollback(&self, registry: &mut Registry, later: &HashSet<Slot>) -> Vec<ListingView> {
        let mut dirty = Vec::new();
        for effect in self.effects.iter().rev() {
            if !effect.revert(registry, later) && !dirty.contains(&effect.view()) {
                dirty.push(effect.view());
            }
        }
        dirty
    }
}

/// Commands applied locally and not yet sent, in gesture order
#[derive(Debug, Default)]
pub struct Outbox {
    pending: VecDeque<Command>,
    next_seq: u64,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mut command: Command) -> u64 {
        self.next_seq += 1;
        command.seq = self.next_seq;
        self.pending.push_back(command);
        self.next_seq
    }

    pub fn pop(&mut self) -> Option<Command> {
        self.pending.pop_front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.pending.iter()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Slots written by the commands still queued
    pub fn pending_slots(&self) -> HashSet<Slot> {
        self.pending.iter().flat_map(Command::slots).collect()
    }
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Apply `transition` to the registry. Returns None when nothing changed
/// (no-op transitions, idempotent repeats, entities that no longer exist).
pub fn execute(transition: &Transition, registry: &mut Registry) -> Option<Command> {
    match transition {
        Transition::Noop | Transition::Detach(Detach::Nothing) => None,
        Transition::Retag { task_id, label } => {
            let cmd = update_task(transition, registry, task_id, |next| {
                task_ops::add_label(next, label).then(|| TaskPatch {
                    labels: Some(next.labels.clone()),
                    ..Default::default()
                })
            })?;
            Some(cmd.with_agent_change(task_id))
        }
        Transition::Detach(Detach::RemoveLabel { task_id, name }) => {
            update_task(transition, registry, task_id, |next| {
                task_ops::remove_label(next, name).then(|| TaskPatch {
                    labels: Some(next.labels.clone()),
                    ..Default::default()
                })
            })
        }
        Transition::ChangeStatus { task_id, status } => {
            update_task(transition, registry, task_id, |next| {
                task_ops::change_status(next, *status).then(|| TaskPatch {
                    status: Some(*status),
                    folder_id: (*status == TaskStatus::Active).then_some(None),
                    ..Default::default()
                })
            })
        }
        Transition::Reparent { task_id, folder_id } => {
            let cmd = update_task(transition, registry, task_id, |next| {
                task_ops::reparent(next, folder_id).then(|| TaskPatch {
                    folder_id: Some(Some(folder_id.clone())),
                    status: Some(TaskStatus::Active),
                    ..Default::default()
                })
            })?;
            Some(cmd.with_agent_change(task_id))
        }
        Transition::Focus { task_id } => focus(transition, registry, task_id),
        Transition::Detach(Detach::Unassign { task_id }) => {
            if registry.workarea().map(String::as_str) != Some(task_id.as_str()) {
                return None;
            }
            let before = registry.set_workarea(None);
            Some(Command::new(
                transition,
                Effect::Workarea {
                    before,
                    after: None,
                },
                None,
            ))
        }
        Transition::Detach(Detach::Unlink { owner, attachment }) => {
            update_task(transition, registry, owner, |next| {
                task_ops::detach(next, attachment).then(|| TaskPatch {
                    attachments: Some(next.attachments.clone()),
                    ..Default::default()
                })
            })
        }
        Transition::Reorder {
            container,
            old_index,
            new_index,
        } => reorder_tasks(transition, registry, container, *old_index, *new_index),
        Transition::ReorderLabels {
            old_index,
            new_index,
        } => {
            let before = registry.label_order();
            if !registry.move_label(*old_index, *new_index) {
                return None;
            }
            let after = registry.label_order();
            let call = BackendCall::ReorderLabels { ids: after.clone() };
            Some(Command::new(
                transition,
                Effect::LabelOrder { before, after },
                Some(call),
            ))
        }
        Transition::ReorderSidebar {
            old_index,
            new_index,
        } => {
            let before = registry.sidebar().clone();
            if !registry.move_sidebar_item(*old_index, *new_index) {
                return None;
            }
            let after = registry.sidebar().clone();
            let call = BackendCall::ReorderFolders {
                ids: after.folder_ids(),
            };
            Some(Command::new(
                transition,
                Effect::Sidebar { before, after },
                Some(call),
            ))
        }
    }
}

/// Field update on one task, built from the latest registry state. `change`
/// mutates a scratch copy and returns the patch to send, or None if the task
/// already had the requested values.
fn update_task(
    transition: &Transition,
    registry: &mut Registry,
    id: &str,
    change: impl FnOnce(&mut Task) -> Option<TaskPatch>,
) -> Option<Command> {
    let task = registry.task_mut(id)?;
    let mut next = task.clone();
    let patch = change(&mut next)?;
    let before = capture(task, &patch);
    patch.apply_to(task);
    let call = BackendCall::UpdateTask {
        id: id.to_string(),
        patch: patch.clone(),
    };
    Some(Command::new(
        transition,
        Effect::TaskFields {
            id: id.to_string(),
            before,
            after: patch,
        },
        Some(call),
    ))
}

/// An empty workarea takes the task as its occupant (transient, nothing to
/// persist). An occupied one gets the task attached to its occupant.
fn focus(transition: &Transition, registry: &mut Registry, task_id: &str) -> Option<Command> {
    let dropped = registry.task(task_id)?.attachment_snapshot();
    let Some(occupant) = registry.workarea().cloned() else {
        let before = registry.set_workarea(Some(task_id.to_string()));
        let after = registry.workarea().cloned();
        return Some(Command::new(
            transition,
            Effect::Workarea { before, after },
            None,
        ));
    };

    let cmd = update_task(transition, registry, &occupant, |next| {
        match task_ops::attach(next, dropped) {
            Ok(true) => Some(TaskPatch {
                attachments: Some(next.attachments.clone()),
                ..Default::default()
            }),
            Ok(false) | Err(_) => None,
        }
    })?;
    Some(cmd.with_agent_change(&occupant))
}

fn reorder_tasks(
    transition: &Transition,
    registry: &mut Registry,
    container: &Container,
    old_index: usize,
    new_index: usize,
) -> Option<Command> {
    let before = registry.task_order();
    if !registry.move_in_container(container, old_index, new_index) {
        return None;
    }
    let after = registry.task_order();
    let call = BackendCall::ReorderTasks {
        ids: registry.container_ids(container),
    };
    Some(Command::new(
        transition,
        Effect::TaskOrder { before, after },
        Some(call),
    ))
}

//! Arena-style entity registry.
//!
//! Every task, label and folder is stored once, keyed by id, in an `IndexMap`
//! whose iteration order is the list order: the main task list, the global
//! label order and the folder order. The sidebar order is a separate sequence
//! of system targets and folder ids, and the folder map is kept in its folder
//! order. The workarea holds at most one task id; its occupant stays in the
//! task arena and is only filtered out of the rendered main list.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::entity::Container;
use super::folder::{Folder, FolderId};
use super::label::{Label, LabelId};
use super::sidebar::{SidebarOrder, SystemTarget};
use super::task::{Task, TaskId};
use crate::ops::order;

#[derive(Debug, Clone)]
pub struct Registry {
    tasks: IndexMap<TaskId, Task>,
    labels: IndexMap<LabelId, Label>,
    folders: IndexMap<FolderId, Folder>,
    workarea: Option<TaskId>,
    sidebar: SidebarOrder,
    system_targets: Vec<SystemTarget>,
}

/// Owned, serializable copy of the registry in render order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub folders: Vec<Folder>,
    #[serde(default)]
    pub workarea: Option<TaskId>,
    #[serde(default)]
    pub sidebar: Vec<String>,
}

/// Rearrange `map` so that the keys listed in `order` come first, in that
/// order. Keys missing from `order` keep their relative order at the end.
fn arrange<V>(map: &mut IndexMap<String, V>, order: &[String]) {
    let rank: HashMap<&str, usize> = order
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();
    let rank_of = |id: &String| rank.get(id.as_str()).copied().unwrap_or(usize::MAX);
    map.sort_by(|a, _, b, _| rank_of(a).cmp(&rank_of(b)));
}

/// Arena contents keyed by id; the first occurrence of a duplicate id wins
fn collect_unique<V>(rows: Vec<V>, id: impl Fn(&V) -> &String) -> IndexMap<String, V> {
    let mut map = IndexMap::with_capacity(rows.len());
    for row in rows {
        let key = id(&row).clone();
        map.entry(key).or_insert(row);
    }
    map
}

impl Registry {
    pub fn new(system_targets: Vec<SystemTarget>) -> Self {
        let mut registry = Registry {
            tasks: IndexMap::new(),
            labels: IndexMap::new(),
            folders: IndexMap::new(),
            workarea: None,
            sidebar: SidebarOrder::default(),
            system_targets,
        };
        registry.reconcile_sidebar();
        registry
    }

    /// Load a snapshot. The stored sidebar order is reconciled against the
    /// folders and system targets, and a workarea id that names no task is
    /// dropped.
    pub fn from_snapshot(snapshot: RegistrySnapshot, system_targets: Vec<SystemTarget>) -> Self {
        let mut registry = Registry::new(system_targets);
        registry.sidebar = SidebarOrder::from_strings(&snapshot.sidebar);
        registry.replace_tasks(snapshot.tasks);
        registry.replace_labels(snapshot.labels);
        registry.replace_folders(snapshot.folders);
        registry.workarea = snapshot
            .workarea
            .filter(|id| registry.tasks.contains_key(id));
        registry
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            tasks: self.tasks().cloned().collect(),
            labels: self.labels().cloned().collect(),
            folders: self.folders().cloned().collect(),
            workarea: self.workarea.clone(),
            sidebar: self.sidebar.to_strings(),
        }
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn task_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.get_mut(id)
    }

    /// All tasks in main-list order, workarea occupant included
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn task_order(&self) -> Vec<TaskId> {
        self.tasks.keys().cloned().collect()
    }

    /// The rendered main list: every task except the workarea occupant
    pub fn main_list(&self) -> Vec<&Task> {
        self.tasks()
            .filter(|t| self.workarea.as_deref() != Some(t.id.as_str()))
            .collect()
    }

    /// Insert or replace a task. New tasks are appended to the main list.
    pub fn upsert_task(&mut self, mut task: Task) {
        if let Some(existing) = self.tasks.get_mut(&task.id) {
            task.position = existing.position;
            *existing = task;
            return;
        }
        task.position = self.tasks.len();
        self.tasks.insert(task.id.clone(), task);
    }

    pub fn remove_task(&mut self, id: &str) -> Option<Task> {
        let task = self.tasks.shift_remove(id)?;
        if self.workarea.as_deref() == Some(id) {
            self.workarea = None;
        }
        self.renumber_tasks();
        Some(task)
    }

    /// Replace the whole task arena, keeping the incoming order
    pub fn replace_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = collect_unique(tasks, |t| &t.id);
        if let Some(id) = &self.workarea
            && !self.tasks.contains_key(id)
        {
            self.workarea = None;
        }
        self.renumber_tasks();
    }

    fn is_in_container(&self, container: &Container, task: &Task) -> bool {
        let in_workarea = self.workarea.as_deref() == Some(task.id.as_str());
        match container {
            Container::Main => !in_workarea,
            Container::Workarea => in_workarea,
            Container::Folder(folder_id) => task.folder_id.as_deref() == Some(folder_id.as_str()),
        }
    }

    /// Ids rendered in `container`, in order
    pub fn container_ids(&self, container: &Container) -> Vec<TaskId> {
        self.tasks()
            .filter(|t| self.is_in_container(container, t))
            .map(|t| t.id.clone())
            .collect()
    }

    pub fn index_in_container(&self, container: &Container, id: &str) -> Option<usize> {
        self.container_ids(container).iter().position(|t| t == id)
    }

    /// Array-move within one container's rendered list. Tasks outside the
    /// container keep their absolute slots in the main order.
    pub fn move_in_container(
        &mut self,
        container: &Container,
        old_index: usize,
        new_index: usize,
    ) -> bool {
        let members = self.container_ids(container);
        let mut next = self.task_order();
        if !order::move_within(&mut next, |id| members.contains(id), old_index, new_index) {
            return false;
        }
        arrange(&mut self.tasks, &next);
        self.renumber_tasks();
        true
    }

    /// Put back a previously captured main order. Ids that no longer exist
    /// are skipped and tasks missing from `order` keep their relative order
    /// at the end.
    pub fn restore_task_order(&mut self, order: &[TaskId]) {
        arrange(&mut self.tasks, order);
        self.renumber_tasks();
    }

    fn renumber_tasks(&mut self) {
        for (i, task) in self.tasks.values_mut().enumerate() {
            task.position = i;
        }
    }

    // -----------------------------------------------------------------------
    // Workarea
    // -----------------------------------------------------------------------

    pub fn workarea(&self) -> Option<&TaskId> {
        self.workarea.as_ref()
    }

    /// Set the workarea occupant, returning the previous one. An id that
    /// names no task clears the slot.
    pub fn set_workarea(&mut self, id: Option<TaskId>) -> Option<TaskId> {
        let id = id.filter(|id| self.tasks.contains_key(id));
        std::mem::replace(&mut self.workarea, id)
    }

    // -----------------------------------------------------------------------
    // Labels
    // -----------------------------------------------------------------------

    pub fn label(&self, id: &str) -> Option<&Label> {
        self.labels.get(id)
    }

    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.labels.values()
    }

    pub fn label_order(&self) -> Vec<LabelId> {
        self.labels.keys().cloned().collect()
    }

    pub fn label_index(&self, id: &str) -> Option<usize> {
        self.labels.get_index_of(id)
    }

    pub fn upsert_label(&mut self, mut label: Label) {
        if let Some(existing) = self.labels.get_mut(&label.id) {
            label.position = existing.position;
            *existing = label;
            return;
        }
        label.position = self.labels.len();
        self.labels.insert(label.id.clone(), label);
    }

    pub fn remove_label(&mut self, id: &str) -> Option<Label> {
        let label = self.labels.shift_remove(id)?;
        self.renumber_labels();
        Some(label)
    }

    pub fn replace_labels(&mut self, labels: Vec<Label>) {
        self.labels = collect_unique(labels, |l| &l.id);
        self.renumber_labels();
    }

    /// Stable array move over the global label order
    pub fn move_label(&mut self, old_index: usize, new_index: usize) -> bool {
        let len = self.labels.len();
        if old_index == new_index || old_index >= len || new_index >= len {
            return false;
        }
        self.labels.move_index(old_index, new_index);
        self.renumber_labels();
        true
    }

    pub fn restore_label_order(&mut self, order: &[LabelId]) {
        arrange(&mut self.labels, order);
        self.renumber_labels();
    }

    fn renumber_labels(&mut self) {
        for (i, label) in self.labels.values_mut().enumerate() {
            label.position = i;
        }
    }

    // -----------------------------------------------------------------------
    // Folders and sidebar
    // -----------------------------------------------------------------------

    pub fn folder(&self, id: &str) -> Option<&Folder> {
        self.folders.get(id)
    }

    pub fn folders(&self) -> impl Iterator<Item = &Folder> {
        self.folders.values()
    }

    pub fn folder_order(&self) -> Vec<FolderId> {
        self.folders.keys().cloned().collect()
    }

    pub fn upsert_folder(&mut self, folder: Folder) {
        if let Some(existing) = self.folders.get_mut(&folder.id) {
            existing.name = folder.name;
            return;
        }
        self.folders.insert(folder.id.clone(), folder);
        self.reconcile_sidebar();
    }

    pub fn remove_folder(&mut self, id: &str) -> Option<Folder> {
        let folder = self.folders.shift_remove(id)?;
        self.reconcile_sidebar();
        Some(folder)
    }

    /// Replace the folder arena. When the sidebar already lists some of the
    /// incoming folders, their sidebar order wins over the incoming order.
    pub fn replace_folders(&mut self, folders: Vec<Folder>) {
        self.folders = collect_unique(folders, |f| &f.id);
        self.reconcile_sidebar();
    }

    /// Replace the folder arena, arranging the sidebar after `preferred`
    /// (typically an order persisted before these folders were known)
    pub fn replace_folders_in_order(&mut self, folders: Vec<Folder>, preferred: SidebarOrder) {
        self.sidebar = preferred;
        self.replace_folders(folders);
    }

    pub fn sidebar(&self) -> &SidebarOrder {
        &self.sidebar
    }

    pub fn system_targets(&self) -> &[SystemTarget] {
        &self.system_targets
    }

    /// Bring the sidebar order in line with the folder set, then arrange the
    /// folders after it. Returns true if the sidebar order changed.
    pub fn reconcile_sidebar(&mut self) -> bool {
        let folder_ids = self.folder_order();
        let changed = self.sidebar.reconcile(&self.system_targets, &folder_ids);
        self.sync_folder_order();
        changed
    }

    pub fn move_sidebar_item(&mut self, old_index: usize, new_index: usize) -> bool {
        let moved = self.sidebar.move_item(old_index, new_index);
        if moved {
            self.sync_folder_order();
        }
        moved
    }

    pub fn restore_sidebar(&mut self, sidebar: SidebarOrder) {
        self.sidebar = sidebar;
        self.reconcile_sidebar();
    }

    fn sync_folder_order(&mut self) {
        arrange(&mut self.folders, &self.sidebar.folder_ids());
        for (i, folder) in self.folders.values_mut().enumerate() {
            folder.position = i;
        }
    }
}

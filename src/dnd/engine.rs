//! Host-facing drag-and-drop engine.
//!
//! [`Engine`] wires the pieces together: the gesture controller feeds pointer
//! positions to the collision resolver, a release is classified and executed
//! against the registry, and the resulting command waits in the outbox until
//! the host calls [`Engine::flush`] with its persistence backend.

use std::path::PathBuf;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::executor::{self, Command, Outbox};
use super::fetch::{FetchOutcome, FetchSequencer, FetchToken, ListingView};
use super::geometry::{Point, Rect};
use super::gesture::{DropAnimation, GestureController, GesturePhase};
use super::notify::{Notification, Notifier};
use super::transition::{self, Transition};
use super::zone::ZoneMap;
use crate::backend::{BackendCall, BackendError, CallKind, Persistence};
use crate::io::sidebar_store;
use crate::model::config::EngineConfig;
use crate::model::entity::{DragSource, DropTarget};
use crate::model::folder::{Folder, FolderId};
use crate::model::label::{Label, LabelId, LabelPatch};
use crate::model::registry::{Registry, RegistrySnapshot};
use crate::model::sidebar::SidebarOrder;
use crate::model::task::{Task, TaskId, TaskStatus};
use crate::ops::task_ops;

/// Error type for engine operations
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("{call} failed: {source}")]
    Persistence {
        call: CallKind,
        #[source]
        source: BackendError,
    },
    #[error("not found: {0}")]
    NotFound(String),
}

impl EngineError {
    fn persistence(call: CallKind) -> impl FnOnce(BackendError) -> EngineError {
        move |source| EngineError::Persistence { call, source }
    }
}

pub struct Engine {
    registry: Registry,
    zones: ZoneMap,
    gesture: GestureController,
    outbox: Outbox,
    notifier: Notifier,
    fetches: FetchSequencer,
    sidebar_file: Option<PathBuf>,
    /// Order read from `sidebar_file`, held until the folders it names load
    stored_sidebar: Option<SidebarOrder>,
}

impl Engine {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_snapshot(config, RegistrySnapshot::default())
    }

    /// Start from existing entities. A snapshot without a sidebar order takes
    /// the persisted one, if any; a snapshot with one discards it.
    pub fn with_snapshot(config: &EngineConfig, mut snapshot: RegistrySnapshot) -> Self {
        let sidebar_file = config.sidebar.state_file.clone();
        let mut stored_sidebar = sidebar_file
            .as_deref()
            .and_then(sidebar_store::read_sidebar);
        if !snapshot.sidebar.is_empty() {
            stored_sidebar = None;
        } else if !snapshot.folders.is_empty()
            && let Some(stored) = stored_sidebar.take()
        {
            snapshot.sidebar = stored.to_strings();
        }

        let registry = Registry::from_snapshot(snapshot, config.sidebar.system_targets.clone());
        Engine {
            registry,
            zones: ZoneMap::new(),
            gesture: GestureController::new(config.gesture.activation_distance),
            outbox: Outbox::new(),
            notifier: Notifier::new(),
            fetches: FetchSequencer::new(),
            sidebar_file,
            stored_sidebar,
        }
    }

    // -----------------------------------------------------------------------
    // Read accessors
    // -----------------------------------------------------------------------

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        self.registry.snapshot()
    }

    pub fn tasks(&self) -> Vec<&Task> {
        self.registry.tasks().collect()
    }

    /// The rendered main list, without the workarea occupant
    pub fn main_list(&self) -> Vec<&Task> {
        self.registry.main_list()
    }

    pub fn labels(&self) -> Vec<&Label> {
        self.registry.labels().collect()
    }

    pub fn folders(&self) -> Vec<&Folder> {
        self.registry.folders().collect()
    }

    pub fn workarea(&self) -> Option<&Task> {
        self.registry
            .workarea()
            .and_then(|id| self.registry.task(id))
    }

    pub fn sidebar(&self) -> &SidebarOrder {
        self.registry.sidebar()
    }

    /// Calls applied locally but not yet sent, in gesture order
    pub fn pending_calls(&self) -> Vec<&BackendCall> {
        self.outbox.iter().filter_map(|c| c.call.as_ref()).collect()
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifier.drain()
    }

    // -----------------------------------------------------------------------
    // Zones
    // -----------------------------------------------------------------------

    pub fn register_zone(&mut self, target: DropTarget, rect: Rect) {
        self.zones.register(target, rect);
    }

    pub fn unregister_zone(&mut self, target: &DropTarget) -> bool {
        self.zones.unregister(target)
    }

    pub fn clear_zones(&mut self) {
        self.zones.clear();
    }

    pub fn zones(&self) -> &ZoneMap {
        &self.zones
    }

    // -----------------------------------------------------------------------
    // Gesture hooks
    // -----------------------------------------------------------------------

    pub fn pointer_down(&mut self, source: DragSource, at: Point, rect: Rect) {
        self.gesture.pointer_down(source, at, rect);
    }

    /// Returns true when the hover candidate changed
    pub fn pointer_move(&mut self, at: Point) -> bool {
        self.gesture.pointer_move(at, &self.zones)
    }

    /// Release the pointer. Returns the transition that fired, or None if the
    /// press never became a drag.
    pub fn pointer_up(&mut self, at: Point) -> Option<Transition> {
        let release = self.gesture.pointer_up(at, &self.zones)?;
        Some(self.apply_drop(&release.source, release.target.as_ref()))
    }

    /// Escape. Nothing was mutated during the drag, so there is nothing to
    /// restore and no call to make.
    pub fn cancel(&mut self) -> bool {
        let cancelled = self.gesture.cancel();
        if cancelled {
            debug!("drag cancelled");
        }
        cancelled
    }

    pub fn phase(&self) -> GesturePhase {
        self.gesture.phase()
    }

    pub fn candidate(&self) -> Option<&DropTarget> {
        self.gesture.candidate()
    }

    pub fn overlay(&self) -> Option<Rect> {
        self.gesture.overlay()
    }

    pub fn drop_animation(&self) -> DropAnimation {
        self.gesture.drop_animation()
    }

    /// Classify and execute a drop whose target the host already knows.
    /// `pointer_up` goes through here after resolving the target.
    pub fn apply_drop(&mut self, source: &DragSource, target: Option<&DropTarget>) -> Transition {
        let transition = transition::classify(source, target, &self.registry);
        if transition.is_noop() {
            debug!(transition = %transition, "drop matched no transition");
            return transition;
        }

        let Some(command) = executor::execute(&transition, &mut self.registry) else {
            debug!(transition = %transition, "nothing to change");
            return transition;
        };
        info!(
            transition = %transition,
            task = transition.task_id().unwrap_or("-"),
            "transition applied"
        );
        self.stamp_views(&command);
        if let Some(task_id) = &command.agent_change {
            self.notifier.publish(Notification::AgentAssignmentChanged {
                task_id: task_id.clone(),
            });
        }
        if command.touches_sidebar() {
            // the user's arrangement now outranks the one read at startup
            self.stored_sidebar = None;
            self.persist_sidebar();
        }
        if command.call.is_some() {
            self.outbox.push(command);
        }
        transition
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Send every pending call in gesture order. Rejected calls roll back
    /// their command; the errors are returned and also published as
    /// notifications. Nothing is retried.
    pub fn flush(&mut self, backend: &mut dyn Persistence) -> Vec<EngineError> {
        let mut errors = Vec::new();
        while let Some(command) = self.outbox.pop() {
            let Some(call) = &command.call else {
                continue;
            };
            match call.send(backend) {
                Ok(()) => debug!(seq = command.seq, call = %call, "call sent"),
                Err(err) => {
                    self.roll_back(&command, &err);
                    errors.push(EngineError::Persistence {
                        call: call.kind(),
                        source: err,
                    });
                }
            }
            // listings requested before the backend saw this call predate it
            self.stamp_views(&command);
        }
        errors
    }

    fn stamp_views(&mut self, command: &Command) {
        for effect in &command.effects {
            self.fetches.record_write(effect.view());
        }
    }

    fn roll_back(&mut self, command: &Command, err: &BackendError) {
        let call = command.call.as_ref().map(BackendCall::kind);
        warn!(
            seq = command.seq,
            transition = %command.transition,
            error = %err,
            "call rejected, rolling back"
        );
        let later = self.outbox.pending_slots();
        for view in command.rollback(&mut self.registry, &later) {
            warn!(seq = command.seq, view = %view, "rollback superseded, view needs resync");
            self.notifier.publish(Notification::ResyncNeeded { view });
        }
        if command.touches_sidebar() {
            self.persist_sidebar();
        }
        if let Some(call) = call {
            self.notifier.publish(Notification::PersistenceFailed {
                call,
                message: err.to_string(),
                at: Utc::now(),
            });
        }
    }

    fn persist_sidebar(&self) {
        let Some(path) = &self.sidebar_file else {
            return;
        };
        if let Err(e) = sidebar_store::write_sidebar(path, self.registry.sidebar()) {
            warn!(error = %e, "could not persist sidebar order");
        }
    }

    // -----------------------------------------------------------------------
    // Listing fetches
    // -----------------------------------------------------------------------

    /// Start a listing request; pass the token back with the rows
    pub fn begin_fetch(&mut self, view: ListingView) -> FetchToken {
        self.fetches.begin(view)
    }

    fn accept(&self, token: FetchToken, view: ListingView) -> bool {
        if token.view == view && self.fetches.is_current(token) {
            return true;
        }
        debug!(view = %view, seq = token.seq, "dropping stale listing response");
        false
    }

    pub fn apply_tasks(&mut self, token: FetchToken, rows: Vec<Task>) -> FetchOutcome {
        if !self.accept(token, ListingView::Tasks) {
            return FetchOutcome::Stale;
        }
        self.registry.replace_tasks(rows);
        FetchOutcome::Applied
    }

    pub fn apply_labels(&mut self, token: FetchToken, rows: Vec<Label>) -> FetchOutcome {
        if !self.accept(token, ListingView::Labels) {
            return FetchOutcome::Stale;
        }
        self.registry.replace_labels(rows);
        FetchOutcome::Applied
    }

    pub fn apply_folders(&mut self, token: FetchToken, rows: Vec<Folder>) -> FetchOutcome {
        if !self.accept(token, ListingView::Folders) {
            return FetchOutcome::Stale;
        }
        let before = self.registry.sidebar().clone();
        match self.stored_sidebar.take() {
            Some(stored) if !rows.is_empty() => {
                self.registry.replace_folders_in_order(rows, stored)
            }
            stored => {
                self.stored_sidebar = stored;
                self.registry.replace_folders(rows);
            }
        }
        if *self.registry.sidebar() != before {
            self.persist_sidebar();
        }
        FetchOutcome::Applied
    }

    // -----------------------------------------------------------------------
    // CRUD pass-throughs
    //
    // These wait for the backend because it assigns identity. Pending drag
    // calls are flushed first so the backend sees writes in gesture order.
    // The returned error only covers the operation itself; a queued drag call
    // rejected on the way is rolled back and reported through
    // `Notification::PersistenceFailed`, as with `flush`.
    // -----------------------------------------------------------------------

    fn flush_pending(&mut self, backend: &mut dyn Persistence) {
        let errors = self.flush(backend);
        if !errors.is_empty() {
            warn!(
                count = errors.len(),
                "queued calls rejected ahead of a direct operation"
            );
        }
    }

    /// Mark views changed by a direct operation so listings requested
    /// earlier do not undo it
    fn wrote(&mut self, views: &[ListingView]) {
        for view in views {
            self.fetches.record_write(*view);
        }
    }

    pub fn create_task(
        &mut self,
        backend: &mut dyn Persistence,
        title: &str,
        labels: &[String],
    ) -> Result<TaskId, EngineError> {
        self.flush_pending(backend);
        let task = backend
            .create_task(title, labels)
            .map_err(EngineError::persistence(CallKind::CreateTask))?;
        let id = task.id.clone();
        info!(task = %id, "task created");
        self.registry.upsert_task(task);
        self.wrote(&[ListingView::Tasks]);
        self.notifier.publish(Notification::TaskCreated {
            task_id: id.clone(),
        });
        Ok(id)
    }

    pub fn delete_task(
        &mut self,
        backend: &mut dyn Persistence,
        id: &str,
    ) -> Result<(), EngineError> {
        self.require_task(id)?;
        self.flush_pending(backend);
        backend
            .delete_task(id)
            .map_err(EngineError::persistence(CallKind::DeleteTask))?;
        self.registry.remove_task(id);
        self.wrote(&[ListingView::Tasks]);
        info!(task = %id, "task deleted");
        Ok(())
    }

    /// Permanently remove every task in the trash. Returns how many went.
    pub fn empty_trash(&mut self, backend: &mut dyn Persistence) -> Result<usize, EngineError> {
        self.flush_pending(backend);
        backend
            .empty_trash()
            .map_err(EngineError::persistence(CallKind::EmptyTrash))?;
        let trashed: Vec<TaskId> = self
            .registry
            .tasks()
            .filter(|t| t.status == TaskStatus::Deleted)
            .map(|t| t.id.clone())
            .collect();
        for id in &trashed {
            self.registry.remove_task(id);
        }
        self.wrote(&[ListingView::Tasks]);
        info!(count = trashed.len(), "trash emptied");
        Ok(trashed.len())
    }

    pub fn create_label(
        &mut self,
        backend: &mut dyn Persistence,
        name: &str,
        color: &str,
    ) -> Result<LabelId, EngineError> {
        self.flush_pending(backend);
        let label = backend
            .create_label(name, color)
            .map_err(EngineError::persistence(CallKind::CreateLabel))?;
        let id = label.id.clone();
        self.registry.upsert_label(label);
        self.wrote(&[ListingView::Labels]);
        info!(label = %id, "label created");
        Ok(id)
    }

    /// Update a label. A rename is carried into every task that uses it.
    pub fn update_label(
        &mut self,
        backend: &mut dyn Persistence,
        id: &str,
        patch: &LabelPatch,
    ) -> Result<(), EngineError> {
        let mut label = self
            .registry
            .label(id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(format!("label {}", id)))?;
        self.flush_pending(backend);
        backend
            .update_label(id, patch)
            .map_err(EngineError::persistence(CallKind::UpdateLabel))?;

        if let Some(name) = &patch.name
            && *name != label.name
        {
            let old = std::mem::replace(&mut label.name, name.clone());
            self.for_each_task(|task| task_ops::rename_label(task, &old, name));
        }
        if let Some(color) = &patch.color {
            label.color = color.clone();
        }
        self.registry.upsert_label(label);
        self.wrote(&[ListingView::Labels, ListingView::Tasks]);
        Ok(())
    }

    /// Delete a label and strip its name from every task
    pub fn delete_label(
        &mut self,
        backend: &mut dyn Persistence,
        id: &str,
    ) -> Result<(), EngineError> {
        let name = self
            .registry
            .label(id)
            .map(|l| l.name.clone())
            .ok_or_else(|| EngineError::NotFound(format!("label {}", id)))?;
        self.flush_pending(backend);
        backend
            .delete_label(id)
            .map_err(EngineError::persistence(CallKind::DeleteLabel))?;
        self.registry.remove_label(id);
        self.for_each_task(|task| task_ops::remove_label(task, &name));
        self.wrote(&[ListingView::Labels, ListingView::Tasks]);
        info!(label = %id, "label deleted");
        Ok(())
    }

    pub fn create_folder(
        &mut self,
        backend: &mut dyn Persistence,
        name: &str,
    ) -> Result<FolderId, EngineError> {
        self.flush_pending(backend);
        let folder = backend
            .create_folder(name)
            .map_err(EngineError::persistence(CallKind::CreateFolder))?;
        let id = folder.id.clone();
        self.registry.upsert_folder(folder);
        self.wrote(&[ListingView::Folders]);
        self.persist_sidebar();
        info!(folder = %id, "folder created");
        Ok(id)
    }

    pub fn rename_folder(
        &mut self,
        backend: &mut dyn Persistence,
        id: &str,
        name: &str,
    ) -> Result<(), EngineError> {
        let mut folder = self
            .registry
            .folder(id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(format!("folder {}", id)))?;
        self.flush_pending(backend);
        backend
            .rename_folder(id, name)
            .map_err(EngineError::persistence(CallKind::RenameFolder))?;
        folder.name = name.to_string();
        self.registry.upsert_folder(folder);
        self.wrote(&[ListingView::Folders]);
        Ok(())
    }

    /// Delete a folder. Its tasks become unfiled; the sidebar drops it.
    pub fn delete_folder(
        &mut self,
        backend: &mut dyn Persistence,
        id: &str,
    ) -> Result<(), EngineError> {
        if self.registry.folder(id).is_none() {
            return Err(EngineError::NotFound(format!("folder {}", id)));
        }
        self.flush_pending(backend);
        backend
            .delete_folder(id)
            .map_err(EngineError::persistence(CallKind::DeleteFolder))?;
        self.registry.remove_folder(id);
        self.for_each_task(|task| {
            task.folder_id.as_deref() == Some(id) && task_ops::set_folder(task, None)
        });
        self.wrote(&[ListingView::Folders, ListingView::Tasks]);
        self.persist_sidebar();
        info!(folder = %id, "folder deleted");
        Ok(())
    }

    fn require_task(&self, id: &str) -> Result<(), EngineError> {
        match self.registry.task(id) {
            Some(_) => Ok(()),
            None => Err(EngineError::NotFound(format!("task {}", id))),
        }
    }

    fn for_each_task(&mut self, mut f: impl FnMut(&mut Task) -> bool) {
        let ids = self.registry.task_order();
        for id in ids {
            if let Some(task) = self.registry.task_mut(&id) {
                f(task);
            }
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("phase", &self.gesture.phase())
            .field("zones", &self.zones.len())
            .field("pending", &self.outbox.len())
            .field("notifications", &self.notifier.len())
            .finish()
    }
}

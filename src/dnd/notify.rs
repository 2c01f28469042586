use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::fetch::ListingView;
use crate::backend::CallKind;
use crate::model::task::TaskId;

/// Events published to host observers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Notification {
    /// Labels, folder or attachments of a task changed; agent views keyed on
    /// them should refresh
    AgentAssignmentChanged { task_id: TaskId },
    TaskCreated { task_id: TaskId },
    PersistenceFailed {
        call: CallKind,
        message: String,
        at: DateTime<Utc>,
    },
    /// A rollback could not be applied cleanly; re-fetch this view
    ResyncNeeded { view: ListingView },
}

/// FIFO of notifications waiting for the host to drain them
#[derive(Debug, Default)]
pub struct Notifier {
    queue: VecDeque<Notification>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, notification: Notification) {
        // one resync per view is enough until the host drains
        if matches!(notification, Notification::ResyncNeeded { .. })
            && self.queue.contains(&notification)
        {
            return;
        }
        self.queue.push_back(notification);
    }

    pub fn drain(&mut self) -> Vec<Notification> {
        self.queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

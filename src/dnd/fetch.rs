use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A cached listing the host can re-fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListingView {
    Tasks,
    Labels,
    Folders,
}

impl std::fmt::Display for ListingView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListingView::Tasks => write!(f, "tasks"),
            ListingView::Labels => write!(f, "labels"),
            ListingView::Folders => write!(f, "folders"),
        }
    }
}

/// Handle for one in-flight listing request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchToken {
    pub view: ListingView,
    pub seq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// A newer request for the same view was issued, or the view was
    /// written locally after the request began; the rows were dropped
    Stale,
}

/// Hands out request tokens and remembers the latest one per view, so a slow
/// response for a superseded request never overwrites a newer one. Local
/// writes are stamped from the same sequence: rows requested before a write
/// predate it and would undo it.
#[derive(Debug, Default)]
pub struct FetchSequencer {
    next_seq: u64,
    latest: HashMap<ListingView, u64>,
    written: HashMap<ListingView, u64>,
}

impl FetchSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, view: ListingView) -> FetchToken {
        self.next_seq += 1;
        self.latest.insert(view, self.next_seq);
        FetchToken {
            view,
            seq: self.next_seq,
        }
    }

    /// Record a local write to `view`. Requests already in flight for it
    /// become stale.
    pub fn record_write(&mut self, view: ListingView) {
        self.next_seq += 1;
        self.written.insert(view, self.next_seq);
    }

    pub fn is_current(&self, token: FetchToken) -> bool {
        let written = self.written.get(&token.view).copied().unwrap_or(0);
        self.latest.get(&token.view) == Some(&token.seq) && written < token.seq
    }
}

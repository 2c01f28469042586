use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::folder::FolderId;
use super::task::TaskStatus;
use crate::ops::order;

/// Built-in sidebar navigation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemTarget {
    Active,
    Closed,
    Trash,
    Assistant,
}

impl SystemTarget {
    pub const ALL: [SystemTarget; 4] = [
        SystemTarget::Active,
        SystemTarget::Closed,
        SystemTarget::Trash,
        SystemTarget::Assistant,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SystemTarget::Active => "active",
            SystemTarget::Closed => "closed",
            SystemTarget::Trash => "trash",
            SystemTarget::Assistant => "assistant",
        }
    }

    pub fn from_name(name: &str) -> Option<SystemTarget> {
        SystemTarget::ALL.into_iter().find(|t| t.name() == name)
    }

    /// The status a task takes when dropped on this target, if any
    pub fn status(self) -> Option<TaskStatus> {
        match self {
            SystemTarget::Active => Some(TaskStatus::Active),
            SystemTarget::Closed => Some(TaskStatus::Closed),
            SystemTarget::Trash => Some(TaskStatus::Deleted),
            SystemTarget::Assistant => None,
        }
    }
}

/// One entry of the persisted sidebar order: `system:<name>` or `folder:<id>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum SidebarItem {
    System(SystemTarget),
    Folder(FolderId),
}

impl std::fmt::Display for SidebarItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SidebarItem::System(t) => write!(f, "system:{}", t.name()),
            SidebarItem::Folder(id) => write!(f, "folder:{}", id),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unrecognized sidebar item: {0}")]
pub struct SidebarItemParseError(pub String);

impl FromStr for SidebarItem {
    type Err = SidebarItemParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(name) = s.strip_prefix("system:") {
            return SystemTarget::from_name(name)
                .map(SidebarItem::System)
                .ok_or_else(|| SidebarItemParseError(s.to_string()));
        }
        match s.strip_prefix("folder:") {
            Some(id) if !id.is_empty() => Ok(SidebarItem::Folder(id.to_string())),
            _ => Err(SidebarItemParseError(s.to_string())),
        }
    }
}

impl From<SidebarItem> for String {
    fn from(item: SidebarItem) -> String {
        item.to_string()
    }
}

impl TryFrom<String> for SidebarItem {
    type Error = SidebarItemParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Ordered sidebar contents: system targets and folders interleaved as the
/// user arranged them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SidebarOrder {
    items: Vec<SidebarItem>,
}

impl SidebarOrder {
    pub fn new(items: Vec<SidebarItem>) -> Self {
        SidebarOrder { items }
    }

    /// Build from stored strings, silently dropping anything unparseable
    pub fn from_strings<S: AsRef<str>>(raw: &[S]) -> Self {
        let items = raw
            .iter()
            .filter_map(|s| s.as_ref().parse::<SidebarItem>().ok())
            .collect();
        SidebarOrder { items }
    }

    pub fn to_strings(&self) -> Vec<String> {
        self.items.iter().map(|i| i.to_string()).collect()
    }

    pub fn items(&self) -> &[SidebarItem] {
        &self.items
    }

    pub fn position(&self, item: &SidebarItem) -> Option<usize> {
        self.items.iter().position(|i| i == item)
    }

    /// Folder ids in their current sidebar order, system items excluded
    pub fn folder_ids(&self) -> Vec<FolderId> {
        self.items
            .iter()
            .filter_map(|i| match i {
                SidebarItem::Folder(id) => Some(id.clone()),
                SidebarItem::System(_) => None,
            })
            .collect()
    }

    /// Make the order contain exactly `system ∪ folders`: stale and duplicate
    /// entries are dropped, missing ones appended (system first, then folders
    /// in the given order), and the relative order of survivors is kept.
    /// Returns true if anything changed.
    pub fn reconcile(&mut self, system: &[SystemTarget], folders: &[FolderId]) -> bool {
        let valid: Vec<SidebarItem> = system
            .iter()
            .map(|t| SidebarItem::System(*t))
            .chain(folders.iter().map(|id| SidebarItem::Folder(id.clone())))
            .collect();
        let valid_set: HashSet<&SidebarItem> = valid.iter().collect();

        let mut seen: HashSet<SidebarItem> = HashSet::new();
        let mut next: Vec<SidebarItem> = Vec::with_capacity(valid.len());
        for item in &self.items {
            if valid_set.contains(item) && seen.insert(item.clone()) {
                next.push(item.clone());
            }
        }
        for item in valid {
            if seen.insert(item.clone()) {
                next.push(item);
            }
        }

        let changed = next != self.items;
        self.items = next;
        changed
    }

    /// Stable array move; returns false if either index is out of range
    pub fn move_item(&mut self, old_index: usize, new_index: usize) -> bool {
        order::array_move(&mut self.items, old_index, new_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids(v: &[&str]) -> Vec<FolderId> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn item_string_forms() {
        assert_eq!(
            SidebarItem::System(SystemTarget::Trash).to_string(),
            "system:trash"
        );
        assert_eq!(SidebarItem::Folder("f3".into()).to_string(), "folder:f3");
        assert_eq!(
            "folder:f1".parse::<SidebarItem>().unwrap(),
            SidebarItem::Folder("f1".into())
        );
        assert!("system:inbox".parse::<SidebarItem>().is_err());
        assert!("folder:".parse::<SidebarItem>().is_err());
        assert!("f1".parse::<SidebarItem>().is_err());
    }

    #[test]
    fn reconcile_drops_stale_and_appends_new() {
        let mut order =
            SidebarOrder::from_strings(&["folder:f2", "system:active", "folder:gone"]);
        let changed = order.reconcile(&[SystemTarget::Active], &ids(&["f1", "f2"]));
        assert!(changed);
        assert_eq!(
            order.to_strings(),
            vec!["folder:f2", "system:active", "folder:f1"]
        );
    }

    #[test]
    fn reconcile_dedupes_and_is_stable_when_valid() {
        let mut order = SidebarOrder::from_strings(&["system:active", "system:active"]);
        assert!(order.reconcile(&[SystemTarget::Active], &[]));
        assert_eq!(order.to_strings(), vec!["system:active"]);
        assert!(!order.reconcile(&[SystemTarget::Active], &[]));
    }

    #[test]
    fn reconcile_empty_builds_default_order() {
        let mut order = SidebarOrder::default();
        order.reconcile(
            &[SystemTarget::Active, SystemTarget::Closed],
            &ids(&["f1"]),
        );
        assert_eq!(
            order.to_strings(),
            vec!["system:active", "system:closed", "folder:f1"]
        );
    }

    #[test]
    fn folder_ids_skip_system_items() {
        let order =
            SidebarOrder::from_strings(&["folder:f3", "system:active", "folder:f1"]);
        assert_eq!(order.folder_ids(), ids(&["f3", "f1"]));
    }

    #[test]
    fn serde_uses_plain_strings() {
        let order = SidebarOrder::from_strings(&["system:closed", "folder:f9"]);
        let json = serde_json::to_string(&order).unwrap();
        assert_eq!(json, r#"["system:closed","folder:f9"]"#);
        let back: SidebarOrder = serde_json::from_str(&json).unwrap();
        assert_eq!(back, order);
    }
}

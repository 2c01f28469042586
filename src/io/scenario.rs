use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::backend::CallKind;
use crate::dnd::geometry::{Point, Rect};
use crate::dnd::zone::DropZone;
use crate::model::entity::{DragSource, DropTarget};
use crate::model::registry::RegistrySnapshot;

/// Error type for loading replay scenarios
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse scenario: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// A scripted session: starting entities, the zones on screen, and the
/// gestures to play against them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    #[serde(default)]
    pub entities: RegistrySnapshot,
    #[serde(default)]
    pub zones: Vec<DropZone>,
    /// Calls the backend rejects from the start
    #[serde(default)]
    pub fail: Vec<CallKind>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Step {
    /// Press at `from`, move through `path`, release (or cancel) at `to`
    Drag {
        source: DragSource,
        from: Point,
        /// Box of the picked-up entity; a point box at `from` when absent
        #[serde(default)]
        rect: Option<Rect>,
        #[serde(default)]
        path: Vec<Point>,
        to: Point,
        #[serde(default)]
        cancel: bool,
    },
    /// Drop with a known target, skipping hit testing
    Drop {
        source: DragSource,
        #[serde(default)]
        target: Option<DropTarget>,
    },
    Flush,
    FailOn {
        call: CallKind,
    },
    Recover {
        call: CallKind,
    },
}

pub fn read_scenario(path: &Path) -> Result<Scenario, ScenarioError> {
    let text = fs::read_to_string(path).map_err(|e| ScenarioError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(serde_json::from_str(&text)?)
}

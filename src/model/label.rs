use serde::{Deserialize, Serialize};

pub type LabelId = String;

/// A global label. Tasks reference labels by name, not by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: LabelId,
    /// Unique across all labels
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub position: usize,
}

impl Label {
    pub fn new(id: impl Into<LabelId>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Label {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            position: 0,
        }
    }
}

/// Partial label update sent to the backend with `update_label`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

use serde::{Deserialize, Serialize};

pub type FolderId = String;

/// A folder holds zero or more tasks through `Task::folder_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
    #[serde(default)]
    pub position: usize,
}

impl Folder {
    pub fn new(id: impl Into<FolderId>, name: impl Into<String>) -> Self {
        Folder {
            id: id.into(),
            name: name.into(),
            position: 0,
        }
    }
}

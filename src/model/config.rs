use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::sidebar::SystemTarget;

/// Engine configuration (dragboard.toml)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub gesture: GestureConfig,
    #[serde(default)]
    pub sidebar: SidebarConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureConfig {
    /// Pointer travel (pixels, euclidean) before a press becomes a drag
    #[serde(default = "default_activation_distance")]
    pub activation_distance: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        GestureConfig {
            activation_distance: default_activation_distance(),
        }
    }
}

fn default_activation_distance() -> f64 {
    8.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SidebarConfig {
    /// System targets shown in the sidebar, in default order
    #[serde(default = "default_system_targets")]
    pub system_targets: Vec<SystemTarget>,
    /// Where the sidebar order is persisted. None keeps it in memory only.
    #[serde(default)]
    pub state_file: Option<PathBuf>,
}

impl Default for SidebarConfig {
    fn default() -> Self {
        SidebarConfig {
            system_targets: default_system_targets(),
            state_file: None,
        }
    }
}

fn default_system_targets() -> Vec<SystemTarget> {
    SystemTarget::ALL.to_vec()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

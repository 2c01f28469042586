use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::EngineConfig;

/// Error type for reading engine configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Read and parse a TOML config file. Missing sections and keys take their
/// defaults; a missing file is an error.
pub fn read_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let config: EngineConfig = toml::from_str(&text)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::sidebar::SystemTarget;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn empty_file_is_all_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dragboard.toml");
        fs::write(&path, "").unwrap();
        assert_eq!(read_config(&path).unwrap(), EngineConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dragboard.toml");
        fs::write(
            &path,
            r#"
[gesture]
activation_distance = 4.5

[sidebar]
system_targets = ["closed", "active"]
state_file = "sidebar.json"
"#,
        )
        .unwrap();
        let config = read_config(&path).unwrap();
        assert_eq!(config.gesture.activation_distance, 4.5);
        assert_eq!(
            config.sidebar.system_targets,
            vec![SystemTarget::Closed, SystemTarget::Active]
        );
        assert_eq!(
            config.sidebar.state_file.as_deref(),
            Some(Path::new("sidebar.json"))
        );
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn missing_file_and_bad_toml_are_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.toml");
        assert!(matches!(
            read_config(&path),
            Err(ConfigError::ReadError { .. })
        ));
        fs::write(&path, "[gesture\nactivation_distance = ").unwrap();
        assert!(matches!(read_config(&path), Err(ConfigError::ParseError(_))));
    }
}

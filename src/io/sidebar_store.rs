use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::model::sidebar::SidebarOrder;

/// Error type for the persisted sidebar order
#[derive(Debug, thiserror::Error)]
pub enum SidebarStoreError {
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("could not serialize sidebar order: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// Read the stored sidebar order. A missing or unreadable file yields None;
/// entries that are neither `system:` nor `folder:` items are dropped.
pub fn read_sidebar(path: &Path) -> Option<SidebarOrder> {
    let content = fs::read_to_string(path).ok()?;
    let raw: Vec<String> = serde_json::from_str(&content).ok()?;
    Some(SidebarOrder::from_strings(&raw))
}

/// Write the sidebar order as a JSON array of strings, atomically
pub fn write_sidebar(path: &Path, order: &SidebarOrder) -> Result<(), SidebarStoreError> {
    let content = serde_json::to_string_pretty(&order.to_strings())?;
    atomic_write(path, content.as_bytes()).map_err(|e| SidebarStoreError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write through a temp file in the same directory, then rename over `path`
fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::sidebar::{SidebarItem, SystemTarget};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sidebar.json");
        let order = SidebarOrder::new(vec![
            SidebarItem::Folder("f3".into()),
            SidebarItem::System(SystemTarget::Active),
            SidebarItem::Folder("f1".into()),
        ]);
        write_sidebar(&path, &order).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let parsed: Vec<String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, vec!["folder:f3", "system:active", "folder:f1"]);
        assert_eq!(read_sidebar(&path), Some(order));
    }

    #[test]
    fn missing_or_malformed_file_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sidebar.json");
        assert_eq!(read_sidebar(&path), None);
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(read_sidebar(&path), None);
    }

    #[test]
    fn unknown_entries_are_dropped_on_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sidebar.json");
        fs::write(&path, r#"["system:trash", "widget:7", "folder:f2"]"#).unwrap();
        assert_eq!(
            read_sidebar(&path).unwrap().to_strings(),
            vec!["system:trash", "folder:f2"]
        );
    }

    #[test]
    fn overwrite_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sidebar.json");
        write_sidebar(&path, &SidebarOrder::default()).unwrap();
        write_sidebar(
            &path,
            &SidebarOrder::new(vec![SidebarItem::System(SystemTarget::Closed)]),
        )
        .unwrap();
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}

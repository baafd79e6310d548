//! Notebook discovery.
//!
//! Walks a base directory for notebooks matching the naming convention
//! `<dataset_id>/<subfolder>/<dataset_id>.ipynb` and derives each target's
//! typed identity once, here, at discovery time.

use std::path::Path;

use anyhow::{Context, Result};

use nbcritic_core::target::TargetId;

/// Find all matching notebooks under `base_dir`, sorted by path.
///
/// When `prefix` is given, only subfolders whose name starts with it are
/// considered (used to select one generation batch).
pub fn find_notebooks(base_dir: &Path, prefix: Option<&str>) -> Result<Vec<TargetId>> {
    let mut targets = Vec::new();

    let entries = std::fs::read_dir(base_dir)
        .with_context(|| format!("failed to read notebooks directory: {}", base_dir.display()))?;

    for entry in entries {
        let entry = entry?;
        let dataset_path = entry.path();
        if !dataset_path.is_dir() {
            continue;
        }
        let dataset_id = entry.file_name().to_string_lossy().to_string();

        for sub_entry in std::fs::read_dir(&dataset_path)? {
            let sub_entry = sub_entry?;
            let sub_path = sub_entry.path();
            if !sub_path.is_dir() {
                continue;
            }
            let subfolder = sub_entry.file_name().to_string_lossy().to_string();
            if let Some(prefix) = prefix {
                if !subfolder.starts_with(prefix) {
                    continue;
                }
            }

            let notebook_path = sub_path.join(format!("{dataset_id}.ipynb"));
            if notebook_path.is_file() {
                targets.push(TargetId::new(
                    notebook_path.to_string_lossy(),
                    &dataset_id,
                    &subfolder,
                ));
            }
        }
    }

    targets.sort_by(|a, b| a.raw().cmp(b.raw()));
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "{}").unwrap();
    }

    #[test]
    fn finds_matching_notebooks_sorted() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("000002/run-b/000002.ipynb"));
        touch(&dir.path().join("000001/run-a/000001.ipynb"));
        // wrong filename: does not match <dataset_id>.ipynb
        touch(&dir.path().join("000003/run-c/other.ipynb"));

        let targets = find_notebooks(dir.path(), None).unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].dataset_id(), "000001");
        assert_eq!(targets[0].subfolder(), "run-a");
        assert_eq!(targets[1].dataset_id(), "000002");
        assert!(targets[0].raw() < targets[1].raw());
    }

    #[test]
    fn prefix_filters_subfolders() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("000001/2025-04-16-a/000001.ipynb"));
        touch(&dir.path().join("000001/2025-05-01-b/000001.ipynb"));

        let targets = find_notebooks(dir.path(), Some("2025-04-16")).unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].subfolder(), "2025-04-16-a");
    }

    #[test]
    fn missing_base_dir_is_an_error() {
        assert!(find_notebooks(Path::new("/nonexistent-nbcritic"), None).is_err());
    }
}

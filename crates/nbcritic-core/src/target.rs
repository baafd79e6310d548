//! Typed evaluation target identity.
//!
//! A target is identified by its notebook path or URL, plus two identity
//! fields derived positionally from it (`.../<dataset_id>/<subfolder>/<file>`).
//! The derivation happens exactly once, at discovery time; everything
//! downstream carries the typed value instead of re-splitting path strings.

use std::fmt;

use crate::error::FormatError;

/// Identity of one evaluation target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetId {
    raw: String,
    dataset_id: String,
    subfolder: String,
}

impl TargetId {
    /// Build from already-known parts (filesystem discovery).
    pub fn new(
        raw: impl Into<String>,
        dataset_id: impl Into<String>,
        subfolder: impl Into<String>,
    ) -> Self {
        TargetId {
            raw: raw.into(),
            dataset_id: dataset_id.into(),
            subfolder: subfolder.into(),
        }
    }

    /// Derive identity fields from a path or URL.
    ///
    /// The dataset id is the third segment from the end, the subfolder the
    /// second; the last segment is the notebook file itself.
    pub fn parse(raw: impl Into<String>) -> Result<Self, FormatError> {
        let raw = raw.into();
        let segments: Vec<&str> = raw.split('/').collect();
        if segments.len() < 3 {
            return Err(FormatError::TargetPath(raw));
        }
        let dataset_id = segments[segments.len() - 3];
        let subfolder = segments[segments.len() - 2];
        if dataset_id.is_empty() || subfolder.is_empty() {
            return Err(FormatError::TargetPath(raw));
        }
        Ok(TargetId {
            dataset_id: dataset_id.to_string(),
            subfolder: subfolder.to_string(),
            raw,
        })
    }

    /// The full path or URL; the persistence key.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn dataset_id(&self) -> &str {
        &self.dataset_id
    }

    pub fn subfolder(&self) -> &str {
        &self.subfolder
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_local_path() {
        let id = TargetId::parse("datasets/000123/run-a/000123.ipynb").unwrap();
        assert_eq!(id.dataset_id(), "000123");
        assert_eq!(id.subfolder(), "run-a");
        assert_eq!(id.raw(), "datasets/000123/run-a/000123.ipynb");
    }

    #[test]
    fn parse_url() {
        let id =
            TargetId::parse("https://example.com/datasets/000456/2025-04-16-a/000456.ipynb")
                .unwrap();
        assert_eq!(id.dataset_id(), "000456");
        assert_eq!(id.subfolder(), "2025-04-16-a");
    }

    #[test]
    fn too_shallow_path_is_rejected() {
        assert!(TargetId::parse("notebook.ipynb").is_err());
        assert!(TargetId::parse("a/notebook.ipynb").is_err());
    }
}

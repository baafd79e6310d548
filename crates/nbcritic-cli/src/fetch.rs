//! Notebook fetching: local files or HTTP(S) downloads.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use nbcritic_core::notebook::Notebook;

/// Translate GitHub blob URLs to raw content URLs.
pub fn rewrite_github_url(url: &str) -> String {
    if url.starts_with("https://github.com/") {
        url.replace("github.com", "raw.githubusercontent.com")
            .replace("/blob/", "/")
    } else {
        url.to_string()
    }
}

pub fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Read a notebook from a local path or download it from a URL.
pub async fn load_notebook(location: &str) -> Result<Notebook> {
    let content = if is_url(location) {
        let response = reqwest::get(location)
            .await
            .with_context(|| format!("failed to download notebook from {location}"))?;
        let status = response.status();
        anyhow::ensure!(
            status.is_success(),
            "failed to download notebook from {location}: HTTP {status}"
        );
        response
            .text()
            .await
            .with_context(|| format!("failed to read notebook body from {location}"))?
    } else {
        std::fs::read_to_string(location)
            .with_context(|| format!("failed to read notebook: {location}"))?
    };

    Ok(Notebook::from_json_str(&content)?)
}

/// Parse a sibling `metadata.json`, if the notebook is local and one exists.
pub fn load_sibling_metadata(location: &str) -> Result<Option<Value>> {
    if is_url(location) {
        return Ok(None);
    }
    let Some(parent) = Path::new(location).parent() else {
        return Ok(None);
    };
    let path = parent.join("metadata.json");
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read metadata: {}", path.display()))?;
    let value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse metadata: {}", path.display()))?;
    Ok(Some(value))
}

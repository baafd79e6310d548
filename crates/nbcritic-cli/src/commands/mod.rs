pub mod critique;
pub mod init;
pub mod rate;
pub mod rate_plots;
pub mod summarize;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};

use nbcritic_core::chat::ChatClient;
use nbcritic_core::target::TargetId;
use nbcritic_providers::{create_client, NbcriticConfig};

use crate::{discover, fetch};

/// Build the configured chat client.
pub(crate) fn client_from_config(config: &NbcriticConfig) -> Result<Box<dyn ChatClient>> {
    let provider = config.providers.get(&config.default_provider).with_context(|| {
        format!(
            "provider '{}' not found in config (run 'nbcritic init' to create one)",
            config.default_provider
        )
    })?;
    create_client(provider)
}

/// Resolve the target list: either a discovery walk or a single notebook.
pub(crate) fn resolve_targets(
    notebooks: Option<&Path>,
    notebook: Option<&str>,
    prefix: Option<&str>,
) -> Result<Vec<TargetId>> {
    if let Some(single) = notebook {
        let location = fetch::rewrite_github_url(single);
        Ok(vec![TargetId::parse(location)?])
    } else if let Some(dir) = notebooks {
        discover::find_notebooks(dir, prefix)
    } else {
        anyhow::bail!("one of --notebooks or --notebook is required");
    }
}

//! Provider configuration and factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use nbcritic_core::chat::ChatClient;

use crate::mock::MockChatClient;
use crate::openrouter::OpenRouterClient;

/// Configuration for a single completion backend.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    OpenRouter {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    Mock {
        #[serde(default)]
        response: String,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::OpenRouter {
                api_key: _,
                base_url,
            } => f
                .debug_struct("OpenRouter")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Mock { response } => f
                .debug_struct("Mock")
                .field("response", response)
                .finish(),
        }
    }
}

/// Default models per evaluation task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDefaults {
    /// Model for per-cell critiques.
    #[serde(default = "default_cells_model")]
    pub cells: String,
    /// Model for critique summaries.
    #[serde(default = "default_summary_model")]
    pub summary: String,
    /// Model for notebook and plot ratings.
    #[serde(default = "default_rating_model")]
    pub rating: String,
}

fn default_cells_model() -> String {
    "google/gemini-2.0-flash-001".to_string()
}
fn default_summary_model() -> String {
    "anthropic/claude-3.7-sonnet".to_string()
}
fn default_rating_model() -> String {
    "google/gemini-2.0-flash-001".to_string()
}

impl Default for ModelDefaults {
    fn default() -> Self {
        Self {
            cells: default_cells_model(),
            summary: default_summary_model(),
            rating: default_rating_model(),
        }
    }
}

/// Top-level nbcritic configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NbcriticConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Provider to use.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Per-task default models.
    #[serde(default)]
    pub models: ModelDefaults,
}

fn default_provider() -> String {
    "openrouter".to_string()
}

impl Default for NbcriticConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            models: ModelDefaults::default(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Resolve env vars in a provider config.
fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::OpenRouter { api_key, base_url } => ProviderConfig::OpenRouter {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
        },
        ProviderConfig::Mock { response } => ProviderConfig::Mock {
            response: response.clone(),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `nbcritic.toml` in the current directory
/// 2. `~/.config/nbcritic/config.toml`
///
/// Environment variable override: `NBCRITIC_OPENROUTER_KEY`.
pub fn load_config() -> Result<NbcriticConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<NbcriticConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("nbcritic.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<NbcriticConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => NbcriticConfig::default(),
    };

    // Apply env var override
    if let Ok(key) = std::env::var("NBCRITIC_OPENROUTER_KEY") {
        config
            .providers
            .entry("openrouter".into())
            .or_insert(ProviderConfig::OpenRouter {
                api_key: String::new(),
                base_url: None,
            });
        if let Some(ProviderConfig::OpenRouter { api_key, .. }) =
            config.providers.get_mut("openrouter")
        {
            *api_key = key;
        }
    }

    // Resolve env vars in all provider configs
    let resolved: HashMap<String, ProviderConfig> = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();
    config.providers = resolved;

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("nbcritic"))
}

/// Create a chat client from its configuration.
pub fn create_client(config: &ProviderConfig) -> Result<Box<dyn ChatClient>> {
    match config {
        ProviderConfig::OpenRouter { api_key, base_url } => {
            anyhow::ensure!(!api_key.is_empty(), "openrouter api_key is empty");
            Ok(Box::new(OpenRouterClient::new(api_key, base_url.clone())))
        }
        ProviderConfig::Mock { response } => {
            Ok(Box::new(MockChatClient::with_fixed_response(response)))
        }
    }
}

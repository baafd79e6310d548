//! nbcritic-providers — chat completion backends.
//!
//! Implements the `ChatClient` trait for OpenRouter-compatible APIs, plus a
//! mock client so the whole pipeline can run offline in tests.

pub mod config;
pub mod error;
pub mod mock;
pub mod openrouter;

pub use config::{create_client, load_config, load_config_from, NbcriticConfig, ProviderConfig};
pub use error::ProviderError;

//! LLM provider implementations for SupportDesk.
//!
//! All providers implement the `supportdesk_core::Provider` trait.
//! [`build_from_config`] picks the endpoint from configuration.

pub mod openai_compat;

use std::sync::Arc;
use supportdesk_config::AppConfig;
use supportdesk_core::Provider;

pub use openai_compat::OpenAiCompatProvider;

/// Build the configured provider.
///
/// The API key may be empty here; requests then fail with an
/// authentication error, which callers surface to the user.
pub fn build_from_config(config: &AppConfig) -> Arc<dyn Provider> {
    let base_url = config
        .api_url
        .clone()
        .unwrap_or_else(|| default_base_url(&config.provider));
    let api_key = config.api_key.clone().unwrap_or_default();

    tracing::debug!(provider = %config.provider, base_url = %base_url, "Building provider");
    Arc::new(OpenAiCompatProvider::new(&config.provider, base_url, api_key))
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "openai" => "https://api.openai.com/v1".into(),
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "azure" => "https://api.openai.azure.com/openai/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}

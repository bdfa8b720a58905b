pub mod ask;
pub mod chat;
pub mod doctor;
pub mod index;
pub mod onboard;

use std::path::Path;
use supportdesk_config::AppConfig;

/// Load the config from `path`, or from the default location.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    tracing::debug!(path = ?path, "Loading config");
    let config = match path {
        Some(path) => AppConfig::load_file(path),
        None => AppConfig::load(),
    };
    Ok(config.map_err(|e| format!("Failed to load config: {e}"))?)
}

/// Fail early, with setup hints, when no API key is available.
pub fn require_api_key(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.has_api_key() {
        return Ok(());
    }
    eprintln!();
    eprintln!("  ERROR: No API key configured!");
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    eprintln!("    SUPPORTDESK_API_KEY=sk-...");
    eprintln!("    OPENAI_API_KEY=sk-...");
    eprintln!();
    eprintln!("  Or add api_key to your config file:");
    eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
    eprintln!();
    Err("No API key found. See above for setup instructions.".into())
}

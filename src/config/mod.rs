mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./postboard.toml",
        "~/.config/postboard/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.store.project_id.trim().is_empty() {
        anyhow::bail!("Store project_id cannot be empty");
    }

    if !is_http_url(&config.store.base_url) {
        anyhow::bail!("Store base_url must be an http(s) URL: {}", config.store.base_url);
    }

    if config.store.collection.trim().is_empty() {
        anyhow::bail!("Store collection cannot be empty");
    }

    if !is_http_url(&config.images.endpoint) {
        anyhow::bail!("Images endpoint must be an http(s) URL: {}", config.images.endpoint);
    }

    if config.store.timeout_secs == 0 || config.images.timeout_secs == 0 {
        anyhow::bail!("Request timeouts cannot be 0");
    }

    if let Some(ref user_id) = config.session.user_id {
        if !user_id.trim().is_empty() && config.session.email.is_none() {
            tracing::warn!("Session user '{}' has no email; post creation will be rejected", user_id);
        }
    }

    Ok(())
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

use url::Url;

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - input path exists (and is a directory when `parse_dir` is set)
/// - save path is an existing directory
/// - indexer URL is http(s) and an API key is present
/// - torrent client URL uses a supported scheme
/// - tracker size multipliers are at least 1
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if !config.input_path.exists() {
        return Err(ConfigError::ValidationError(format!(
            "\"{}\" does not exist",
            config.input_path.display()
        )));
    }
    if config.parse_dir && !config.input_path.is_dir() {
        return Err(ConfigError::ValidationError(format!(
            "parse_dir is set but \"{}\" is not a directory; parse_dir treats the contents of \
             the input path as individual releases",
            config.input_path.display()
        )));
    }
    if !config.save_path.is_dir() {
        return Err(ConfigError::ValidationError(format!(
            "\"{}\" directory does not exist",
            config.save_path.display()
        )));
    }

    let indexer_url = Url::parse(&config.indexer.url).map_err(|e| {
        ConfigError::ValidationError(format!("invalid indexer URL '{}': {}", config.indexer.url, e))
    })?;
    if !matches!(indexer_url.scheme(), "http" | "https") {
        return Err(ConfigError::ValidationError(
            "indexer URL must start with http / https".to_string(),
        ));
    }
    if config.indexer.api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "indexer.api_key cannot be empty".to_string(),
        ));
    }

    if let Some(client) = &config.torrent_client {
        let client_url = Url::parse(&client.url).map_err(|e| {
            ConfigError::ValidationError(format!("invalid torrent client URL '{}': {}", client.url, e))
        })?;
        if !matches!(client_url.scheme(), "http" | "https" | "scgi") {
            return Err(ConfigError::ValidationError(format!(
                "unknown URI scheme '{}'",
                client.url
            )));
        }
    }

    if let Some((tracker, _)) = config
        .search
        .tracker_size_multipliers
        .iter()
        .find(|(_, multiplier)| **multiplier == 0)
    {
        return Err(ConfigError::ValidationError(format!(
            "size multiplier for tracker '{}' must be at least 1",
            tracker
        )));
    }

    Ok(())
}

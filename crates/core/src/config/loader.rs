use figment::{
    providers::{Env, Format, Toml},
    Figment, Provider,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration from an optional file, environment variables and
/// caller-supplied overrides (typically CLI flags), in increasing precedence.
pub fn load_config(path: Option<&Path>, overrides: impl Provider) -> Result<Config, ConfigError> {
    let mut figment = Figment::new();

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        figment = figment.merge(Toml::file(path));
    }

    let config: Config = figment
        .merge(Env::prefixed("CROSSGRAB_").split("__"))
        .merge(overrides)
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

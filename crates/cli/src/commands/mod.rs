pub mod config_cmd;
pub mod demo;
pub mod plan;
pub mod run;

use std::path::{Path, PathBuf};

use goalchain_agents::default_registry;
use goalchain_config::{AppConfig, ConfigError};
use goalchain_orchestrator::Orchestrator;

/// Config file in effect: the `--config` path or the default location.
pub fn config_file(path: Option<&Path>) -> PathBuf {
    path.map(Path::to_path_buf)
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"))
}

/// Load config from `path` (or the default location) with env overrides.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match path {
        Some(path) => {
            let mut config = AppConfig::load_from(path)?;
            config.apply_overrides(|name| std::env::var(name).ok())?;
            Ok(config)
        }
        None => AppConfig::load(),
    }
}

/// Orchestrator wired with the built-in agents.
pub fn build_orchestrator(config: &AppConfig) -> Orchestrator {
    Orchestrator::from_config(config, default_registry(&config.agents))
}

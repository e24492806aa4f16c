//! `goalchain config`: configuration management commands.

use std::path::Path;

use goalchain_config::AppConfig;

pub fn validate(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match super::load_config(config_path) {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let warnings = warnings(&config);

            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            println!();
            println!(
                "   Retries:    {} attempts, {}ms backoff x{} (max {}ms)",
                config.engine.max_attempts,
                config.engine.initial_backoff_ms,
                config.engine.backoff_multiplier,
                config.engine.max_backoff_ms
            );
            println!(
                "   Scoring:    penalty {}, bonus {}, threshold {}",
                config.scoring.failure_penalty,
                config.scoring.summarize_bonus,
                config.scoring.satisfaction_threshold
            );
            println!(
                "   Planner:    weather requires launch = {}",
                config.planner.weather_requires_launch
            );
            println!("   HTTP:       {}s timeout", config.agents.http_timeout_secs);
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub fn show(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(config_path)
        .map_err(|e| format!("Failed to load config: {e}"))?;
    config.agents.openweather_api_key = redacted(config.agents.openweather_api_key);
    config.agents.news_api_key = redacted(config.agents.news_api_key);
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub fn path(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", super::config_file(config_path).display());
    Ok(())
}

/// Settings that work but degrade an agent.
fn warnings(config: &AppConfig) -> Vec<&'static str> {
    let mut warnings = Vec::new();

    if config.agents.openweather_api_key.is_none() {
        warnings.push("No OpenWeatherMap key (set OPENWEATHER_API_KEY), weather will be simulated");
    }

    if config.agents.news_api_key.is_none() {
        warnings.push("No NewsAPI key (set NEWS_API_KEY), news will use canned articles");
    }

    if config.agents.fallback_location.is_none() {
        warnings.push("No fallback_location, Weather fails when the launchpad is unknown");
    }

    warnings
}

fn redacted(key: Option<String>) -> Option<String> {
    key.map(|_| "***".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn config_path_is_valid() {
        let path = super::super::config_file(None);
        assert!(path.to_str().unwrap().ends_with("config.toml"));
        assert_eq!(
            super::super::config_file(Some(Path::new("/etc/goalchain.toml"))),
            Path::new("/etc/goalchain.toml")
        );
    }

    #[test]
    fn blank_fallback_location_is_warned_about() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[agents]\nfallback_location = \"\"").unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        let found = warnings(&config);
        assert!(found.iter().any(|w| w.contains("fallback_location")));

        assert!(
            !warnings(&AppConfig::default())
                .iter()
                .any(|w| w.contains("fallback_location"))
        );
    }

    #[test]
    fn keys_are_redacted() {
        assert_eq!(redacted(Some("secret".into())).as_deref(), Some("***"));
        assert_eq!(redacted(None), None);
    }
}

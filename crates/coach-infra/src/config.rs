//! Configuration loader for the coaching backend.
//!
//! Reads `config.toml` from the data directory (`~/.coach/` by default)
//! and deserializes it into [`CoachConfig`]. A missing file yields the
//! defaults; a file that exists but cannot be read or parsed is a fatal
//! [`ConfigError`], since serving with half-applied settings is worse than
//! not starting.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use coach_types::config::CoachConfig;
use coach_types::error::ConfigError;

/// Overrides `prompt.dev_mode` (`1`/`true`/`yes` or `0`/`false`/`no`).
pub const ENV_DEV_MODE: &str = "COACH_DEV_MODE";
/// Overrides `database_url`.
pub const ENV_DATABASE_URL: &str = "COACH_DATABASE_URL";
/// Overrides the data directory.
pub const ENV_DATA_DIR: &str = "COACH_DATA_DIR";

/// Resolve the data directory: `COACH_DATA_DIR`, else `~/.coach`, else
/// `./.coach` when no home directory is known.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(ENV_DATA_DIR)
        && !dir.trim().is_empty()
    {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".coach")
}

/// Load configuration from `{data_dir}/config.toml` and apply environment
/// overrides.
pub async fn load_config(data_dir: &Path) -> Result<CoachConfig, ConfigError> {
    let config_path = data_dir.join("config.toml");

    let mut config = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => parse_config(&config_path, &content)?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %config_path.display(), "no config.toml found, using defaults");
            CoachConfig::default()
        }
        Err(err) => {
            return Err(ConfigError::Read {
                path: config_path.display().to_string(),
                message: err.to_string(),
            });
        }
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate(&config)?;
    Ok(config)
}

fn parse_config(path: &Path, content: &str) -> Result<CoachConfig, ConfigError> {
    toml::from_str::<CoachConfig>(content).map_err(|err| ConfigError::Parse {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}

/// Apply `COACH_*` overrides using `lookup` to read variables.
pub fn apply_env_overrides(
    config: &mut CoachConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(raw) = lookup(ENV_DEV_MODE) {
        config.prompt.dev_mode = parse_bool(&raw).ok_or_else(|| ConfigError::Invalid {
            field: ENV_DEV_MODE.to_string(),
            message: format!("expected a boolean, got '{raw}'"),
        })?;
    }
    if let Some(url) = lookup(ENV_DATABASE_URL)
        && !url.trim().is_empty()
    {
        config.database_url = Some(url);
    }
    Ok(())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

fn validate(config: &CoachConfig) -> Result<(), ConfigError> {
    if config.oracle.model.trim().is_empty() {
        return Err(ConfigError::Invalid {
            field: "oracle.model".to_string(),
            message: "must not be empty".to_string(),
        });
    }
    if config.oracle.timeout_secs == 0 {
        return Err(ConfigError::Invalid {
            field: "oracle.timeout_secs".to_string(),
            message: "must be greater than zero".to_string(),
        });
    }
    if config.jobs.queue_capacity == 0 {
        return Err(ConfigError::Invalid {
            field: "jobs.queue_capacity".to_string(),
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(())
}

/// Read the oracle API key from the configured environment variable.
pub fn resolve_api_key(config: &CoachConfig) -> Result<SecretString, ConfigError> {
    resolve_api_key_with(config, |key| std::env::var(key).ok())
}

fn resolve_api_key_with(
    config: &CoachConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    let var = &config.oracle.api_key_env;
    match lookup(var) {
        Some(key) if !key.trim().is_empty() => Ok(SecretString::from(key)),
        _ => Err(ConfigError::MissingApiKey(var.clone())),
    }
}

/// `{data_dir}/coach.db` unless `database_url` is set.
pub fn database_url(config: &CoachConfig, data_dir: &Path) -> String {
    config
        .database_url
        .clone()
        .unwrap_or_else(|| crate::sqlite::pool::default_database_url(data_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[tokio::test]
    async fn test_load_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).await.unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.jobs.queue_capacity, 256);
    }

    #[tokio::test]
    async fn test_load_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
[server]
bind = "0.0.0.0:9000"

[oracle]
model = "claude-haiku-4-5"
timeout_secs = 10

[prompt]
recent_message_limit = 5
"#,
        )
        .await
        .unwrap();

        let config = load_config(tmp.path()).await.unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert_eq!(config.oracle.model, "claude-haiku-4-5");
        assert_eq!(config.oracle.timeout_secs, 10);
        assert_eq!(config.prompt.recent_message_limit, 5);
    }

    #[tokio::test]
    async fn test_load_config_malformed_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "[oracle\nmodel = ")
            .await
            .unwrap();

        let err = load_config(tmp.path()).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_load_config_rejects_zero_timeout() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "[oracle]\ntimeout_secs = 0\n")
            .await
            .unwrap();

        let err = load_config(tmp.path()).await.unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "oracle.timeout_secs"));
    }

    #[test]
    fn test_env_overrides_apply() {
        let mut config = CoachConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                (ENV_DEV_MODE, "true"),
                (ENV_DATABASE_URL, "sqlite:///tmp/other.db"),
            ]),
        )
        .unwrap();
        assert!(config.prompt.dev_mode);
        assert_eq!(config.database_url.as_deref(), Some("sqlite:///tmp/other.db"));
    }

    #[test]
    fn test_env_override_invalid_bool_is_error() {
        let mut config = CoachConfig::default();
        let err = apply_env_overrides(&mut config, env(&[(ENV_DEV_MODE, "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_dev_mode_can_be_forced_off() {
        let mut config = CoachConfig::default();
        config.prompt.dev_mode = true;
        apply_env_overrides(&mut config, env(&[(ENV_DEV_MODE, "0")])).unwrap();
        assert!(!config.prompt.dev_mode);
    }

    #[test]
    fn test_resolve_api_key_present_and_missing() {
        let config = CoachConfig::default();
        let key = resolve_api_key_with(&config, env(&[("ANTHROPIC_API_KEY", "sk-abc")])).unwrap();
        assert_eq!(key.expose_secret(), "sk-abc");

        let err = resolve_api_key_with(&config, env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey(ref var) if var == "ANTHROPIC_API_KEY"));

        let err = resolve_api_key_with(&config, env(&[("ANTHROPIC_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey(_)));
    }

    #[test]
    fn test_database_url_defaults_to_data_dir() {
        let config = CoachConfig::default();
        let url = database_url(&config, Path::new("/var/lib/coach"));
        assert_eq!(url, "sqlite:///var/lib/coach/coach.db");
    }
}

//! Policy loading from disk and the process environment.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use crate::config::schema::{LogFormat, OriginPolicy, PolicyConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Names the optional TOML policy file.
pub const CONFIG_PATH_ENV: &str = "GATEKEEPER_CONFIG";

/// Error type for policy loading. Every variant is fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse policy file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load the process-wide policy.
///
/// Reads `.env` if present, then the TOML file named by `GATEKEEPER_CONFIG`,
/// then environment overrides, then validates.
pub fn load() -> Result<PolicyConfig, ConfigError> {
    dotenvy::dotenv().ok();

    let path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
    load_from(path.as_deref(), |key| std::env::var(key).ok())
}

/// Same pipeline as [`load`] with an explicit file and environment lookup.
pub fn load_from<F>(path: Option<&Path>, env: F) -> Result<PolicyConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            toml::from_str(&content)?
        }
        None => PolicyConfig::default(),
    };

    apply_env(&mut config, &env)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn apply_env<F>(config: &mut PolicyConfig, env: &F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = env("HOST") {
        config.server.host = host;
    }
    if let Some(port) = parse_env(env, "PORT")? {
        config.server.port = port;
    }

    // An empty secret is the same as no secret.
    if let Some(token) = env("ADMIN_ACCESS_TOKEN") {
        config.admin.access_token = Some(token).filter(|t| !t.is_empty());
    }

    if let Some(host) = env("DB_HOST") {
        config.database.host = host;
    }
    if let Some(port) = parse_env(env, "DB_PORT")? {
        config.database.port = port;
    }
    if let Some(username) = env("DB_USERNAME") {
        config.database.username = Some(username);
    }
    if let Some(password) = env("DB_PASSWORD") {
        config.database.password = Some(password);
    }
    if let Some(database) = env("DB_DATABASE") {
        config.database.database = Some(database);
    }
    if let Some(ssl) = parse_env(env, "DB_SSL")? {
        config.database.ssl = ssl;
    }

    if let Some(window_ms) = parse_env(env, "RATE_LIMIT_WINDOW_MS")? {
        config.rate_limit.window_ms = window_ms;
    }
    if let Some(max) = parse_env(env, "RATE_LIMIT_MAX")? {
        config.rate_limit.max_requests = max;
    }

    if let Some(origins) = env("CORS_ORIGINS") {
        config.cors.policy = parse_origins(&origins);
    }

    if let Some(level) = env("LOG_LEVEL") {
        config.observability.log_level = level;
    }
    if let Some(format) = env("LOG_FORMAT") {
        config.observability.log_format = match format.to_ascii_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            _ => {
                return Err(ConfigError::InvalidEnv {
                    key: "LOG_FORMAT",
                    value: format,
                })
            }
        };
    }
    if let Some(address) = env("METRICS_ADDRESS") {
        config.observability.metrics_address = address;
        config.observability.metrics_enabled = true;
    }

    Ok(())
}

fn parse_env<F, T>(env: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match env(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { key, value: raw }),
    }
}

/// `*` admits any origin, `false` or blank disables CORS processing,
/// anything else is a comma-separated allow list.
fn parse_origins(raw: &str) -> OriginPolicy {
    let raw = raw.trim();
    match raw {
        "" | "false" => OriginPolicy::Unrestricted,
        "*" => OriginPolicy::Any,
        list => OriginPolicy::List(
            list.split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect(),
        ),
    }
}

//! Configuration loader
//!
//! Loads importer configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Reads a `.env` file into the environment if one exists
//! 2. Attempts to load from environment variables
//! 3. If no provider is configured there, falls back to a config file
//! 4. Probes multiple paths for config files (JSON or TOML)
//!
//! ## Environment Variables
//! Per provider (`GOOGLE`, `MICROSOFT`, `YAHOO`); a provider is configured
//! when its client id is set, and then all three are required:
//! - `CONTACT_IMPORTER_<PROVIDER>_CLIENT_ID`
//! - `CONTACT_IMPORTER_<PROVIDER>_CLIENT_SECRET`
//! - `CONTACT_IMPORTER_<PROVIDER>_REDIRECT_URI`
//!
//! Optional:
//! - `CONTACT_IMPORTER_HTTP_TIMEOUT_SECS`, `CONTACT_IMPORTER_HTTP_USER_AGENT`
//! - `CONTACT_IMPORTER_SESSION_TTL_SECS`, `CONTACT_IMPORTER_SESSION_MAX_ENTRIES`
//! - `CONTACT_IMPORTER_STRICT_STATE` (true/false)
//! - `CONTACT_IMPORTER_LOG_LEVEL`, `CONTACT_IMPORTER_LOG_FORMAT` (pretty/json)
//!
//! ## File Locations
//! The loader probes `contact-importer.{json,toml}` then `config.{json,toml}`
//! in the working directory, its parent, and next to the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use contact_importer_domain::{ImporterConfig, ImporterError, ProviderConfig, ProviderKind, Result};

const ENV_PREFIX: &str = "CONTACT_IMPORTER";
const CONFIG_FILE_NAMES: [&str; 4] =
    ["contact-importer.json", "contact-importer.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `ImporterError::Config` if configuration cannot be loaded from
/// either source or fails validation.
pub fn load() -> Result<ImporterConfig> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)?
        }
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `ImporterError::Config` if no provider is configured, a configured
/// provider is missing a variable, or a numeric value does not parse.
pub fn load_from_env() -> Result<ImporterConfig> {
    let mut config = ImporterConfig::default();

    for kind in ProviderKind::ALL {
        if let Some(provider) = provider_from_env(kind)? {
            config.providers.set(kind, provider);
        }
    }
    if config.configured_providers().is_empty() {
        return Err(ImporterError::Config(format!(
            "No {ENV_PREFIX}_<PROVIDER>_CLIENT_ID environment variable set"
        )));
    }

    if let Some(timeout) = env_parse::<u64>("HTTP_TIMEOUT_SECS")? {
        config.http.timeout_secs = timeout;
    }
    config.http.user_agent = env_opt("HTTP_USER_AGENT");

    if let Some(ttl) = env_parse::<u64>("SESSION_TTL_SECS")? {
        config.session.ttl_secs = ttl;
    }
    if let Some(max_entries) = env_parse::<u64>("SESSION_MAX_ENTRIES")? {
        config.session.max_entries = max_entries;
    }

    config.oauth.strict_state = env_bool("STRICT_STATE", false);

    if let Some(level) = env_opt("LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(format) = env_parse("LOG_FORMAT")? {
        config.logging.format = format;
    }

    Ok(config)
}

fn provider_from_env(kind: ProviderKind) -> Result<Option<ProviderConfig>> {
    let prefix = kind.as_str().to_ascii_uppercase();
    let Some(client_id) = env_opt(&format!("{prefix}_CLIENT_ID")) else {
        return Ok(None);
    };

    Ok(Some(ProviderConfig::new(
        client_id,
        env_var(&format!("{prefix}_CLIENT_SECRET"))?,
        env_var(&format!("{prefix}_REDIRECT_URI"))?,
    )))
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `ImporterError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<ImporterConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ImporterError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ImporterError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ImporterError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ImporterConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ImporterError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ImporterError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(ImporterError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.join(".."));
        dirs.insert(0, cwd);
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

fn env_name(key: &str) -> String {
    format!("{ENV_PREFIX}_{key}")
}

/// Optional variable; empty values count as unset.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(env_name(key)).ok().filter(|v| !v.trim().is_empty())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        ImporterError::Config(format!("Missing required environment variable: {}", env_name(key)))
    })
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| {
                ImporterError::Config(format!("Invalid value for {}: {e}", env_name(key)))
            })
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    env_opt(key)
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use contact_importer_domain::LogFormat;
    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: [&str; 16] = [
        "GOOGLE_CLIENT_ID",
        "GOOGLE_CLIENT_SECRET",
        "GOOGLE_REDIRECT_URI",
        "MICROSOFT_CLIENT_ID",
        "MICROSOFT_CLIENT_SECRET",
        "MICROSOFT_REDIRECT_URI",
        "YAHOO_CLIENT_ID",
        "YAHOO_CLIENT_SECRET",
        "YAHOO_REDIRECT_URI",
        "HTTP_TIMEOUT_SECS",
        "HTTP_USER_AGENT",
        "SESSION_TTL_SECS",
        "SESSION_MAX_ENTRIES",
        "STRICT_STATE",
        "LOG_LEVEL",
        "LOG_FORMAT",
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(env_name(key));
        }
    }

    fn set(key: &str, value: &str) {
        std::env::set_var(env_name(key), value);
    }

    fn temp_config(contents: &str, extension: &str) -> PathBuf {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        let path = temp_file.path().with_extension(extension);
        std::fs::copy(temp_file.path(), &path).unwrap();
        path
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        for value in ["1", "true", "yes", "on", "TRUE"] {
            set("STRICT_STATE", value);
            assert!(env_bool("STRICT_STATE", false), "{value} should be true");
        }
        for value in ["0", "false", "no", "off"] {
            set("STRICT_STATE", value);
            assert!(!env_bool("STRICT_STATE", true), "{value} should be false");
        }

        clear_env();
        assert!(env_bool("STRICT_STATE", true));
        assert!(!env_bool("STRICT_STATE", false));
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        set("GOOGLE_CLIENT_ID", "google-id");
        set("GOOGLE_CLIENT_SECRET", "google-secret");
        set("GOOGLE_REDIRECT_URI", "https://app.example.com/google");
        set("YAHOO_CLIENT_ID", "yahoo-id");
        set("YAHOO_CLIENT_SECRET", "yahoo-secret");
        set("YAHOO_REDIRECT_URI", "https://app.example.com/yahoo");
        set("HTTP_TIMEOUT_SECS", "10");
        set("SESSION_TTL_SECS", "120");
        set("STRICT_STATE", "true");
        set("LOG_FORMAT", "json");

        let result = load_from_env();
        clear_env();

        let config = result.unwrap();
        assert_eq!(
            config.configured_providers(),
            vec![ProviderKind::Google, ProviderKind::Yahoo]
        );
        assert_eq!(config.provider(ProviderKind::Google).unwrap().client_id, "google-id");
        assert_eq!(
            config.provider(ProviderKind::Yahoo).unwrap().redirect_uri,
            "https://app.example.com/yahoo"
        );
        assert_eq!(config.http.timeout_secs, 10);
        assert_eq!(config.session.ttl_secs, 120);
        assert!(config.oauth.strict_state);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_env_missing_var() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        assert!(matches!(load_from_env(), Err(ImporterError::Config(_))));

        set("MICROSOFT_CLIENT_ID", "ms-id");
        set("MICROSOFT_CLIENT_SECRET", "ms-secret");
        let result = load_from_env();
        clear_env();

        match result {
            Err(ImporterError::Config(msg)) => {
                assert!(msg.contains("CONTACT_IMPORTER_MICROSOFT_REDIRECT_URI"));
            }
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        set("GOOGLE_CLIENT_ID", "id");
        set("GOOGLE_CLIENT_SECRET", "secret");
        set("GOOGLE_REDIRECT_URI", "https://app.example.com/cb");
        set("HTTP_TIMEOUT_SECS", "soon");

        let result = load_from_env();
        clear_env();

        assert!(matches!(result, Err(ImporterError::Config(_))), "Should be a Config error");
    }

    #[test]
    fn test_load_from_file_json() {
        let path = temp_config(
            r#"{
                "providers": {
                    "google": {
                        "client_id": "id",
                        "client_secret": "secret",
                        "redirect_uri": "https://app.example.com/cb",
                        "scopes": ["https://www.googleapis.com/auth/contacts.readonly"]
                    }
                },
                "http": { "timeout_secs": 5 }
            }"#,
            "json",
        );

        let config = load_from_file(Some(path.clone())).unwrap();
        std::fs::remove_file(path).ok();

        let google = config.provider(ProviderKind::Google).unwrap();
        assert_eq!(google.scopes.as_ref().map(Vec::len), Some(1));
        assert_eq!(config.http.timeout_secs, 5);
        assert!(config.http.user_agent.is_none());
    }

    #[test]
    fn test_load_from_file_toml() {
        let path = temp_config(
            r#"
[providers.microsoft]
client_id = "id"
client_secret = "secret"
redirect_uri = "https://app.example.com/cb"

[session]
ttl_secs = 300

[oauth]
strict_state = true

[logging]
level = "contact_importer=debug"
format = "json"
"#,
            "toml",
        );

        let config = load_from_file(Some(path.clone())).unwrap();
        std::fs::remove_file(path).ok();

        assert!(config.provider(ProviderKind::Microsoft).is_ok());
        assert_eq!(config.session.ttl_secs, 300);
        assert!(config.oauth.strict_state);
        assert_eq!(config.logging.level, "contact_importer=debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/contact-importer.json")));
        assert!(matches!(result, Err(ImporterError::Config(_))), "Should be a Config error");
    }

    #[test]
    fn test_load_from_file_invalid_json() {
        let path = temp_config(r#"{ "this is": "not valid json" "#, "json");

        let result = load_from_file(Some(path.clone()));
        std::fs::remove_file(path).ok();

        assert!(result.is_err(), "Should fail with invalid JSON");
    }

    #[test]
    fn test_parse_config_unsupported_extension() {
        let result = parse_config("key: value", Path::new("config.yaml"));
        assert!(matches!(result, Err(ImporterError::Config(msg)) if msg.contains("yaml")));
    }
}

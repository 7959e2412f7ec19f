//! Configuration service implementation.
//!
//! Loads [`ClientConfig`] from `config.toml`, then applies environment
//! overrides. The file wins over built-in defaults and the environment wins
//! over the file.

use crate::paths::IntakePaths;
use intake_core::config::ClientConfig;
use intake_core::error::{IntakeError, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

pub const ENV_API_BASE_URL: &str = "INTAKE_API_BASE_URL";
pub const ENV_DOMAIN_KEY: &str = "INTAKE_DOMAIN_KEY";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "INTAKE_REQUEST_TIMEOUT_SECS";
pub const ENV_HIGHLIGHT_DECAY_MS: &str = "INTAKE_HIGHLIGHT_DECAY_MS";

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Configuration service that loads and caches the client configuration.
#[derive(Clone)]
pub struct ConfigService {
    config_file: Option<PathBuf>,
    paths: IntakePaths,
    env: EnvLookup,
    /// Cached configuration loaded from file.
    /// Uses RwLock for thread-safe lazy loading.
    config: Arc<RwLock<Option<ClientConfig>>>,
}

impl ConfigService {
    /// Creates a service reading the platform config file and process environment.
    pub fn new() -> Self {
        Self {
            config_file: None,
            paths: IntakePaths::default(),
            env: Arc::new(|key: &str| std::env::var(key).ok()),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Reads configuration from an explicit file instead of the platform default.
    pub fn with_config_file(mut self, path: impl AsRef<Path>) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Replaces the environment lookup.
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Arc::new(lookup);
        self
    }

    /// Gets the configuration, loading from file if not cached.
    ///
    /// # Errors
    ///
    /// Fails when the file exists but cannot be read or parsed, or when an
    /// environment override is not a valid value.
    pub fn get_config(&self) -> Result<ClientConfig> {
        {
            let read_lock = self
                .config
                .read()
                .map_err(|e| IntakeError::internal(format!("config cache poisoned: {e}")))?;
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let mut loaded = self.load_file()?;
        self.apply_env_overrides(&mut loaded)?;

        {
            let mut write_lock = self
                .config
                .write()
                .map_err(|e| IntakeError::internal(format!("config cache poisoned: {e}")))?;
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = None;
        }
    }

    /// Path that `get_config` reads.
    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.config_file {
            Some(path) => Ok(path.clone()),
            None => self
                .paths
                .config_file()
                .map_err(|e| IntakeError::config(e.to_string())),
        }
    }

    fn load_file(&self) -> Result<ClientConfig> {
        let path = self.config_path()?;
        if !path.exists() {
            tracing::debug!("[ConfigService] {} not found, using defaults", path.display());
            return Ok(ClientConfig::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: ClientConfig = toml::from_str(&content)?;
        tracing::debug!("[ConfigService] Loaded {}", path.display());
        Ok(config)
    }

    fn apply_env_overrides(&self, config: &mut ClientConfig) -> Result<()> {
        if let Some(url) = self.lookup(ENV_API_BASE_URL) {
            config.api_base_url = url;
        }
        if let Some(key) = self.lookup(ENV_DOMAIN_KEY) {
            config.domain_key = key;
        }
        if let Some(raw) = self.lookup(ENV_REQUEST_TIMEOUT_SECS) {
            config.request_timeout_secs = parse_number(ENV_REQUEST_TIMEOUT_SECS, &raw)?;
        }
        if let Some(raw) = self.lookup(ENV_HIGHLIGHT_DECAY_MS) {
            config.highlight_decay_ms = parse_number(ENV_HIGHLIGHT_DECAY_MS, &raw)?;
        }
        Ok(())
    }

    /// Blank values count as unset.
    fn lookup(&self, key: &str) -> Option<String> {
        (self.env)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConfigService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigService")
            .field("config_file", &self.config_file)
            .field("paths", &self.paths)
            .finish_non_exhaustive()
    }
}

fn parse_number(key: &str, raw: &str) -> Result<u64> {
    raw.parse::<u64>()
        .map_err(|_| IntakeError::config(format!("{key} must be a non-negative integer, got '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + Send + Sync + 'static {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let service = ConfigService::new()
            .with_config_file(temp.path().join("config.toml"))
            .with_env_lookup(env_from(&[]));

        assert_eq!(service.get_config().unwrap(), ClientConfig::default());
    }

    #[test]
    fn test_file_values_are_loaded() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            "api_base_url = \"http://clinic.local:9000\"\nhighlight_decay_ms = 1500\n",
        )
        .unwrap();

        let service = ConfigService::new()
            .with_config_file(&path)
            .with_env_lookup(env_from(&[]));
        let config = service.get_config().unwrap();

        assert_eq!(config.api_base_url, "http://clinic.local:9000");
        assert_eq!(config.highlight_decay_ms, 1500);
        assert_eq!(config.chat_path, "/chatkit");
    }

    #[test]
    fn test_environment_overrides_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "api_base_url = \"http://from-file\"\ndomain_key = \"file-key\"\n").unwrap();

        let service = ConfigService::new().with_config_file(&path).with_env_lookup(env_from(&[
            (ENV_API_BASE_URL, "http://from-env"),
            (ENV_REQUEST_TIMEOUT_SECS, "5"),
            (ENV_DOMAIN_KEY, "  "),
        ]));
        let config = service.get_config().unwrap();

        assert_eq!(config.api_base_url, "http://from-env");
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.domain_key, "file-key");
    }

    #[test]
    fn test_invalid_env_number_is_config_error() {
        let temp = TempDir::new().unwrap();
        let service = ConfigService::new()
            .with_config_file(temp.path().join("config.toml"))
            .with_env_lookup(env_from(&[(ENV_HIGHLIGHT_DECAY_MS, "soon")]));

        let err = service.get_config().unwrap_err();
        assert!(matches!(err, IntakeError::Config(_)));
    }

    #[test]
    fn test_malformed_file_is_serialization_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "api_base_url = [").unwrap();

        let service = ConfigService::new()
            .with_config_file(&path)
            .with_env_lookup(env_from(&[]));
        let err = service.get_config().unwrap_err();
        assert!(matches!(err, IntakeError::Serialization { ref format, .. } if format == "TOML"));
    }

    #[test]
    fn test_config_is_cached_until_invalidated() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "domain_key = \"first\"\n").unwrap();

        let service = ConfigService::new()
            .with_config_file(&path)
            .with_env_lookup(env_from(&[]));
        assert_eq!(service.get_config().unwrap().domain_key, "first");

        std::fs::write(&path, "domain_key = \"second\"\n").unwrap();
        assert_eq!(service.get_config().unwrap().domain_key, "first");

        service.invalidate_cache();
        assert_eq!(service.get_config().unwrap().domain_key, "second");
    }
}

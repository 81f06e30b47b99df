//! Configuration loading for the request gateway.
//!
//! Every field has a default, so an empty TOML file is a valid config.
//! Values that would make the gateway misbehave are rejected by
//! [`GatewayConfig::validate`].

use crate::error::Locale;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV_VAR: &str = "TRUSTAGENCY_CLIENT_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    pub base_url: String,
    /// Per-attempt timeout.
    pub timeout_ms: u64,
    /// Total attempts for retryable failures, including the first.
    pub retry_attempts: u32,
    /// Backoff base; attempt `n` (zero-based) waits `retry_delay_ms * 2^n`.
    pub retry_delay_ms: u64,
    /// GET cache lifetime. Zero disables the cache.
    pub cache_ttl_ms: u64,
    pub debug: bool,
    pub login_path: String,
    pub register_path: String,
    pub refresh_path: String,
    pub logout_path: String,
    pub event_capacity: usize,
    pub locale: Locale,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            timeout_ms: 30_000,
            retry_attempts: 3,
            retry_delay_ms: 1_000,
            cache_ttl_ms: 300_000,
            debug: false,
            login_path: "/api/admin/login".to_string(),
            register_path: "/api/admin/register".to_string(),
            refresh_path: "/api/auth/refresh".to_string(),
            logout_path: "/api/admin/logout".to_string(),
            event_capacity: 64,
            locale: Locale::En,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or TRUSTAGENCY_CLIENT_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl GatewayConfig {
    /// Preset for the public site: TTL cache on, paths under `/api`.
    pub fn site(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            login_path: "/api/auth/login".to_string(),
            register_path: "/api/auth/register".to_string(),
            logout_path: "/api/auth/logout".to_string(),
            ..Self::default()
        }
    }

    /// Preset for the admin console: no TTL cache, admin auth paths.
    pub fn admin(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            cache_ttl_ms: 0,
            ..Self::default()
        }
    }

    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path_from_args().or_else(config_path_from_env);
        let path = path.ok_or(ConfigError::MissingConfigPath)?;
        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: GatewayConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.base_url.trim();
        if base.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "base_url",
                reason: "must not be empty".to_string(),
            });
        }
        let host = base
            .strip_prefix("http://")
            .or_else(|| base.strip_prefix("https://"))
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "base_url",
                reason: "must start with http:// or https://".to_string(),
            })?;
        if host.trim_end_matches('/').is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "base_url",
                reason: "must include a host".to_string(),
            });
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.retry_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retry_attempts",
                reason: "must be > 0".to_string(),
            });
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "event_capacity",
                reason: "must be > 0".to_string(),
            });
        }
        for (field, path) in [
            ("login_path", &self.login_path),
            ("register_path", &self.register_path),
            ("refresh_path", &self.refresh_path),
            ("logout_path", &self.logout_path),
        ] {
            if !path.starts_with('/') {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "must start with '/'".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Base URL without a trailing slash.
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    /// Delay before the attempt following zero-based attempt `attempt`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        Duration::from_millis(self.retry_delay_ms.saturating_mul(factor))
    }

    /// Whether `endpoint` is one of the auth endpoints that never carry a
    /// bearer token and never trigger refresh or logout.
    pub fn is_auth_exempt(&self, endpoint: &str) -> bool {
        let path = endpoint.split('?').next().unwrap_or(endpoint);
        [&self.login_path, &self.register_path, &self.refresh_path]
            .iter()
            .any(|exempt| path == exempt.as_str() || path.ends_with(exempt.as_str()))
    }
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from)
}

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = GatewayConfig::default();
        config.validate().unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
    }

    #[test]
    fn backoff_doubles() {
        let config = GatewayConfig::default();
        assert_eq!(config.backoff_delay(0), Duration::from_millis(1_000));
        assert_eq!(config.backoff_delay(1), Duration::from_millis(2_000));
        assert_eq!(config.backoff_delay(2), Duration::from_millis(4_000));
    }

    #[test]
    fn rejects_bad_values() {
        let bad = GatewayConfig {
            base_url: "localhost:8001".to_string(),
            ..GatewayConfig::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(ConfigError::InvalidValue { field: "base_url", .. })
        ));

        let bad = GatewayConfig {
            retry_attempts: 0,
            ..GatewayConfig::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(ConfigError::InvalidValue { field: "retry_attempts", .. })
        ));

        let bad = GatewayConfig {
            timeout_ms: 0,
            ..GatewayConfig::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url = \"https://trustagency.info\"\ncache_ttl_ms = 0\nlocale = \"zh-CN\"").unwrap();
        let config = GatewayConfig::from_path(file.path()).unwrap();
        assert_eq!(config.base_url, "https://trustagency.info");
        assert_eq!(config.cache_ttl_ms, 0);
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.locale, Locale::ZhCn);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = toml::from_str::<GatewayConfig>("retries = 4").unwrap_err();
        assert!(err.to_string().contains("retries"));
    }

    #[test]
    fn auth_exempt_paths() {
        let config = GatewayConfig::admin("http://localhost:8001");
        assert!(config.is_auth_exempt("/api/admin/login"));
        assert!(config.is_auth_exempt("http://localhost:8001/api/auth/refresh"));
        assert!(!config.is_auth_exempt("/api/admin/me"));
        assert_eq!(config.cache_ttl_ms, 0);
    }
}

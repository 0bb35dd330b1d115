//! Configuration loading and management
//!
//! Configuration is read from YAML and then overridden by `GARAGE_*`
//! environment variables:
//!
//! | Variable                   | Key                          |
//! |----------------------------|------------------------------|
//! | `GARAGE_CONFIG`            | path of the YAML file        |
//! | `GARAGE_HOST`              | `server.host`                |
//! | `GARAGE_PORT`              | `server.port`                |
//! | `GARAGE_CORS_ORIGINS`      | `server.cors_origins` (comma-separated) |
//! | `GARAGE_BACKEND`           | `backend.kind`               |
//! | `GARAGE_BACKEND_URL`       | `backend.url`                |
//! | `GARAGE_BACKEND_KEY`       | `backend.anon_key`           |
//! | `GARAGE_BACKEND_SERVICE_KEY` | `backend.service_key`      |
//! | `GARAGE_ADMIN_EMAILS`      | `admin.emails` (comma-separated) |
//! | `GARAGE_ADMIN_PASSWORD`    | `admin.seed_password`        |
//! | `GARAGE_TRANSITION_POLICY` | `orders.transition_policy`   |

use crate::core::error::ConfigError;
use crate::orders::TransitionPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File read when `GARAGE_CONFIG` is not set, if present
pub const DEFAULT_CONFIG_FILE: &str = "garage.yaml";

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed browser origins; empty allows any origin
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origins: Vec::new(),
        }
    }
}

/// Which storage and identity backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    #[default]
    InMemory,
    Hosted,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub kind: BackendKind,
    /// Base URL of the hosted backend
    pub url: Option<String>,
    /// Public API key sent with every request
    pub anon_key: Option<String>,
    /// Privileged key for identity administration (provisioning)
    pub service_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Identities with these emails are administrators
    pub emails: Vec<String>,
    /// Password registered for every admin email on the in-memory backend
    pub seed_password: Option<String>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            emails: vec!["admin@admin.com".to_string()],
            seed_password: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrdersConfig {
    pub transition_policy: TransitionPolicy,
}

/// Complete configuration of the server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub admin: AdminConfig,
    pub orders: OrdersConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file '{}'", path.display()))?;
        serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::ParseError {
                file: Some(path.display().to_string()),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            file: None,
            message: e.to_string(),
        })?;
        Ok(config)
    }

    /// Defaults: in-memory backend on `0.0.0.0:3000`, strict transitions
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Load from the process environment
    ///
    /// Reads `GARAGE_CONFIG` (or `garage.yaml` when it exists), applies the
    /// environment overrides and validates the result.
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// [`load`](Self::load) with an explicit variable lookup
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = match lookup("GARAGE_CONFIG") {
            Some(path) => {
                tracing::info!(path = %path, "loading configuration");
                Self::from_yaml_file(&path)?
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                tracing::info!(path = DEFAULT_CONFIG_FILE, "loading configuration");
                Self::from_yaml_file(DEFAULT_CONFIG_FILE)?
            }
            None => {
                tracing::info!("no configuration file, using defaults");
                Self::default_config()
            }
        };
        config.apply_env(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `GARAGE_*` variables
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = var("GARAGE_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("GARAGE_PORT") {
            self.server.port = port.trim().parse().map_err(|e| ConfigError::InvalidValue {
                key: "GARAGE_PORT".to_string(),
                message: format!("{e}"),
            })?;
        }
        if let Some(origins) = var("GARAGE_CORS_ORIGINS") {
            self.server.cors_origins = split_list(&origins);
        }
        if let Some(kind) = var("GARAGE_BACKEND") {
            self.backend.kind = match kind.trim().to_ascii_lowercase().as_str() {
                "in_memory" | "memory" => BackendKind::InMemory,
                "hosted" => BackendKind::Hosted,
                other => {
                    return Err(ConfigError::InvalidValue {
                        key: "GARAGE_BACKEND".to_string(),
                        message: format!("expected 'in_memory' or 'hosted', got '{other}'"),
                    });
                }
            };
        }
        if let Some(url) = var("GARAGE_BACKEND_URL") {
            self.backend.url = Some(url);
        }
        if let Some(key) = var("GARAGE_BACKEND_KEY") {
            self.backend.anon_key = Some(key);
        }
        if let Some(key) = var("GARAGE_BACKEND_SERVICE_KEY") {
            self.backend.service_key = Some(key);
        }
        if let Some(emails) = var("GARAGE_ADMIN_EMAILS") {
            self.admin.emails = split_list(&emails);
        }
        if let Some(password) = var("GARAGE_ADMIN_PASSWORD") {
            self.admin.seed_password = Some(password);
        }
        if let Some(policy) = var("GARAGE_TRANSITION_POLICY") {
            self.orders.transition_policy = policy.parse()?;
        }
        Ok(())
    }

    /// Check cross-field requirements
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.kind == BackendKind::Hosted {
            if self.backend.url.as_deref().is_none_or(|u| u.trim().is_empty()) {
                return Err(ConfigError::InvalidValue {
                    key: "backend.url".to_string(),
                    message: "required for the hosted backend".to_string(),
                });
            }
            if self.backend.anon_key.is_none() {
                return Err(ConfigError::InvalidValue {
                    key: "backend.anon_key".to_string(),
                    message: "required for the hosted backend".to_string(),
                });
            }
        }
        if self.admin.emails.is_empty() {
            tracing::warn!("no admin emails configured, admin routes are unreachable");
        }
        Ok(())
    }

    /// `host:port` to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

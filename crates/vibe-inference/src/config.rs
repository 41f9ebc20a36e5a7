//! Inference configuration.
//!
//! Configuration can be loaded from:
//! - TOML files (default: ~/.config/vibe-os/inference.toml)
//! - Environment variables (`GEMINI_API_KEY`, `VIBE_*`)
//!
//! # Example
//!
//! ```rust,no_run
//! use vibe_inference::config::InferenceConfig;
//!
//! // Load from default path or fall back to env vars
//! let config = InferenceConfig::load().expect("Failed to load config");
//!
//! // Or explicitly from a file
//! let config = InferenceConfig::from_file(std::path::Path::new("inference.toml")).expect("Failed to load");
//!
//! // Or from environment variables
//! let config = InferenceConfig::from_env();
//! ```
//!
//! TOML layout:
//!
//! ```toml
//! [inference]
//! api_key = "${GEMINI_API_KEY}"
//! primary_model = "gemini-3-pro-preview"
//! thinking_budget = 1024
//!
//! [inference.fallback]
//! enabled = true
//! model = "gemini-2.5-flash"
//! ```

use std::env;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use vibe_core::defaults;

use crate::gemini::GeminiConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No API key configured (set GEMINI_API_KEY or inference.api_key)")]
    MissingApiKey,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("valid env var pattern"));

/// Secondary-tier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// Whether a failed primary attempt is retried on the secondary model.
    #[serde(default = "FallbackConfig::default_enabled")]
    pub enabled: bool,
    /// Secondary model. It never receives a thinking budget.
    #[serde(default = "FallbackConfig::default_model")]
    pub model: String,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            model: Self::default_model(),
        }
    }
}

impl FallbackConfig {
    fn default_enabled() -> bool {
        true
    }

    fn default_model() -> String {
        defaults::SECONDARY_MODEL.to_string()
    }
}

/// Main inference configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Gemini REST base URL.
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub primary_model: String,
    /// Reasoning budget for the primary tier.
    pub thinking_budget: u32,
    pub image_model: String,
    pub timeout_secs: u64,
    pub fallback: FallbackConfig,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::GEMINI_URL.to_string(),
            api_key: None,
            primary_model: defaults::PRIMARY_MODEL.to_string(),
            thinking_budget: defaults::THINKING_BUDGET,
            image_model: defaults::IMAGE_MODEL.to_string(),
            timeout_secs: defaults::GEN_TIMEOUT_SECS,
            fallback: FallbackConfig::default(),
        }
    }
}

impl InferenceConfig {
    /// Get the default config file path.
    ///
    /// Returns: ~/.config/vibe-os/inference.toml
    pub fn default_config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config"));
        path.push(defaults::APP_DIR_NAME);
        path.push("inference.toml");
        path
    }

    /// Load configuration from the default path, falling back to environment variables.
    pub fn load() -> ConfigResult<Self> {
        let path = Self::default_config_path();

        if path.exists() {
            info!(path = %path.display(), "Loading inference config");
            Self::from_file(&path)
        } else {
            debug!(
                path = %path.display(),
                "Config file not found, using environment variables"
            );
            let config = Self::from_env();
            config.validate()?;
            Ok(config)
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text, substituting `${VAR}` references.
    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        let content = Self::substitute_env_vars(content);

        #[derive(Deserialize)]
        struct TomlRoot {
            #[serde(default)]
            inference: InferenceConfig,
        }

        let root: TomlRoot = toml::from_str(&content)?;
        let mut config = root.inference;
        config.api_key = normalize_api_key(config.api_key);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = Self::default();

        Self {
            base_url: lookup("VIBE_GEMINI_URL").unwrap_or(base.base_url),
            api_key: normalize_api_key(lookup("GEMINI_API_KEY").or_else(|| lookup("API_KEY"))),
            primary_model: lookup("VIBE_PRIMARY_MODEL").unwrap_or(base.primary_model),
            thinking_budget: lookup("VIBE_THINKING_BUDGET")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(base.thinking_budget),
            image_model: lookup("VIBE_IMAGE_MODEL").unwrap_or(base.image_model),
            timeout_secs: lookup("VIBE_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(base.timeout_secs),
            fallback: FallbackConfig {
                enabled: lookup("VIBE_FALLBACK")
                    .map(|v| !matches!(v.trim().to_lowercase().as_str(), "0" | "false" | "off"))
                    .unwrap_or(base.fallback.enabled),
                model: lookup("VIBE_SECONDARY_MODEL").unwrap_or(base.fallback.model),
            },
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.base_url.is_empty() {
            return Err(ConfigError::Validation(
                "base_url cannot be empty".to_string(),
            ));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "base_url must start with http:// or https://, got: {}",
                self.base_url
            )));
        }

        if self.primary_model.is_empty() {
            return Err(ConfigError::Validation(
                "primary_model cannot be empty".to_string(),
            ));
        }

        if self.image_model.is_empty() {
            return Err(ConfigError::Validation(
                "image_model cannot be empty".to_string(),
            ));
        }

        if self.fallback.enabled && self.fallback.model.is_empty() {
            return Err(ConfigError::Validation(
                "fallback model cannot be empty while fallback is enabled".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// API key, required before any remote call.
    pub fn require_api_key(&self) -> ConfigResult<&str> {
        self.api_key.as_deref().ok_or(ConfigError::MissingApiKey)
    }

    /// Backend configuration for one model on the configured endpoint.
    pub fn gemini_config(&self, model: &str) -> GeminiConfig {
        GeminiConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            model: model.to_string(),
            timeout_seconds: self.timeout_secs,
        }
    }

    /// Substitute environment variables in the format ${VAR_NAME}.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_PATTERN
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }
}

/// Empty keys and unresolved `${VAR}` placeholders count as absent.
fn normalize_api_key(key: Option<String>) -> Option<String> {
    key.map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty() && !ENV_VAR_PATTERN.is_match(k))
}

//! Configuration system for ResearchHub.
//!
//! Uses `figment` for layered configuration: defaults -> user config file ->
//! explicit config file -> environment -> overrides. The user config lives at
//! `<config dir>/researchhub/config.toml` as resolved by `directories`.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::paper::SUMMARY_PREVIEW_CHARS;
use crate::query::DEFAULT_RESULT_COUNT;

const ENV_PREFIX: &str = "RESEARCHHUB_";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HubConfig {
    pub service: ServiceConfig,
    pub search: SearchConfig,
    pub storage: StorageConfig,
    pub ui: UiConfig,
}

/// Recommendation service connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// URL the recommendation request is POSTed to.
    pub endpoint: String,
    /// Total request timeout in seconds.
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8000/recommend/".to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Search defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Result count a new session starts with.
    pub default_result_count: i64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_result_count: DEFAULT_RESULT_COUNT,
        }
    }
}

/// Durable storage settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding `recentSearches.json` and `savedPapers.json`.
    /// Defaults to the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

/// Terminal presentation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Summaries longer than this are collapsed until expanded.
    pub summary_preview_chars: usize,
    /// Column at which summaries are wrapped.
    pub wrap_width: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            summary_preview_chars: SUMMARY_PREVIEW_CHARS,
            wrap_width: 96,
        }
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("dev", "researchhub", "researchhub")
}

/// Location of the user-level config file, if a home directory is known.
pub fn user_config_path() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().join("config.toml"))
}

/// Platform data directory used when `storage.data_dir` is unset.
pub fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".researchhub"))
}

impl HubConfig {
    /// Directory the durable store writes into.
    pub fn data_dir(&self) -> PathBuf {
        self.storage.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    /// Check the configuration and return every problem found.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        match url::Url::parse(&self.service.endpoint) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => problems.push(format!(
                "service.endpoint must use http or https, got '{}'",
                url.scheme()
            )),
            Err(e) => problems.push(format!(
                "service.endpoint '{}' is not a valid URL: {}",
                self.service.endpoint, e
            )),
        }
        if self.service.timeout_secs == 0 {
            problems.push("service.timeout_secs must be greater than 0".to_string());
        }
        if self.service.connect_timeout_secs == 0 {
            problems.push("service.connect_timeout_secs must be greater than 0".to_string());
        }
        if self.ui.summary_preview_chars == 0 {
            problems.push("ui.summary_preview_chars must be greater than 0".to_string());
        }
        if self.ui.wrap_width < 20 {
            problems.push("ui.wrap_width must be at least 20".to_string());
        }

        problems
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
    }
}

/// Build the layered figment without extracting it.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides
/// 2. Environment variables (`RESEARCHHUB_SERVICE__ENDPOINT`, ...)
/// 3. Explicit config file (`--config`)
/// 4. User config (`<config dir>/config.toml`)
/// 5. Built-in defaults
pub fn figment(
    user_config: Option<&Path>,
    config_file: Option<&Path>,
    overrides: Option<&HubConfig>,
) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(HubConfig::default()));

    if let Some(path) = user_config
        && path.exists()
    {
        figment = figment.merge(Toml::file(path));
    }

    if let Some(path) = config_file {
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    figment
}

/// Load and validate configuration from every layer.
pub fn load_config(
    config_file: Option<&Path>,
    overrides: Option<&HubConfig>,
) -> Result<HubConfig, ConfigError> {
    if let Some(path) = config_file
        && !path.exists()
    {
        return Err(ConfigError::Invalid {
            message: format!("config file not found: {}", path.display()),
        });
    }

    let user_config = user_config_path();
    let config: HubConfig = figment(user_config.as_deref(), config_file, overrides)
        .extract()
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;

    let problems = config.validate();
    if !problems.is_empty() {
        return Err(ConfigError::Invalid {
            message: problems.join("; "),
        });
    }
    Ok(config)
}

/// Write the default configuration to `path` unless a file already exists.
///
/// Returns `true` when a file was written.
pub fn write_default_config(path: &Path) -> Result<bool, ConfigError> {
    if path.exists() {
        return Ok(false);
    }
    let rendered = HubConfig::default().to_toml()?;
    crate::persistence::atomic_write(path, rendered.as_bytes()).map_err(|e| {
        ConfigError::Invalid {
            message: format!("failed to write {}: {}", path.display(), e),
        }
    })?;
    Ok(true)
}

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides `api.base_url` when no flag is given.
pub const API_URL_ENV: &str = "FINVISION_API_URL";

/// Top-level configuration loaded from `~/.finvision/config.toml`.
///
/// Never holds the bearer token; that lives in the session store.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub attendance: AttendanceConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

impl Config {
    /// Load config from `~/.finvision/config.toml`, falling back to defaults
    /// when the file does not exist.
    #[cfg(feature = "fs")]
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(path)
        } else {
            let cfg = Config::default();
            cfg.validate()?;
            Ok(cfg)
        }
    }

    /// Load from a specific path.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Serialize config to TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        self.validate()?;
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api.validate()?;
        self.attendance.validate()?;
        Ok(())
    }

    /// Pick the API base URL: explicit flag, then `FINVISION_API_URL`, then
    /// the file. Trailing slashes are dropped.
    pub fn resolve_api_url(&self, flag: Option<&str>) -> String {
        let env = std::env::var(API_URL_ENV).ok();
        flag.map(str::to_string)
            .or(env.filter(|v| !v.trim().is_empty()))
            .unwrap_or_else(|| self.api.base_url.clone())
            .trim_end_matches('/')
            .to_string()
    }

    #[cfg(feature = "fs")]
    pub fn default_path() -> PathBuf {
        home_dir().join(".finvision").join("config.toml")
    }

    /// Session file location with a leading `~/` expanded.
    pub fn session_path(&self) -> PathBuf {
        expand_home(&self.session.storage_path)
    }
}

#[cfg(feature = "fs")]
fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Expand a leading `~/`. Without the `fs` feature the path is returned as is.
#[cfg(feature = "fs")]
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => home_dir().join(rest),
        None => Path::new(path).to_path_buf(),
    }
}

#[cfg(not(feature = "fs"))]
pub fn expand_home(path: &str) -> PathBuf {
    Path::new(path).to_path_buf()
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(String),
    #[error("parse: {0}")]
    Parse(String),
    #[error("validation: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Section structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_app_name() -> String {
    "finvision".into()
}
fn default_log_level() -> String {
    "info".into()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl ApiConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let url = self.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "api.base_url must start with http:// or https:// (got {url:?})"
            )));
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "http://localhost:5000/api".into()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
        }
    }
}

fn default_storage_path() -> String {
    "~/.finvision/session.json".into()
}

/// Options for the single-shot position request made before check-in/out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttendanceConfig {
    #[serde(default = "default_geo_timeout")]
    pub geolocation_timeout_ms: u32,
    #[serde(default = "default_true")]
    pub high_accuracy: bool,
    #[serde(default)]
    pub maximum_age_ms: u32,
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            geolocation_timeout_ms: default_geo_timeout(),
            high_accuracy: true,
            maximum_age_ms: 0,
        }
    }
}

impl AttendanceConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.geolocation_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "attendance.geolocation_timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_geo_timeout() -> u32 {
    10_000
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> String {
    ".".into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let cfg = Config::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.api.base_url, "http://localhost:5000/api");
        assert_eq!(cfg.attendance.geolocation_timeout_ms, 10_000);
        assert!(cfg.attendance.high_accuracy);
    }

    #[test]
    fn flag_wins_and_trailing_slash_dropped() {
        let cfg = Config::default();
        assert_eq!(
            cfg.resolve_api_url(Some("https://crm.example.com/api/")),
            "https://crm.example.com/api"
        );
    }
}

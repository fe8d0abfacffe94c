use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::clients::gemini::DEFAULT_BASE_URL;
use crate::messages::Locale;

pub const DEFAULT_DATA_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_INSIGHT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_DATA_TEMPERATURE: f32 = 0.5;
pub const DEFAULT_INSIGHT_TEMPERATURE: f32 = 0.7;
const DEFAULT_LOG_LEVEL: &str = "chart_studio=info";

/// Main configuration structure loaded from chart_studio.toml and environment variables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub inference: InferenceConfig,
    pub storage: StorageConfig,
    pub locale: Locale,
    /// Runtime configuration loaded from environment variables
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

/// Inference API endpoint, model ids and sampling temperatures
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub base_url: String,
    pub data_model: String,
    pub insight_model: String,
    pub data_temperature: f32,
    pub insight_temperature: f32,
    pub timeout_ms: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            data_model: DEFAULT_DATA_MODEL.to_string(),
            insight_model: DEFAULT_INSIGHT_MODEL.to_string(),
            data_temperature: DEFAULT_DATA_TEMPERATURE,
            insight_temperature: DEFAULT_INSIGHT_TEMPERATURE,
            timeout_ms: 30_000,
        }
    }
}

/// Where the chart state is kept between runs
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            dir: base.join("chart-studio"),
        }
    }
}

/// Runtime configuration loaded from environment variables
#[derive(Clone)]
pub struct RuntimeConfig {
    pub api_key: Option<String>,
    pub log_level: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

// The key must never reach a log line.
impl fmt::Debug for RuntimeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl RuntimeConfig {
    pub fn load_from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_key: lookup("GEMINI_API_KEY")
                .or_else(|| lookup("API_KEY"))
                .filter(|k| !k.trim().is_empty()),
            log_level: lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        }
    }
}

impl Config {
    /// Load configuration from TOML file and environment variables.
    /// Uses CHART_STUDIO_CONFIG or defaults to "chart_studio.toml".
    pub fn load() -> anyhow::Result<Self> {
        if let Ok(env_path) = std::env::var("CHART_ENV_FILE") {
            let _ = dotenvy::from_path(env_path);
        } else {
            let _ = dotenvy::dotenv();
        }

        let config_path = std::env::var("CHART_STUDIO_CONFIG")
            .unwrap_or_else(|_| "chart_studio.toml".to_string());

        let mut config: Config = if let Ok(content) = std::fs::read_to_string(&config_path) {
            Self::from_toml_str(&content)?
        } else {
            tracing::warn!("Config file {} not found, using defaults", config_path);
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.runtime = RuntimeConfig::load_from_env();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Env-first overrides of file values
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("CHART_INFERENCE_BASE_URL") {
            self.inference.base_url = url;
        }
        if let Some(model) = lookup("CHART_DATA_MODEL") {
            self.inference.data_model = model;
        }
        if let Some(model) = lookup("CHART_INSIGHT_MODEL") {
            self.inference.insight_model = model;
        }
        if let Some(timeout) = lookup("CHART_INFERENCE_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.inference.timeout_ms = timeout;
        }
        if let Some(dir) = lookup("CHART_STORAGE_DIR") {
            self.storage.dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup("CHART_LOCALE") {
            match raw.parse::<Locale>() {
                Ok(locale) => self.locale = locale,
                Err(e) => tracing::warn!("Ignoring CHART_LOCALE: {}", e),
            }
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let inference = &self.inference;
        if !inference.base_url.starts_with("http://") && !inference.base_url.starts_with("https://")
        {
            anyhow::bail!(
                "inference base_url '{}' must start with http:// or https://",
                inference.base_url
            );
        }
        for (name, t) in [
            ("data_temperature", inference.data_temperature),
            ("insight_temperature", inference.insight_temperature),
        ] {
            if !(0.0..=2.0).contains(&t) {
                anyhow::bail!("{} must be between 0.0 and 2.0, got {}", name, t);
            }
        }
        if inference.timeout_ms == 0 {
            anyhow::bail!("inference timeout_ms must be > 0");
        }
        if inference.data_model.trim().is_empty() || inference.insight_model.trim().is_empty() {
            anyhow::bail!("model identifiers must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_fixed_temperatures() {
        let config = Config::default();
        assert_eq!(config.inference.data_temperature, 0.5);
        assert_eq!(config.inference.insight_temperature, 0.7);
        assert_eq!(config.locale, Locale::Es);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = Config::from_toml_str(
            r#"
            locale = "en"

            [inference]
            data_model = "gemini-custom"
            "#,
        )
        .unwrap();
        assert_eq!(config.locale, Locale::En);
        assert_eq!(config.inference.data_model, "gemini-custom");
        assert_eq!(config.inference.insight_model, DEFAULT_INSIGHT_MODEL);
        assert_eq!(config.inference.timeout_ms, 30_000);
    }

    #[test]
    fn env_overrides_win_over_file() {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[
            ("CHART_DATA_MODEL", "m1"),
            ("CHART_INFERENCE_TIMEOUT_MS", "1500"),
            ("CHART_STORAGE_DIR", "/tmp/charts"),
            ("CHART_LOCALE", "en"),
        ]));
        assert_eq!(config.inference.data_model, "m1");
        assert_eq!(config.inference.timeout_ms, 1500);
        assert_eq!(config.storage.dir, PathBuf::from("/tmp/charts"));
        assert_eq!(config.locale, Locale::En);
    }

    #[test]
    fn bad_locale_override_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[("CHART_LOCALE", "klingon")]));
        assert_eq!(config.locale, Locale::Es);
    }

    #[test]
    fn api_key_falls_back_and_is_redacted() {
        let runtime = RuntimeConfig::from_lookup(lookup_from(&[("API_KEY", "secret-123")]));
        assert_eq!(runtime.api_key.as_deref(), Some("secret-123"));
        assert!(!format!("{:?}", runtime).contains("secret-123"));

        let preferred = RuntimeConfig::from_lookup(lookup_from(&[
            ("API_KEY", "old"),
            ("GEMINI_API_KEY", "new"),
        ]));
        assert_eq!(preferred.api_key.as_deref(), Some("new"));
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let mut config = Config::default();
        config.inference.data_temperature = 3.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.inference.base_url = "ftp://nope".into();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.inference.timeout_ms = 0;
        assert!(config.validate().is_err());
    }
}

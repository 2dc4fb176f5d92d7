//! Configuration management for Landmark Explorer.
//!
//! Configuration is loaded from a TOML file in the platform config directory,
//! falling back to defaults. Service settings default to `${ENV_VAR}`
//! references so a plain `.env` file is enough to get started; they are
//! resolved exactly once into [`ServiceEndpoints`] before any client is built.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Image classification service
    pub classifier: ClassifierConfig,

    /// Text generation service
    pub generator: GeneratorConfig,

    /// Translation service
    pub translator: TranslatorConfig,

    /// Translation preferences
    pub translation: TranslationConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// A `.env` file in the working directory is loaded into the process
    /// environment first. Returns the default configuration if no config file
    /// exists.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }

        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// - macOS: ~/Library/Application Support/com.landmark.landmark/config.toml
    /// - Linux: ~/.config/landmark/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\landmark\config\config.toml
    ///
    /// Falls back to ~/.landmark/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "landmark", "landmark")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".landmark").join("config.toml")
            })
    }

    /// Resolve every service endpoint and credential.
    ///
    /// Any value that resolves to nothing is a startup error naming both the
    /// config field and the environment variable that would satisfy it. The
    /// translator region is the only optional value.
    pub fn services(&self) -> Result<ServiceEndpoints, ConfigError> {
        self.services_with(|name| std::env::var(name).ok())
    }

    /// Like [`Config::services`], with an explicit variable lookup.
    pub fn services_with<F>(&self, lookup: F) -> Result<ServiceEndpoints, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |field: &str, value: &str| {
            resolve_with(value, &lookup).ok_or_else(|| ConfigError::Missing {
                field: field.to_string(),
                env_var: env_var_name(value).unwrap_or(field).to_string(),
            })
        };

        let classifier = ClassifierEndpoint {
            url: require("classifier.endpoint", &self.classifier.endpoint)?,
            prediction_key: require("classifier.prediction_key", &self.classifier.prediction_key)?,
        };
        let generator = GeneratorEndpoint {
            url: require("generator.endpoint", &self.generator.endpoint)?,
            api_key: require("generator.api_key", &self.generator.api_key)?,
        };
        let translator = TranslatorEndpoint {
            base_url: require("translator.endpoint", &self.translator.endpoint)?,
            key: require("translator.key", &self.translator.key)?,
            region: resolve_with(&self.translator.region, &lookup)
                .unwrap_or_else(|| TranslatorConfig::DEFAULT_REGION.to_string()),
        };

        Ok(ServiceEndpoints {
            classifier,
            generator,
            translator,
        })
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    resolve_with(value, |name| std::env::var(name).ok())
}

fn resolve_with<F>(value: &str, lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let resolved = match env_var_name(value) {
        Some(name) => lookup(name)?,
        None => value.to_string(),
    };
    let trimmed = resolved.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn env_var_name(value: &str) -> Option<&str> {
    value
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Language;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn full_env() -> Vec<(&'static str, &'static str)> {
        vec![
            ("CV_API_URL", "https://cv.example/predict"),
            ("CV_API_KEY", "cv-key"),
            ("GPT4_API_URL", "https://gpt.example/chat"),
            ("GPT_API_KEY", "gpt-key"),
            ("TRANSLATOR_ENDPOINT", "https://tr.example"),
            ("TRANSLATOR_KEY", "tr-key"),
        ]
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.translation.enabled);
        assert_eq!(config.translation.target_language, Language::En);
        assert_eq!(config.limits.request_timeout_ms, 60_000);
        assert_eq!(config.classifier.endpoint, "${CV_API_URL}");
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[classifier]"));
        assert!(toml.contains("[translation]"));
        assert!(toml.contains("target_language = \"en\""));
    }

    #[test]
    fn test_services_resolve_from_env() {
        let config = Config::default();
        let services = config.services_with(env(&full_env())).unwrap();
        assert_eq!(services.classifier.url, "https://cv.example/predict");
        assert_eq!(services.generator.api_key, "gpt-key");
        assert_eq!(services.translator.base_url, "https://tr.example");
    }

    #[test]
    fn test_translator_region_defaults() {
        let config = Config::default();
        let services = config.services_with(env(&full_env())).unwrap();
        assert_eq!(services.translator.region, "eastus");

        let mut vars = full_env();
        vars.push(("TRANSLATOR_LOCATION", "westeurope"));
        let services = config.services_with(env(&vars)).unwrap();
        assert_eq!(services.translator.region, "westeurope");
    }

    #[test]
    fn test_missing_credential_is_config_error() {
        let config = Config::default();
        let vars: Vec<_> = full_env()
            .into_iter()
            .filter(|(k, _)| *k != "GPT_API_KEY")
            .collect();
        let err = config.services_with(env(&vars)).unwrap_err();
        match err {
            ConfigError::Missing { field, env_var } => {
                assert_eq!(field, "generator.api_key");
                assert_eq!(env_var, "GPT_API_KEY");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let mut config = Config::default();
        config.classifier.endpoint = "   ".to_string();
        let err = config.services_with(env(&full_env())).unwrap_err();
        assert!(err.to_string().contains("classifier.endpoint"));
    }

    #[test]
    fn test_literal_values_pass_through() {
        assert_eq!(resolve_env_var("plain-key"), Some("plain-key".to_string()));
        assert_eq!(resolve_env_var(""), None);
        assert_eq!(resolve_env_var("${DEFINITELY_NOT_SET_LANDMARK_123}"), None);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[translation]\nenabled = false\ntarget_language = \"ar\"\n\n[limits]\njpeg_quality = 75\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(!config.translation.enabled);
        assert_eq!(config.translation.target_language, Language::Ar);
        assert_eq!(config.limits.jpeg_quality, 75);
        // Untouched sections keep their defaults
        assert_eq!(config.generator.api_key, "${GPT_API_KEY}");
    }

    #[test]
    fn test_load_from_rejects_unknown_language() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[translation]\ntarget_language = \"it\"\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));
    }
}

//! Sub-configuration structs with their defaults.

use crate::types::Language;
use serde::{Deserialize, Serialize};

/// Image classification service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Prediction endpoint URL (supports ${ENV_VAR} syntax)
    pub endpoint: String,

    /// Prediction key (supports ${ENV_VAR} syntax)
    pub prediction_key: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: "${CV_API_URL}".to_string(),
            prediction_key: "${CV_API_KEY}".to_string(),
        }
    }
}

/// Text generation service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Chat completions endpoint URL (supports ${ENV_VAR} syntax)
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: "${GPT4_API_URL}".to_string(),
            api_key: "${GPT_API_KEY}".to_string(),
        }
    }
}

/// Translation service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Service base URL; `/translate` is appended (supports ${ENV_VAR} syntax)
    pub endpoint: String,

    /// Subscription key (supports ${ENV_VAR} syntax)
    pub key: String,

    /// Subscription region (supports ${ENV_VAR} syntax).
    /// Falls back to `DEFAULT_REGION` when unresolved.
    pub region: String,
}

impl TranslatorConfig {
    pub const DEFAULT_REGION: &'static str = "eastus";
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            endpoint: "${TRANSLATOR_ENDPOINT}".to_string(),
            key: "${TRANSLATOR_KEY}".to_string(),
            region: "${TRANSLATOR_LOCATION}".to_string(),
        }
    }
}

/// User-facing translation preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Translate generated answers
    pub enabled: bool,

    /// Target language; "en" means no translation call is made
    pub target_language: Language,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            target_language: Language::En,
        }
    }
}

/// Resource limits for image preparation and remote calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Per-request timeout for every remote call in milliseconds
    pub request_timeout_ms: u64,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Maximum input size in megabytes
    pub max_file_size_mb: u64,

    /// JPEG quality used when re-encoding uploads (1-100)
    pub jpeg_quality: u8,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 60_000,
            decode_timeout_ms: 5_000,
            max_image_dimension: 10_000,
            max_file_size_mb: 50,
            jpeg_quality: 90,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Classification endpoint with its credential resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierEndpoint {
    pub url: String,
    pub prediction_key: String,
}

/// Generation endpoint with its credential resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorEndpoint {
    pub url: String,
    pub api_key: String,
}

/// Translation endpoint with credential and region resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatorEndpoint {
    pub base_url: String,
    pub key: String,
    pub region: String,
}

/// Every remote endpoint, resolved once at startup and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoints {
    pub classifier: ClassifierEndpoint,
    pub generator: GeneratorEndpoint,
    pub translator: TranslatorEndpoint,
}

//! Translation client for a Translator v3 style API.
//!
//! Answers are always generated in English; this client renders them in the
//! user's chosen language. An empty or malformed success body is a soft
//! failure ([`TranslationOutcome::NoContent`]), distinct from a transport or
//! HTTP error.

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::config::TranslatorEndpoint;
use crate::error::{ServiceError, ServiceKind, ServiceResult};
use crate::types::Language;

pub const API_VERSION: &str = "3.0";

static EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("emphasis pattern is valid"));

/// Replace every `**text**` span with `text`.
pub fn strip_emphasis(text: &str) -> String {
    EMPHASIS.replace_all(text, "$1").into_owned()
}

/// Text to translate from the fixed source language.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationRequest {
    pub text: String,
    pub source: Language,
    pub target: Language,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>, target: Language) -> Self {
        Self {
            text: text.into(),
            source: Language::SOURCE,
            target,
        }
    }

    /// Query parameters for the `/translate` call.
    pub fn query(&self) -> [(&'static str, &'static str); 3] {
        [
            ("api-version", API_VERSION),
            ("from", self.source.code()),
            ("to", self.target.code()),
        ]
    }
}

/// Result of a translation call that reached the service.
#[derive(Debug, Clone, PartialEq)]
pub enum TranslationOutcome {
    /// Translated text with emphasis markup removed
    Translated(String),
    /// The service answered but had nothing usable
    NoContent,
}

/// Trait for translation backends.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Service name for logging.
    fn name(&self) -> &str;

    async fn translate(&self, request: &TranslationRequest) -> ServiceResult<TranslationOutcome>;
}

/// Client for a Translator v3 endpoint.
pub struct AzureTranslator {
    endpoint: TranslatorEndpoint,
    client: reqwest::Client,
    timeout: Duration,
}

impl AzureTranslator {
    pub fn new(endpoint: TranslatorEndpoint, timeout: Duration) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
            timeout,
        }
    }

    fn url(&self) -> String {
        format!("{}/translate", self.endpoint.base_url.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
struct TranslateItem<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct TranslateResult {
    #[serde(default)]
    translations: Vec<TranslatedText>,
}

#[derive(Deserialize)]
struct TranslatedText {
    #[serde(default)]
    text: String,
}

/// Pull the first translation out of a success body, cleaned of emphasis.
pub(crate) fn parse_translation(body: &str) -> TranslationOutcome {
    let results: Vec<TranslateResult> = match serde_json::from_str(body) {
        Ok(results) => results,
        Err(e) => {
            tracing::warn!("Translation response could not be parsed: {e}");
            return TranslationOutcome::NoContent;
        }
    };

    match results
        .into_iter()
        .next()
        .and_then(|r| r.translations.into_iter().next())
    {
        Some(t) if !t.text.is_empty() => TranslationOutcome::Translated(strip_emphasis(&t.text)),
        _ => TranslationOutcome::NoContent,
    }
}

#[async_trait]
impl Translator for AzureTranslator {
    fn name(&self) -> &str {
        "azure-translator"
    }

    async fn translate(&self, request: &TranslationRequest) -> ServiceResult<TranslationOutcome> {
        let start = Instant::now();
        let trace_id = Uuid::new_v4().to_string();

        let resp = self
            .client
            .post(self.url())
            .query(&request.query())
            .header("Ocp-Apim-Subscription-Key", &self.endpoint.key)
            .header("Ocp-Apim-Subscription-Region", &self.endpoint.region)
            .header("Content-Type", "application/json")
            .header("X-ClientTraceId", &trace_id)
            .json(&[TranslateItem {
                text: &request.text,
            }])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ServiceError::transport(ServiceKind::Translation, &e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                service: ServiceKind::Translation,
                status_code: status.as_u16(),
                message: text,
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| ServiceError::transport(ServiceKind::Translation, &e))?;
        let outcome = parse_translation(&body);

        tracing::debug!(
            trace_id = %trace_id,
            "Translation to {} finished in {}ms",
            request.target,
            start.elapsed().as_millis()
        );
        Ok(outcome)
    }
}

//! Answer generation client using a Chat Completions style API.
//!
//! Every request carries the same system instruction and sampling
//! parameters; only the user prompt varies.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::config::GeneratorEndpoint;
use crate::error::{ServiceError, ServiceKind, ServiceResult};

/// Persona and style directive sent with every generation request.
pub const SYSTEM_PROMPT: &str = "You are a knowledgeable assistant for landmarks, providing concise, simple, and exciting descriptions. \
Imagine you're talking to a tourist, and your goal is to make them thrilled to visit this landmark. \
Keep the information as short as possible, without exceeding 250 tokens, but use fewer tokens if appropriate. \
Write in a way that is easy to read\u{2014}use bullet points, short paragraphs, and simple language. \
Make the description positive, engaging, and informative, highlighting key aspects that make the landmark special.";

pub const MAX_TOKENS: u32 = 250;
pub const TEMPERATURE: f32 = 0.8;
pub const TOP_P: f32 = 0.9;

/// A fully built generation request. Immutable once constructed, so a failed
/// request can be re-issued unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    system_prompt: String,
    user_prompt: String,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

impl GenerationRequest {
    /// Build a request for `prompt` with the fixed instruction and sampling.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: SYSTEM_PROMPT.to_string(),
            user_prompt: prompt.into(),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            top_p: TOP_P,
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn user_prompt(&self) -> &str {
        &self.user_prompt
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn top_p(&self) -> f32 {
        self.top_p
    }
}

/// Generated prose.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    /// First choice's content, trimmed
    pub text: String,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait for text generation backends.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Service name for logging.
    fn name(&self) -> &str;

    async fn generate(&self, request: &GenerationRequest) -> ServiceResult<Generation>;
}

/// Client for a Chat Completions deployment authenticated with `api-key`.
pub struct ChatCompletionsGenerator {
    endpoint: GeneratorEndpoint,
    client: reqwest::Client,
    timeout: Duration,
}

impl ChatCompletionsGenerator {
    pub fn new(endpoint: GeneratorEndpoint, timeout: Duration) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

// --- Request types ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a GenerationRequest> for ChatRequest<'a> {
    fn from(request: &'a GenerationRequest) -> Self {
        Self {
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            top_p: request.top_p,
        }
    }
}

// --- Response types ---

#[derive(Deserialize)]
struct ChatResponse {
    choices: Option<Vec<Choice>>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

fn unexpected(message: impl Into<String>) -> ServiceError {
    ServiceError::UnexpectedFormat {
        service: ServiceKind::Generation,
        message: message.into(),
    }
}

/// Extract the first choice's content from a successful response body.
pub(crate) fn parse_chat_response(body: &str) -> ServiceResult<String> {
    let chat: ChatResponse = serde_json::from_str(body)
        .map_err(|e| unexpected(format!("Failed to parse response: {e}")))?;

    let choices = chat
        .choices
        .ok_or_else(|| unexpected("response has no choices field"))?;

    let content = choices
        .into_iter()
        .next()
        .ok_or_else(|| unexpected("response has an empty choices array"))?
        .message
        .and_then(|m| m.content)
        .ok_or_else(|| unexpected("first choice has no message content"))?;

    Ok(content.trim().to_string())
}

#[async_trait]
impl AnswerGenerator for ChatCompletionsGenerator {
    fn name(&self) -> &str {
        "chat-completions"
    }

    async fn generate(&self, request: &GenerationRequest) -> ServiceResult<Generation> {
        let start = Instant::now();

        let resp = self
            .client
            .post(&self.endpoint.url)
            .header("api-key", &self.endpoint.api_key)
            .header("Content-Type", "application/json")
            .json(&ChatRequest::from(request))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ServiceError::transport(ServiceKind::Generation, &e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                service: ServiceKind::Generation,
                status_code: status.as_u16(),
                message: text,
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| ServiceError::transport(ServiceKind::Generation, &e))?;
        let text = parse_chat_response(&body)?;

        Ok(Generation {
            text,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

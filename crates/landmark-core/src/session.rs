//! Per-user interaction state machine.
//!
//! ```text
//! Idle → Classifying → Rejected | ClassificationFailed | Accepted
//! Accepted → (ask) Generating → GenerationFailed | Generated
//! Generated → (translation on, target ≠ en) Translating
//!           → TranslationFailed | TranslationUnavailable | Translated
//! GenerationFailed → (retry) Generating
//! any → (reset) Idle
//! ```
//!
//! A `Session` belongs to exactly one user and runs one step at a time; it
//! must not be shared between concurrent interactions. Multi-user hosts keep
//! one `Session` per session id.

use crate::config::TranslationConfig;
use crate::error::{ServiceError, SessionError};
use crate::query::build_prompt;
use crate::selector::select;
use crate::services::{GenerationRequest, ServiceClients, TranslationOutcome, TranslationRequest};
use crate::types::{
    Intent, InteractionReport, Language, Prediction, RejectionReason, Selection,
    TranslationRecord,
};

/// Whether and where generated answers get translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslationSettings {
    pub enabled: bool,
    pub target: Language,
}

impl TranslationSettings {
    /// True when a translation call should be made.
    pub fn should_translate(&self) -> bool {
        self.enabled && self.target != Language::SOURCE
    }
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            target: Language::En,
        }
    }
}

impl From<&TranslationConfig> for TranslationSettings {
    fn from(config: &TranslationConfig) -> Self {
        Self {
            enabled: config.enabled,
            target: config.target_language,
        }
    }
}

/// An accepted classification.
#[derive(Debug, Clone, PartialEq)]
pub struct Landmark {
    pub label: String,
    pub confidence: f32,
}

/// A generated answer to one intent.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub intent: Intent,
    pub prompt: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    Classifying,
    Rejected {
        reason: RejectionReason,
        top: Option<Prediction>,
    },
    ClassificationFailed(ServiceError),
    Accepted(Landmark),
    Generating {
        landmark: Landmark,
        intent: Intent,
    },
    GenerationFailed {
        landmark: Landmark,
        intent: Intent,
        request: GenerationRequest,
        error: ServiceError,
    },
    Generated {
        landmark: Landmark,
        answer: Answer,
    },
    Translating {
        landmark: Landmark,
        answer: Answer,
        language: Language,
    },
    TranslationFailed {
        landmark: Landmark,
        answer: Answer,
        language: Language,
        error: ServiceError,
    },
    TranslationUnavailable {
        landmark: Landmark,
        answer: Answer,
        language: Language,
    },
    Translated {
        landmark: Landmark,
        answer: Answer,
        language: Language,
        text: String,
    },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Classifying => "classifying",
            SessionState::Rejected { .. } => "rejected",
            SessionState::ClassificationFailed(_) => "classification-failed",
            SessionState::Accepted(_) => "accepted",
            SessionState::Generating { .. } => "generating",
            SessionState::GenerationFailed { .. } => "generation-failed",
            SessionState::Generated { .. } => "generated",
            SessionState::Translating { .. } => "translating",
            SessionState::TranslationFailed { .. } => "translation-failed",
            SessionState::TranslationUnavailable { .. } => "translation-unavailable",
            SessionState::Translated { .. } => "translated",
        }
    }

    /// The accepted landmark, in any state that has one.
    pub fn landmark(&self) -> Option<&Landmark> {
        match self {
            SessionState::Accepted(landmark)
            | SessionState::Generating { landmark, .. }
            | SessionState::GenerationFailed { landmark, .. }
            | SessionState::Generated { landmark, .. }
            | SessionState::Translating { landmark, .. }
            | SessionState::TranslationFailed { landmark, .. }
            | SessionState::TranslationUnavailable { landmark, .. }
            | SessionState::Translated { landmark, .. } => Some(landmark),
            _ => None,
        }
    }

    /// The generated answer, once there is one.
    pub fn answer(&self) -> Option<&Answer> {
        match self {
            SessionState::Generated { answer, .. }
            | SessionState::Translating { answer, .. }
            | SessionState::TranslationFailed { answer, .. }
            | SessionState::TranslationUnavailable { answer, .. }
            | SessionState::Translated { answer, .. } => Some(answer),
            _ => None,
        }
    }

    /// Whether a follow-up question can be asked from here.
    pub fn accepts_questions(&self) -> bool {
        matches!(
            self,
            SessionState::Accepted(_)
                | SessionState::GenerationFailed { .. }
                | SessionState::Generated { .. }
                | SessionState::TranslationFailed { .. }
                | SessionState::TranslationUnavailable { .. }
                | SessionState::Translated { .. }
        )
    }
}

/// One user's interaction with the pipeline.
pub struct Session {
    clients: ServiceClients,
    translation: TranslationSettings,
    state: SessionState,
}

impl Session {
    pub fn new(clients: ServiceClients, translation: TranslationSettings) -> Self {
        Self {
            clients,
            translation,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn translation(&self) -> TranslationSettings {
        self.translation
    }

    /// Change translation preferences; applies to the next question asked.
    pub fn set_translation(&mut self, settings: TranslationSettings) {
        self.translation = settings;
    }

    /// Return to `Idle`, discarding everything about the current interaction.
    pub fn reset(&mut self) {
        self.transition(SessionState::Idle);
    }

    /// Classify a JPEG image and gate the result.
    ///
    /// Starting a new identification abandons whatever the previous
    /// interaction was doing.
    pub async fn identify(&mut self, jpeg: &[u8]) -> &SessionState {
        if !matches!(self.state, SessionState::Idle) {
            tracing::debug!("Abandoning {} interaction", self.state.name());
            self.reset();
        }

        self.transition(SessionState::Classifying);
        let next = match self.clients.classifier.classify(jpeg).await {
            Err(error) => {
                tracing::warn!("Classification failed: {error}");
                SessionState::ClassificationFailed(error)
            }
            Ok(predictions) => match select(&predictions) {
                Selection::Accepted { label, confidence } => {
                    tracing::info!("Identified {label} ({:.1}%)", confidence * 100.0);
                    SessionState::Accepted(Landmark { label, confidence })
                }
                Selection::Rejected { reason, top } => {
                    tracing::info!("No landmark accepted: {reason:?}");
                    SessionState::Rejected { reason, top }
                }
            },
        };
        self.transition(next);
        &self.state
    }

    /// Ask a follow-up question about the accepted landmark.
    pub async fn ask(&mut self, intent: Intent) -> Result<&SessionState, SessionError> {
        let landmark = match self.state.landmark() {
            Some(landmark) if self.state.accepts_questions() => landmark.clone(),
            _ => return Err(self.invalid("ask")),
        };

        let request = GenerationRequest::new(build_prompt(intent, &landmark.label));
        self.run(landmark, intent, request).await;
        Ok(&self.state)
    }

    /// Re-issue the exact request that last failed.
    pub async fn retry(&mut self) -> Result<&SessionState, SessionError> {
        let (landmark, intent, request) = match &self.state {
            SessionState::GenerationFailed {
                landmark,
                intent,
                request,
                ..
            } => (landmark.clone(), *intent, request.clone()),
            _ => return Err(self.invalid("retry")),
        };

        self.run(landmark, intent, request).await;
        Ok(&self.state)
    }

    /// Machine-readable summary once an answer exists.
    pub fn report(&self) -> Option<InteractionReport> {
        let landmark = self.state.landmark()?;
        let answer = self.state.answer()?;

        let (translation, translation_error) = match &self.state {
            SessionState::Translated { language, text, .. } => (
                Some(TranslationRecord {
                    language: *language,
                    direction: language.direction(),
                    text: text.clone(),
                }),
                None,
            ),
            SessionState::TranslationFailed { error, .. } => (None, Some(error.to_string())),
            SessionState::TranslationUnavailable { .. } => {
                (None, Some("no translation content available".to_string()))
            }
            _ => (None, None),
        };

        Some(InteractionReport {
            landmark: landmark.label.clone(),
            confidence: landmark.confidence,
            intent: answer.intent,
            prompt: answer.prompt.clone(),
            response: answer.text.clone(),
            translation,
            translation_error,
        })
    }

    async fn run(&mut self, landmark: Landmark, intent: Intent, request: GenerationRequest) {
        self.transition(SessionState::Generating {
            landmark: landmark.clone(),
            intent,
        });

        let generation = match self.clients.generator.generate(&request).await {
            Ok(generation) => generation,
            Err(error) => {
                tracing::warn!("Generation failed: {error}");
                self.transition(SessionState::GenerationFailed {
                    landmark,
                    intent,
                    request,
                    error,
                });
                return;
            }
        };
        tracing::debug!("Generated {} chars in {}ms", generation.text.len(), generation.latency_ms);

        let answer = Answer {
            intent,
            prompt: request.user_prompt().to_string(),
            text: generation.text,
        };

        if !self.translation.should_translate() {
            self.transition(SessionState::Generated { landmark, answer });
            return;
        }

        let language = self.translation.target;
        self.transition(SessionState::Translating {
            landmark: landmark.clone(),
            answer: answer.clone(),
            language,
        });

        let translation_request = TranslationRequest::new(answer.text.clone(), language);
        let next = match self.clients.translator.translate(&translation_request).await {
            Ok(TranslationOutcome::Translated(text)) => SessionState::Translated {
                landmark,
                answer,
                language,
                text,
            },
            Ok(TranslationOutcome::NoContent) => {
                tracing::warn!("Translation service returned no content");
                SessionState::TranslationUnavailable {
                    landmark,
                    answer,
                    language,
                }
            }
            Err(error) => {
                tracing::warn!("Translation failed: {error}");
                SessionState::TranslationFailed {
                    landmark,
                    answer,
                    language,
                    error,
                }
            }
        };
        self.transition(next);
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!(from = self.state.name(), to = next.name(), "Session transition");
        self.state = next;
    }

    fn invalid(&self, operation: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            operation,
            state: self.state.name(),
        }
    }
}

//! Core data types for the Landmark Explorer pipeline.
//!
//! Everything here is request-scoped: a value lives for one user interaction
//! and is never shared between interactions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One (label, confidence) pair from the classification service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Class label, e.g. "Eiffel Tower" or the sentinel "negative"
    #[serde(rename = "tagName")]
    pub label: String,

    /// Probability in [0, 1]
    #[serde(rename = "probability")]
    pub confidence: f32,
}

impl Prediction {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// Why a classification result was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// The service returned an empty prediction list
    NoPredictions,
    /// The top prediction did not clear the confidence threshold
    LowConfidence,
    /// The top prediction is the "no landmark" class
    NegativeClass,
}

/// Outcome of applying the confidence gate to a prediction list.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Accepted {
        label: String,
        confidence: f32,
    },
    Rejected {
        reason: RejectionReason,
        /// The top prediction, when there was one
        top: Option<Prediction>,
    },
}

impl Selection {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Selection::Accepted { .. })
    }
}

/// The four follow-up question categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Intent {
    Description,
    History,
    FunFacts,
    NearbyAttractions,
}

impl Intent {
    /// All intents in menu order.
    pub const ALL: [Intent; 4] = [
        Intent::Description,
        Intent::History,
        Intent::FunFacts,
        Intent::NearbyAttractions,
    ];

    /// Short human title for menus and headings.
    pub fn title(&self) -> &'static str {
        match self {
            Intent::Description => "Description",
            Intent::History => "Historical Background",
            Intent::FunFacts => "Fun Facts",
            Intent::NearbyAttractions => "Nearby Attractions",
        }
    }

    /// Menu help text.
    pub fn help(&self) -> &'static str {
        match self {
            Intent::Description => "Get a concise description of the landmark",
            Intent::History => "Learn about the historical significance of the landmark",
            Intent::FunFacts => "Discover interesting facts about the landmark",
            Intent::NearbyAttractions => "Find nearby attractions or landmarks",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::Description => write!(f, "description"),
            Intent::History => write!(f, "history"),
            Intent::FunFacts => write!(f, "fun-facts"),
            Intent::NearbyAttractions => write!(f, "nearby"),
        }
    }
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "description" => Ok(Intent::Description),
            "history" => Ok(Intent::History),
            "fun-facts" | "fun_facts" | "funfacts" => Ok(Intent::FunFacts),
            "nearby" | "nearby-attractions" | "nearby_attractions" => {
                Ok(Intent::NearbyAttractions)
            }
            other => Err(format!("Unknown intent: {other}")),
        }
    }
}

/// Reading direction used when rendering text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    Ltr,
    Rtl,
}

/// Languages the translation step can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
    Fr,
    Es,
    Zh,
    De,
}

impl Language {
    /// Every generated answer is English.
    pub const SOURCE: Language = Language::En;

    pub const ALL: [Language; 6] = [
        Language::En,
        Language::Ar,
        Language::Fr,
        Language::Es,
        Language::Zh,
        Language::De,
    ];

    /// Lower-case language code as sent to the translation service.
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
            Language::Fr => "fr",
            Language::Es => "es",
            Language::Zh => "zh",
            Language::De => "de",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Ar => "Arabic",
            Language::Fr => "French",
            Language::Es => "Spanish",
            Language::Zh => "Chinese",
            Language::De => "German",
        }
    }

    pub fn direction(&self) -> TextDirection {
        match self {
            Language::Ar => TextDirection::Rtl,
            _ => TextDirection::Ltr,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        Language::ALL
            .into_iter()
            .find(|lang| lang.code() == code)
            .ok_or_else(|| {
                format!("Unsupported language '{s}' (expected one of: en, ar, fr, es, zh, de)")
            })
    }
}

/// Where the image bytes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageSource {
    /// A file on disk
    #[default]
    Upload,
    /// A camera capture piped in by the caller
    Camera,
}

/// Translated text attached to a report.
#[derive(Debug, Clone, Serialize)]
pub struct TranslationRecord {
    pub language: Language,
    pub direction: TextDirection,
    pub text: String,
}

/// Machine-readable record of one completed interaction.
#[derive(Debug, Clone, Serialize)]
pub struct InteractionReport {
    pub landmark: String,
    pub confidence: f32,
    pub intent: Intent,
    pub prompt: String,
    pub response: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<TranslationRecord>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation_error: Option<String>,
}

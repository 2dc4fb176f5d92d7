//! CLI enum types for the identify command.

use clap::ValueEnum;
use landmark_core::{ImageSource, Intent, Language};

/// Where the image comes from.
#[derive(Clone, Copy, Debug, ValueEnum, Default)]
pub enum SourceArg {
    /// Read the image file given as INPUT
    #[default]
    Upload,
    /// Read a captured frame from stdin
    Camera,
}

impl From<SourceArg> for ImageSource {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Upload => ImageSource::Upload,
            SourceArg::Camera => ImageSource::Camera,
        }
    }
}

/// Follow-up question to ask.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum IntentArg {
    /// Short description
    Description,
    /// Historical background
    History,
    /// Fun facts
    FunFacts,
    /// Nearby attractions
    Nearby,
}

impl From<IntentArg> for Intent {
    fn from(arg: IntentArg) -> Self {
        match arg {
            IntentArg::Description => Intent::Description,
            IntentArg::History => Intent::History,
            IntentArg::FunFacts => Intent::FunFacts,
            IntentArg::Nearby => Intent::NearbyAttractions,
        }
    }
}

/// Translation target.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LanguageArg {
    En,
    Ar,
    Fr,
    Es,
    Zh,
    De,
}

impl From<LanguageArg> for Language {
    fn from(arg: LanguageArg) -> Self {
        match arg {
            LanguageArg::En => Language::En,
            LanguageArg::Ar => Language::Ar,
            LanguageArg::Fr => Language::Fr,
            LanguageArg::Es => Language::Es,
            LanguageArg::Zh => Language::Zh,
            LanguageArg::De => Language::De,
        }
    }
}

/// How results are written to stdout.
#[derive(Clone, Copy, Debug, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// One JSON report per answered question
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

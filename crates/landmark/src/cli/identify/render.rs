//! Terminal presentation of session outcomes.
//!
//! Answers and reports go to stdout; warnings, errors and headings go to
//! stderr so `--format json` output can be piped.

use console::{measure_text_width, Style, Term};
use landmark_core::{
    ImageError, RejectionReason, ServiceError, SessionState, TextDirection,
};

use super::types::OutputFormat;

/// Right-to-left embedding and pop directional formatting characters.
const RLE: char = '\u{202B}';
const PDF: char = '\u{202C}';

/// Render whatever the session just reached.
pub fn state(state: &SessionState, format: OutputFormat) {
    match state {
        SessionState::Idle | SessionState::Classifying => {}
        SessionState::Rejected { reason, .. } => warn(rejection_message(*reason)),
        SessionState::ClassificationFailed(error) => error_line(&classification_message(error)),
        SessionState::Accepted(landmark) => {
            if format == OutputFormat::Text {
                let bold = Style::new().for_stderr().bold().cyan();
                eprintln!();
                eprintln!(
                    "  {} {}",
                    bold.apply_to("Landmark Name:"),
                    bold.apply_to(&landmark.label)
                );
                eprintln!(
                    "  {}",
                    Style::new()
                        .for_stderr()
                        .dim()
                        .apply_to(format!("confidence {:.1}%", landmark.confidence * 100.0))
                );
                eprintln!();
            }
        }
        SessionState::Generating { .. } | SessionState::Translating { .. } => {}
        SessionState::GenerationFailed { error, .. } => error_line(&generation_message(error)),
        SessionState::Generated { landmark, answer }
        | SessionState::TranslationFailed {
            landmark, answer, ..
        }
        | SessionState::TranslationUnavailable {
            landmark, answer, ..
        }
        | SessionState::Translated {
            landmark, answer, ..
        } => {
            if format == OutputFormat::Text {
                heading(&format!("Response for {}", landmark.label));
                println!("{}", answer.text);
            }
            translation(state, format);
        }
    }
}

fn translation(state: &SessionState, format: OutputFormat) {
    match state {
        SessionState::Translated { language, text, .. } => {
            if format == OutputFormat::Text {
                heading(&format!("Translation ({})", language.code().to_uppercase()));
                match language.direction() {
                    TextDirection::Rtl => {
                        let term = Term::stdout();
                        let width = alignment_width(term.is_term(), term.size().1);
                        println!("{}", right_to_left(text, width));
                    }
                    TextDirection::Ltr => println!("{text}"),
                }
            }
        }
        SessionState::TranslationFailed { error, .. } => {
            tracing::debug!("Translation error detail: {error}");
            error_line(TRANSLATION_FAILED);
        }
        SessionState::TranslationUnavailable { .. } => error_line(TRANSLATION_EMPTY),
        _ => {}
    }
}

pub const TRANSLATION_FAILED: &str =
    "Translation failed. Please check your network or API settings, or try again later.";
pub const TRANSLATION_EMPTY: &str = "No response from the translation service.";

pub fn rejection_message(reason: RejectionReason) -> &'static str {
    match reason {
        RejectionReason::NoPredictions => {
            "No predictions received from the model. Please try uploading a different image."
        }
        RejectionReason::LowConfidence | RejectionReason::NegativeClass => {
            "No recognizable landmark detected in the image. Please try uploading a different image."
        }
    }
}

pub fn classification_message(error: &ServiceError) -> String {
    match error {
        ServiceError::Status { status_code, .. } => {
            format!("Error: {status_code}. Please try again later.")
        }
        ServiceError::Transport { message, .. } => format!(
            "Error: could not reach the classification service ({message}). Please try again later."
        ),
        ServiceError::UnexpectedFormat { .. } => {
            "Error: unexpected response from the classification service. Please try again later."
                .to_string()
        }
    }
}

pub fn generation_message(error: &ServiceError) -> String {
    match error {
        ServiceError::UnexpectedFormat { .. } => {
            "Unexpected response format from the generation service. Please try again later."
                .to_string()
        }
        other => format!("An error occurred: {other}"),
    }
}

pub fn image_message(error: &ImageError) -> String {
    format!("Could not read the image: {error}. Please try a different image.")
}

/// Columns to right-align against. Redirected output is never padded.
fn alignment_width(is_term: bool, columns: u16) -> usize {
    if is_term {
        usize::from(columns)
    } else {
        0
    }
}

/// Wrap each line in a right-to-left embedding and right-align it to `width`.
pub fn right_to_left(text: &str, width: usize) -> String {
    text.lines()
        .map(|line| {
            let visible = measure_text_width(line);
            let pad = width.saturating_sub(visible);
            format!("{}{RLE}{line}{PDF}", " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn heading(text: &str) {
    let style = Style::new().for_stderr().bold();
    eprintln!();
    eprintln!("{}", style.apply_to(format!("### {text}")));
}

pub fn warn(text: &str) {
    let style = Style::new().for_stderr().yellow();
    eprintln!("  {}", style.apply_to(format!("⚠ {text}")));
}

pub fn error_line(text: &str) {
    let style = Style::new().for_stderr().red();
    eprintln!("  {}", style.apply_to(format!("✗ {text}")));
}

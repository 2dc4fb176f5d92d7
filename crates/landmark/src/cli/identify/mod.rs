//! The `landmark identify` command.

mod interactive;
pub mod render;
pub mod types;

pub use types::{IntentArg, LanguageArg, OutputFormat, SourceArg};

use clap::Args;
use landmark_core::{
    Config, EncodedImage, Explorer, ExplorerError, ImageSource, Intent, Session, SessionState,
};
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};

use super::theme::spinner;

/// Arguments for the `identify` command.
#[derive(Args, Debug)]
pub struct IdentifyArgs {
    /// Image file to identify (jpg, png, webp, ...)
    pub input: Option<PathBuf>,

    /// Image source: a file, or a camera frame piped to stdin
    #[arg(long, value_enum, default_value = "upload")]
    pub source: SourceArg,

    /// Ask this question and exit instead of showing the menu
    #[arg(short, long, value_enum)]
    pub intent: Option<IntentArg>,

    /// Translate answers into this language (overrides config)
    #[arg(short, long, value_enum, env = "LANDMARK_LANGUAGE")]
    pub language: Option<LanguageArg>,

    /// Do not translate answers
    #[arg(long)]
    pub no_translate: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Execute the identify command.
pub async fn execute(args: IdentifyArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(language) = args.language {
        config.translation.target_language = language.into();
    }
    if args.no_translate {
        config.translation.enabled = false;
    }

    // Missing endpoints or credentials stop here, before any image is read.
    let explorer = Explorer::new(config)?;

    let source: ImageSource = args.source.into();
    let bytes = read_image(source, args.input.as_deref())?;

    let mut session = explorer.session();
    let Some(jpeg) = prepare(&explorer, bytes).await else {
        return Ok(());
    };

    let state = identify(&mut session, &jpeg, args.format).await;

    // Stdin carries the camera frame, so menus are only offered for uploads.
    let can_prompt = source == ImageSource::Upload
        && std::io::stdin().is_terminal()
        && std::io::stderr().is_terminal();

    match args.intent {
        Some(intent) => {
            if !state.accepts_questions() {
                return finish(&state);
            }
            let mut state = ask(&mut session, intent.into(), args.format).await;
            if can_prompt {
                state = interactive::offer_retry(&mut session, state, args.format).await?;
            }
            finish(&state)
        }
        None if can_prompt => interactive::run(&explorer, session, args.format).await,
        None => {
            if state.accepts_questions() {
                tracing::info!("Pass --intent to ask a question without the menu");
            }
            finish(&state)
        }
    }
}

/// Exit status for a one-shot run: failed remote steps are errors so scripts
/// can tell them apart from a rejection or an answer.
fn finish(state: &SessionState) -> anyhow::Result<()> {
    match state {
        SessionState::ClassificationFailed(error) => {
            anyhow::bail!("Identification failed: {error}")
        }
        SessionState::GenerationFailed { error, .. } => {
            anyhow::bail!("No answer was generated: {error}")
        }
        _ => Ok(()),
    }
}

/// Read raw image bytes from the selected source.
fn read_image(source: ImageSource, input: Option<&Path>) -> anyhow::Result<Vec<u8>> {
    match source {
        ImageSource::Upload => {
            let path = input.ok_or_else(|| anyhow::anyhow!("An image path is required"))?;
            let bytes = std::fs::read(path)
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
            tracing::debug!("Read {} bytes from {}", bytes.len(), path.display());
            Ok(bytes)
        }
        ImageSource::Camera => {
            let mut bytes = Vec::new();
            std::io::stdin().lock().read_to_end(&mut bytes)?;
            tracing::debug!("Read {} bytes of camera capture from stdin", bytes.len());
            Ok(bytes)
        }
    }
}

/// Decode and re-encode; image problems are reported, not propagated.
pub(crate) async fn prepare(explorer: &Explorer, bytes: Vec<u8>) -> Option<EncodedImage> {
    match explorer.prepare_image(bytes).await {
        Ok(jpeg) => Some(jpeg),
        Err(ExplorerError::Image(e)) => {
            render::error_line(&render::image_message(&e));
            None
        }
        Err(e) => {
            render::error_line(&format!("Could not prepare the image: {e}"));
            None
        }
    }
}

pub(crate) async fn identify(
    session: &mut Session,
    jpeg: &EncodedImage,
    format: OutputFormat,
) -> SessionState {
    let pb = spinner("Analyzing the image...");
    let state = session.identify(&jpeg.bytes).await.clone();
    pb.finish_and_clear();
    render::state(&state, format);
    state
}

/// Ask one question, rendering the outcome. Returns the resulting state.
pub(crate) async fn ask(session: &mut Session, intent: Intent, format: OutputFormat) -> SessionState {
    let label = session
        .state()
        .landmark()
        .map(|l| l.label.clone())
        .unwrap_or_default();
    let pb = spinner(format!("Generating a response about {label}..."));
    let result = session.ask(intent).await.map(|s| s.clone());
    pb.finish_and_clear();

    let state = match result {
        Ok(state) => state,
        Err(e) => {
            render::error_line(&e.to_string());
            return session.state().clone();
        }
    };
    emit(session, &state, format);
    state
}

/// Re-issue the failed generation request.
pub(crate) async fn retry(session: &mut Session, format: OutputFormat) -> SessionState {
    let pb = spinner("Retrying...");
    let result = session.retry().await.map(|s| s.clone());
    pb.finish_and_clear();

    let state = match result {
        Ok(state) => state,
        Err(e) => {
            render::error_line(&e.to_string());
            return session.state().clone();
        }
    };
    emit(session, &state, format);
    state
}

fn emit(session: &Session, state: &SessionState, format: OutputFormat) {
    render::state(state, format);
    if format == OutputFormat::Json {
        if let Some(report) = session.report() {
            match serde_json::to_string(&report) {
                Ok(json) => println!("{json}"),
                Err(e) => tracing::error!("Failed to serialize report: {e}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use landmark_core::services::GenerationRequest;
    use landmark_core::{Answer, Landmark, Language, RejectionReason, ServiceError, ServiceKind};

    #[test]
    fn test_read_image_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF]).unwrap();

        let bytes = read_image(ImageSource::Upload, Some(&path)).unwrap();
        assert_eq!(bytes, vec![0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn test_read_image_missing_file() {
        let err = read_image(ImageSource::Upload, Some(Path::new("/nonexistent/x.jpg")))
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/x.jpg"));
    }

    fn failure(kind: ServiceKind, status_code: u16) -> ServiceError {
        ServiceError::Status {
            service: kind,
            status_code,
            message: String::new(),
        }
    }

    fn eiffel() -> Landmark {
        Landmark {
            label: "Eiffel Tower".to_string(),
            confidence: 0.91,
        }
    }

    #[test]
    fn test_finish_fails_on_service_errors() {
        let classification = SessionState::ClassificationFailed(failure(
            ServiceKind::Classification,
            401,
        ));
        let err = finish(&classification).unwrap_err();
        assert!(err.to_string().contains("401"));

        let generation = SessionState::GenerationFailed {
            landmark: eiffel(),
            intent: Intent::History,
            request: GenerationRequest::new("Give a brief history of Eiffel Tower."),
            error: failure(ServiceKind::Generation, 500),
        };
        let err = finish(&generation).unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_finish_accepts_answers_and_rejections() {
        let rejected = SessionState::Rejected {
            reason: RejectionReason::NegativeClass,
            top: None,
        };
        assert!(finish(&rejected).is_ok());
        assert!(finish(&SessionState::Accepted(eiffel())).is_ok());

        // A translation problem still leaves a usable answer.
        let translation_failed = SessionState::TranslationFailed {
            landmark: eiffel(),
            answer: Answer {
                intent: Intent::Description,
                prompt: "Give me a short description of Eiffel Tower.".to_string(),
                text: "An iron lattice tower.".to_string(),
            },
            language: Language::Ar,
            error: failure(ServiceKind::Translation, 503),
        };
        assert!(finish(&translation_failed).is_ok());
    }

    #[test]
    fn test_upload_requires_path() {
        assert!(read_image(ImageSource::Upload, None).is_err());
    }
}

//! End-to-end interaction flows through the public API with scripted services.

use async_trait::async_trait;
use landmark_core::error::ServiceResult;
use landmark_core::services::{
    AnswerGenerator, Classifier, Generation, GenerationRequest, TranslationOutcome,
    TranslationRequest, Translator,
};
use landmark_core::{
    Config, Explorer, Intent, Language, Prediction, ServiceClients, ServiceError, ServiceKind,
    SessionState,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

struct FixedClassifier(Vec<Prediction>);

#[async_trait]
impl Classifier for FixedClassifier {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn classify(&self, jpeg: &[u8]) -> ServiceResult<Vec<Prediction>> {
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "classifier must receive JPEG bytes");
        Ok(self.0.clone())
    }
}

struct EchoGenerator;

#[async_trait]
impl AnswerGenerator for EchoGenerator {
    fn name(&self) -> &str {
        "echo"
    }

    async fn generate(&self, request: &GenerationRequest) -> ServiceResult<Generation> {
        Ok(Generation {
            text: format!("**Answer** to: {}", request.user_prompt()),
            latency_ms: 1,
        })
    }
}

/// Records every translation request; fails for German.
#[derive(Default)]
struct RecordingTranslator {
    calls: AtomicU32,
    targets: Mutex<Vec<Language>>,
}

#[async_trait]
impl Translator for RecordingTranslator {
    fn name(&self) -> &str {
        "recording"
    }

    async fn translate(&self, request: &TranslationRequest) -> ServiceResult<TranslationOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.targets.lock().unwrap().push(request.target);
        assert_eq!(request.source, Language::En);
        if request.target == Language::De {
            return Err(ServiceError::Status {
                service: ServiceKind::Translation,
                status_code: 403,
                message: "forbidden".to_string(),
            });
        }
        Ok(TranslationOutcome::Translated(landmark_core::strip_emphasis(
            &request.text,
        )))
    }
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::DynamicImage::new_rgb8(width, height);
    let mut buffer = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buffer, image::ImageFormat::Png).unwrap();
    buffer.into_inner()
}

fn explorer(predictions: Vec<Prediction>, translator: Arc<RecordingTranslator>) -> Explorer {
    let clients = ServiceClients {
        classifier: Arc::new(FixedClassifier(predictions)),
        generator: Arc::new(EchoGenerator),
        translator,
    };
    Explorer::with_clients(Config::default(), clients)
}

#[tokio::test]
async fn upload_to_translated_answer() {
    let translator = Arc::new(RecordingTranslator::default());
    let explorer = explorer(
        vec![
            Prediction::new("negative", 0.2),
            Prediction::new("Colosseum", 0.88),
        ],
        translator.clone(),
    );

    let jpeg = explorer.prepare_image(png(32, 32)).await.unwrap();
    let mut session = explorer.session();
    assert_eq!(session.identify(&jpeg.bytes).await.name(), "accepted");

    // Defaults: translation on, target en, so no call is made.
    let state = session.ask(Intent::FunFacts).await.unwrap();
    assert_eq!(state.name(), "generated");
    assert_eq!(translator.calls.load(Ordering::SeqCst), 0);

    let mut settings = session.translation();
    settings.target = Language::Fr;
    session.set_translation(settings);

    let state = session.ask(Intent::History).await.unwrap();
    match state {
        SessionState::Translated { text, answer, .. } => {
            assert_eq!(text, "Answer to: Give a brief history of Colosseum.");
            assert!(answer.text.starts_with("**Answer**"));
        }
        other => panic!("unexpected state: {}", other.name()),
    }

    let report = session.report().unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["landmark"], "Colosseum");
    assert_eq!(json["intent"], "history");
    assert_eq!(json["translation"]["language"], "fr");
    assert_eq!(json["translation"]["direction"], "ltr");
}

#[tokio::test]
async fn translation_error_does_not_hide_answer() {
    let translator = Arc::new(RecordingTranslator::default());
    let explorer = explorer(vec![Prediction::new("Brandenburg Gate", 0.97)], translator.clone());

    let jpeg = explorer.prepare_image(png(8, 8)).await.unwrap();
    let mut session = explorer.session();
    session.identify(&jpeg.bytes).await;
    session.set_translation(landmark_core::TranslationSettings {
        enabled: true,
        target: Language::De,
    });

    let state = session.ask(Intent::Description).await.unwrap();
    assert_eq!(state.name(), "translation-failed");
    assert_eq!(
        state.answer().unwrap().text,
        "**Answer** to: Give me a short description of Brandenburg Gate."
    );
    assert_eq!(*translator.targets.lock().unwrap(), vec![Language::De]);
}

#[tokio::test]
async fn rejected_image_then_reset() {
    let translator = Arc::new(RecordingTranslator::default());
    let explorer = explorer(vec![Prediction::new("Big Ben", 0.4)], translator);

    let jpeg = explorer.prepare_image(png(8, 8)).await.unwrap();
    let mut session = explorer.session();
    let state = session.identify(&jpeg.bytes).await;
    assert_eq!(state.name(), "rejected");

    assert!(session.ask(Intent::Description).await.is_err());
    session.reset();
    assert_eq!(session.state(), &SessionState::Idle);
}

//! Landmark Explorer Core - identify a landmark in a photo and answer
//! follow-up questions about it.
//!
//! # Architecture
//!
//! All heavy lifting is delegated to three remote services; this crate owns
//! the decisions between them:
//!
//! ```text
//! Image → JPEG → Classify → Confidence gate → (intent) Prompt → Generate → [Translate]
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use landmark_core::{Config, Explorer, Intent};
//!
//! #[tokio::main]
//! async fn main() -> landmark_core::Result<()> {
//!     let explorer = Explorer::new(Config::load()?)?;
//!     let jpeg = explorer.prepare_image(std::fs::read("./tower.jpg")?).await?;
//!
//!     let mut session = explorer.session();
//!     session.identify(&jpeg.bytes).await;
//!     session.ask(Intent::History).await?;
//!     println!("{:?}", session.report());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod jpeg;
pub mod query;
pub mod selector;
pub mod services;
pub mod session;
pub mod types;

// Re-exports for convenient access
pub use config::{Config, ServiceEndpoints};
pub use error::{
    ConfigError, ExplorerError, ImageError, Result, ServiceError, ServiceKind, SessionError,
};
pub use jpeg::{EncodedImage, UploadEncoder};
pub use query::build_prompt;
pub use selector::{select, CONFIDENCE_THRESHOLD, NEGATIVE_CLASS};
pub use services::{strip_emphasis, ServiceClients};
pub use session::{Answer, Landmark, Session, SessionState, TranslationSettings};
pub use types::{
    ImageSource, Intent, InteractionReport, Language, Prediction, RejectionReason, Selection,
    TextDirection,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Entry point: validated configuration plus the service clients built from it.
///
/// Construction fails if any required endpoint or credential is missing, so
/// configuration problems surface before the first image is submitted.
pub struct Explorer {
    config: Config,
    clients: ServiceClients,
}

impl Explorer {
    /// Resolve endpoints from `config` and build the HTTP clients.
    pub fn new(config: Config) -> Result<Self> {
        tracing::debug!("Initializing Landmark Explorer v{}", VERSION);
        let endpoints = config.services()?;
        let clients = ServiceClients::from_endpoints(&endpoints, &config.limits);
        Ok(Self { config, clients })
    }

    /// Build with explicit clients (alternative backends, tests).
    pub fn with_clients(config: Config, clients: ServiceClients) -> Self {
        Self { config, clients }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Start a fresh session using the configured translation preferences.
    pub fn session(&self) -> Session {
        Session::new(
            self.clients.clone(),
            TranslationSettings::from(&self.config.translation),
        )
    }

    /// Decode user-supplied image bytes and re-encode them as JPEG.
    pub async fn prepare_image(&self, bytes: Vec<u8>) -> Result<EncodedImage> {
        let encoder = UploadEncoder::new(self.config.limits.clone());
        Ok(encoder.encode_jpeg(bytes).await?)
    }
}

//! Clients for the three remote services.
//!
//! Each service sits behind an `async_trait` so the session can be driven by
//! any implementation; the concrete clients talk HTTP via `reqwest`. Clients
//! are built from already-resolved endpoints and never read the environment.

pub mod classifier;
pub mod generator;
pub mod translator;

pub use classifier::{Classifier, CustomVisionClassifier};
pub use generator::{AnswerGenerator, ChatCompletionsGenerator, Generation, GenerationRequest};
pub use translator::{
    strip_emphasis, AzureTranslator, TranslationOutcome, TranslationRequest, Translator,
};

use crate::config::{LimitsConfig, ServiceEndpoints};
use std::sync::Arc;
use std::time::Duration;

/// The three service clients an interaction needs.
#[derive(Clone)]
pub struct ServiceClients {
    pub classifier: Arc<dyn Classifier>,
    pub generator: Arc<dyn AnswerGenerator>,
    pub translator: Arc<dyn Translator>,
}

impl ServiceClients {
    /// Build the HTTP clients for resolved endpoints.
    pub fn from_endpoints(endpoints: &ServiceEndpoints, limits: &LimitsConfig) -> Self {
        let timeout = Duration::from_millis(limits.request_timeout_ms);
        Self {
            classifier: Arc::new(CustomVisionClassifier::new(
                endpoints.classifier.clone(),
                timeout,
            )),
            generator: Arc::new(ChatCompletionsGenerator::new(
                endpoints.generator.clone(),
                timeout,
            )),
            translator: Arc::new(AzureTranslator::new(endpoints.translator.clone(), timeout)),
        }
    }
}

/// Minimal one-request-per-connection HTTP server that records what clients
/// send and answers with a canned response.
#[cfg(test)]
pub(crate) mod test_server {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// One request as received on the wire.
    #[derive(Debug, Clone)]
    pub struct RecordedRequest {
        pub method: String,
        pub target: String,
        pub headers: Vec<(String, String)>,
        pub body: Vec<u8>,
    }

    impl RecordedRequest {
        /// Header value by case-insensitive name.
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }

        pub fn json(&self) -> serde_json::Value {
            serde_json::from_slice(&self.body).unwrap()
        }
    }

    /// Serve `count` requests with `status` and `body`, then return them.
    pub async fn serve(
        status: u16,
        body: &'static str,
        count: usize,
    ) -> (String, JoinHandle<Vec<RecordedRequest>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let mut recorded = Vec::with_capacity(count);
            for _ in 0..count {
                let (mut stream, _) = listener.accept().await.unwrap();
                recorded.push(read_request(&mut stream).await);

                let reason = if status < 400 { "OK" } else { "Error" };
                let response = format!(
                    "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\n\
                     Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(response.as_bytes()).await.unwrap();
                stream.shutdown().await.ok();
            }
            recorded
        });

        (base_url, handle)
    }

    async fn read_request(stream: &mut TcpStream) -> RecordedRequest {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        let head_end = loop {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before headers were complete");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos;
            }
        };

        let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
        let mut lines = head.split("\r\n");
        let mut request_line = lines.next().unwrap_or_default().split(' ');
        let method = request_line.next().unwrap_or_default().to_string();
        let target = request_line.next().unwrap_or_default().to_string();
        let headers: Vec<(String, String)> = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();

        let content_length = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, v)| v.parse::<usize>().ok())
            .unwrap_or(0);

        let body_start = head_end + 4;
        while buf.len() < body_start + content_length {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before body was complete");
            buf.extend_from_slice(&chunk[..n]);
        }

        RecordedRequest {
            method,
            target,
            headers,
            body: buf[body_start..body_start + content_length].to_vec(),
        }
    }
}

//! Text generation backends.
//!
//! The remote service receives the rendered prompt together with the
//! structured telemetry it was built from, and answers with a single short
//! text string.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use serde::{Deserialize, Serialize};
use tracing::debug;

use neurogrid_state::{ClusterConfig, SystemMetrics};

use crate::error::NarratorError;

/// Largest response body read from the service.
pub const MAX_RESPONSE_BYTES: usize = 64 * 1024;

/// Boxed future returned by [`TextGenerator::generate`].
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Telemetry the narration prompt was built from.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NarrationContext {
    pub metrics: SystemMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<ClusterConfig>,
    /// Up to three most recent log messages, oldest first.
    pub recent_logs: Vec<String>,
}

/// Body of a generation request.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub context: NarrationContext,
}

/// Expected response body. `response` is accepted as an alias for `text`.
#[derive(Debug, Deserialize)]
struct GenerationResponse {
    #[serde(alias = "response")]
    text: String,
}

/// A service that turns a prompt into text.
pub trait TextGenerator: Send + Sync {
    fn generate<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> BoxFuture<'a, Result<String, NarratorError>>;
}

/// Generator used when no endpoint is configured. Always fails, so callers
/// get the fallback text without any network I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGenerator;

impl TextGenerator for OfflineGenerator {
    fn generate<'a>(
        &'a self,
        _request: &'a GenerationRequest,
    ) -> BoxFuture<'a, Result<String, NarratorError>> {
        Box::pin(async { Err(NarratorError::Offline) })
    }
}

/// Posts JSON to a plain-HTTP endpoint over a fresh hyper http1 connection.
#[derive(Debug, Clone)]
pub struct HttpGenerator {
    endpoint: http::Uri,
    /// `host:port` to dial.
    address: String,
    /// Value of the `host` header.
    authority: String,
}

impl HttpGenerator {
    /// Parse an endpoint such as `http://127.0.0.1:11434/api/generate`.
    pub fn new(endpoint: &str) -> Result<Self, NarratorError> {
        let endpoint: http::Uri = endpoint
            .parse()
            .map_err(|e: http::uri::InvalidUri| NarratorError::InvalidEndpoint(e.to_string()))?;

        match endpoint.scheme_str() {
            Some("http") => {}
            Some(other) => {
                return Err(NarratorError::InvalidEndpoint(format!(
                    "unsupported scheme {other}"
                )));
            }
            None => {
                return Err(NarratorError::InvalidEndpoint(
                    "missing scheme".to_string(),
                ));
            }
        }

        let authority = endpoint
            .authority()
            .ok_or_else(|| NarratorError::InvalidEndpoint("missing host".to_string()))?;
        let address = format!("{}:{}", authority.host(), authority.port_u16().unwrap_or(80));
        let authority = authority.as_str().to_string();

        Ok(Self {
            endpoint,
            address,
            authority,
        })
    }

    /// The address this generator connects to.
    pub fn address(&self) -> &str {
        &self.address
    }

    async fn post(&self, body: Vec<u8>) -> Result<String, NarratorError> {
        let stream = tokio::net::TcpStream::connect(&self.address).await?;

        let io = hyper_util::rt::TokioIo::new(stream);
        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(|e| NarratorError::Http(e.to_string()))?;

        // Drive the connection in the background.
        tokio::spawn(async move {
            let _ = conn.await;
        });

        let path = self
            .endpoint
            .path_and_query()
            .map(|p| p.as_str())
            .unwrap_or("/");

        let req = http::Request::builder()
            .method("POST")
            .uri(path)
            .header("host", &self.authority)
            .header("content-type", "application/json")
            .header("user-agent", "neurogrid-narrator/0.1")
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| NarratorError::Http(e.to_string()))?;

        let resp = sender
            .send_request(req)
            .await
            .map_err(|e| NarratorError::Http(e.to_string()))?;

        let status = resp.status();
        let bytes = Limited::new(resp.into_body(), MAX_RESPONSE_BYTES)
            .collect()
            .await
            .map_err(|e| {
                if e.is::<LengthLimitError>() {
                    NarratorError::TooLarge(MAX_RESPONSE_BYTES)
                } else {
                    NarratorError::Http(e.to_string())
                }
            })?
            .to_bytes();

        if !status.is_success() {
            debug!(%status, address = %self.address, "narrator non-2xx");
            return Err(NarratorError::Status(status.as_u16()));
        }

        let parsed: GenerationResponse = serde_json::from_slice(&bytes)?;
        Ok(parsed.text)
    }
}

impl TextGenerator for HttpGenerator {
    fn generate<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> BoxFuture<'a, Result<String, NarratorError>> {
        Box::pin(async move {
            let body = serde_json::to_vec(request)?;
            self.post(body).await
        })
    }
}

//! Transport connector for the streaming chat endpoint.
//!
//! Issues exactly one POST per send and hands back the body stream. There is
//! no retry: a failed attempt surfaces to the caller, who may resend.

use futures_util::StreamExt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{NetworkError, StreamError};
use crate::models::ChatRequest;
use crate::traits::{ByteStream, Headers, HttpClient, HttpError};

/// Upper bound on how much of an error body is read for the message.
const MAX_ERROR_BODY_BYTES: usize = 4096;

/// A successfully opened response stream.
pub struct OpenStream {
    pub status: u16,
    pub body: ByteStream,
}

impl std::fmt::Debug for OpenStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenStream")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Client for the streaming chat endpoint.
#[derive(Clone)]
pub struct TransportConnector {
    client: Arc<dyn HttpClient>,
    endpoint: String,
}

impl TransportConnector {
    pub fn new(client: Arc<dyn HttpClient>, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Headers sent with every chat request.
    pub fn build_headers(auth_token: &str) -> Headers {
        let mut headers = Headers::new();
        headers.insert(
            "Authorization".to_string(),
            format!("Bearer {}", auth_token),
        );
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Accept".to_string(), "text/event-stream".to_string());
        headers
    }

    /// POST the conversation and return the body stream.
    ///
    /// A non-success status reads the body as a best-effort message and
    /// fails. A success status without a body also fails.
    pub async fn open(
        &self,
        request: &ChatRequest,
        auth_token: &str,
    ) -> Result<OpenStream, NetworkError> {
        let body = serde_json::to_string(request).map_err(|e| NetworkError::Other {
            message: format!("failed to encode request: {}", e),
        })?;
        let headers = Self::build_headers(auth_token);

        debug!(
            "POST {} with {} message(s)",
            self.endpoint,
            request.len()
        );

        let response = self
            .client
            .post_stream(&self.endpoint, &body, &headers)
            .await
            .map_err(|e| network_error_from_http(e, &self.endpoint))?;

        let status = response.status;

        if !response.is_success() {
            let message = match response.body {
                Some(body) => read_error_message(body).await,
                None => String::new(),
            };
            warn!("Chat endpoint returned HTTP {}: {}", status, message);
            return Err(NetworkError::HttpStatus { status, message });
        }

        match response.body {
            Some(body) => {
                info!("Chat stream opened (HTTP {})", status);
                Ok(OpenStream { status, body })
            }
            None => {
                warn!("Chat endpoint returned HTTP {} with no body", status);
                Err(NetworkError::MissingBody { status })
            }
        }
    }
}

impl std::fmt::Debug for TransportConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportConnector")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

/// Map a failure to obtain a response.
pub fn network_error_from_http(err: HttpError, url: &str) -> NetworkError {
    match err {
        HttpError::ConnectionFailed(message) | HttpError::InvalidUrl(message) => {
            NetworkError::ConnectionFailed {
                url: url.to_string(),
                message,
            }
        }
        HttpError::Timeout(_) => NetworkError::Timeout {
            operation: "assistant request".to_string(),
        },
        HttpError::Cancelled => NetworkError::Cancelled,
        HttpError::Io(message) | HttpError::Other(message) => NetworkError::Other { message },
    }
}

/// Map a failure while reading an open body.
pub fn stream_error_from_http(err: HttpError) -> StreamError {
    StreamError::ConnectionLost {
        message: err.to_string(),
    }
}

/// Drain an error body, lossily decoded and capped, then pull a message out
/// of a JSON error envelope if there is one.
async fn read_error_message(mut body: ByteStream) -> String {
    let mut bytes: Vec<u8> = Vec::new();
    while let Some(chunk) = body.next().await {
        match chunk {
            Ok(chunk) => {
                let room = MAX_ERROR_BODY_BYTES.saturating_sub(bytes.len());
                bytes.extend_from_slice(&chunk[..chunk.len().min(room)]);
                if bytes.len() >= MAX_ERROR_BODY_BYTES {
                    break;
                }
            }
            Err(e) => {
                debug!("Error body read stopped early: {}", e);
                break;
            }
        }
    }

    let text = String::from_utf8_lossy(&bytes).trim().to_string();
    extract_error_message(&text).unwrap_or(text)
}

/// `{"error":"..."}`, `{"error":{"message":"..."}}` or `{"message":"..."}`.
fn extract_error_message(text: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    let message = match value.get("error") {
        Some(serde_json::Value::String(s)) => Some(s.as_str()),
        Some(error) => error.get("message").and_then(|m| m.as_str()),
        None => value.get("message").and_then(|m| m.as_str()),
    }?;
    Some(message.to_string())
}

//! Mock HTTP client for testing.
//!
//! Returns scripted streaming responses so the pipeline can be driven with
//! any chunking, status or failure without network access.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::traits::{ByteStream, Headers, HttpClient, HttpError, StreamResponse};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method
    pub method: String,
    /// Request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request body
    pub body: String,
}

impl RecordedRequest {
    /// Parse the recorded body as JSON.
    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// 200 with the given body chunks, then end of stream
    Stream(Vec<Bytes>),
    /// 200 with the given chunks, then a read error
    StreamThenError(Vec<Bytes>, HttpError),
    /// 200 with the given chunks, then the stream never yields again
    StreamThenHang(Vec<Bytes>),
    /// Non-streaming status with a text body
    Status { status: u16, body: String },
    /// Status with no readable body
    NoBody(u16),
    /// The request itself fails
    Error(HttpError),
}

impl MockResponse {
    /// 200 stream built from string chunks.
    pub fn chunks<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MockResponse::Stream(
            chunks
                .into_iter()
                .map(|chunk| Bytes::from(chunk.into()))
                .collect(),
        )
    }

    fn into_stream_response(self) -> Result<StreamResponse, HttpError> {
        let ok = |chunks: Vec<Bytes>| stream::iter(chunks.into_iter().map(Ok));

        match self {
            MockResponse::Stream(chunks) => {
                let body: ByteStream = Box::pin(ok(chunks));
                Ok(StreamResponse::new(200, Some(body)))
            }
            MockResponse::StreamThenError(chunks, err) => {
                let body: ByteStream = Box::pin(ok(chunks).chain(stream::once(async { Err(err) })));
                Ok(StreamResponse::new(200, Some(body)))
            }
            MockResponse::StreamThenHang(chunks) => {
                let body: ByteStream = Box::pin(ok(chunks).chain(stream::pending()));
                Ok(StreamResponse::new(200, Some(body)))
            }
            MockResponse::Status { status, body } => {
                let body: ByteStream = Box::pin(ok(vec![Bytes::from(body)]));
                Ok(StreamResponse::new(status, Some(body)))
            }
            MockResponse::NoBody(status) => Ok(StreamResponse::new(status, None)),
            MockResponse::Error(err) => Err(err),
        }
    }
}

/// Mock HTTP client for testing.
///
/// # Example
///
/// ```ignore
/// use wellchat::adapters::mock::{MockHttpClient, MockResponse};
///
/// let client = MockHttpClient::new();
/// client.set_response(
///     "https://api.example.com/chat",
///     MockResponse::chunks(["data: [DONE]\n"]),
/// );
///
/// // ... drive a session ...
///
/// let requests = client.get_requests();
/// assert_eq!(requests.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    /// Configured responses by URL
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    /// Default response when no specific match
    default_response: Arc<Mutex<Option<MockResponse>>>,
    /// Recorded requests for verification
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHttpClient {
    /// Create a new mock HTTP client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock that answers every URL with `response`.
    pub fn with_default(response: MockResponse) -> Self {
        let client = Self::new();
        client.set_default_response(response);
        client
    }

    /// Set a response for a specific URL.
    ///
    /// The URL is matched exactly.
    pub fn set_response(&self, url: &str, response: MockResponse) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(url.to_string(), response);
    }

    /// Set a default response for URLs without specific matches.
    pub fn set_default_response(&self, response: MockResponse) {
        let mut default = self.default_response.lock().unwrap();
        *default = Some(response);
    }

    /// Get all recorded requests.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests made so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn record_request(&self, url: &str, headers: &Headers, body: &str) {
        let mut requests = self.requests.lock().unwrap();
        requests.push(RecordedRequest {
            method: "POST".to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            body: body.to_string(),
        });
    }

    fn get_response(&self, url: &str) -> Option<MockResponse> {
        if let Some(response) = self.responses.lock().unwrap().get(url) {
            return Some(response.clone());
        }
        self.default_response.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<StreamResponse, HttpError> {
        self.record_request(url, headers, body);

        match self.get_response(url) {
            Some(response) => response.into_stream_response(),
            None => Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        }
    }
}

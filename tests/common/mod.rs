//! Common test utilities for integration tests.
//!
//! Builders for scripted assistants and helpers for producing wire lines.

#![allow(dead_code)]

use std::sync::Arc;

pub use wellchat::adapters::mock::{MockEntitlement, MockHttpClient, MockResponse};
use wellchat::assistant::{Assistant, Reply};
use wellchat::models::Conversation;
use wellchat::session::{SessionHandle, SessionReport, SessionUpdate};
use wellchat::traits::Tier;
use wellchat::transport::TransportConnector;

pub const TEST_URL: &str = "https://api.test.local/functions/v1/chat";
pub const TEST_TOKEN: &str = "test-access-token-12345";

/// A `data:` line carrying one content fragment, newline included.
pub fn fragment_line(text: &str) -> String {
    let payload = serde_json::json!({"choices": [{"delta": {"content": text}}]});
    format!("data: {}\n", payload)
}

/// The terminal line, newline included.
pub fn done_line() -> String {
    "data: [DONE]\n".to_string()
}

/// Concatenate fragment lines for every text, optionally followed by `[DONE]`.
pub fn stream_body(fragments: &[&str], terminal: bool) -> String {
    let mut body: String = fragments.iter().map(|f| fragment_line(f)).collect();
    if terminal {
        body.push_str(&done_line());
    }
    body
}

/// Split bytes into chunks at the given offsets.
pub fn split_at_offsets(bytes: &[u8], offsets: &[usize]) -> Vec<bytes::Bytes> {
    let mut chunks = Vec::new();
    let mut start = 0;
    for &offset in offsets {
        chunks.push(bytes::Bytes::copy_from_slice(&bytes[start..offset]));
        start = offset;
    }
    chunks.push(bytes::Bytes::copy_from_slice(&bytes[start..]));
    chunks
}

/// Assistant for a premium caller backed by a scripted HTTP client.
pub fn premium_assistant(response: MockResponse) -> (Assistant, MockHttpClient) {
    assistant_for(Tier::Premium, "en", response)
}

pub fn assistant_for(tier: Tier, locale: &str, response: MockResponse) -> (Assistant, MockHttpClient) {
    let client = MockHttpClient::with_default(response);
    let assistant = Assistant::new(
        TransportConnector::new(Arc::new(client.clone()), TEST_URL),
        Arc::new(MockEntitlement::new(tier)),
        locale,
    );
    (assistant, client)
}

/// Unwrap a streaming reply.
pub fn expect_streaming(reply: Reply) -> SessionHandle {
    match reply {
        Reply::Streaming(handle) => handle,
        Reply::Fallback { reply, .. } => panic!("expected streaming, got fallback {:?}", reply),
    }
}

/// Drain every update, then join the session.
pub async fn finish(mut handle: SessionHandle) -> (Vec<SessionUpdate>, SessionReport) {
    let mut updates = Vec::new();
    while let Some(update) = handle.recv().await {
        updates.push(update);
    }
    let report = handle.join().await.expect("session task");
    (updates, report)
}

/// Send one message as a premium caller against scripted chunks.
pub async fn stream_chunks(chunks: Vec<bytes::Bytes>) -> SessionReport {
    let (assistant, _) = premium_assistant(MockResponse::Stream(chunks));
    let reply = assistant
        .send_message(&Conversation::new(), "hello", TEST_TOKEN)
        .await
        .expect("send");
    finish(expect_streaming(reply)).await.1
}

/// Snapshot texts, in order.
pub fn snapshots(updates: &[SessionUpdate]) -> Vec<String> {
    updates
        .iter()
        .filter_map(|update| match update {
            SessionUpdate::Snapshot(text) => Some(text.clone()),
            SessionUpdate::Finished(_) => None,
        })
        .collect()
}

//! Line classification and payload parsing
//!
//! Stateless functions: one turns a decoded line into a `Frame`, the other
//! turns a data payload into a `DeltaEvent`.

use crate::sse::events::{DeltaEvent, Frame, PayloadError, TERMINAL_TOKEN};
use crate::sse::payloads::{ChunkPayload, ErrorPayload};

/// Classify a single decoded line (newline and trailing CR already removed)
pub fn parse_frame_line(line: &str) -> Frame {
    if line.trim().is_empty() {
        return Frame::Blank;
    }

    if let Some(stripped) = line.strip_prefix(':') {
        return Frame::Comment(stripped.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("data:") {
        return Frame::Data(rest.trim().to_string());
    }

    // event:, id:, retry: and unknown extensions carry nothing we use
    Frame::Unrecognized(line.to_string())
}

/// Interpret a data frame payload.
///
/// Only syntactically broken JSON is reported as `Incomplete`. Any object
/// with a non-null `"error"` key is a server error, whatever its shape.
/// Other valid JSON that does not look like a chunk is metadata.
pub fn parse_payload(payload: &str) -> Result<DeltaEvent, PayloadError> {
    if payload == TERMINAL_TOKEN {
        return Ok(DeltaEvent::Terminal);
    }

    let mut value: serde_json::Value =
        serde_json::from_str(payload).map_err(|e| PayloadError::Incomplete {
            source: e.to_string(),
        })?;

    let object = match value.as_object_mut() {
        Some(object) => object,
        None => return Ok(DeltaEvent::Metadata),
    };

    if let Some(error) = object.remove("error").and_then(ErrorPayload::from_value) {
        let (message, code) = error.into_parts();
        return Ok(DeltaEvent::ServerError { message, code });
    }

    let chunk: ChunkPayload = match serde_json::from_value(value) {
        Ok(chunk) => chunk,
        Err(_) => return Ok(DeltaEvent::Metadata),
    };

    Ok(chunk
        .fragment()
        .map(DeltaEvent::Fragment)
        .unwrap_or(DeltaEvent::Metadata))
}

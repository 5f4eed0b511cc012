//! Server-sent event stream decoding
//!
//! Decodes the chat endpoint's event stream:
//! - `data: <json>` - a chunk carrying `choices[].delta.content`
//! - `data: [DONE]` - end of response
//! - Empty lines and lines starting with `:` - no-ops
//! - Anything else - ignored
//!
//! # Module structure
//! - `events` - Frame and DeltaEvent definitions
//! - `payloads` - Internal payload deserialization structs
//! - `parser` - Stateless line and payload parsing
//! - `decoder` - Incremental byte-to-event decoder (FrameDecoder, Utf8Decoder)

mod decoder;
mod events;
mod parser;
mod payloads;

pub use decoder::{DecoderStats, FrameDecoder, Utf8Decoder};
pub use events::{DeltaEvent, Frame, PayloadError, TERMINAL_TOKEN};
pub use parser::{parse_frame_line, parse_payload};

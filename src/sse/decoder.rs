//! Incremental frame decoder
//!
//! Turns raw byte chunks into delta events. Decoding state is carried
//! across chunks: a multi-byte character or a line may be split anywhere.
//!
//! A data line whose payload does not parse is pushed back in front of the
//! unread text and decoding stalls there. More bytes cannot complete a line
//! that already ended, so it is retried only at `finish()`, where it is
//! dropped and the lines behind it are decoded.

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::sse::events::{DeltaEvent, Frame};
use crate::sse::parser::{parse_frame_line, parse_payload};

const REPLACEMENT: char = '\u{FFFD}';

/// UTF-8 decoder that keeps an incomplete trailing sequence between calls
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode as much of `pending + bytes` as possible.
    ///
    /// Invalid sequences become U+FFFD. An incomplete sequence at the end is
    /// held back until the next call.
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);

        let mut out = String::with_capacity(self.pending.len());
        let mut rest: &[u8] = &self.pending;

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    rest = &[];
                    break;
                }
                Err(e) => {
                    let (valid, tail) = rest.split_at(e.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        Some(len) => {
                            out.push(REPLACEMENT);
                            rest = &tail[len..];
                        }
                        None => {
                            rest = tail;
                            break;
                        }
                    }
                }
            }
        }

        let consumed = self.pending.len() - rest.len();
        self.pending.drain(..consumed);
        out
    }

    /// Flush held-back bytes. A truncated sequence becomes U+FFFD.
    pub fn finish(&mut self) -> String {
        let pending = std::mem::take(&mut self.pending);
        String::from_utf8_lossy(&pending).into_owned()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// Counters describing how a decoder handled its input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderStats {
    pub lines: usize,
    pub requeued: usize,
    pub dropped: usize,
}

/// Byte stream to delta event decoder for one response
#[derive(Debug, Default)]
pub struct FrameDecoder {
    utf8: Utf8Decoder,
    buffer: String,
    /// Start of the unread part of `buffer`
    cursor: usize,
    /// No newline in `buffer[cursor..scanned]`
    scanned: usize,
    /// Lines put back in front of the unread text
    requeued: VecDeque<String>,
    /// A requeued data line blocks the batch until `finish()`
    stalled: bool,
    finished: bool,
    terminated: bool,
    stats: DecoderStats,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk of raw bytes. Ignored once the terminal token was seen.
    pub fn push(&mut self, chunk: &[u8]) {
        if self.terminated || self.finished {
            return;
        }
        let text = self.utf8.decode(chunk);
        self.compact();
        self.buffer.push_str(&text);
    }

    /// Mark end of stream. The remaining buffer is treated as a last batch
    /// of lines, whether or not the final line ended with a newline.
    pub fn finish(&mut self) {
        if self.finished {
            return;
        }
        let tail = self.utf8.finish();
        self.buffer.push_str(&tail);
        let unread = &self.buffer[self.cursor..];
        if !unread.is_empty() && !unread.ends_with('\n') {
            self.buffer.push('\n');
        }
        self.finished = true;
    }

    /// Next event that can be produced from the buffered bytes.
    ///
    /// Returns `None` when more input is needed (or after `finish()`, when the
    /// buffer is exhausted). After `Terminal` it always returns `None`.
    ///
    /// A stalled line is complete, so later bytes cannot change it. Until
    /// `finish()` it is neither read nor parsed again.
    pub fn next_event(&mut self) -> Option<DeltaEvent> {
        if self.terminated || (self.stalled && !self.finished) {
            return None;
        }

        while let Some(line) = self.next_line() {
            let payload = match parse_frame_line(&line) {
                Frame::Data(payload) => payload,
                Frame::Comment(_) | Frame::Blank => continue,
                Frame::Unrecognized(other) => {
                    trace!("Ignoring unrecognized line: {}", other);
                    continue;
                }
            };

            match parse_payload(&payload) {
                Ok(event) => {
                    if event == DeltaEvent::Terminal {
                        self.terminated = true;
                        self.buffer.clear();
                        self.cursor = 0;
                        self.scanned = 0;
                        self.requeued.clear();
                    }
                    return Some(event);
                }
                Err(e) if !self.finished => {
                    debug!("Re-buffering unparseable data line: {}", e);
                    self.stats.requeued += 1;
                    self.requeue(line);
                    self.stalled = true;
                    return None;
                }
                Err(e) => {
                    debug!("Dropping unresolved data line at end of stream: {}", e);
                    self.stats.dropped += 1;
                }
            }
        }

        None
    }

    /// Drain every event currently available, stopping after `Terminal`.
    pub fn drain_events(&mut self) -> Vec<DeltaEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event() {
            events.push(event);
        }
        events
    }

    /// Put a line back in front of the unread text. It is the next line read.
    pub fn requeue(&mut self, line: String) {
        self.requeued.push_front(line);
    }

    /// Text not yet resolved into events, requeued lines first.
    pub fn buffered(&self) -> String {
        let mut text = String::new();
        for line in &self.requeued {
            text.push_str(line);
            text.push('\n');
        }
        text.push_str(&self.buffer[self.cursor..]);
        text
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Whether the terminal token has been decoded.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Whether an unparseable line is holding back the rest of the stream.
    pub fn is_stalled(&self) -> bool {
        self.stalled && !self.finished && !self.terminated
    }

    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// Requeued lines come first and were already counted.
    fn next_line(&mut self) -> Option<String> {
        if let Some(line) = self.requeued.pop_front() {
            return Some(line);
        }

        let from = self.scanned.max(self.cursor);
        let newline = match self.buffer[from..].find('\n') {
            Some(offset) => from + offset,
            None => {
                self.scanned = self.buffer.len();
                return None;
            }
        };

        let mut line = self.buffer[self.cursor..newline].to_string();
        self.cursor = newline + 1;
        self.scanned = self.cursor;
        if line.ends_with('\r') {
            line.pop();
        }
        self.stats.lines += 1;
        Some(line)
    }

    /// Drop consumed text once it makes up at least half the buffer.
    fn compact(&mut self) {
        if self.cursor == 0 || self.cursor * 2 < self.buffer.len() {
            return;
        }
        self.buffer.drain(..self.cursor);
        self.scanned = self.scanned.saturating_sub(self.cursor);
        self.cursor = 0;
    }
}

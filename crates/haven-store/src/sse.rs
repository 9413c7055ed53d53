//! # Event-Stream Parsing
//!
//! Incremental parser for the remote store's `text/event-stream`
//! subscription frames.
//!
//! ## Wire Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Subscription Stream Frames                            │
//! │                                                                         │
//! │  event: put                                                            │
//! │  data: {"path": "/", "data": [{"id": 1, ...}]}                         │
//! │  <blank line>                                                          │
//! │                                                                         │
//! │  event: keep-alive          heartbeat, data is null                    │
//! │  event: patch               partial update below the key               │
//! │  event: cancel              server revoked the read                    │
//! │  event: auth_revoked        credential expired                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Frames arrive in arbitrary chunk sizes, so the parser buffers bytes and
//! only emits events for complete (blank-line-terminated) frames. Frame
//! boundaries are byte positions, which keeps a UTF-8 sequence split across
//! network chunks intact.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{StoreError, StoreResult};

/// A parsed subscription event.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// Whole-or-partial value replacement at `path` below the subscribed key.
    Put { path: String, data: Value },

    /// Partial merge at `path`. The store treats it as a signal to refetch.
    Patch { path: String, data: Value },

    /// Periodic heartbeat.
    KeepAlive,

    /// The server cancelled the subscription (usually a rules change).
    Cancel,

    /// The credential used for the subscription was revoked.
    AuthRevoked,
}

#[derive(Deserialize)]
struct PutPayload {
    path: String,
    data: Value,
}

/// Incremental event-stream parser.
#[derive(Debug, Default)]
pub struct EventStreamParser {
    buffer: Vec<u8>,
}

impl EventStreamParser {
    pub fn new() -> Self {
        EventStreamParser::default()
    }

    /// Appends a network chunk and returns every event completed by it.
    ///
    /// Unknown event names are skipped (forward compatibility); a `put` or
    /// `patch` whose payload is not valid JSON is an error, which the
    /// listener treats as a broken stream and reconnects.
    pub fn push(&mut self, chunk: &[u8]) -> StoreResult<Vec<ServerEvent>> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some((end, terminator_len)) = find_frame_end(&self.buffer) {
            let frame: Vec<u8> = self.buffer.drain(..end + terminator_len).collect();
            let frame = String::from_utf8_lossy(&frame[..end]);
            if let Some(event) = parse_frame(&frame)? {
                events.push(event);
            }
        }
        Ok(events)
    }
}

/// Position and length of the first frame terminator (`\n\n` or
/// `\r\n\r\n`), if a complete frame is buffered.
fn find_frame_end(buffer: &[u8]) -> Option<(usize, usize)> {
    for i in 0..buffer.len().saturating_sub(1) {
        if buffer[i..].starts_with(b"\r\n\r\n") {
            return Some((i, 4));
        }
        if buffer[i..].starts_with(b"\n\n") {
            return Some((i, 2));
        }
    }
    None
}

fn parse_frame(frame: &str) -> StoreResult<Option<ServerEvent>> {
    let mut event_name: Option<&str> = None;
    let mut data = String::new();

    for line in frame.lines() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if let Some(rest) = line.strip_prefix("event:") {
            event_name = Some(rest.trim());
        } else if let Some(rest) = line.strip_prefix("data:") {
            if !data.is_empty() {
                data.push('\n');
            }
            data.push_str(rest.trim_start());
        }
        // Comment lines (":...") and unknown fields are ignored.
    }

    let event = match event_name {
        Some("put") => Some(decode_payload(&data)?.into_put()),
        Some("patch") => Some(decode_payload(&data)?.into_patch()),
        Some("keep-alive") => Some(ServerEvent::KeepAlive),
        Some("cancel") => Some(ServerEvent::Cancel),
        Some("auth_revoked") => Some(ServerEvent::AuthRevoked),
        _ => None,
    };
    Ok(event)
}

fn decode_payload(data: &str) -> StoreResult<PutPayload> {
    serde_json::from_str(data).map_err(|err| {
        StoreError::Serialization(format!("bad subscription payload: {}", err))
    })
}

impl PutPayload {
    fn into_put(self) -> ServerEvent {
        ServerEvent::Put {
            path: self.path,
            data: self.data,
        }
    }

    fn into_patch(self) -> ServerEvent {
        ServerEvent::Patch {
            path: self.path,
            data: self.data,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

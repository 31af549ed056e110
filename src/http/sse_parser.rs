//! Server-sent events for `streamGenerateContent?alt=sse`.
//!
//! The server writes one `data:` line per response chunk. Comment lines,
//! `event:`/`id:` fields and blank separators carry nothing we use.

use super::loud_wire;
use crate::errors::GenaiError;
use async_stream::try_stream;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use std::str;

/// Returns the JSON payload of a `data:` line, or `None` for any other line
/// and for empty payloads.
fn data_payload(line: &[u8]) -> Result<Option<&str>, GenaiError> {
    let line = str::from_utf8(line)?.trim_end_matches(['\n', '\r']);
    Ok(line
        .strip_prefix("data:")
        .map(str::trim_start)
        .filter(|payload| !payload.is_empty()))
}

/// Parses an SSE byte stream into a stream of deserialized chunks.
///
/// Bytes are buffered until a full line is available, so a chunk may be
/// split anywhere across network reads. A final `data:` line that is not
/// newline-terminated is still parsed when the body ends.
///
/// `request_id` correlates chunks with the originating request in LOUD_WIRE
/// output.
pub fn parse_sse_stream<T>(
    byte_stream: impl Stream<Item = Result<Bytes, reqwest::Error>> + Send,
    request_id: usize,
) -> impl Stream<Item = Result<T, GenaiError>> + Send
where
    T: DeserializeOwned + Send,
{
    try_stream! {
        futures_util::pin_mut!(byte_stream);
        let mut buffer: Vec<u8> = Vec::new();

        while let Some(chunk) = byte_stream.next().await {
            buffer.extend_from_slice(&chunk?);

            while let Some(end) = buffer.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=end).collect();
                if let Some(payload) = data_payload(&line)? {
                    loud_wire::log_sse_chunk(request_id, payload);
                    yield serde_json::from_str::<T>(payload)?;
                }
            }
        }

        if let Some(payload) = data_payload(&buffer)? {
            loud_wire::log_sse_chunk(request_id, payload);
            yield serde_json::from_str::<T>(payload)?;
        }
    }
}

//! Reassembly of fragmented inbound messages.
//!
//! ```text
//! WaitingForFragment --data(last=false)--> Accumulating
//! WaitingForFragment --data(last=true)---> FrameComplete
//! Accumulating       --data(last=false)--> Accumulating
//! Accumulating       --data(last=true)---> FrameComplete
//! FrameComplete      --finish()----------> WaitingForFragment
//! ```
//!
//! `finish()` is the "yielded" step: the caller has consumed the frame and
//! the buffer is cleared with its capacity kept for the next one.

use crate::types::ServerMessage;
use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssemblerState {
    WaitingForFragment,
    Accumulating,
    FrameComplete,
}

/// Accumulates fragments into one reusable buffer until a frame is complete.
#[derive(Debug)]
pub struct FrameAssembler {
    buffer: Vec<u8>,
    state: AssemblerState,
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameAssembler {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(4096)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            state: AssemblerState::WaitingForFragment,
        }
    }

    #[must_use]
    pub fn state(&self) -> AssemblerState {
        self.state
    }

    /// Capacity of the internal buffer.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Appends one fragment. Returns `true` once the frame is complete.
    ///
    /// Pushing onto a completed frame that was never finished starts a new
    /// frame, discarding the old one.
    pub fn push(&mut self, payload: &[u8], last: bool) -> bool {
        if self.state == AssemblerState::FrameComplete {
            self.finish();
        }
        self.buffer.extend_from_slice(payload);
        self.state = if last {
            AssemblerState::FrameComplete
        } else {
            AssemblerState::Accumulating
        };
        last
    }

    /// The complete frame, if one is ready.
    #[must_use]
    pub fn frame(&self) -> Option<&[u8]> {
        (self.state == AssemblerState::FrameComplete).then_some(self.buffer.as_slice())
    }

    /// Marks the current frame as consumed and clears the buffer.
    pub fn finish(&mut self) {
        self.buffer.clear();
        self.state = AssemblerState::WaitingForFragment;
    }
}

/// Decodes a complete frame.
///
/// Empty frames, JSON `null` and malformed JSON decode to `None`; the caller
/// skips them.
pub fn decode_server_message(frame: &[u8]) -> Option<ServerMessage> {
    if frame.iter().all(u8::is_ascii_whitespace) {
        warn!("Skipping empty Live frame");
        return None;
    }

    match serde_json::from_slice::<Option<ServerMessage>>(frame) {
        Ok(Some(message)) => Some(message),
        Ok(None) => {
            warn!("Skipping null Live frame");
            None
        }
        Err(e) => {
            warn!(
                "Skipping malformed Live frame ({} bytes): {}",
                frame.len(),
                e
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TURN_COMPLETE: &str = r#"{"serverContent":{"turnComplete":true}}"#;

    #[test]
    fn test_single_fragment_frame() {
        let mut assembler = FrameAssembler::new();
        assert_eq!(assembler.state(), AssemblerState::WaitingForFragment);
        assert!(assembler.frame().is_none());

        assert!(assembler.push(TURN_COMPLETE.as_bytes(), true));
        assert_eq!(assembler.state(), AssemblerState::FrameComplete);
        assert_eq!(assembler.frame(), Some(TURN_COMPLETE.as_bytes()));
    }

    #[test]
    fn test_three_fragments_make_one_frame() {
        let mut assembler = FrameAssembler::new();
        assert!(!assembler.push(br#"{"serverCon"#, false));
        assert_eq!(assembler.state(), AssemblerState::Accumulating);
        assert!(assembler.frame().is_none());
        assert!(!assembler.push(br#"tent":{"turnCom"#, false));
        assert!(assembler.push(br#"plete":true}}"#, true));

        let message = decode_server_message(assembler.frame().unwrap()).unwrap();
        assert!(message.is_turn_complete());
    }

    #[test]
    fn test_finish_keeps_capacity() {
        let mut assembler = FrameAssembler::with_capacity(16);
        assembler.push(&[b'x'; 1024], true);
        let grown = assembler.capacity();
        assert!(grown >= 1024);

        assembler.finish();
        assert_eq!(assembler.state(), AssemblerState::WaitingForFragment);
        assert_eq!(assembler.capacity(), grown);

        assembler.push(b"{}", true);
        assert_eq!(assembler.frame(), Some(&b"{}"[..]));
    }

    #[test]
    fn test_push_after_unfinished_frame_starts_fresh() {
        let mut assembler = FrameAssembler::new();
        assembler.push(b"first", true);
        assembler.push(b"second", true);
        assert_eq!(assembler.frame(), Some(&b"second"[..]));
    }

    #[test]
    fn test_decode_skips_empty_null_and_malformed() {
        assert!(decode_server_message(b"").is_none());
        assert!(decode_server_message(b"  \n").is_none());
        assert!(decode_server_message(b"null").is_none());
        assert!(decode_server_message(b"{not json").is_none());
        assert!(decode_server_message(b"42").is_none());
        assert!(decode_server_message(br#"{"setupComplete":{}}"#).is_some());
    }

    proptest! {
        #[test]
        fn prop_any_fragmentation_yields_same_message(
            text in "[a-zA-Z0-9 ]{0,64}",
            cuts in proptest::collection::vec(0usize..200, 0..8),
        ) {
            let frame = serde_json::json!({
                "serverContent": {"modelTurn": {"parts": [{"text": text}]}, "turnComplete": true}
            })
            .to_string();
            let bytes = frame.as_bytes();

            let mut points: Vec<usize> = cuts.into_iter().map(|c| c % (bytes.len() + 1)).collect();
            points.push(0);
            points.push(bytes.len());
            points.sort_unstable();
            points.dedup();

            let mut assembler = FrameAssembler::with_capacity(1);
            let segments: Vec<_> = points.windows(2).collect();
            for (i, window) in segments.iter().enumerate() {
                let complete = assembler.push(&bytes[window[0]..window[1]], i + 1 == segments.len());
                prop_assert_eq!(complete, i + 1 == segments.len());
            }

            let reassembled = decode_server_message(assembler.frame().unwrap()).unwrap();
            let whole = decode_server_message(bytes).unwrap();
            prop_assert_eq!(reassembled, whole);
        }
    }
}

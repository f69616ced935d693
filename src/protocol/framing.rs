//! Frame extractor for the delimiter-bounded serial protocol
//!
//! Accumulates raw serial bytes and extracts the payload between a
//! `<START>` and `<END>` marker pair. Payloads are not escaped, so a
//! payload that happens to contain the end marker is truncated early;
//! the host-side framing avoids emitting such sequences.

use crate::config::framing::{END_DELIMITER, SERIAL_BUFFER_SIZE, START_DELIMITER};
use crate::queue::Message;
use heapless::Vec;
use log::{debug, warn};

/// Accumulates incoming bytes and extracts complete delimited frames.
///
/// One extractor instance services one serial stream. No partial-frame
/// state survives a reset; a frame split across `feed` calls is
/// reconstructed purely by the accumulating buffer.
pub struct FrameExtractor {
    buffer: Vec<u8, SERIAL_BUFFER_SIZE>,
}

impl FrameExtractor {
    /// Create a new empty frame extractor.
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Push one byte into the accumulator.
    ///
    /// Returns `Some(message)` when the byte completes a well-formed
    /// frame. Overflow and malformed frames are consumed silently apart
    /// from a diagnostic; the stream resynchronises on the next start
    /// marker.
    pub fn feed(&mut self, byte: u8) -> Option<Message> {
        if self.buffer.push(byte).is_err() {
            warn!("serial buffer overflow, resynchronising");
            self.buffer.clear();
            return None;
        }

        if self.buffer.ends_with(END_DELIMITER) {
            let message = self.extract();
            // Frame boundary consumed either way
            self.buffer.clear();
            return message;
        }

        None
    }

    /// Copy the payload between the first start marker and the trailing
    /// end marker, if the region is non-empty.
    fn extract(&self) -> Option<Message> {
        let Some(start) = find_subsequence(&self.buffer, START_DELIMITER) else {
            debug!("frame without start marker, discarding {} bytes", self.buffer.len());
            return None;
        };

        let lo = start + START_DELIMITER.len();
        let hi = self.buffer.len() - END_DELIMITER.len();
        if lo >= hi {
            debug!("empty frame, discarding");
            return None;
        }

        let mut message = Message::new();
        if message.extend_from_slice(&self.buffer[lo..hi]).is_err() {
            warn!("frame payload of {} bytes exceeds message capacity, discarding", hi - lo);
            return None;
        }
        Some(message)
    }

    /// Discard any partially accumulated frame.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

impl Default for FrameExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// First occurrence of `needle` in `haystack` (memmem analog).
fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

//! Packet encode/decode and framed serial output
//!
//! The binary codec is postcard; this module only wraps its output in
//! the start/end markers and pushes complete frames into a serial sink.

use crate::config::framing::{END_DELIMITER, MAX_FRAME_SIZE, MAX_PACKET_SIZE, START_DELIMITER};
use crate::protocol::packet::Packet;
use embedded_io::Write;
use heapless::Vec;
use thiserror::Error;

/// Failure while producing or emitting an outbound frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("packet does not fit the outbound frame buffer")]
    Encode,
    #[error("serial write failed")]
    Io,
}

/// Decode a packet from an extracted frame payload.
pub fn decode_packet(bytes: &[u8]) -> Result<Packet, postcard::Error> {
    postcard::from_bytes(bytes)
}

/// Encode a packet into a complete delimited frame.
pub fn encode_frame(packet: &Packet) -> Result<Vec<u8, MAX_FRAME_SIZE>, WireError> {
    let mut body = [0u8; MAX_PACKET_SIZE];
    let body = postcard::to_slice(packet, &mut body).map_err(|_| WireError::Encode)?;

    let mut frame = Vec::new();
    frame
        .extend_from_slice(START_DELIMITER)
        .and_then(|_| frame.extend_from_slice(body))
        .and_then(|_| frame.extend_from_slice(END_DELIMITER))
        .map_err(|_| WireError::Encode)?;
    Ok(frame)
}

/// Encode a packet and write the framed bytes to a serial sink.
pub fn write_frame<W: Write>(sink: &mut W, packet: &Packet) -> Result<(), WireError> {
    let frame = encode_frame(packet)?;
    sink.write_all(&frame).map_err(|_| WireError::Io)
}

#[cfg(test)]
pub mod mock {
    //! Capture sink for asserting on emitted frames

    use super::*;
    use crate::config::framing::{END_DELIMITER, START_DELIMITER};

    /// Serial sink that records everything written to it.
    #[derive(Default)]
    pub struct CaptureSink {
        pub bytes: std::vec::Vec<u8>,
    }

    impl CaptureSink {
        pub fn new() -> Self {
            Self::default()
        }

        /// Decode every complete frame captured so far, in order.
        pub fn frames(&self) -> std::vec::Vec<Packet> {
            let mut packets = std::vec::Vec::new();
            let mut rest = self.bytes.as_slice();
            while let Some(start) = find(rest, START_DELIMITER) {
                let body_start = start + START_DELIMITER.len();
                let Some(end) = find(&rest[body_start..], END_DELIMITER) else {
                    break;
                };
                let body = &rest[body_start..body_start + end];
                packets.push(decode_packet(body).expect("captured frame should decode"));
                rest = &rest[body_start + end + END_DELIMITER.len()..];
            }
            packets
        }
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    impl embedded_io::ErrorType for CaptureSink {
        type Error = core::convert::Infallible;
    }

    impl embedded_io::Write for CaptureSink {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            self.bytes.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }
}

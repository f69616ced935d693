//! GPS seams: the sentence decoder and the byte stream feeding it
//!
//! Sentence parsing is owned by an external decoding library; the radio
//! controller only drains whatever bytes the GPS port currently has and
//! asks the decoder for the latest valid fix. Nothing here blocks
//! waiting for a fix.

use crate::protocol::packet::GpsFix;

/// Incremental GPS sentence decoder.
pub trait GpsDecoder {
    /// Feed one raw byte from the GPS stream.
    fn feed(&mut self, byte: u8);

    /// The most recent complete valid fix, if any has been decoded.
    fn fix(&self) -> Option<GpsFix>;
}

/// Non-blocking byte source for the GPS serial stream.
pub trait GpsPort {
    /// Next available byte, or `None` when the stream is currently empty.
    fn read_byte(&mut self) -> Option<u8>;
}

#[cfg(test)]
pub mod mock {
    //! Scriptable GPS decoder and port for unit tests

    use super::*;
    use std::collections::VecDeque;

    /// Port backed by a queue of bytes.
    #[derive(Default)]
    pub struct QueuedPort {
        bytes: VecDeque<u8>,
    }

    impl QueuedPort {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_bytes(&mut self, bytes: &[u8]) {
            self.bytes.extend(bytes.iter().copied());
        }

        pub fn is_drained(&self) -> bool {
            self.bytes.is_empty()
        }
    }

    impl GpsPort for QueuedPort {
        fn read_byte(&mut self) -> Option<u8> {
            self.bytes.pop_front()
        }
    }

    /// Decoder that reports a scripted fix and counts fed bytes.
    #[derive(Default)]
    pub struct ScriptedDecoder {
        pub fix: Option<GpsFix>,
        pub bytes_fed: usize,
    }

    impl ScriptedDecoder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_fix(fix: GpsFix) -> Self {
            Self {
                fix: Some(fix),
                bytes_fed: 0,
            }
        }
    }

    impl GpsDecoder for ScriptedDecoder {
        fn feed(&mut self, _byte: u8) {
            self.bytes_fed += 1;
        }

        fn fix(&self) -> Option<GpsFix> {
            self.fix
        }
    }
}

//! Compile-time configuration for the transceiver node

/// Serial frame protocol constants
pub mod framing {
    /// Marker preceding every framed packet on the serial link
    pub const START_DELIMITER: &[u8] = b"<START>";

    /// Marker terminating every framed packet on the serial link
    pub const END_DELIMITER: &[u8] = b"<END>";

    /// Capacity of the frame extractor's accumulation buffer.
    ///
    /// A frame that grows past this without a terminating end marker is
    /// discarded wholesale and the stream resynchronises on the next
    /// start marker.
    pub const SERIAL_BUFFER_SIZE: usize = 1024;

    /// Maximum extracted payload carried by one queued message
    pub const MAX_MESSAGE_SIZE: usize = 512;

    /// Maximum encoded packet size on the wire (outbound `Log` frames
    /// dominate: payload + RSSI series + fixed fields)
    pub const MAX_PACKET_SIZE: usize = 768;

    /// A full outbound frame: start marker + encoded packet + end marker
    pub const MAX_FRAME_SIZE: usize =
        START_DELIMITER.len() + MAX_PACKET_SIZE + END_DELIMITER.len();
}

/// Bounded message queue sizing
pub mod queue {
    /// Slots in the serial-to-application message queue
    pub const MESSAGE_QUEUE_DEPTH: usize = 20;
}

/// Radio constants
pub mod radio {
    /// Maximum LoRa payload accepted for transmit or receive
    pub const MAX_LORA_PAYLOAD: usize = 256;

    /// RSSI samples retained while listening; oldest evicted beyond this
    pub const RSSI_LOG_DEPTH: usize = 100;

    /// RSSI series bytes embedded in a telemetry frame (raw LE i32)
    pub const RSSI_LOG_BYTES: usize = RSSI_LOG_DEPTH * 4;

    /// Over-current protection limit applied during configuration, in mA
    pub const CURRENT_LIMIT_MA: u16 = 140;
}

/// Factory-default radio settings, used when no persisted record exists
pub mod radio_defaults {
    pub const FREQUENCY_MHZ: f32 = 915.0;
    pub const OUTPUT_POWER_DBM: i8 = 22;
    pub const BANDWIDTH_KHZ: f32 = 500.0;
    pub const SPREADING_FACTOR: u8 = 7;
    /// Coding rate 4/5
    pub const CODING_RATE: u8 = 5;
    pub const PREAMBLE_SYMBOLS: u16 = 8;
    pub const CRC_ENABLED: bool = true;
    pub const SYNC_WORD: u8 = 0xAB;
}

/// Bounds enforced by the settings validity predicate
pub mod limits {
    pub const FREQUENCY_MIN_MHZ: f32 = 400.0;
    pub const FREQUENCY_MAX_MHZ: f32 = 960.0;
    pub const POWER_MIN_DBM: i8 = -3;
    pub const POWER_MAX_DBM: i8 = 22;
    pub const SPREADING_FACTOR_MIN: u8 = 5;
    pub const SPREADING_FACTOR_MAX: u8 = 12;
}

/// Persisted state
pub mod storage {
    /// Well-known path of the binary-encoded settings record
    pub const SETTINGS_PATH: &str = "/settings.bin";

    /// Upper bound on the encoded settings record
    pub const SETTINGS_MAX_BYTES: usize = 64;
}

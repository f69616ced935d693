//! Packet model for the serial command/telemetry protocol
//!
//! A packet carries exactly one variant; the wire discriminant is the
//! enum tag, so an unknown or malformed discriminant is a decode failure
//! rather than a packet. Both sides must share this definition — the
//! postcard encoding is not self-describing, so field order and types
//! must match exactly.

use crate::config::radio::{MAX_LORA_PAYLOAD, RSSI_LOG_BYTES};
use heapless::Vec;
use serde::{Deserialize, Serialize};

/// Operating mode of the radio controller.
///
/// Exactly one mode is active at a time; transitions happen only through
/// an explicit state-change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RadioState {
    Standby,
    Transmitter,
    Receiver,
}

/// GPS fix embedded in telemetry.
///
/// All-zero fields mean no valid fix has been decoded yet.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GpsFix {
    pub latitude: f64,
    pub longitude: f64,
    pub satellites: u32,
}

/// Radio configuration record.
///
/// Persisted to durable storage and round-tripped over the serial link;
/// mutated only through the settings store's transactional apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Centre frequency in MHz
    pub frequency: f32,
    /// Output power in dBm
    pub power: i8,
    /// Bandwidth in kHz
    pub bandwidth: f32,
    /// Spreading factor (5-12)
    pub spreading_factor: u8,
    /// Coding rate denominator (5-8 for 4/5 to 4/8)
    pub coding_rate: u8,
    /// Preamble length in symbols
    pub preamble: u16,
    /// Hardware CRC on transmitted/received packets
    pub set_crc: bool,
    /// LoRa sync word
    pub sync_word: u8,
    /// Operating mode entered after initialisation
    pub default_state: RadioState,
}

impl Default for Settings {
    fn default() -> Self {
        use crate::config::radio_defaults;

        Self {
            frequency: radio_defaults::FREQUENCY_MHZ,
            power: radio_defaults::OUTPUT_POWER_DBM,
            bandwidth: radio_defaults::BANDWIDTH_KHZ,
            spreading_factor: radio_defaults::SPREADING_FACTOR,
            coding_rate: radio_defaults::CODING_RATE,
            preamble: radio_defaults::PREAMBLE_SYMBOLS,
            set_crc: radio_defaults::CRC_ENABLED,
            sync_word: radio_defaults::SYNC_WORD,
            default_state: RadioState::Transmitter,
        }
    }
}

/// Payload to transmit over the radio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transmission {
    pub payload: Vec<u8, MAX_LORA_PAYLOAD>,
}

/// Host control request; each set flag is honoured independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Read back the active settings
    pub settings: bool,
    /// Target operating mode; acted on only when it differs from the
    /// current mode
    pub state_change: RadioState,
    /// Report the current GPS fix
    pub gps: bool,
}

/// Telemetry report emitted after a transmit attempt or a completed
/// reception.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Log {
    /// Received packet bytes; empty on the transmit path
    pub payload: Vec<u8, MAX_LORA_PAYLOAD>,
    /// RSSI samples collected while listening, as raw little-endian i32
    /// values; empty on the transmit path
    pub rssi_log: Vec<u8, RSSI_LOG_BYTES>,
    /// Packet-averaged RSSI in dBm
    pub rssi_avg: f32,
    /// Signal-to-noise ratio in dB
    pub snr: f32,
    /// Hardware reported a CRC mismatch for this packet
    pub crc_error: bool,
    /// Any other hardware failure during the operation
    pub general_error: bool,
    pub gps: GpsFix,
}

/// One command or telemetry unit on the serial link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Packet {
    Settings(Settings),
    Transmission(Transmission),
    Request(Request),
    Log(Log),
    Gps(GpsFix),
}

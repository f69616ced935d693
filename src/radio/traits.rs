//! Radio driver trait for abstraction and testability
//!
//! Mirrors the external transceiver driver library: per-parameter
//! configuration setters with specific invalid-parameter errors,
//! asynchronous transmit/receive start, packet readout with status, and
//! completion-flag registration. The register-level SPI protocol lives
//! behind this trait, not in this crate.

use crate::radio::flags::IrqFlag;
use thiserror::Error;

/// Driver-level operation failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RadioError {
    #[error("radio failed to initialise")]
    Init,
    #[error("failed to enter standby")]
    Standby,
    #[error("failed to start transmission")]
    Transmit,
    #[error("failed to start listening")]
    Receive,
}

/// Configuration parameter rejected by the hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("selected frequency is invalid for this module")]
    Frequency,
    #[error("selected output power is invalid for this module")]
    OutputPower,
    #[error("selected bandwidth is invalid for this module")]
    Bandwidth,
    #[error("selected spreading factor is invalid for this module")]
    SpreadingFactor,
    #[error("selected coding rate is invalid for this module")]
    CodingRate,
    #[error("selected preamble length is invalid for this module")]
    PreambleLength,
    #[error("selected CRC mode is invalid for this module")]
    CrcMode,
    #[error("unable to set sync word")]
    SyncWord,
    #[error("selected current limit is invalid for this module")]
    CurrentLimit,
}

/// Packet readout status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RxError {
    #[error("CRC mismatch on received packet")]
    CrcMismatch,
    #[error("packet readout failed")]
    Failed,
}

/// Abstract transceiver driver.
///
/// `start_transmit` and `start_receive` return once the hardware
/// operation is started; completion is signalled through the registered
/// interrupt flags.
pub trait RadioDriver {
    fn begin(&mut self) -> Result<(), RadioError>;

    /// Register the flag raised by the packet-sent interrupt.
    fn set_packet_sent_flag(&mut self, flag: &'static IrqFlag);

    /// Register the flag raised by the packet-received interrupt.
    fn set_packet_received_flag(&mut self, flag: &'static IrqFlag);

    fn set_frequency(&mut self, mhz: f32) -> Result<(), ParamError>;
    fn set_output_power(&mut self, dbm: i8) -> Result<(), ParamError>;
    fn set_bandwidth(&mut self, khz: f32) -> Result<(), ParamError>;
    fn set_spreading_factor(&mut self, sf: u8) -> Result<(), ParamError>;
    fn set_coding_rate(&mut self, cr: u8) -> Result<(), ParamError>;
    fn set_preamble_length(&mut self, symbols: u16) -> Result<(), ParamError>;
    fn set_crc(&mut self, enabled: bool) -> Result<(), ParamError>;
    fn set_sync_word(&mut self, word: u8) -> Result<(), ParamError>;
    fn set_current_limit(&mut self, ma: u16) -> Result<(), ParamError>;

    fn standby(&mut self) -> Result<(), RadioError>;
    fn start_transmit(&mut self, data: &[u8]) -> Result<(), RadioError>;
    fn start_receive(&mut self) -> Result<(), RadioError>;

    /// Whether the pending receive interrupt marks a complete packet
    /// (as opposed to a header-detected-only interrupt).
    fn rx_done(&mut self) -> bool;

    /// Length of the packet awaiting readout.
    fn packet_length(&mut self) -> usize;

    /// Read the received packet into `buf` (sized via `packet_length`).
    fn read_data(&mut self, buf: &mut [u8]) -> Result<(), RxError>;

    /// Packet-averaged RSSI in dBm.
    fn rssi(&mut self) -> f32;

    /// SNR of the last packet in dB.
    fn snr(&mut self) -> f32;

    /// Instantaneous channel RSSI in dBm, valid while listening.
    fn rssi_instant(&mut self) -> i32;
}

//! Radio controller: operating-mode state machine, completion-flag
//! protocol, receive polling with bounded RSSI sampling, and telemetry
//! emission.

use crate::config::radio::{CURRENT_LIMIT_MA, MAX_LORA_PAYLOAD, RSSI_LOG_BYTES, RSSI_LOG_DEPTH};
use crate::gps::{GpsDecoder, GpsPort};
use crate::protocol::packet::{GpsFix, Log, Packet, RadioState, Settings};
use crate::protocol::wire;
use crate::radio::flags::IrqFlags;
use crate::radio::traits::{ParamError, RadioDriver, RadioError, RxError};
use embedded_io::Write;
use heapless::{Deque, Vec};
use log::{error, info};

/// Owns the transceiver driver, the GPS seams, and the controller's
/// mutable state. All mutation happens on the control loop; interrupt
/// context only raises the flags.
pub struct RadioController<R, G, P>
where
    R: RadioDriver,
    G: GpsDecoder,
    P: GpsPort,
{
    driver: R,
    gps: G,
    gps_port: P,
    flags: &'static IrqFlags,
    state: RadioState,
    rssi_samples: Deque<i32, RSSI_LOG_DEPTH>,
}

impl<R, G, P> RadioController<R, G, P>
where
    R: RadioDriver,
    G: GpsDecoder,
    P: GpsPort,
{
    pub fn new(driver: R, gps: G, gps_port: P, flags: &'static IrqFlags) -> Self {
        Self {
            driver,
            gps,
            gps_port,
            flags,
            state: RadioState::Standby,
            rssi_samples: Deque::new(),
        }
    }

    /// Bring up the hardware, register both completion handlers, and
    /// apply the initial configuration.
    pub fn initialize(&mut self, settings: &Settings) -> Result<(), RadioError> {
        self.driver.begin()?;
        self.driver.set_packet_sent_flag(&self.flags.transmitted);
        self.driver.set_packet_received_flag(&self.flags.received);
        self.configure(settings).map_err(|e| {
            error!("initial radio configuration failed: {}", e);
            RadioError::Init
        })?;

        // No transmit is in flight at boot, so the gate starts open
        self.flags.transmitted.raise();
        Ok(())
    }

    pub fn state(&self) -> RadioState {
        self.state
    }

    /// Push the full configuration to the hardware, in fixed order.
    ///
    /// The first rejected parameter aborts the sequence, except coding
    /// rate and preamble length which are reported and skipped.
    pub fn configure(&mut self, settings: &Settings) -> Result<(), ParamError> {
        self.driver.set_frequency(settings.frequency)?;
        self.driver.set_output_power(settings.power)?;
        self.driver.set_bandwidth(settings.bandwidth)?;
        self.driver.set_spreading_factor(settings.spreading_factor)?;
        if let Err(e) = self.driver.set_coding_rate(settings.coding_rate) {
            error!("{}", e);
        }
        if let Err(e) = self.driver.set_preamble_length(settings.preamble) {
            error!("{}", e);
        }
        self.driver.set_crc(settings.set_crc)?;
        self.driver.set_sync_word(settings.sync_word)?;
        self.driver.set_current_limit(CURRENT_LIMIT_MA)?;
        Ok(())
    }

    /// Transition to `target`, forcing the hardware through standby.
    ///
    /// Entering `Receiver` re-registers the receive handler, clears the
    /// RSSI series, and restarts listening; entering `Transmitter`
    /// re-registers the transmit handler. A no-op when already in
    /// `target`.
    pub fn set_state(&mut self, target: RadioState) -> Result<(), RadioError> {
        if target == self.state {
            return Ok(());
        }

        self.driver.standby()?;
        match target {
            RadioState::Receiver => {
                self.driver.set_packet_received_flag(&self.flags.received);
                self.rssi_samples.clear();
                self.driver.start_receive()?;
            }
            RadioState::Transmitter => {
                self.driver.set_packet_sent_flag(&self.flags.transmitted);
            }
            RadioState::Standby => {}
        }

        info!("radio entering {:?} mode", target);
        self.state = target;
        Ok(())
    }

    /// Start an asynchronous transmit, gated on the previous one having
    /// completed.
    ///
    /// While a transmit is in flight the call is a silent no-op
    /// (deliberate backpressure, not an error). When the gate is open a
    /// telemetry frame reporting the outcome is emitted unconditionally.
    pub fn transmit<W: Write>(&mut self, payload: &[u8], sink: &mut W) {
        if !self.flags.transmitted.take() {
            return;
        }

        let result = self.driver.start_transmit(payload);
        if let Err(e) = &result {
            error!("transmit start failed: {}", e);
        }

        let log = Log {
            payload: Vec::new(),
            rssi_log: Vec::new(),
            rssi_avg: self.driver.rssi(),
            snr: 0.0,
            crc_error: false,
            general_error: result.is_err(),
            gps: self.attach_gps(),
        };
        self.emit(sink, &Packet::Log(log));
    }

    /// One bounded unit of receive servicing; call every loop tick while
    /// in `Receiver` mode.
    ///
    /// Packet complete: read it out, emit telemetry with the drained
    /// RSSI series, restart listening. Header detected but packet still
    /// on the air: do nothing this tick. No interrupt pending: append
    /// one instantaneous RSSI sample.
    pub fn service_receive<W: Write>(&mut self, sink: &mut W) {
        if self.flags.received.take() {
            if !self.driver.rx_done() {
                return;
            }

            let log = self.build_reception_log();
            self.emit(sink, &Packet::Log(log));

            if let Err(e) = self.driver.start_receive() {
                error!("failed to restart listening: {}", e);
            }
        } else {
            self.push_rssi_sample();
        }
    }

    /// Drain whatever the GPS stream currently holds and report the
    /// latest valid fix, or a zeroed fix when none has been decoded.
    /// Never blocks waiting for a fix.
    pub fn attach_gps(&mut self) -> GpsFix {
        while let Some(byte) = self.gps_port.read_byte() {
            self.gps.feed(byte);
        }
        self.gps.fix().unwrap_or_default()
    }

    /// Emit a GPS-only telemetry frame.
    pub fn report_gps<W: Write>(&mut self, sink: &mut W) {
        let fix = self.attach_gps();
        self.emit(sink, &Packet::Gps(fix));
    }

    fn build_reception_log(&mut self) -> Log {
        let len = self.driver.packet_length().min(MAX_LORA_PAYLOAD);
        let mut payload: Vec<u8, MAX_LORA_PAYLOAD> = Vec::new();
        // Length checked against capacity above
        let _ = payload.resize_default(len);

        let status = self.driver.read_data(&mut payload);
        let (crc_error, general_error) = match status {
            Ok(()) => (false, false),
            Err(RxError::CrcMismatch) => (true, false),
            Err(_) => (false, true),
        };

        Log {
            payload,
            rssi_log: self.drain_rssi_log(),
            rssi_avg: self.driver.rssi(),
            snr: self.driver.snr(),
            crc_error,
            general_error,
            gps: self.attach_gps(),
        }
    }

    /// Serialize and clear the sample series, oldest first, as raw
    /// little-endian i32 values.
    fn drain_rssi_log(&mut self) -> Vec<u8, RSSI_LOG_BYTES> {
        let mut bytes = Vec::new();
        while let Some(sample) = self.rssi_samples.pop_front() {
            let _ = bytes.extend_from_slice(&sample.to_le_bytes());
        }
        bytes
    }

    fn push_rssi_sample(&mut self) {
        let sample = self.driver.rssi_instant();
        if self.rssi_samples.is_full() {
            self.rssi_samples.pop_front();
        }
        let _ = self.rssi_samples.push_back(sample);
    }

    fn emit<W: Write>(&mut self, sink: &mut W, packet: &Packet) {
        if let Err(e) = wire::write_frame(sink, packet) {
            error!("telemetry emit failed: {}", e);
        }
    }

    #[cfg(test)]
    pub(crate) fn driver(&self) -> &R {
        &self.driver
    }

    #[cfg(test)]
    pub(crate) fn driver_mut(&mut self) -> &mut R {
        &mut self.driver
    }

    #[cfg(test)]
    pub(crate) fn rssi_sample_count(&self) -> usize {
        self.rssi_samples.len()
    }
}

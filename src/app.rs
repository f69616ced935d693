//! Application controller: ties the message queue, settings store and
//! radio controller together into the per-tick control loop.

use crate::gps::{GpsDecoder, GpsPort};
use crate::protocol::packet::{Packet, RadioState};
use crate::protocol::wire;
use crate::queue::MessageReceiver;
use crate::radio::traits::{RadioDriver, RadioError};
use crate::radio::RadioController;
use crate::settings::{SettingsStore, StoreError};
use crate::storage::Storage;
use embedded_io::Write;
use log::{debug, error, warn};
use thiserror::Error;

/// Startup failures. Either one leaves the node unable to operate.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum AppError {
    #[error("settings: {0}")]
    Settings(#[from] StoreError),
    #[error("radio: {0}")]
    Radio(#[from] RadioError),
}

/// The control-loop owner. Consumes messages from the ingestion queue,
/// dispatches decoded envelopes, and services the radio each tick.
pub struct AppController<'a, S, R, G, P>
where
    S: Storage,
    R: RadioDriver,
    G: GpsDecoder,
    P: GpsPort,
{
    receiver: MessageReceiver<'a>,
    settings: SettingsStore<S>,
    radio: RadioController<R, G, P>,
}

impl<'a, S, R, G, P> AppController<'a, S, R, G, P>
where
    S: Storage,
    R: RadioDriver,
    G: GpsDecoder,
    P: GpsPort,
{
    pub fn new(
        receiver: MessageReceiver<'a>,
        settings: SettingsStore<S>,
        radio: RadioController<R, G, P>,
    ) -> Self {
        Self {
            receiver,
            settings,
            radio,
        }
    }

    /// Bring the node up: load persisted settings, initialise the radio
    /// with them, and enter the persisted default operating mode.
    pub fn init(&mut self) -> Result<(), AppError> {
        self.settings.initialize()?;
        let active = self.settings.active().clone();
        self.radio.initialize(&active)?;
        self.radio.set_state(active.default_state)?;
        Ok(())
    }

    /// One loop iteration: handle at most one queued message, then do
    /// the state-dependent per-tick radio servicing.
    pub fn tick<W: Write>(&mut self, sink: &mut W) {
        if let Ok(message) = self.receiver.try_receive() {
            match wire::decode_packet(&message) {
                Ok(packet) => self.dispatch(packet, sink),
                Err(_) => warn!("discarding {} byte frame that failed to decode", message.len()),
            }
            // message dropped here, releasing its buffer
        }

        if self.radio.state() == RadioState::Receiver {
            self.radio.service_receive(sink);
        }
    }

    fn dispatch<W: Write>(&mut self, packet: Packet, sink: &mut W) {
        match packet {
            Packet::Settings(new) => {
                if self.settings.apply(new, &mut self.radio).is_ok() {
                    // Acknowledge by echoing the now-active settings
                    let report = self.settings.report();
                    self.emit(sink, &report);
                }
            }
            Packet::Transmission(tx) => {
                if self.radio.state() == RadioState::Transmitter {
                    self.radio.transmit(&tx.payload, sink);
                } else {
                    debug!("transmission ignored outside transmitter mode");
                }
            }
            Packet::Request(request) => {
                if request.settings {
                    let report = self.settings.report();
                    self.emit(sink, &report);
                }
                if request.state_change != self.radio.state() {
                    if let Err(e) = self.radio.set_state(request.state_change) {
                        error!("state change failed: {}", e);
                    }
                }
                if request.gps {
                    self.radio.report_gps(sink);
                }
            }
            Packet::Log(_) | Packet::Gps(_) => {
                debug!("ignoring inbound telemetry envelope");
            }
        }
    }

    fn emit<W: Write>(&mut self, sink: &mut W, packet: &Packet) {
        if let Err(e) = wire::write_frame(sink, packet) {
            error!("report emit failed: {}", e);
        }
    }

    #[cfg(test)]
    pub(crate) fn radio(&self) -> &RadioController<R, G, P> {
        &self.radio
    }

    #[cfg(test)]
    pub(crate) fn settings(&self) -> &SettingsStore<S> {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::framing::MAX_MESSAGE_SIZE;
    use crate::gps::mock::{QueuedPort, ScriptedDecoder};
    use crate::protocol::packet::{GpsFix, Request, Settings, Transmission};
    use crate::protocol::wire::mock::CaptureSink;
    use crate::queue::{Message, MessageQueue};
    use crate::radio::flags::IrqFlags;
    use crate::radio::traits::mock::MockRadio;
    use crate::storage::mock::MemStorage;

    type TestApp<'a> =
        AppController<'a, MemStorage, MockRadio, ScriptedDecoder, QueuedPort>;

    fn app(queue: &MessageQueue) -> TestApp<'_> {
        let flags: &'static IrqFlags = Box::leak(Box::new(IrqFlags::new()));
        let radio = RadioController::new(
            MockRadio::new(),
            ScriptedDecoder::new(),
            QueuedPort::new(),
            flags,
        );
        let mut app = AppController::new(
            queue.receiver(),
            SettingsStore::new(MemStorage::new()),
            radio,
        );
        app.init().unwrap();
        app
    }

    fn enqueue(queue: &MessageQueue, packet: &Packet) {
        let mut buf = [0u8; MAX_MESSAGE_SIZE];
        let bytes = postcard::to_slice(packet, &mut buf).unwrap();
        enqueue_raw(queue, bytes);
    }

    fn enqueue_raw(queue: &MessageQueue, bytes: &[u8]) {
        let mut message = Message::new();
        message.extend_from_slice(bytes).unwrap();
        queue.sender().try_send(message).unwrap();
    }

    fn transmission(bytes: &[u8]) -> Packet {
        let mut payload = heapless::Vec::new();
        payload.extend_from_slice(bytes).unwrap();
        Packet::Transmission(Transmission { payload })
    }

    fn request(settings: bool, state_change: RadioState, gps: bool) -> Packet {
        Packet::Request(Request {
            settings,
            state_change,
            gps,
        })
    }

    #[test]
    fn init_enters_persisted_default_mode() {
        let queue = MessageQueue::new();
        let app = app(&queue);

        // Factory default operating mode
        assert_eq!(app.radio().state(), RadioState::Transmitter);
        assert!(app.radio().driver().sent_flag.is_some());
        assert!(app.radio().driver().received_flag.is_some());
    }

    #[test]
    fn settings_envelope_applies_and_acknowledges() {
        let queue = MessageQueue::new();
        let mut app = app(&queue);
        let mut sink = CaptureSink::new();

        let mut new = Settings::default();
        new.frequency = 868.0;
        new.power = 10;
        enqueue(&queue, &Packet::Settings(new.clone()));

        app.tick(&mut sink);

        assert_eq!(app.settings().active(), &new);
        assert_eq!(sink.frames(), vec![Packet::Settings(new)]);
    }

    #[test]
    fn rejected_settings_are_not_acknowledged() {
        let queue = MessageQueue::new();
        let mut app = app(&queue);
        let mut sink = CaptureSink::new();

        let mut bad = Settings::default();
        bad.frequency = 1200.0;
        enqueue(&queue, &Packet::Settings(bad));

        app.tick(&mut sink);

        assert_eq!(app.settings().active(), &Settings::default());
        assert!(sink.frames().is_empty());
    }

    #[test]
    fn transmission_forwarded_in_transmitter_mode() {
        let queue = MessageQueue::new();
        let mut app = app(&queue);
        let mut sink = CaptureSink::new();

        enqueue(&queue, &transmission(b"over the air"));
        app.tick(&mut sink);

        assert_eq!(app.radio().driver().transmits, vec![b"over the air".to_vec()]);
        // Outcome telemetry accompanies the transmit
        assert!(matches!(sink.frames().as_slice(), [Packet::Log(_)]));
    }

    #[test]
    fn transmission_dropped_outside_transmitter_mode() {
        let queue = MessageQueue::new();
        let mut app = app(&queue);
        let mut sink = CaptureSink::new();

        enqueue(&queue, &request(false, RadioState::Standby, false));
        app.tick(&mut sink);
        assert_eq!(app.radio().state(), RadioState::Standby);

        enqueue(&queue, &transmission(b"nope"));
        app.tick(&mut sink);

        assert!(app.radio().driver().transmits.is_empty());
        assert!(sink.frames().is_empty());
    }

    #[test]
    fn request_flags_honored_independently() {
        let queue = MessageQueue::new();
        let mut app = app(&queue);
        let mut sink = CaptureSink::new();

        // All three at once: report settings, switch mode, report GPS
        enqueue(&queue, &request(true, RadioState::Receiver, true));
        app.tick(&mut sink);

        assert_eq!(app.radio().state(), RadioState::Receiver);
        assert_eq!(app.radio().driver().receive_starts, 1);
        assert_eq!(
            sink.frames(),
            vec![
                Packet::Settings(Settings::default()),
                Packet::Gps(GpsFix::default()),
            ]
        );
    }

    #[test]
    fn matching_state_request_is_a_no_op_transition() {
        let queue = MessageQueue::new();
        let mut app = app(&queue);
        let mut sink = CaptureSink::new();

        enqueue(&queue, &request(false, RadioState::Transmitter, false));
        app.tick(&mut sink);

        assert_eq!(app.radio().state(), RadioState::Transmitter);
        // Only the startup transition forced standby; the request did not
        assert_eq!(app.radio().driver().standbys, 1);
        assert!(sink.frames().is_empty());
    }

    #[test]
    fn undecodable_message_is_discarded() {
        let queue = MessageQueue::new();
        let mut app = app(&queue);
        let mut sink = CaptureSink::new();

        enqueue_raw(&queue, &[0x09, 0xFF, 0xFF]);
        app.tick(&mut sink);
        assert!(sink.frames().is_empty());

        // The loop keeps going afterwards
        enqueue(&queue, &request(true, RadioState::Transmitter, false));
        app.tick(&mut sink);
        assert_eq!(sink.frames(), vec![Packet::Settings(Settings::default())]);
    }

    #[test]
    fn inbound_telemetry_envelopes_ignored() {
        let queue = MessageQueue::new();
        let mut app = app(&queue);
        let mut sink = CaptureSink::new();

        enqueue(&queue, &Packet::Gps(GpsFix::default()));
        app.tick(&mut sink);

        assert!(sink.frames().is_empty());
        assert!(app.radio().driver().transmits.is_empty());
    }

    #[test]
    fn receiver_mode_is_serviced_every_tick() {
        let queue = MessageQueue::new();
        let mut app = app(&queue);
        let mut sink = CaptureSink::new();

        // Tick one switches mode and already services the listener once
        enqueue(&queue, &request(false, RadioState::Receiver, false));
        app.tick(&mut sink);

        // Idle ticks while listening each take one RSSI sample
        app.tick(&mut sink);
        app.tick(&mut sink);
        app.tick(&mut sink);
        assert_eq!(app.radio().rssi_sample_count(), 4);
    }
}

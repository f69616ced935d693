//! Settings store: validation, persistence, and transactional apply
//!
//! The active record is the single process-wide configuration. It is
//! mutated only through `apply`, which validates, installs, pushes the
//! configuration to hardware, and either persists the new record or
//! rolls back to the snapshot.

use crate::config::limits;
use crate::config::storage::{SETTINGS_MAX_BYTES, SETTINGS_PATH};
use crate::gps::{GpsDecoder, GpsPort};
use crate::protocol::packet::{Packet, Settings};
use crate::radio::traits::{ParamError, RadioDriver};
use crate::radio::RadioController;
use crate::storage::{Storage, StorageError};
use log::{error, info, warn};
use thiserror::Error;

/// Settings value rejected by the validity predicate
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SettingsError {
    #[error("frequency {0} MHz outside supported range")]
    Frequency(f32),
    #[error("output power {0} dBm outside supported range")]
    Power(i8),
    #[error("spreading factor {0} outside supported range")]
    SpreadingFactor(u8),
}

/// Store operation failures
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum StoreError {
    #[error("storage: {0}")]
    Storage(#[from] StorageError),
    #[error("persisted settings failed to decode")]
    Decode,
    #[error("settings record failed to encode")]
    Encode,
    #[error("invalid settings: {0}")]
    Invalid(#[from] SettingsError),
    #[error("hardware rejected configuration: {0}")]
    Configure(#[from] ParamError),
}

/// Check a settings record against the hardware's accepted ranges.
///
/// Deliberately not exhaustive: bandwidth, coding rate, preamble and
/// sync word are taken as given and left to the hardware to reject.
pub fn validate(settings: &Settings) -> Result<(), SettingsError> {
    if !(limits::FREQUENCY_MIN_MHZ..=limits::FREQUENCY_MAX_MHZ).contains(&settings.frequency) {
        return Err(SettingsError::Frequency(settings.frequency));
    }
    if !(limits::POWER_MIN_DBM..=limits::POWER_MAX_DBM).contains(&settings.power) {
        return Err(SettingsError::Power(settings.power));
    }
    if !(limits::SPREADING_FACTOR_MIN..=limits::SPREADING_FACTOR_MAX)
        .contains(&settings.spreading_factor)
    {
        return Err(SettingsError::SpreadingFactor(settings.spreading_factor));
    }
    Ok(())
}

/// Durable store for the active radio configuration.
pub struct SettingsStore<S: Storage> {
    storage: S,
    active: Settings,
}

impl<S: Storage> SettingsStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            active: Settings::default(),
        }
    }

    /// The active configuration.
    pub fn active(&self) -> &Settings {
        &self.active
    }

    /// Mount storage, create the record with defaults if absent, load
    /// it, and validate it. Any failure here is fatal for startup.
    pub fn initialize(&mut self) -> Result<(), StoreError> {
        self.storage.mount()?;

        if !self.storage.exists(SETTINGS_PATH)? {
            info!("no persisted settings, writing defaults");
            self.active = Settings::default();
            self.save()?;
        }

        self.active = self.load()?;
        validate(&self.active)?;
        info!("loaded settings: {:?}", self.active);
        Ok(())
    }

    /// Transactionally install `new` as the active configuration.
    ///
    /// Validates first, then configures the hardware; on a hardware
    /// rejection the snapshot is restored and re-applied best-effort.
    /// On success the record is persisted; a persist failure keeps the
    /// new record active (hardware is already updated) and is surfaced
    /// to the caller.
    pub fn apply<R, G, P>(
        &mut self,
        new: Settings,
        radio: &mut RadioController<R, G, P>,
    ) -> Result<(), StoreError>
    where
        R: RadioDriver,
        G: GpsDecoder,
        P: GpsPort,
    {
        validate(&new)?;

        let previous = self.active.clone();
        self.active = new;

        if let Err(e) = radio.configure(&self.active) {
            error!("failed to apply settings ({}), reverting", e);
            self.active = previous;
            if radio.configure(&self.active).is_err() {
                error!("rollback configuration also failed");
            }
            return Err(e.into());
        }

        if let Err(e) = self.save() {
            warn!("settings applied to hardware but not persisted: {}", e);
            return Err(e);
        }

        info!("updated settings: {:?}", self.active);
        Ok(())
    }

    /// Settings packet for read-back over the serial link. No mutation.
    pub fn report(&self) -> Packet {
        Packet::Settings(self.active.clone())
    }

    fn load(&mut self) -> Result<Settings, StoreError> {
        let mut buf = [0u8; SETTINGS_MAX_BYTES];
        let len = self.storage.read(SETTINGS_PATH, &mut buf)?;
        postcard::from_bytes(&buf[..len]).map_err(|_| StoreError::Decode)
    }

    fn save(&mut self) -> Result<(), StoreError> {
        let mut buf = [0u8; SETTINGS_MAX_BYTES];
        let bytes = postcard::to_slice(&self.active, &mut buf).map_err(|_| StoreError::Encode)?;
        self.storage.write(SETTINGS_PATH, bytes)?;
        Ok(())
    }
}

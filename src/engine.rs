//! Contract for the register-level flash command engine.
//!
//! Every method is synchronous and may only be called while interrupts are
//! masked. The methods that take a descriptor additionally require the decode
//! path to be suspended (see [`XipGuard`](crate::XipGuard)), except the decode
//! state save/restore pair, which performs its own suspension.

use crate::descriptor::FlashDescriptor;
use crate::detect::{self, Identification, JedecId};
use crate::types::{Error, IoMode};

/// Inline encryption mode captured when the decode path is suspended.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncryptionState {
    enabled: bool,
}

impl EncryptionState {
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub const fn enabled(self) -> bool {
        self.enabled
    }
}

/// Memory-mapped read configuration of the decode path.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecodeConfig {
    pub io_mode: IoMode,
    pub continuous_read: bool,
    /// Flash offset mapped at the start of the XIP window.
    pub image_offset: u32,
    pub read_len: u32,
}

/// Token produced by [`FlashEngine::save_decode_state`].
///
/// Only the engine that produced it interprets its contents.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecodeSnapshot {
    pub config: DecodeConfig,
}

impl DecodeSnapshot {
    pub const fn new(config: DecodeConfig) -> Self {
        Self { config }
    }
}

pub trait FlashEngine {
    fn read_jedec_id(&mut self) -> Result<JedecId, Error>;

    /// Identifies the attached part.
    ///
    /// The default reads the JEDEC id and looks it up in the built-in part
    /// table; engines with their own identification tables override it.
    fn identify(&mut self) -> Identification {
        match self.read_jedec_id() {
            Ok(jedec) => detect::identify_jedec(jedec),
            Err(_) => Identification::invalid(JedecId::from_raw(0)),
        }
    }

    /// Captures the encryption mode and stops memory-mapped decoding so raw
    /// commands can be issued.
    fn suspend_decode(&mut self) -> EncryptionState;

    /// Re-enables memory-mapped decoding with the mode returned by the
    /// matching [`suspend_decode`](Self::suspend_decode).
    fn resume_decode(&mut self, state: EncryptionState);

    fn raw_read(
        &mut self,
        descriptor: &FlashDescriptor,
        addr: u32,
        out: &mut [u8],
    ) -> Result<(), Error>;

    fn raw_write(&mut self, descriptor: &FlashDescriptor, addr: u32, data: &[u8])
        -> Result<(), Error>;

    /// Erases every sector touching `start..=end`.
    fn raw_erase(&mut self, descriptor: &FlashDescriptor, start: u32, end: u32)
        -> Result<(), Error>;

    fn read_rcv_register(&mut self, descriptor: &FlashDescriptor, cmd: u8) -> Result<u8, Error>;

    /// Writes `value` with `cmd`, including write-enable and the busy wait.
    fn write_rcv_register(
        &mut self,
        descriptor: &FlashDescriptor,
        cmd: u8,
        value: u8,
    ) -> Result<(), Error>;

    /// Leaves XIP mode and snapshots the decode configuration.
    ///
    /// Returns [`Error::StateSaveUnsupported`] when the current mode cannot be
    /// captured.
    fn save_decode_state(&mut self, descriptor: &FlashDescriptor) -> Result<DecodeSnapshot, Error>;

    fn restore_decode_state(&mut self, descriptor: &FlashDescriptor, snapshot: DecodeSnapshot);

    fn force_decode_config(&mut self, descriptor: &FlashDescriptor, config: DecodeConfig);
}

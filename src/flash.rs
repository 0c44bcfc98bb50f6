use core::cmp::min;

use embedded_storage::nor_flash::{
    check_erase, check_read, check_write, ErrorType, NorFlash, ReadNorFlash,
};

use crate::config::XipConfig;
use crate::descriptor::{FlashDescriptor, SECTOR_SIZE_BYTES};
use crate::engine::{EncryptionState, FlashEngine};
use crate::guard::XipGuard;
use crate::irq::{InterruptControl, IrqSection};
use crate::rcv::{self, RcvBit};
use crate::types::Error;

/// RAM staging size for writes whose source lives in the XIP window.
pub const BOUNCE_CHUNK_BYTES: usize = 256;

/// Inclusive end address of an erase of `len` bytes at `addr`.
///
/// Wraps like the command engine's 32-bit address arithmetic, so a zero
/// length yields the byte just below `addr`.
#[inline(always)]
pub const fn erase_end_address(addr: u32, len: u32) -> u32 {
    addr.wrapping_add(len).wrapping_sub(1)
}

/// Locked access to a flash part the firmware may be executing from.
///
/// Owns the command engine and the interrupt strategy, and caches the part
/// descriptor. Every bus operation runs with interrupts masked and the decode
/// path suspended.
pub struct XipFlash<E: FlashEngine, I: InterruptControl> {
    engine: E,
    irq: I,
    config: XipConfig,
    descriptor: Option<FlashDescriptor>,
    encryption: EncryptionState,
}

impl<E: FlashEngine, I: InterruptControl> XipFlash<E, I> {
    pub fn new(engine: E, irq: I) -> Self {
        Self::with_config(engine, irq, XipConfig::default())
    }

    pub fn with_config(engine: E, irq: I, config: XipConfig) -> Self {
        Self {
            engine,
            irq,
            config,
            descriptor: None,
            encryption: EncryptionState::default(),
        }
    }

    /// Caches the flash descriptor.
    ///
    /// A supplied descriptor is adopted as is. Without one, the part is
    /// identified through the engine; an unrecognised part leaves the store
    /// empty and returns [`Error::IdentifyFailed`]. If the locked section
    /// can't be opened, identification doesn't run and the store is kept.
    pub fn initialize(&mut self, descriptor: Option<FlashDescriptor>) -> Result<(), Error> {
        if let Some(descriptor) = descriptor {
            debug!("adopting flash descriptor {}", descriptor.name);
            self.descriptor = Some(descriptor);
            return Ok(());
        }

        let id = self.locked(|engine| Ok(engine.identify()))?;
        if !id.valid {
            self.descriptor = None;
            error!(
                "flash identify failed, jedec id {:#x}",
                id.descriptor.jedec.as_raw()
            );
            return Err(Error::IdentifyFailed);
        }

        info!(
            "identified flash {} ({} bytes)",
            id.descriptor.name,
            id.descriptor.capacity()
        );
        self.descriptor = Some(id.descriptor);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.descriptor.is_some()
    }

    pub fn descriptor(&self) -> Result<&FlashDescriptor, Error> {
        self.descriptor.as_ref().ok_or(Error::NotInitialized)
    }

    /// Encryption mode captured by the most recent locked section.
    pub fn encryption_state(&self) -> EncryptionState {
        self.encryption
    }

    pub fn config(&self) -> &XipConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn release(self) -> (E, I) {
        (self.engine, self.irq)
    }

    pub fn read(&mut self, addr: u32, out: &mut [u8]) -> Result<(), Error> {
        let descriptor = *self.descriptor()?;
        if out.is_empty() {
            return Ok(());
        }
        self.locked(|engine| engine.raw_read(&descriptor, addr, out))
    }

    pub fn write(&mut self, addr: u32, data: &[u8]) -> Result<(), Error> {
        let descriptor = *self.descriptor()?;
        if data.is_empty() {
            return Ok(());
        }

        if !self.config.window.overlaps(data) {
            return self.locked(|engine| engine.raw_write(&descriptor, addr, data));
        }

        // The source can't be fetched while decoding is suspended, so stage
        // it in RAM one chunk at a time.
        let mut bounce = [0u8; BOUNCE_CHUNK_BYTES];
        let mut done = 0usize;
        while done < data.len() {
            let step = min(BOUNCE_CHUNK_BYTES, data.len() - done);
            bounce[..step].copy_from_slice(&data[done..done + step]);
            let chunk_addr = addr.wrapping_add(done as u32);
            let chunk = &bounce[..step];
            self.locked(|engine| engine.raw_write(&descriptor, chunk_addr, chunk))?;
            done += step;
        }
        Ok(())
    }

    /// Erases the sectors covering `len` bytes from `addr`.
    ///
    /// The engine receives the inclusive range
    /// `addr..=erase_end_address(addr, len)`; a zero length is passed through
    /// unchanged rather than skipped.
    pub fn erase(&mut self, addr: u32, len: u32) -> Result<(), Error> {
        let descriptor = *self.descriptor()?;
        let end = erase_end_address(addr, len);
        trace!("erase {:#x}..={:#x}", addr, end);
        self.locked(|engine| engine.raw_erase(&descriptor, addr, end))
    }

    pub fn erase_all(&mut self) -> Result<(), Error> {
        let capacity = self.descriptor()?.capacity();
        self.erase(0, capacity)
    }

    /// Sets the recovery bit of the cached part with interrupts masked.
    pub fn rcv_enable(&mut self, bit: RcvBit) -> Result<(), Error> {
        let descriptor = *self.descriptor()?;
        self.rcv_enable_with(&descriptor, bit)
    }

    /// Sets the recovery bit using an explicit descriptor.
    pub fn rcv_enable_with(&mut self, descriptor: &FlashDescriptor, bit: RcvBit) -> Result<(), Error> {
        rcv::enable_with_lock(&mut self.engine, &mut self.irq, descriptor, bit)
    }

    fn locked<R>(&mut self, op: impl FnOnce(&mut E) -> Result<R, Error>) -> Result<R, Error> {
        let _irq = IrqSection::enter(&mut self.irq)?;
        let mut guard = XipGuard::enter(&mut self.engine);
        self.encryption = guard.encryption();

        let result = op(guard.engine());
        if let Err(err) = &result {
            warn!("flash command failed: {:?}", err);
        }
        result
    }
}

impl<E: FlashEngine, I: InterruptControl> ErrorType for XipFlash<E, I> {
    type Error = Error;
}

impl<E: FlashEngine, I: InterruptControl> ReadNorFlash for XipFlash<E, I> {
    const READ_SIZE: usize = 1;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        self.descriptor()?;
        check_read(&*self, offset, bytes.len())?;
        XipFlash::read(self, offset, bytes)
    }

    fn capacity(&self) -> usize {
        self.descriptor
            .map(|d| d.capacity() as usize)
            .unwrap_or(0)
    }
}

impl<E: FlashEngine, I: InterruptControl> NorFlash for XipFlash<E, I> {
    const WRITE_SIZE: usize = 1;
    const ERASE_SIZE: usize = SECTOR_SIZE_BYTES as usize;

    fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
        self.descriptor()?;
        check_erase(&*self, from, to)?;
        if from == to {
            return Ok(());
        }
        XipFlash::erase(self, from, to - from)
    }

    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        self.descriptor()?;
        check_write(&*self, offset, bytes.len())?;
        XipFlash::write(self, offset, bytes)
    }
}

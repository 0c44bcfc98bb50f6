//! Recovery (RCV) mode enable sequence.
//!
//! Some parts need a register bit set so that power loss in the middle of an
//! erase leaves the array recoverable. Toggling it requires leaving XIP mode,
//! so the decode configuration is saved first and restored afterwards.

use crate::descriptor::FlashDescriptor;
use crate::engine::{DecodeConfig, FlashEngine};
use crate::irq::{InterruptControl, IrqSection};
use crate::types::{Error, IoMode};

/// Lane width forced when the decode state cannot be saved.
pub const FALLBACK_IO_MODE: IoMode = IoMode::QuadIo;
pub const FALLBACK_CONTINUOUS_READ: bool = true;
pub const FALLBACK_IMAGE_OFFSET: u32 = 0;
pub const FALLBACK_READ_LEN: u32 = 32;

/// Decode configuration applied when [`FlashEngine::save_decode_state`]
/// fails. The dummy cycle count follows the descriptor's
/// [`quad_io_dummy_cycles`](FlashDescriptor::quad_io_dummy_cycles).
pub const FALLBACK_DECODE_CONFIG: DecodeConfig = DecodeConfig {
    io_mode: FALLBACK_IO_MODE,
    continuous_read: FALLBACK_CONTINUOUS_READ,
    image_offset: FALLBACK_IMAGE_OFFSET,
    read_len: FALLBACK_READ_LEN,
};

/// Register access used to set the recovery bit.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RcvBit {
    pub read_cmd: u8,
    pub write_cmd: u8,
    pub bit_pos: u8,
}

impl RcvBit {
    pub const fn new(read_cmd: u8, write_cmd: u8, bit_pos: u8) -> Self {
        Self {
            read_cmd,
            write_cmd,
            bit_pos,
        }
    }

    fn mask(self) -> Result<u8, Error> {
        if self.bit_pos >= 8 {
            return Err(Error::InvalidBitPosition);
        }
        Ok(1 << self.bit_pos)
    }
}

fn set_rcv_bit<E: FlashEngine>(
    engine: &mut E,
    descriptor: &FlashDescriptor,
    bit: RcvBit,
    mask: u8,
) -> Result<(), Error> {
    let value = engine.read_rcv_register(descriptor, bit.read_cmd)?;
    if value & mask != 0 {
        return Ok(());
    }

    engine.write_rcv_register(descriptor, bit.write_cmd, value | mask)?;

    let value = engine.read_rcv_register(descriptor, bit.read_cmd)?;
    if value & mask == 0 {
        return Err(Error::CommandFailure);
    }
    Ok(())
}

/// Sets the recovery bit. The caller must already have interrupts masked.
///
/// If the decode state cannot be saved, the decode path is forced to
/// [`FALLBACK_DECODE_CONFIG`], the bit is left alone and
/// [`Error::DecodeFallback`] is returned. Otherwise the saved state is
/// restored after the bit-set attempt whatever its outcome, and that outcome
/// is returned.
pub fn enable_need_lock<E: FlashEngine>(
    engine: &mut E,
    descriptor: &FlashDescriptor,
    bit: RcvBit,
) -> Result<(), Error> {
    let mask = bit.mask()?;

    let snapshot = match engine.save_decode_state(descriptor) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            warn!(
                "decode state save failed ({:?}), forcing fallback decode config",
                err
            );
            engine.force_decode_config(descriptor, FALLBACK_DECODE_CONFIG);
            return Err(Error::DecodeFallback);
        }
    };

    let result = set_rcv_bit(engine, descriptor, bit, mask);
    engine.restore_decode_state(descriptor, snapshot);

    if let Err(err) = result {
        warn!("rcv enable on {} failed: {:?}", descriptor.name, err);
    }
    result
}

/// [`enable_need_lock`] inside its own interrupt-masked section.
pub fn enable_with_lock<E: FlashEngine, I: InterruptControl>(
    engine: &mut E,
    irq: &mut I,
    descriptor: &FlashDescriptor,
    bit: RcvBit,
) -> Result<(), Error> {
    let _irq = IrqSection::enter(irq)?;
    enable_need_lock(engine, descriptor, bit)
}

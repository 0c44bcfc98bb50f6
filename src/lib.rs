//! XIP-safe access to a serial NOR flash that also holds the running firmware.
//!
//! Every command runs with interrupts masked and memory-mapped decoding
//! suspended, so nothing fetches instructions from the flash window while
//! the bus is busy. The register-level command engine and the interrupt
//! controller are supplied by the caller through [`FlashEngine`] and
//! [`InterruptControl`].

#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

mod config;
mod descriptor;
mod detect;
mod engine;
mod flash;
mod guard;
pub mod irq;
pub mod rcv;
mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{FlashWindow, XipConfig};
pub use descriptor::{CommandSet, FlashDescriptor, FlashGeometry, FlashTiming};
pub use detect::{descriptor_for, identify_jedec, Identification, JedecId};
pub use engine::{DecodeConfig, DecodeSnapshot, EncryptionState, FlashEngine};
pub use flash::{erase_end_address, XipFlash, BOUNCE_CHUNK_BYTES};
pub use guard::XipGuard;
pub use irq::{InterruptControl, IrqSection};
pub use rcv::RcvBit;
pub use types::{Error, IoMode};

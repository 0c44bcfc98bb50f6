//! Interrupt exclusion around flash command sequences.
//!
//! On a single core the only thing that can redirect control into the XIP
//! window while a command is outstanding is an interrupt handler, so masking
//! interrupts is the whole locking story. Sections are flat: opening one
//! while another is open is not supported.

use core::cell::Cell;

use critical_section::Mutex;

use crate::types::Error;

pub trait InterruptControl {
    /// Masks interrupts. Strategies that can detect nesting return
    /// [`Error::Reentrant`] instead of masking twice.
    fn disable(&mut self) -> Result<(), Error>;

    /// Undoes the matching [`disable`](Self::disable).
    fn enable(&mut self);
}

/// Interrupt-masked section, unmasked again on drop.
pub struct IrqSection<'a, I: InterruptControl> {
    irq: &'a mut I,
}

impl<'a, I: InterruptControl> IrqSection<'a, I> {
    #[inline(always)]
    pub fn enter(irq: &'a mut I) -> Result<Self, Error> {
        irq.disable()?;
        Ok(Self { irq })
    }
}

impl<I: InterruptControl> Drop for IrqSection<'_, I> {
    #[inline(always)]
    fn drop(&mut self) {
        self.irq.enable();
    }
}

/// PRIMASK-based masking for Cortex-M cores.
///
/// Restores the PRIMASK value seen at `disable`, so a section opened with
/// interrupts already masked leaves them masked.
#[cfg(feature = "cortex-m")]
#[derive(Default)]
pub struct CortexMInterrupts {
    was_active: bool,
}

#[cfg(feature = "cortex-m")]
impl CortexMInterrupts {
    pub const fn new() -> Self {
        Self { was_active: false }
    }
}

#[cfg(feature = "cortex-m")]
impl InterruptControl for CortexMInterrupts {
    #[inline(always)]
    fn disable(&mut self) -> Result<(), Error> {
        self.was_active = cortex_m::register::primask::read().is_active();
        cortex_m::interrupt::disable();
        Ok(())
    }

    #[inline(always)]
    fn enable(&mut self) {
        // Flash controller writes must land before fetching from XIP again.
        cortex_m::asm::dsb();
        cortex_m::asm::isb();
        if self.was_active {
            // SAFETY: interrupts were enabled when the section was opened.
            unsafe { cortex_m::interrupt::enable() };
        }
    }
}

/// Exclusive flag for targets without a usable interrupt controller.
///
/// Opening a second section while one is held fails with
/// [`Error::Reentrant`]. Share one flag between every handle that reaches the
/// same flash bus.
pub struct ExclusiveFlag<'a> {
    held: &'a Mutex<Cell<bool>>,
}

impl<'a> ExclusiveFlag<'a> {
    pub const fn new(held: &'a Mutex<Cell<bool>>) -> Self {
        Self { held }
    }

    pub fn is_held(&self) -> bool {
        critical_section::with(|cs| self.held.borrow(cs).get())
    }
}

impl InterruptControl for ExclusiveFlag<'_> {
    fn disable(&mut self) -> Result<(), Error> {
        critical_section::with(|cs| {
            let held = self.held.borrow(cs);
            if held.get() {
                return Err(Error::Reentrant);
            }
            held.set(true);
            Ok(())
        })
    }

    fn enable(&mut self) {
        critical_section::with(|cs| self.held.borrow(cs).set(false));
    }
}

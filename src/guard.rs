use crate::engine::{EncryptionState, FlashEngine};

/// Decode-path critical section.
///
/// While the guard lives, the flash is out of memory-mapped mode: nothing may
/// fetch from the XIP window, so the caller must run from RAM with interrupts
/// masked. Dropping the guard resumes decoding with the encryption state
/// captured on entry. The guard borrows the engine mutably, so sections can
/// not nest.
pub struct XipGuard<'a, E: FlashEngine> {
    engine: &'a mut E,
    saved: EncryptionState,
}

impl<'a, E: FlashEngine> XipGuard<'a, E> {
    #[inline(always)]
    pub fn enter(engine: &'a mut E) -> Self {
        let saved = engine.suspend_decode();
        Self { engine, saved }
    }

    #[inline(always)]
    pub fn encryption(&self) -> EncryptionState {
        self.saved
    }

    #[inline(always)]
    pub fn engine(&mut self) -> &mut E {
        &mut *self.engine
    }

    /// Resumes decoding now instead of at end of scope.
    #[inline(always)]
    pub fn exit(self) {}
}

impl<E: FlashEngine> Drop for XipGuard<'_, E> {
    #[inline(always)]
    fn drop(&mut self) {
        self.engine.resume_decode(self.saved);
    }
}

/// CPU address range through which the flash is memory mapped.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlashWindow {
    pub start: usize,
    pub end: usize,
}

impl FlashWindow {
    /// No mapped window; no buffer is ever treated as flash resident.
    pub const NONE: Self = Self { start: 0, end: 0 };

    pub const fn new(start: usize, size: usize) -> Self {
        Self {
            start,
            end: start.saturating_add(size),
        }
    }

    /// Whether any byte of `bytes` is fetched through the window.
    pub fn overlaps(&self, bytes: &[u8]) -> bool {
        if bytes.is_empty() {
            return false;
        }
        let start = bytes.as_ptr() as usize;
        let end = start.saturating_add(bytes.len());
        start < self.end && end > self.start
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct XipConfig {
    /// Window the running firmware executes from.
    pub window: FlashWindow,
}

impl XipConfig {
    pub const fn new(window: FlashWindow) -> Self {
        Self { window }
    }
}

impl Default for XipConfig {
    fn default() -> Self {
        Self {
            window: FlashWindow::NONE,
        }
    }
}

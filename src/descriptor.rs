//! Identification, geometry and timing data for the attached flash part.

use crate::detect::JedecId;

pub(crate) const SECTOR_SIZE_BYTES: u32 = 4 * 1024;
pub(crate) const BLOCK_32K_BYTES: u32 = 32 * 1024;
pub(crate) const BLOCK_64K_BYTES: u32 = 64 * 1024;
pub(crate) const PAGE_SIZE_BYTES: u32 = 256;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlashGeometry {
    pub capacity_bytes: u32,
    pub page_size: u32,
    pub sector_size: u32,
    pub block_32k_size: u32,
    pub block_64k_size: u32,
}

impl FlashGeometry {
    pub const fn common_spi_nor(capacity_bytes: u32) -> Self {
        Self {
            capacity_bytes,
            page_size: PAGE_SIZE_BYTES,
            sector_size: SECTOR_SIZE_BYTES,
            block_32k_size: BLOCK_32K_BYTES,
            block_64k_size: BLOCK_64K_BYTES,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandSet {
    pub write_enable: u8,
    pub read_status: u8,
    pub read_status2: Option<u8>,
    pub write_status: u8,
    pub read: u8,
    pub fast_read: u8,
    pub dual_output_read: Option<u8>,
    pub quad_output_read: Option<u8>,
    pub dual_io_read: Option<u8>,
    pub quad_io_read: Option<u8>,
    pub page_program: u8,
    pub quad_page_program: Option<u8>,
    pub sector_erase: u8,
    pub block_erase_32k: Option<u8>,
    pub block_erase_64k: Option<u8>,
    pub chip_erase: Option<u8>,
    pub read_jedec_id: u8,
    pub reset_enable: Option<u8>,
    pub reset: Option<u8>,
    pub deep_power_down: Option<u8>,
    pub release_power_down: Option<u8>,
}

impl CommandSet {
    pub const fn common_spi_nor() -> Self {
        Self {
            write_enable: 0x06,
            read_status: 0x05,
            read_status2: Some(0x35),
            write_status: 0x01,
            read: 0x03,
            fast_read: 0x0B,
            dual_output_read: Some(0x3B),
            quad_output_read: Some(0x6B),
            dual_io_read: Some(0xBB),
            quad_io_read: Some(0xEB),
            page_program: 0x02,
            quad_page_program: Some(0x32),
            sector_erase: 0x20,
            block_erase_32k: Some(0x52),
            block_erase_64k: Some(0xD8),
            chip_erase: Some(0xC7),
            read_jedec_id: 0x9F,
            reset_enable: Some(0x66),
            reset: Some(0x99),
            deep_power_down: Some(0xB9),
            release_power_down: Some(0xAB),
        }
    }
}

impl Default for CommandSet {
    fn default() -> Self {
        Self::common_spi_nor()
    }
}

/// Worst-case command durations, in milliseconds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlashTiming {
    pub page_program_ms: u16,
    pub sector_erase_ms: u16,
    pub block_erase_32k_ms: u16,
    pub block_erase_64k_ms: u16,
    pub chip_erase_ms: u32,
}

impl FlashTiming {
    pub const fn common_spi_nor() -> Self {
        Self {
            page_program_ms: 5,
            sector_erase_ms: 300,
            block_erase_32k_ms: 1200,
            block_erase_64k_ms: 1200,
            chip_erase_ms: 200_000,
        }
    }
}

impl Default for FlashTiming {
    fn default() -> Self {
        Self::common_spi_nor()
    }
}

/// Everything the command engine needs to drive one flash part.
///
/// Cached once by [`XipFlash::initialize`](crate::XipFlash::initialize) and
/// read-only afterward.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlashDescriptor {
    pub name: &'static str,
    pub jedec: JedecId,
    pub geometry: FlashGeometry,
    pub commands: CommandSet,
    pub timing: FlashTiming,
    /// Dummy cycles the part needs for a quad I/O read.
    pub quad_io_dummy_cycles: u8,
}

impl FlashDescriptor {
    pub const fn common_spi_nor(name: &'static str, jedec: JedecId, capacity_bytes: u32) -> Self {
        Self {
            name,
            jedec,
            geometry: FlashGeometry::common_spi_nor(capacity_bytes),
            commands: CommandSet::common_spi_nor(),
            timing: FlashTiming::common_spi_nor(),
            quad_io_dummy_cycles: 4,
        }
    }

    /// Placeholder carried by a failed identification.
    pub const fn unidentified(jedec: JedecId) -> Self {
        Self::common_spi_nor("unidentified", jedec, 0)
    }

    pub const fn capacity(&self) -> u32 {
        self.geometry.capacity_bytes
    }
}

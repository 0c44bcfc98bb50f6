//! JEDEC-based identification of common SPI NOR parts.

use crate::descriptor::FlashDescriptor;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JedecId {
    pub manufacturer: u8,
    pub memory_type: u8,
    pub density: u8,
}

impl JedecId {
    pub const fn from_raw(value: u32) -> Self {
        Self {
            manufacturer: (value & 0xff) as u8,
            memory_type: ((value >> 8) & 0xff) as u8,
            density: ((value >> 16) & 0xff) as u8,
        }
    }

    pub const fn as_raw(self) -> u32 {
        (self.manufacturer as u32)
            | ((self.memory_type as u32) << 8)
            | ((self.density as u32) << 16)
    }
}

/// Result of an identify sequence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Identification {
    pub descriptor: FlashDescriptor,
    /// Set when the part was recognised and `descriptor` can be trusted.
    pub valid: bool,
}

impl Identification {
    pub const fn valid(descriptor: FlashDescriptor) -> Self {
        Self {
            descriptor,
            valid: true,
        }
    }

    pub const fn invalid(jedec: JedecId) -> Self {
        Self {
            descriptor: FlashDescriptor::unidentified(jedec),
            valid: false,
        }
    }
}

struct KnownPart {
    raw: u32,
    name: &'static str,
}

const MIB: u32 = 1024 * 1024;

const PARTS_4MIB: &[KnownPart] = &[
    KnownPart { raw: 0x1640EF, name: "w25q32" },
    KnownPart { raw: 0x1640C8, name: "gd25q32" },
    KnownPart { raw: 0x1620C2, name: "mx25l32" },
    KnownPart { raw: 0x16400B, name: "xt25f32" },
    KnownPart { raw: 0x16701C, name: "en25q32" },
];
const PARTS_8MIB: &[KnownPart] = &[
    KnownPart { raw: 0x1740EF, name: "w25q64" },
    KnownPart { raw: 0x1740C8, name: "gd25q64" },
    KnownPart { raw: 0x1720C2, name: "mx25l64" },
    KnownPart { raw: 0x17400B, name: "xt25f64" },
    KnownPart { raw: 0x17701C, name: "en25q64" },
];
const PARTS_16MIB: &[KnownPart] = &[
    KnownPart { raw: 0x1840EF, name: "w25q128" },
    KnownPart { raw: 0x1840C8, name: "gd25q128" },
    KnownPart { raw: 0x1820C2, name: "mx25l128" },
    KnownPart { raw: 0x18400B, name: "xt25f128" },
    KnownPart { raw: 0x182085, name: "py25q128ha" },
    KnownPart { raw: 0x18701C, name: "en25q128" },
];

const TABLES: &[(&[KnownPart], u32)] = &[
    (PARTS_4MIB, 4 * MIB),
    (PARTS_8MIB, 8 * MIB),
    (PARTS_16MIB, 16 * MIB),
];

// Some vendors report manufacturer and density swapped.
#[inline(always)]
const fn swap_jedec_mfg_density(raw: u32) -> u32 {
    ((raw & 0x0000_00ff) << 16) | (raw & 0x0000_ff00) | ((raw & 0x00ff_0000) >> 16)
}

fn lookup_raw(raw: u32) -> Option<FlashDescriptor> {
    TABLES.iter().find_map(|(parts, capacity)| {
        parts.iter().find(|part| part.raw == raw).map(|part| {
            FlashDescriptor::common_spi_nor(part.name, JedecId::from_raw(raw), *capacity)
        })
    })
}

/// Looks `jedec` up in the built-in part table.
pub fn descriptor_for(jedec: JedecId) -> Option<FlashDescriptor> {
    let raw = jedec.as_raw();
    lookup_raw(raw).or_else(|| lookup_raw(swap_jedec_mfg_density(raw)))
}

pub fn identify_jedec(jedec: JedecId) -> Identification {
    match descriptor_for(jedec) {
        Some(descriptor) => Identification::valid(descriptor),
        None => Identification::invalid(jedec),
    }
}

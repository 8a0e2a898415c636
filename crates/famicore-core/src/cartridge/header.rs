//! iNES 1.0 header decoding.
//!
//! The first 16 bytes of every `.nes` image describe how much PRG/CHR data
//! follows, which mapper the board uses and how the nametables are wired.
//!
//! # Quick overview
//! - Pass the raw image to [`Header::parse`].
//! - `prg_banks` counts 16 KiB program banks, `chr_banks` counts 8 KiB graphics
//!   banks (zero means the board carries CHR-RAM instead).
//! - Damaged headers turn into a descriptive [`Error`].

mod mirroring;

use bitflags::bitflags;

use crate::error::Error;

pub use mirroring::Mirroring;

const INES_MAGIC: &[u8; 4] = b"NES\x1A";

/// Size of the fixed iNES header in bytes.
pub const INES_HEADER_LEN: usize = 16;
/// Size of the optional trainer block that sits between header and PRG data.
pub const TRAINER_LEN: usize = 512;
/// Size of a PRG bank as counted by the header.
pub const PRG_BANK_SIZE: usize = 16 * 1024;
/// Size of a CHR bank as counted by the header.
pub const CHR_BANK_SIZE: usize = 8 * 1024;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Flags6: u8 {
        const MIRRORING        = 0b0000_0001;
        const BATTERY          = 0b0000_0010;
        const TRAINER          = 0b0000_0100;
        const FOUR_SCREEN      = 0b0000_1000;
        const MAPPER_LOW_MASK  = 0b1111_0000;
    }
}

/// Decoded iNES header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Number of 16 KiB PRG ROM banks.
    pub prg_banks: usize,
    /// Number of 8 KiB CHR ROM banks. Zero selects CHR-RAM.
    pub chr_banks: usize,
    /// Mapper number assembled from the two header nibbles.
    pub mapper: u16,
    /// Nametable layout requested by the board wiring.
    pub mirroring: Mirroring,
    /// A 512-byte trainer precedes the PRG data.
    pub trainer_present: bool,
}

impl Header {
    /// Parse an iNES header from the given byte slice.
    pub fn parse(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < INES_HEADER_LEN {
            return Err(Error::TooShort {
                actual: bytes.len(),
            });
        }

        if &bytes[0..4] != INES_MAGIC {
            return Err(Error::InvalidMagic);
        }

        let flags6 = Flags6::from_bits_truncate(bytes[6]);
        let mapper = ((bytes[6] >> 4) | (bytes[7] & 0xF0)) as u16;

        Ok(Self {
            prg_banks: bytes[4] as usize,
            chr_banks: bytes[5] as usize,
            mapper,
            mirroring: resolve_mirroring(flags6),
            trainer_present: flags6.contains(Flags6::TRAINER),
        })
    }

    /// Total PRG ROM size in bytes.
    pub fn prg_rom_size(&self) -> usize {
        self.prg_banks * PRG_BANK_SIZE
    }

    /// Total CHR ROM size in bytes.
    pub fn chr_rom_size(&self) -> usize {
        self.chr_banks * CHR_BANK_SIZE
    }
}

fn resolve_mirroring(flags6: Flags6) -> Mirroring {
    if flags6.contains(Flags6::FOUR_SCREEN) {
        Mirroring::FourScreen
    } else if flags6.contains(Flags6::MIRRORING) {
        Mirroring::Vertical
    } else {
        Mirroring::Horizontal
    }
}

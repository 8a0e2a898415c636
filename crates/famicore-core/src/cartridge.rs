//! Cartridge data and its bank-switch logic.
//!
//! A [`Rom`] is the immutable data contract handed over by a loader: PRG banks
//! in 16 KiB units, CHR banks in 8 KiB units (none means CHR-RAM), a mapper id
//! and the board's mirroring. A [`Cartridge`] pairs that data with the live
//! [`Mapper`] state machine that decides which banks are visible.

pub mod header;
pub mod mapper;

use std::{fs, path::Path};

use tracing::debug;

use crate::error::Error;

pub use header::{CHR_BANK_SIZE, Header, Mirroring, PRG_BANK_SIZE};
pub use mapper::{Mapper, MapperBus, WriteOutcome};

/// Immutable PRG/CHR contents plus the board description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rom {
    prg_banks: Vec<Box<[u8]>>,
    chr_banks: Vec<Box<[u8]>>,
    mapper_id: u16,
    mirroring: Mirroring,
    has_trainer: bool,
}

impl Rom {
    /// Builds a ROM from already separated banks.
    ///
    /// Every PRG bank is cut or zero-padded to 16 KiB and every CHR bank to
    /// 8 KiB, so a bank load covers exactly its window.
    pub fn new(
        prg_banks: Vec<Vec<u8>>,
        chr_banks: Vec<Vec<u8>>,
        mapper_id: u16,
        mirroring: Mirroring,
    ) -> Self {
        Self {
            prg_banks: prg_banks
                .into_iter()
                .map(|bank| pad_bank(bank, PRG_BANK_SIZE))
                .collect(),
            chr_banks: chr_banks
                .into_iter()
                .map(|bank| pad_bank(bank, CHR_BANK_SIZE))
                .collect(),
            mapper_id,
            mirroring,
            has_trainer: false,
        }
    }

    /// Parses a complete iNES image.
    pub fn from_ines(bytes: &[u8]) -> Result<Self, Error> {
        let header = Header::parse(bytes)?;
        if header.prg_banks == 0 {
            return Err(Error::MissingPrgRom);
        }

        let mut cursor = header::INES_HEADER_LEN;
        if header.trainer_present {
            take_section(bytes, &mut cursor, "trainer", header::TRAINER_LEN)?;
        }
        let prg = take_section(bytes, &mut cursor, "PRG ROM", header.prg_rom_size())?;
        let chr = take_section(bytes, &mut cursor, "CHR ROM", header.chr_rom_size())?;

        let rom = Self {
            prg_banks: prg.chunks(PRG_BANK_SIZE).map(Box::from).collect(),
            chr_banks: chr.chunks(CHR_BANK_SIZE).map(Box::from).collect(),
            mapper_id: header.mapper,
            mirroring: header.mirroring,
            has_trainer: header.trainer_present,
        };
        debug!(
            mapper = rom.mapper_id,
            prg_banks = rom.prg_bank_count(),
            chr_banks = rom.chr_bank_count(),
            mirroring = ?rom.mirroring,
            "parsed iNES image"
        );
        Ok(rom)
    }

    pub fn prg_bank(&self, index: usize) -> Option<&[u8]> {
        self.prg_banks.get(index).map(AsRef::as_ref)
    }

    pub fn chr_bank(&self, index: usize) -> Option<&[u8]> {
        self.chr_banks.get(index).map(AsRef::as_ref)
    }

    pub fn prg_bank_count(&self) -> usize {
        self.prg_banks.len()
    }

    pub fn chr_bank_count(&self) -> usize {
        self.chr_banks.len()
    }

    pub fn mapper_id(&self) -> u16 {
        self.mapper_id
    }

    pub fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    pub fn has_trainer(&self) -> bool {
        self.has_trainer
    }

    /// Boards without CHR ROM expose 8 KiB of writable pattern memory.
    pub fn has_chr_ram(&self) -> bool {
        self.chr_banks.is_empty()
    }
}

fn pad_bank(mut bank: Vec<u8>, size: usize) -> Box<[u8]> {
    bank.resize(size, 0);
    bank.into_boxed_slice()
}

fn take_section<'a>(
    bytes: &'a [u8],
    cursor: &mut usize,
    section: &'static str,
    len: usize,
) -> Result<&'a [u8], Error> {
    let available = bytes.len().saturating_sub(*cursor);
    if available < len {
        return Err(Error::SectionTooShort {
            section,
            expected: len,
            actual: available,
        });
    }
    let slice = &bytes[*cursor..*cursor + len];
    *cursor += len;
    Ok(slice)
}

/// ROM data together with the mapper state built for it.
#[derive(Debug, Clone)]
pub struct Cartridge {
    pub(crate) rom: Rom,
    pub(crate) mapper: Box<dyn Mapper>,
}

impl Cartridge {
    /// Picks the mapper variant for `rom`, failing for unknown ids and for
    /// boards without program ROM.
    pub fn new(rom: Rom) -> Result<Self, Error> {
        if rom.prg_bank_count() == 0 {
            return Err(Error::MissingPrgRom);
        }
        let mapper = mapper::create(&rom)?;
        Ok(Self { rom, mapper })
    }

    pub fn rom(&self) -> &Rom {
        &self.rom
    }

    /// Drops all bank-select state, as a fresh power cycle of the board would.
    pub(crate) fn rebuild_mapper(&mut self) -> Result<(), Error> {
        self.mapper = mapper::create(&self.rom)?;
        Ok(())
    }
}

/// Reads and parses an iNES image from disk.
pub fn load_rom_from_file<P: AsRef<Path>>(path: P) -> Result<Rom, Error> {
    let bytes = fs::read(path)?;
    Rom::from_ines(&bytes)
}

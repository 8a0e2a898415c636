#![allow(dead_code)]

use anyhow::{Context, Result};
use famicore_core::Nes;

pub const PRG_BANK_SIZE: usize = 0x4000;
pub const CHR_BANK_SIZE: usize = 0x2000;

/// Offset of the NMI vector within the last PRG bank.
const VECTOR_OFFSET: usize = PRG_BANK_SIZE - 6;

/// Builds iNES images in memory.
///
/// Every PRG bank is filled with its own index and every CHR bank with
/// `0x10 | index`, so tests can tell from a single read which bank is mapped.
#[derive(Debug, Clone)]
pub struct Image {
    mapper: u8,
    flags6: u8,
    prg: Vec<Vec<u8>>,
    chr: Vec<Vec<u8>>,
}

impl Image {
    pub fn new(mapper: u8, prg_banks: usize, chr_banks: usize) -> Self {
        Self {
            mapper,
            flags6: 0,
            prg: (0..prg_banks).map(|i| vec![i as u8; PRG_BANK_SIZE]).collect(),
            chr: (0..chr_banks).map(|i| vec![0x10 | i as u8; CHR_BANK_SIZE]).collect(),
        }
    }

    /// One 16 KiB bank, no mapper, code entered at `$8000`.
    pub fn nrom(code: &[u8]) -> Self {
        Self::new(0, 1, 1).code(0, 0, code).vectors(0x8000, 0x8000, 0x8000)
    }

    /// Places `bytes` at `offset` inside PRG bank `bank`.
    pub fn code(mut self, bank: usize, offset: usize, bytes: &[u8]) -> Self {
        self.prg[bank][offset..offset + bytes.len()].copy_from_slice(bytes);
        self
    }

    /// Writes the NMI, reset and IRQ vectors at the end of the last PRG bank.
    pub fn vectors(mut self, nmi: u16, reset: u16, irq: u16) -> Self {
        let mut table = [0u8; 6];
        table[0..2].copy_from_slice(&nmi.to_le_bytes());
        table[2..4].copy_from_slice(&reset.to_le_bytes());
        table[4..6].copy_from_slice(&irq.to_le_bytes());
        if let Some(last) = self.prg.last_mut() {
            last[VECTOR_OFFSET..].copy_from_slice(&table);
        }
        self
    }

    pub fn vertical(mut self) -> Self {
        self.flags6 |= 0x01;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut bytes = vec![
            0x4E,
            0x45,
            0x53,
            0x1A,
            self.prg.len() as u8,
            self.chr.len() as u8,
            self.flags6 | (self.mapper << 4),
            self.mapper & 0xF0,
        ];
        bytes.resize(16, 0);
        for bank in self.prg.iter().chain(&self.chr) {
            bytes.extend_from_slice(bank);
        }
        bytes
    }
}

/// Loads `image` into a fresh console.
pub fn boot(image: &Image) -> Result<Nes> {
    let mut nes = Nes::new();
    nes.load_rom(&image.build())
        .context("loading in-memory image")?;
    Ok(nes)
}

pub fn run_frames(nes: &mut Nes, frames: usize) {
    for _ in 0..frames {
        nes.run_frame();
    }
}

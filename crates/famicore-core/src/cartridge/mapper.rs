//! Bank-switch state machines.
//!
//! A mapper never owns a copy of the cartridge memory. It observes CPU writes
//! into cartridge space and reacts by bulk-loading banks into the CPU address
//! space or the video bus through [`MapperBus`].
//!
//! | Id | Board  | Switches                      |
//! |----|--------|-------------------------------|
//! | 0  | NROM   | nothing                       |
//! | 1  | MMC1   | PRG, CHR and mirroring (serial) |
//! | 2  | UxROM  | 16 KiB PRG at `$8000`          |
//! | 3  | CNROM  | 8 KiB CHR                      |

mod mapper0;
mod mapper1;
mod mapper2;
mod mapper3;

use std::fmt::Debug;

use dyn_clone::DynClone;
use tracing::warn;

use crate::{
    cartridge::{CHR_BANK_SIZE, Mirroring, Rom},
    error::Error,
    memory::{cpu as cpu_mem, ppu as ppu_mem},
    ppu::Ppu,
    ram::cpu::AddressSpace,
};

pub use mapper0::Mapper0;
pub use mapper1::Mapper1;
pub use mapper2::Mapper2;
pub use mapper3::Mapper3;

/// Result of offering a cartridge-space write to the mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    /// `true` when the write was a pure register command and must not reach RAM.
    pub suppress_default_write: bool,
}

impl WriteOutcome {
    /// The write was consumed by the mapper.
    pub const SUPPRESS: Self = Self {
        suppress_default_write: true,
    };
    /// The bus should store the byte as usual (cartridge RAM).
    pub const STORE: Self = Self {
        suppress_default_write: false,
    };
}

pub trait Mapper: DynClone + Debug {
    /// Installs the power-on bank layout.
    ///
    /// The default puts the first PRG bank at `$8000`, the last PRG bank at
    /// `$C000` and, when the board has CHR ROM, the first CHR bank at `$0000`.
    fn on_load(&mut self, bus: &mut MapperBus<'_>) {
        bus.install_power_on_banks();
    }

    /// Handles a CPU write to `$4020-$FFFF`.
    fn on_write(&mut self, addr: u16, value: u8, bus: &mut MapperBus<'_>) -> WriteOutcome;
}

dyn_clone::clone_trait_object!(Mapper);

/// Builds the bank-switch variant named by the ROM's mapper id.
pub fn create(rom: &Rom) -> Result<Box<dyn Mapper>, Error> {
    let mapper: Box<dyn Mapper> = match rom.mapper_id() {
        0 => Box::new(Mapper0::new()),
        1 => Box::new(Mapper1::new()),
        2 => Box::new(Mapper2::new()),
        3 => Box::new(Mapper3::new()),
        other => return Err(Error::UnsupportedMapper(other)),
    };
    Ok(mapper)
}

/// Boards without bank switching still carry work RAM at `$6000-$7FFF`.
pub(crate) fn prg_ram_outcome(addr: u16) -> WriteOutcome {
    if (cpu_mem::PRG_RAM_START..=cpu_mem::PRG_RAM_END).contains(&addr) {
        WriteOutcome::STORE
    } else {
        WriteOutcome::SUPPRESS
    }
}

/// Window through which a mapper installs banks and pokes the PPU.
pub struct MapperBus<'a> {
    pub(crate) rom: &'a Rom,
    pub(crate) memory: &'a mut AddressSpace,
    pub(crate) ppu: &'a mut Ppu,
    /// CPU cycle of the write being handled, used by the mid-frame redraw.
    pub(crate) cycle: u64,
}

impl MapperBus<'_> {
    pub fn prg_bank_count(&self) -> usize {
        self.rom.prg_bank_count()
    }

    pub fn chr_bank_count(&self) -> usize {
        self.rom.chr_bank_count()
    }

    pub fn has_chr_ram(&self) -> bool {
        self.rom.has_chr_ram()
    }

    /// Copies 16 KiB PRG bank `bank` (reduced modulo the bank count) to `dest`.
    pub fn load_prg(&mut self, bank: usize, dest: u16) {
        let count = self.rom.prg_bank_count();
        match self.rom.prg_bank(bank % count.max(1)) {
            Some(data) => self.memory.load_into(data, dest as usize),
            None => warn!(bank, count, "PRG bank not present on cartridge"),
        }
    }

    /// Copies 8 KiB CHR bank `bank` (reduced modulo the bank count) to `dest`.
    pub fn load_chr(&mut self, bank: usize, dest: u16) {
        let count = self.rom.chr_bank_count();
        match self.rom.chr_bank(bank % count.max(1)) {
            Some(data) => self.ppu.video_mut().load_into(data, dest),
            None => warn!(bank, count, "CHR bank not present on cartridge"),
        }
    }

    /// Copies one 4 KiB half of an 8 KiB CHR bank to `dest`.
    ///
    /// Even numbers select the lower half of bank `bank >> 1`, odd numbers the upper.
    pub fn load_chr_4k(&mut self, bank: usize, dest: u16) {
        let count = self.rom.chr_bank_count();
        let half = ppu_mem::PATTERN_TABLE_SIZE;
        match self.rom.chr_bank((bank >> 1) % count.max(1)) {
            Some(data) => {
                let start = if bank % 2 == 0 { 0 } else { half };
                let end = (start + half).min(CHR_BANK_SIZE);
                self.ppu.video_mut().load_into(&data[start..end], dest);
            }
            None => warn!(bank, count, "CHR bank not present on cartridge"),
        }
    }

    pub fn set_mirroring(&mut self, mirroring: Mirroring) {
        self.ppu.video_mut().set_mirroring(mirroring);
    }

    /// Mid-frame redraw hook: recomposites the picture if a render is running.
    pub fn redraw(&mut self) {
        self.ppu.redraw(self.cycle);
    }

    pub(crate) fn install_power_on_banks(&mut self) {
        let last = self.prg_bank_count().saturating_sub(1);
        self.load_prg(0, cpu_mem::PRG_ROM_START);
        self.load_prg(last, cpu_mem::PRG_ROM_HIGH_START);
        if !self.has_chr_ram() {
            self.load_chr(0, ppu_mem::PATTERN_TABLE_0);
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::cartridge::PRG_BANK_SIZE;

    /// ROM whose PRG bank `n` is filled with `n` and CHR bank `n` with `0x80 | n`.
    pub(crate) fn banked_rom(mapper_id: u16, prg_banks: usize, chr_banks: usize) -> Rom {
        let prg = (0..prg_banks)
            .map(|bank| vec![bank as u8; PRG_BANK_SIZE])
            .collect();
        let chr = (0..chr_banks)
            .map(|bank| {
                let mut data = vec![0x80 | bank as u8; CHR_BANK_SIZE];
                // Distinguish the upper 4 KiB half.
                data[ppu_mem::PATTERN_TABLE_SIZE..].fill(0xC0 | bank as u8);
                data
            })
            .collect();
        Rom::new(prg, chr, mapper_id, Mirroring::Horizontal)
    }

    /// Memory owners a mapper talks to, bundled for tests.
    pub(crate) struct Rig {
        pub(crate) rom: Rom,
        pub(crate) memory: AddressSpace,
        pub(crate) ppu: Ppu,
        /// CPU cycle handed to the mapper with every write.
        pub(crate) cycle: u64,
    }

    impl Rig {
        pub(crate) fn new(rom: Rom) -> Self {
            let mut ppu = Ppu::new();
            ppu.video_mut().set_chr_ram(rom.has_chr_ram());
            Self {
                rom,
                memory: AddressSpace::new(),
                ppu,
                cycle: 0,
            }
        }

        pub(crate) fn bus(&mut self) -> MapperBus<'_> {
            MapperBus {
                rom: &self.rom,
                memory: &mut self.memory,
                ppu: &mut self.ppu,
                cycle: self.cycle,
            }
        }

        pub(crate) fn load(&mut self, mapper: &mut dyn Mapper) {
            let mut bus = self.bus();
            mapper.on_load(&mut bus);
        }

        pub(crate) fn write(&mut self, mapper: &mut dyn Mapper, addr: u16, value: u8) -> WriteOutcome {
            let mut bus = self.bus();
            mapper.on_write(addr, value, &mut bus)
        }

        pub(crate) fn prg(&self, addr: u16) -> u8 {
            self.memory.read(addr as usize)
        }

        pub(crate) fn chr(&self, addr: u16) -> u8 {
            self.ppu.video().peek(addr)
        }
    }
}

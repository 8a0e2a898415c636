//! Mapper 1 (MMC1 / SxROM).
//!
//! Registers are loaded serially: each write to `$8000-$FFFF` shifts bit 0 of
//! the value into a 5-bit buffer, and the fifth write commits the buffer to the
//! register selected by the address of that last write. A write with bit 7 set
//! clears the buffer and forces PRG mode 3.
//!
//! | Address range | Register   | Bits                                      |
//! |---------------|------------|-------------------------------------------|
//! | `$8000-$9FFF` | Control    | `CPPMM`: CHR mode, PRG mode, mirroring    |
//! | `$A000-$BFFF` | CHR bank 0 | 4 KiB bank for `$0000` (or 8 KiB in mode 0) |
//! | `$C000-$DFFF` | CHR bank 1 | 4 KiB bank for `$1000` (mode 1 only)      |
//! | `$E000-$FFFF` | PRG bank   | 16 KiB bank number                        |
//!
//! PRG modes: 0/1 switch 32 KiB at `$8000` ignoring the low bit, 2 fixes the
//! first bank at `$8000` and switches `$C000`, 3 fixes the last bank at
//! `$C000` and switches `$8000`.
//!
//! Boards with CHR-RAM ignore CHR bank selects. Writes to `$6000-$7FFF` reach
//! the work RAM.

use tracing::debug;

use crate::{
    cartridge::{
        Mirroring,
        mapper::{Mapper, MapperBus, WriteOutcome, prg_ram_outcome},
    },
    memory::{cpu as cpu_mem, ppu as ppu_mem},
};

const RESET_BIT: u8 = 0x80;
const SHIFT_LEN: u8 = 5;

const CONTROL_END: u16 = 0xA000;
const CHR_BANK_0_END: u16 = 0xC000;
const CHR_BANK_1_END: u16 = 0xE000;

const CHR_BANK_MASK: u8 = 0x1F;
const PRG_BANK_MASK: u8 = 0x0F;

#[derive(Debug, Clone)]
pub struct Mapper1 {
    shift: u8,
    shift_count: u8,

    prg_mode: u8,
    chr_mode: u8,
    /// Last mirroring value written through the control register.
    mirroring: Option<u8>,

    chr_bank_0: usize,
    chr_bank_1: usize,
    prg_bank: usize,

    // Banks currently installed, so unchanged windows are left alone.
    prg_low: Option<usize>,
    prg_high: Option<usize>,
    chr_low: Option<usize>,
    chr_high: Option<usize>,
}

impl Default for Mapper1 {
    fn default() -> Self {
        Self::new()
    }
}

impl Mapper1 {
    pub fn new() -> Self {
        Self {
            shift: 0,
            shift_count: 0,
            prg_mode: 3,
            chr_mode: 0,
            mirroring: None,
            chr_bank_0: 0,
            chr_bank_1: 0,
            prg_bank: 0,
            prg_low: None,
            prg_high: None,
            chr_low: None,
            chr_high: None,
        }
    }

    fn commit(&mut self, addr: u16, value: u8, bus: &mut MapperBus<'_>) {
        if addr < CONTROL_END {
            self.write_control(value, bus);
        } else if addr < CHR_BANK_0_END {
            self.chr_bank_0 = chr_bank_number(value, bus);
            self.apply_chr(bus);
        } else if addr < CHR_BANK_1_END {
            self.chr_bank_1 = chr_bank_number(value, bus);
            self.apply_chr(bus);
        } else {
            self.prg_bank = (value & PRG_BANK_MASK) as usize % bus.prg_bank_count().max(1);
            self.apply_prg(bus);
        }
    }

    fn write_control(&mut self, value: u8, bus: &mut MapperBus<'_>) {
        let mirroring = value & 0b11;
        let prg_mode = (value >> 2) & 0b11;
        let chr_mode = (value >> 4) & 0b1;

        if self.mirroring != Some(mirroring) {
            bus.set_mirroring(match mirroring {
                0 => Mirroring::SingleScreenLower,
                1 => Mirroring::SingleScreenUpper,
                2 => Mirroring::Vertical,
                _ => Mirroring::Horizontal,
            });
            self.mirroring = Some(mirroring);
        }
        if prg_mode != self.prg_mode {
            self.prg_mode = prg_mode;
            self.apply_prg(bus);
        }
        if chr_mode != self.chr_mode {
            self.chr_mode = chr_mode;
            self.apply_chr(bus);
        }
    }

    fn apply_prg(&mut self, bus: &mut MapperBus<'_>) {
        let (low, high) = match self.prg_mode {
            0 | 1 => {
                let base = self.prg_bank & !1;
                (base, base + 1)
            }
            2 => (0, self.prg_bank),
            _ => (self.prg_bank, bus.prg_bank_count().saturating_sub(1)),
        };
        if self.prg_low != Some(low) {
            debug!(bank = low, "MMC1 PRG bank at $8000");
            bus.load_prg(low, cpu_mem::PRG_ROM_START);
            self.prg_low = Some(low);
        }
        if self.prg_high != Some(high) {
            debug!(bank = high, "MMC1 PRG bank at $C000");
            bus.load_prg(high, cpu_mem::PRG_ROM_HIGH_START);
            self.prg_high = Some(high);
        }
    }

    fn apply_chr(&mut self, bus: &mut MapperBus<'_>) {
        if bus.has_chr_ram() {
            return;
        }
        let (low, high) = if self.chr_mode == 0 {
            let base = self.chr_bank_0 & !1;
            (base, base + 1)
        } else {
            (self.chr_bank_0, self.chr_bank_1)
        };
        if self.chr_low != Some(low) {
            debug!(bank = low, "MMC1 CHR bank at $0000");
            bus.load_chr_4k(low, ppu_mem::PATTERN_TABLE_0);
            self.chr_low = Some(low);
            bus.redraw();
        }
        if self.chr_high != Some(high) {
            debug!(bank = high, "MMC1 CHR bank at $1000");
            bus.load_chr_4k(high, ppu_mem::PATTERN_TABLE_1);
            self.chr_high = Some(high);
            bus.redraw();
        }
    }
}

/// CHR registers count 4 KiB banks, twice the 8 KiB bank count.
fn chr_bank_number(value: u8, bus: &MapperBus<'_>) -> usize {
    (value & CHR_BANK_MASK) as usize % (bus.chr_bank_count() * 2).max(1)
}

impl Mapper for Mapper1 {
    fn on_load(&mut self, bus: &mut MapperBus<'_>) {
        bus.install_power_on_banks();
        self.prg_low = Some(0);
        self.prg_high = Some(bus.prg_bank_count().saturating_sub(1));
        if !bus.has_chr_ram() {
            self.chr_low = Some(0);
            self.chr_high = Some(1);
        }
    }

    fn on_write(&mut self, addr: u16, value: u8, bus: &mut MapperBus<'_>) -> WriteOutcome {
        if addr < cpu_mem::PRG_ROM_START {
            return prg_ram_outcome(addr);
        }

        if value & RESET_BIT != 0 {
            self.shift = 0;
            self.shift_count = 0;
            self.prg_mode = 3;
            self.apply_prg(bus);
            return WriteOutcome::SUPPRESS;
        }

        self.shift |= (value & 1) << self.shift_count;
        self.shift_count += 1;
        if self.shift_count == SHIFT_LEN {
            let committed = self.shift;
            self.shift = 0;
            self.shift_count = 0;
            self.commit(addr, committed, bus);
        }
        WriteOutcome::SUPPRESS
    }
}

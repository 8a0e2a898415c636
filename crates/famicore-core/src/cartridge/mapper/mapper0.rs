//! Mapper 0 (NROM).
//!
//! No bank switching at all: the power-on layout installed by
//! [`Mapper::on_load`] stays for the life of the cartridge. A 16 KiB board
//! shows its single bank in both program windows.
//!
//! - **PRG**: `$8000-$BFFF` first bank, `$C000-$FFFF` last bank.
//! - **PRG RAM**: `$6000-$7FFF`, stored by the bus.
//! - **CHR**: 8 KiB ROM or RAM at PPU `$0000-$1FFF`.

use crate::cartridge::mapper::{Mapper, MapperBus, WriteOutcome, prg_ram_outcome};

#[derive(Debug, Clone, Default)]
pub struct Mapper0;

impl Mapper0 {
    pub fn new() -> Self {
        Self
    }
}

impl Mapper for Mapper0 {
    fn on_write(&mut self, addr: u16, _value: u8, _bus: &mut MapperBus<'_>) -> WriteOutcome {
        prg_ram_outcome(addr)
    }
}

use tracing::debug;

use crate::{
    cartridge::mapper::{Mapper, MapperBus, WriteOutcome, prg_ram_outcome},
    memory::{cpu as cpu_mem, ppu as ppu_mem},
};

// Mapper 3 – CNROM 8 KiB CHR banking.
//
// | Area | Address range     | Behaviour                                  |
// |------|-------------------|--------------------------------------------|
// | CPU  | `$6000-$7FFF`     | PRG-RAM, stored by the bus                 |
// | CPU  | `$8000-$FFFF`     | Fixed PRG-ROM, any write selects CHR bank  |
// | PPU  | `$0000-$1FFF`     | 8 KiB switchable CHR-ROM bank              |

#[derive(Debug, Clone, Default)]
pub struct Mapper3 {
    /// CHR bank copied into the pattern tables. Power-on installs bank 0.
    committed: usize,
}

impl Mapper3 {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Mapper for Mapper3 {
    fn on_write(&mut self, addr: u16, value: u8, bus: &mut MapperBus<'_>) -> WriteOutcome {
        if addr < cpu_mem::PRG_ROM_START {
            return prg_ram_outcome(addr);
        }

        let count = bus.chr_bank_count();
        if count == 0 {
            return WriteOutcome::SUPPRESS;
        }
        let bank = value as usize % count;
        if bank != self.committed {
            debug!(bank, "CNROM CHR bank switch");
            // The bulk load flags both pattern tables dirty.
            bus.load_chr(bank, ppu_mem::PATTERN_TABLE_0);
            self.committed = bank;
        }
        WriteOutcome::SUPPRESS
    }
}

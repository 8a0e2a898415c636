use tracing::debug;

use crate::{
    cartridge::mapper::{Mapper, MapperBus, WriteOutcome, prg_ram_outcome},
    memory::cpu as cpu_mem,
};

// Mapper 2 – UxROM simple 16 KiB PRG banking.
//
// | Area | Address range     | Behaviour                                  |
// |------|-------------------|--------------------------------------------|
// | CPU  | `$6000-$7FFF`     | PRG-RAM, stored by the bus                 |
// | CPU  | `$8000-$BFFF`     | 16 KiB switchable PRG-ROM bank             |
// | CPU  | `$C000-$FFFF`     | 16 KiB fixed PRG-ROM bank (last)           |
// | PPU  | `$0000-$1FFF`     | CHR ROM/RAM (no mapper-side CHR banking)   |

/// Bank select bits honoured by the latch.
const BANK_SELECT_MASK: u8 = 0x0F;

#[derive(Debug, Clone, Default)]
pub struct Mapper2 {
    /// Bank currently copied into `$8000-$BFFF`, `None` until the first switch.
    committed: Option<usize>,
}

impl Mapper2 {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Mapper for Mapper2 {
    fn on_write(&mut self, addr: u16, value: u8, bus: &mut MapperBus<'_>) -> WriteOutcome {
        if addr < cpu_mem::PRG_ROM_START {
            return prg_ram_outcome(addr);
        }

        let bank = (value & BANK_SELECT_MASK) as usize % bus.prg_bank_count().max(1);
        if self.committed != Some(bank) {
            debug!(bank, "UxROM PRG bank switch");
            bus.load_prg(bank, cpu_mem::PRG_ROM_START);
            self.committed = Some(bank);
        }
        WriteOutcome::SUPPRESS
    }
}

//! Address maps of the two buses.
//!
//! The decoders in `bus::cpu` and `ppu::video_bus` match on these ranges
//! directly, so the tables below are the single source for both maps.

/// CPU address map.
pub mod cpu {
    pub const ADDRESS_SPACE_SIZE: usize = 0x1_0000;

    /// The stack lives in `$0100-$01FF`.
    pub const STACK_PAGE_START: u16 = 0x0100;

    // Interrupt vectors, low byte first.
    pub const NMI_VECTOR_LO: u16 = 0xFFFA;
    pub const RESET_VECTOR_LO: u16 = 0xFFFC;
    pub const IRQ_VECTOR_LO: u16 = 0xFFFE;

    /// 2 KiB of work RAM, repeated four times up to here.
    pub const INTERNAL_RAM_MIRROR_END: u16 = 0x1FFF;
    pub const INTERNAL_RAM_SIZE: usize = 0x0800;
    pub const INTERNAL_RAM_MASK: u16 = (INTERNAL_RAM_SIZE as u16) - 1;

    /// Eight PPU ports repeated every 8 bytes.
    pub const PPU_REGISTER_BASE: u16 = 0x2000;
    pub const PPU_REGISTER_END: u16 = 0x3FFF;

    /// Pulse, triangle, noise and DMC ports.
    pub const APU_REGISTER_BASE: u16 = 0x4000;
    pub const APU_REGISTER_END: u16 = 0x4013;
    /// Writing page `N` copies `$N00-$NFF` into OAM.
    pub const OAM_DMA: u16 = 0x4014;
    pub const APU_STATUS: u16 = 0x4015;
    /// Strobe on write, serial button bit on read.
    pub const CONTROLLER_PORT_1: u16 = 0x4016;
    /// Frame counter on write. Reads belong to the second pad, which is absent.
    pub const APU_FRAME_COUNTER: u16 = 0x4017;

    /// CPU test-mode ports, disabled on retail consoles.
    pub const TEST_MODE_BASE: u16 = 0x4018;
    pub const TEST_MODE_END: u16 = 0x401F;

    /// Everything from here up is decoded by the cartridge.
    pub const CARTRIDGE_SPACE_BASE: u16 = 0x4020;
    /// Work RAM on the cartridge board.
    pub const PRG_RAM_START: u16 = 0x6000;
    pub const PRG_RAM_END: u16 = 0x7FFF;
    /// Low 16 KiB program window.
    pub const PRG_ROM_START: u16 = 0x8000;
    /// High 16 KiB program window.
    pub const PRG_ROM_HIGH_START: u16 = 0xC000;
    pub const CPU_ADDR_END: u16 = 0xFFFF;
}

/// PPU address map and CPU-side port numbers.
pub mod ppu {
    const REGISTER_SELECT_MASK: u16 = 0x0007;

    /// The 14-bit video address space wraps at 16 KiB.
    pub const VRAM_MIRROR_MASK: u16 = 0x3FFF;

    pub const PATTERN_TABLE_0: u16 = 0x0000;
    pub const PATTERN_TABLE_1: u16 = 0x1000;
    pub const PATTERN_TABLE_SIZE: usize = 0x1000;
    /// Both pattern tables, one 8 KiB CHR bank.
    pub const CHR_SIZE: usize = 0x2000;

    pub const NAMETABLE_BASE: u16 = 0x2000;
    /// `$3000-$3EFF` folds back onto `$2000-$2EFF`.
    pub const NAMETABLE_MIRROR_BASE: u16 = 0x3000;
    pub const NAMETABLE_SIZE: usize = 0x0400;
    /// 960 tile bytes come first, then 64 attribute bytes.
    pub const ATTRIBUTE_TABLE_OFFSET: usize = 0x03C0;

    pub const PALETTE_BASE: u16 = 0x3F00;
    /// 32 palette cells, repeated through `$3FFF`.
    pub const PALETTE_MASK: u16 = 0x001F;

    /// 64 sprites of 4 bytes.
    pub const OAM_RAM_SIZE: usize = 0x100;

    /// PPU ports as seen from the CPU.
    #[repr(u16)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Register {
        Control = 0x2000,
        Mask = 0x2001,
        Status = 0x2002,
        OamAddr = 0x2003,
        OamData = 0x2004,
        Scroll = 0x2005,
        Addr = 0x2006,
        Data = 0x2007,
    }

    impl Register {
        pub const fn addr(self) -> u16 {
            self as u16
        }

        /// Port selected by any address in `$2000-$3FFF`.
        pub const fn from_cpu_addr(addr: u16) -> Self {
            match addr & REGISTER_SELECT_MASK {
                0 => Self::Control,
                1 => Self::Mask,
                2 => Self::Status,
                3 => Self::OamAddr,
                4 => Self::OamData,
                5 => Self::Scroll,
                6 => Self::Addr,
                _ => Self::Data,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ppu::Register;

    #[test]
    fn register_mirrors_decode_every_eight_bytes() {
        assert_eq!(Register::from_cpu_addr(0x2002), Register::Status);
        assert_eq!(Register::from_cpu_addr(0x3FFA), Register::Status);
        assert_eq!(Register::from_cpu_addr(0x200F), Register::Data);
        assert_eq!(Register::Scroll.addr(), 0x2005);
    }
}

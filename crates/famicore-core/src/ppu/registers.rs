//! CPU-visible PPU register state.
//!
//! Bit layouts live in the submodules; [`Registers`] bundles them with the
//! OAM pointer, the `$2006` address and the scroll latch.

mod control;
mod mask;
mod scroll;
mod status;

pub(crate) use control::Control;
pub(crate) use mask::Mask;
pub(crate) use scroll::ScrollRegisters;
pub(crate) use status::Status;

use crate::{memory::ppu as ppu_mem, ram::ppu::OamRam};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Registers {
    pub(crate) control: Control,
    pub(crate) mask: Mask,
    pub(crate) status: Status,
    pub(crate) oam_addr: u8,
    /// Primary sprite memory, 64 entries of Y, tile, attributes, X.
    pub(crate) oam: OamRam,
    pub(crate) scroll: ScrollRegisters,
    /// Address used by `$2007`, assembled by two `$2006` writes.
    pub(crate) vram_addr: u16,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    pub(crate) fn new() -> Self {
        Self {
            control: Control::default(),
            mask: Mask::default(),
            // The PPU powers up inside vblank.
            status: Status::VERTICAL_BLANK,
            oam_addr: 0,
            oam: OamRam::new(),
            scroll: ScrollRegisters::default(),
            vram_addr: 0,
        }
    }

    pub(crate) fn write_oam_data(&mut self, value: u8) {
        self.oam.write(self.oam_addr as usize, value);
        self.oam_addr = self.oam_addr.wrapping_add(1);
    }

    pub(crate) fn read_oam_data(&self) -> u8 {
        self.oam.read(self.oam_addr as usize)
    }

    /// Steps the `$2007` address by 1 or 32.
    pub(crate) fn advance_vram_addr(&mut self) {
        self.vram_addr =
            self.vram_addr.wrapping_add(self.control.vram_increment()) & ppu_mem::VRAM_MIRROR_MASK;
    }
}

use bitflags::bitflags;

bitflags! {
    /// `$2000` PPUCTRL.
    ///
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// V P H B S I N N
    /// ```
    /// - `NN`: nametable quadrant the picture starts in
    /// - `I`: `$2007` address step (0 = +1, 1 = +32)
    /// - `S`: pattern table for 8x8 sprites
    /// - `B`: pattern table for the background
    /// - `H`: 8x16 sprites
    /// - `P`: master/slave select, not emulated
    /// - `V`: raise NMI when vblank starts
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub(crate) struct Control: u8 {
        const NAMETABLE = 0b0000_0011;
        const INCREMENT_32 = 0b0000_0100;
        const SPRITE_TABLE = 0b0000_1000;
        const BACKGROUND_TABLE = 0b0001_0000;
        const SPRITE_SIZE_16 = 0b0010_0000;
        const MASTER_SLAVE = 0b0100_0000;
        const GENERATE_NMI = 0b1000_0000;
    }
}

impl Control {
    /// Nametable select bits (0..=3).
    pub(crate) fn nametable_index(self) -> u8 {
        self.bits() & 0b11
    }

    pub(crate) fn vram_increment(self) -> u16 {
        if self.contains(Control::INCREMENT_32) {
            32
        } else {
            1
        }
    }

    /// Pattern table (0 or 1) used by 8x8 sprites.
    pub(crate) fn sprite_table(self) -> usize {
        usize::from(self.contains(Control::SPRITE_TABLE))
    }

    /// Pattern table (0 or 1) used by the background.
    pub(crate) fn background_table(self) -> usize {
        usize::from(self.contains(Control::BACKGROUND_TABLE))
    }

    pub(crate) fn use_8x16_sprites(self) -> bool {
        self.contains(Control::SPRITE_SIZE_16)
    }

    pub(crate) fn nmi_enabled(self) -> bool {
        self.contains(Control::GENERATE_NMI)
    }

    pub(crate) fn with_nametable(self, index: u8) -> Self {
        Self::from_bits_retain((self.bits() & !Control::NAMETABLE.bits()) | (index & 0b11))
    }
}

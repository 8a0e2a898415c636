use bitflags::bitflags;

bitflags! {
    /// `$2002` PPUSTATUS.
    ///
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// V S O . . . . .
    /// ```
    /// Sprite overflow is never raised.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub(crate) struct Status: u8 {
        const SPRITE_OVERFLOW = 0b0010_0000;
        const SPRITE_ZERO_HIT = 0b0100_0000;
        /// Cleared by every `$2002` read.
        const VERTICAL_BLANK = 0b1000_0000;
    }
}

/// The `t` latch as the scroll and address ports see it.
///
/// `t` is kept as two bytes instead of a 15-bit word: `t_hi` holds fine Y
/// (bits 4-6) and the top of coarse Y (bits 0-1), `t_lo` holds the rest of
/// coarse Y (bits 5-7) and coarse X (bits 0-4). The nametable bits live in
/// PPUCTRL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct ScrollRegisters {
    pub(crate) t_hi: u8,
    pub(crate) t_lo: u8,
    /// Fine X (0..=7).
    pub(crate) x: u8,
    /// Shared `$2005`/`$2006` write toggle: `true` means the next write is the second.
    pub(crate) w: bool,
}

impl ScrollRegisters {
    /// `$2005`. Returns `true` when this write completed the pair.
    pub(crate) fn write_scroll(&mut self, value: u8) -> bool {
        if !self.w {
            self.x = value & 0b111;
            self.t_lo = (self.t_lo & 0xE0) | (value >> 3);
            self.w = true;
            false
        } else {
            self.t_hi = (((value & 0b111) << 4) | ((value >> 6) & 0b11)) & 0x7F;
            self.t_lo = (self.t_lo & 0x1F) | ((value << 2) & 0xE0);
            self.w = false;
            true
        }
    }

    /// Horizontal scroll in pixels.
    pub(crate) fn scroll_x(&self) -> u8 {
        (self.t_lo << 3) | self.x
    }

    /// Vertical scroll in pixels; values past the last row read as negative.
    pub(crate) fn scroll_y(&self) -> i32 {
        let high = (self.t_hi & 0b11) << 6;
        let mid = (self.t_lo >> 2) & 0x38;
        let fine = (self.t_hi >> 4) & 0b111;
        let y = i32::from(high | mid | fine);
        if y > 239 { y - 256 } else { y }
    }

    pub(crate) fn reset_latch(&mut self) {
        self.w = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scrolled(x: u8, y: u8) -> ScrollRegisters {
        let mut regs = ScrollRegisters::default();
        assert!(!regs.write_scroll(x));
        assert!(regs.write_scroll(y));
        regs
    }

    #[test]
    fn scroll_pair_round_trips_coordinates() {
        let regs = scrolled(0x7D, 0x5E);
        assert_eq!(regs.scroll_x(), 0x7D);
        assert_eq!(regs.scroll_y(), 0x5E);
        assert!(!regs.w);
    }

    #[test]
    fn rows_past_239_are_negative() {
        assert_eq!(scrolled(0, 248).scroll_y(), -8);
        assert_eq!(scrolled(0, 239).scroll_y(), 239);
    }

    #[test]
    fn first_write_keeps_coarse_y() {
        let mut regs = scrolled(0, 0xE8);
        regs.write_scroll(0x10);
        assert_eq!(regs.scroll_x(), 0x10);
        assert_eq!(regs.t_lo & 0xE0, (0xE8u8 << 2) & 0xE0);
    }
}

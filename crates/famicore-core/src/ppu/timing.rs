//! NTSC frame timing expressed in CPU cycles.
//!
//! Rendering is not clocked dot by dot. The whole visible picture is produced
//! in one go once the frame passes [`RENDER_START_CYCLE`], and these helpers
//! translate between a screen position and the CPU cycle at which the beam
//! would reach it.

use crate::ppu::SCREEN_WIDTH;

pub const CPU_CYCLES_PER_FRAME: u64 = 29_780;
pub const PPU_DOTS_PER_CPU_CYCLE: i64 = 3;
pub const DOTS_PER_SCANLINE: i64 = 341;
/// Cycles between vblank start (frame cycle 0) and the first rendered row.
pub const RENDER_START_CYCLE: u64 = 2_273;
pub const OAM_DMA_CYCLES: u64 = 514;

/// Dot within a scanline after which the horizontal scroll of the next row
/// has already been latched.
const LATE_DOT: i64 = 250;

/// CPU cycle at which the beam draws pixel `index` (row-major, 256 per row).
///
/// Row numbering starts one line early to account for the pre-render line.
pub fn pixel_to_cycle(index: usize) -> u64 {
    let row = (index / SCREEN_WIDTH) as i64 + 1;
    let col = (index % SCREEN_WIDTH) as i64;
    let dots = row * DOTS_PER_SCANLINE + col;
    dots.div_euclid(PPU_DOTS_PER_CPU_CYCLE) as u64 + RENDER_START_CYCLE
}

/// Screen row a register write at `cycle` takes effect from.
///
/// Negative before rendering starts.
pub fn cycle_to_row(cycle: u64) -> i64 {
    let dots = (cycle as i64 - RENDER_START_CYCLE as i64) * PPU_DOTS_PER_CPU_CYCLE;
    let mut row = dots.div_euclid(DOTS_PER_SCANLINE);
    // Truncating remainder: a negative offset never rounds up.
    if dots % DOTS_PER_SCANLINE > LATE_DOT {
        row += 1;
    }
    row
}

/// First pixel index a mid-frame recomposite starting at `cycle` must cover.
pub fn redraw_start(cycle: u64) -> usize {
    cycle_to_row(cycle).max(0) as usize * SCREEN_WIDTH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_pixel_follows_the_prerender_line() {
        assert_eq!(pixel_to_cycle(0), 2_273 + 341 / 3);
    }

    #[test]
    fn pixel_cycle_counts_whole_rows() {
        // Row 10, column 100 is beam row 11.
        let index = 10 * SCREEN_WIDTH + 100;
        assert_eq!(pixel_to_cycle(index), (11 * 341 + 100) / 3 + 2_273);
    }

    #[test]
    fn row_lookup_rounds_late_dots_up() {
        // 341 dots in: start of row 1.
        let start_of_row_one = RENDER_START_CYCLE + 341 / 3 + 1;
        assert_eq!(cycle_to_row(start_of_row_one), 1);
        // Past dot 250 the write lands on the next row.
        assert_eq!(cycle_to_row(RENDER_START_CYCLE + 84), 1);
        assert_eq!(cycle_to_row(RENDER_START_CYCLE + 83), 0);
    }

    #[test]
    fn writes_before_rendering_redraw_everything() {
        assert!(cycle_to_row(100) < 0);
        assert_eq!(redraw_start(100), 0);
        assert_eq!(redraw_start(RENDER_START_CYCLE + 84), SCREEN_WIDTH);
    }
}

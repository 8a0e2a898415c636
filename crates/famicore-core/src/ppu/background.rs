//! Background layer.
//!
//! Up to four nametable quadrants are decoded into a 512x480 "super
//! background", laid out as
//!
//! ```text
//! +-----+-----+
//! |  0  |  1  |
//! +-----+-----+
//! |  2  |  3  |
//! +-----+-----+
//! ```
//!
//! and the visible 256x240 window is then cut out of it at the scroll offset,
//! wrapping in both directions.

use crate::{
    memory::ppu as ppu_mem,
    ppu::{
        SCREEN_HEIGHT, SCREEN_WIDTH,
        tiles::{TILE_SIZE, TileCache, colorize},
    },
};

pub(crate) const SUPER_WIDTH: usize = SCREEN_WIDTH * 2;
pub(crate) const SUPER_HEIGHT: usize = SCREEN_HEIGHT * 2;

const TILES_PER_ROW: usize = 32;
const TILE_ROWS: usize = 30;
/// Columns hidden by the left-edge mask.
pub(crate) const LEFT_MASK_WIDTH: usize = 8;

#[derive(Debug, Clone)]
pub(crate) struct Background {
    full: Box<[u8]>,
    /// Clipped visible window.
    view: Box<[u8]>,
    drawn: [bool; 4],
}

impl Default for Background {
    fn default() -> Self {
        Self::new()
    }
}

impl Background {
    pub(crate) fn new() -> Self {
        Self {
            full: vec![0; SUPER_WIDTH * SUPER_HEIGHT].into_boxed_slice(),
            view: vec![0; SCREEN_WIDTH * SCREEN_HEIGHT].into_boxed_slice(),
            drawn: [false; 4],
        }
    }

    pub(crate) fn view(&self) -> &[u8] {
        &self.view
    }

    pub(crate) fn is_drawn(&self, quadrant: usize) -> bool {
        self.drawn[quadrant]
    }

    /// Forgets which quadrants were drawn this frame.
    pub(crate) fn invalidate(&mut self) {
        self.drawn = [false; 4];
    }

    /// Decodes one nametable into its quadrant of the super background.
    pub(crate) fn draw_quadrant(
        &mut self,
        quadrant: usize,
        nametable: &[u8],
        tiles: &TileCache,
        table: usize,
        palettes: [[u8; 4]; 4],
    ) {
        let origin_x = (quadrant & 1) * SCREEN_WIDTH;
        let origin_y = (quadrant >> 1) * SCREEN_HEIGHT;

        for tile_row in 0..TILE_ROWS {
            for tile_col in 0..TILES_PER_ROW {
                let cell = tile_row * TILES_PER_ROW + tile_col;
                let palette = palettes[attribute_palette(nametable, tile_row, tile_col)];
                let tile = colorize(tiles.tile(table, nametable[cell]), palette);

                let x = origin_x + tile_col * TILE_SIZE;
                let y = origin_y + tile_row * TILE_SIZE;
                for (row, pixels) in tile.chunks_exact(TILE_SIZE).enumerate() {
                    let start = (y + row) * SUPER_WIDTH + x;
                    self.full[start..start + TILE_SIZE].copy_from_slice(pixels);
                }
            }
        }
        self.drawn[quadrant] = true;
    }

    /// Cuts the visible window at (`scroll_x`, `scroll_y`) out of the super
    /// background. `blank_left` fills the first 8 columns with that color.
    pub(crate) fn clip(&mut self, scroll_x: usize, scroll_y: usize, blank_left: Option<u8>) {
        for y in 0..SCREEN_HEIGHT {
            let src_row = ((y + scroll_y) % SUPER_HEIGHT) * SUPER_WIDTH;
            let dst = &mut self.view[y * SCREEN_WIDTH..(y + 1) * SCREEN_WIDTH];
            for (x, px) in dst.iter_mut().enumerate() {
                *px = self.full[src_row + (x + scroll_x) % SUPER_WIDTH];
            }
            if let Some(color) = blank_left {
                dst[..LEFT_MASK_WIDTH].fill(color);
            }
        }
    }
}

/// Palette number (0..=3) the attribute table assigns to a tile cell.
///
/// One attribute byte covers a 4x4-tile block; each 2-bit field covers 2x2.
fn attribute_palette(nametable: &[u8], tile_row: usize, tile_col: usize) -> usize {
    let byte_index = (tile_row / 4) * 8 + tile_col / 4;
    let byte = nametable[ppu_mem::ATTRIBUTE_TABLE_OFFSET + byte_index];
    let shift = ((((tile_row % 4) / 2) << 1) | ((tile_col % 4) / 2)) * 2;
    ((byte >> shift) & 0b11) as usize
}

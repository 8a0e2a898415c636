//! Decoded pattern-table cache.
//!
//! Each pattern table holds 256 tiles of 16 bytes (two bit planes). Rendering
//! works on the decoded form: 64 two-bit color numbers per tile, row-major.
//! A table is re-decoded only when the video bus reports it dirty.

use crate::memory::ppu as ppu_mem;

pub(crate) const TILE_SIZE: usize = 8;
pub(crate) const TILES_PER_TABLE: usize = 256;
const BYTES_PER_TILE: usize = 16;

/// 8x8 color numbers (0..=3), or palette entries once colored.
pub(crate) type Tile = [u8; TILE_SIZE * TILE_SIZE];

#[derive(Debug, Clone)]
pub(crate) struct TileCache {
    tables: [Box<[Tile]>; 2],
}

impl Default for TileCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TileCache {
    pub(crate) fn new() -> Self {
        let empty = || vec![[0u8; TILE_SIZE * TILE_SIZE]; TILES_PER_TABLE].into_boxed_slice();
        Self {
            tables: [empty(), empty()],
        }
    }

    /// Decodes all 256 tiles of `table` from its raw 4 KiB of pattern bytes.
    pub(crate) fn rebuild(&mut self, table: usize, pattern: &[u8]) {
        debug_assert_eq!(pattern.len(), ppu_mem::PATTERN_TABLE_SIZE);
        for (tile, bytes) in self.tables[table & 1]
            .iter_mut()
            .zip(pattern.chunks_exact(BYTES_PER_TILE))
        {
            *tile = decode_tile(bytes);
        }
    }

    pub(crate) fn tile(&self, table: usize, index: u8) -> &Tile {
        &self.tables[table & 1][index as usize]
    }
}

/// Combines the low and high bit planes of one tile.
pub(crate) fn decode_tile(bytes: &[u8]) -> Tile {
    let mut tile = [0u8; TILE_SIZE * TILE_SIZE];
    for row in 0..TILE_SIZE {
        let low = bytes[row];
        let high = bytes[row + TILE_SIZE];
        for col in 0..TILE_SIZE {
            let shift = 7 - col;
            tile[row * TILE_SIZE + col] = ((low >> shift) & 1) | (((high >> shift) & 1) << 1);
        }
    }
    tile
}

/// Maps color numbers through a 4-entry palette.
pub(crate) fn colorize(tile: &Tile, palette: [u8; 4]) -> Tile {
    tile.map(|color| palette[(color & 3) as usize])
}

pub(crate) fn flip_horizontal(tile: &mut Tile) {
    for row in tile.chunks_exact_mut(TILE_SIZE) {
        row.reverse();
    }
}

pub(crate) fn flip_vertical(tile: &mut Tile) {
    for row in 0..TILE_SIZE / 2 {
        let (upper, lower) = tile.split_at_mut((TILE_SIZE - 1 - row) * TILE_SIZE);
        upper[row * TILE_SIZE..(row + 1) * TILE_SIZE].swap_with_slice(&mut lower[..TILE_SIZE]);
    }
}

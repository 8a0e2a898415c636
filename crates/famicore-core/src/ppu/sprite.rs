use bitflags::bitflags;

use crate::ppu::{
    SCREEN_HEIGHT, SCREEN_WIDTH,
    background::LEFT_MASK_WIDTH,
    registers::Control,
    tiles::{TILE_SIZE, Tile, TileCache, colorize, flip_horizontal, flip_vertical},
    video_bus::SPRITE_TRANSPARENT,
};

pub(crate) const SPRITE_COUNT: usize = 64;
const BYTES_PER_SPRITE: usize = 4;
/// Last column at which a sprite-zero hit can register.
const HIT_LAST_COLUMN: usize = SCREEN_WIDTH - 2;

bitflags! {
    /// Attribute bits stored in sprite byte 2.
    ///
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// V H P . . . p p
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub(crate) struct SpriteAttributes: u8 {
        /// Sprite palette select (0..=3).
        const PALETTE = 0b0000_0011;
        /// Drawn behind opaque background pixels.
        const BEHIND_BACKGROUND = 0b0010_0000;
        const FLIP_HORIZONTAL = 0b0100_0000;
        const FLIP_VERTICAL = 0b1000_0000;
    }
}

/// One decoded OAM entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Sprite {
    /// Top row on screen. OAM stores the row above.
    pub(crate) y: usize,
    pub(crate) x: usize,
    pub(crate) tile: u8,
    pub(crate) attributes: SpriteAttributes,
}

impl Sprite {
    pub(crate) fn from_oam(oam: &[u8], index: usize) -> Self {
        let base = index * BYTES_PER_SPRITE;
        Self {
            y: oam[base] as usize + 1,
            tile: oam[base + 1],
            attributes: SpriteAttributes::from_bits_retain(oam[base + 2]),
            x: oam[base + 3] as usize,
        }
    }

    fn palette(&self) -> usize {
        (self.attributes & SpriteAttributes::PALETTE).bits() as usize
    }

    /// Pattern table and first tile number, honouring 8x16 mode.
    fn table_and_tile(&self, control: Control) -> (usize, u8) {
        if control.use_8x16_sprites() {
            ((self.tile & 1) as usize, self.tile & 0xFE)
        } else {
            (control.sprite_table(), self.tile)
        }
    }

    fn oriented(&self, tile: &Tile) -> Tile {
        let mut tile = *tile;
        if self.attributes.contains(SpriteAttributes::FLIP_HORIZONTAL) {
            flip_horizontal(&mut tile);
        }
        if self.attributes.contains(SpriteAttributes::FLIP_VERTICAL) {
            flip_vertical(&mut tile);
        }
        tile
    }
}

/// Full-frame sprite layers in front of and behind the background.
#[derive(Debug, Clone)]
pub(crate) struct SpriteLayers {
    pub(crate) front: Box<[u8]>,
    pub(crate) back: Box<[u8]>,
}

impl Default for SpriteLayers {
    fn default() -> Self {
        Self::new()
    }
}

impl SpriteLayers {
    pub(crate) fn new() -> Self {
        let layer = || vec![SPRITE_TRANSPARENT; SCREEN_WIDTH * SCREEN_HEIGHT].into_boxed_slice();
        Self {
            front: layer(),
            back: layer(),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.front.fill(SPRITE_TRANSPARENT);
        self.back.fill(SPRITE_TRANSPARENT);
    }

    /// Draws all 64 sprites. Lower OAM indices win overlapping pixels.
    pub(crate) fn draw_all(
        &mut self,
        oam: &[u8],
        tiles: &TileCache,
        control: Control,
        palettes: [[u8; 4]; 4],
    ) {
        for index in 0..SPRITE_COUNT {
            let sprite = Sprite::from_oam(oam, index);
            let (table, first) = sprite.table_and_tile(control);
            let palette = palettes[sprite.palette()];
            let layer = if sprite.attributes.contains(SpriteAttributes::BEHIND_BACKGROUND) {
                &mut self.back
            } else {
                &mut self.front
            };

            if control.use_8x16_sprites() {
                // A vertically flipped 8x16 sprite also swaps its halves.
                let (top, bottom) = if sprite.attributes.contains(SpriteAttributes::FLIP_VERTICAL) {
                    (first + 1, first)
                } else {
                    (first, first + 1)
                };
                for (offset, number) in [(0, top), (TILE_SIZE, bottom)] {
                    let tile = sprite.oriented(&colorize(tiles.tile(table, number), palette));
                    blit(&mut layer[..], &tile, sprite.x, sprite.y + offset);
                }
            } else {
                let tile = sprite.oriented(&colorize(tiles.tile(table, first), palette));
                blit(&mut layer[..], &tile, sprite.x, sprite.y);
            }
        }
    }

    /// Hides sprites in the first 8 columns.
    pub(crate) fn mask_left(&mut self) {
        for layer in [&mut self.front, &mut self.back] {
            for row in layer.chunks_exact_mut(SCREEN_WIDTH) {
                row[..LEFT_MASK_WIDTH].fill(SPRITE_TRANSPARENT);
            }
        }
    }
}

/// Copies opaque pixels into free slots of `layer`, clipping at the screen edge.
fn blit(layer: &mut [u8], tile: &Tile, x: usize, y: usize) {
    for row in 0..TILE_SIZE {
        if y + row >= SCREEN_HEIGHT {
            break;
        }
        for col in 0..TILE_SIZE {
            if x + col >= SCREEN_WIDTH {
                break;
            }
            let slot = &mut layer[(y + row) * SCREEN_WIDTH + x + col];
            if *slot == SPRITE_TRANSPARENT {
                *slot = tile[row * TILE_SIZE + col];
            }
        }
    }
}

/// Finds the first pixel where an opaque pixel of sprite 0 covers a
/// background pixel other than the universal color.
///
/// Only the first 8x8 tile is tested, also in 8x16 mode. Returns the pixel index.
pub(crate) fn sprite_zero_hit(
    oam: &[u8],
    tiles: &TileCache,
    control: Control,
    background: &[u8],
    universal: u8,
) -> Option<usize> {
    let sprite = Sprite::from_oam(oam, 0);
    let (table, number) = sprite.table_and_tile(control);
    let tile = sprite.oriented(tiles.tile(table, number));

    for row in 0..TILE_SIZE {
        let y = sprite.y + row;
        if y >= SCREEN_HEIGHT {
            break;
        }
        for col in 0..TILE_SIZE {
            let x = sprite.x + col;
            if x > HIT_LAST_COLUMN {
                break;
            }
            if tile[row * TILE_SIZE + col] == 0 {
                continue;
            }
            let index = y * SCREEN_WIDTH + x;
            if background[index] != universal {
                return Some(index);
            }
        }
    }
    None
}

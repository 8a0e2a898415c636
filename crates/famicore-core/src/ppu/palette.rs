//! Fixed 64-entry master palette.
//!
//! Palette RAM stores 6-bit indices into this table. The frame buffer keeps
//! those indices (with the universal-color tag in bit 7) until vblank, when
//! [`to_rgba`] turns them into display pixels.

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Self = Self::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 0xFF]
    }
}

#[rustfmt::skip]
pub const NTSC_PALETTE: [Color; 64] = [
    Color::new(0x75, 0x75, 0x75), Color::new(0x27, 0x1B, 0x8F), Color::new(0x00, 0x00, 0xAB), Color::new(0x47, 0x00, 0x9F),
    Color::new(0x8F, 0x00, 0x77), Color::new(0xAB, 0x00, 0x13), Color::new(0xA7, 0x00, 0x00), Color::new(0x7F, 0x0B, 0x00),
    Color::new(0x43, 0x2F, 0x00), Color::new(0x00, 0x47, 0x00), Color::new(0x00, 0x51, 0x00), Color::new(0x00, 0x3F, 0x17),
    Color::new(0x1B, 0x3F, 0x5F), Color::new(0x00, 0x00, 0x00), Color::new(0x00, 0x00, 0x00), Color::new(0x00, 0x00, 0x00),
    Color::new(0xBC, 0xBC, 0xBC), Color::new(0x00, 0x73, 0xEF), Color::new(0x23, 0x3B, 0xEF), Color::new(0x83, 0x00, 0xF3),
    Color::new(0xBF, 0x00, 0xBF), Color::new(0xE7, 0x00, 0x5B), Color::new(0xDB, 0x2B, 0x00), Color::new(0xCB, 0x4F, 0x0F),
    Color::new(0x8B, 0x73, 0x00), Color::new(0x00, 0x97, 0x00), Color::new(0x00, 0xAB, 0x00), Color::new(0x00, 0x93, 0x3B),
    Color::new(0x00, 0x83, 0x8B), Color::new(0x00, 0x00, 0x00), Color::new(0x00, 0x00, 0x00), Color::new(0x00, 0x00, 0x00),
    Color::new(0xFF, 0xFF, 0xFF), Color::new(0x3F, 0xBF, 0xFF), Color::new(0x5F, 0x97, 0xFF), Color::new(0xA7, 0x8B, 0xFD),
    Color::new(0xF7, 0x7B, 0xFF), Color::new(0xFF, 0x77, 0xB7), Color::new(0xFF, 0x77, 0x63), Color::new(0xFF, 0x9B, 0x3B),
    Color::new(0xF3, 0xBF, 0x3F), Color::new(0x83, 0xD3, 0x13), Color::new(0x4F, 0xDF, 0x4B), Color::new(0x58, 0xF8, 0x98),
    Color::new(0x00, 0xEB, 0xDB), Color::new(0x3C, 0x3C, 0x3C), Color::new(0x00, 0x00, 0x00), Color::new(0x00, 0x00, 0x00),
    Color::new(0xFF, 0xFF, 0xFF), Color::new(0xAB, 0xE7, 0xFF), Color::new(0xC7, 0xD7, 0xFF), Color::new(0xD7, 0xCB, 0xFF),
    Color::new(0xFF, 0xC7, 0xFF), Color::new(0xFF, 0xC7, 0xDB), Color::new(0xFF, 0xBF, 0xB3), Color::new(0xFF, 0xDB, 0xAB),
    Color::new(0xFF, 0xE7, 0xA3), Color::new(0xE3, 0xFF, 0xA3), Color::new(0xAB, 0xF3, 0xBF), Color::new(0xB3, 0xFF, 0xCF),
    Color::new(0x9F, 0xFF, 0xF3), Color::new(0xA0, 0xA0, 0xA0), Color::new(0x00, 0x00, 0x00), Color::new(0x00, 0x00, 0x00),
];

/// Looks up a frame-buffer pixel. Bit 7 is a tag and ignored; anything left
/// outside the table (the sprite sentinel) is black.
pub fn color_of(pixel: u8) -> Color {
    NTSC_PALETTE
        .get((pixel & 0x7F) as usize)
        .copied()
        .unwrap_or(Color::BLACK)
}

/// Converts an index frame into RGBA8888, 4 bytes per pixel.
pub fn to_rgba(indices: &[u8], out: &mut [u8]) {
    for (pixel, dst) in indices.iter().zip(out.chunks_exact_mut(4)) {
        dst.copy_from_slice(&color_of(*pixel).to_rgba());
    }
}

//! PPU-side memory map (`$0000-$3FFF`).
//!
//! | Range         | Target                                            |
//! |---------------|---------------------------------------------------|
//! | `$0000-$1FFF` | Pattern tables (CHR ROM image or CHR-RAM)         |
//! | `$2000-$2FFF` | Four logical nametables, aliased per mirroring    |
//! | `$3000-$3EFF` | Mirror of `$2000-$2EFF`                           |
//! | `$3F00-$3FFF` | 32 palette cells, mirrored every 32 bytes         |
//!
//! Pattern and nametable reads go through a one-byte read-ahead buffer;
//! palette reads are immediate.

use crate::{
    cartridge::Mirroring,
    memory::ppu as ppu_mem,
    ram::ppu::{NametableRam, PatternRam},
};

/// Sprite palette entry 0 is never drawn.
pub const SPRITE_TRANSPARENT: u8 = 0xF0;
/// Marks the universal background color so it never equals a regular entry.
pub const UNIVERSAL_TAG: u8 = 0x80;
/// Palette entries are 6 bits wide.
const COLOR_MASK: u8 = 0x3F;

#[derive(Debug, Clone)]
pub struct VideoBus {
    patterns: PatternRam,
    /// Physical nametable banks; two of them are unused outside four-screen mode.
    nametables: [NametableRam; 4],
    mirroring: Mirroring,
    /// Background palettes. Entry 0 of each holds the tagged universal color.
    bg_palette: [[u8; 4]; 4],
    sprite_palette: [[u8; 4]; 4],
    read_buffer: u8,
    chr_ram: bool,
    pattern_dirty: [bool; 2],
}

impl Default for VideoBus {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoBus {
    pub fn new() -> Self {
        Self {
            patterns: PatternRam::new(),
            nametables: Default::default(),
            mirroring: Mirroring::Horizontal,
            bg_palette: [[0; 4]; 4],
            sprite_palette: [[SPRITE_TRANSPARENT, 0, 0, 0]; 4],
            read_buffer: 0,
            chr_ram: false,
            pattern_dirty: [true, true],
        }
    }

    /// `$2007` read: returns the previously fetched byte for pattern and
    /// nametable space, the live cell for palette space.
    pub fn read(&mut self, addr: u16) -> u8 {
        let addr = addr & ppu_mem::VRAM_MIRROR_MASK;
        if addr >= ppu_mem::PALETTE_BASE {
            return self.read_palette(addr) & COLOR_MASK;
        }
        let fetched = self.peek(addr);
        std::mem::replace(&mut self.read_buffer, fetched)
    }

    /// `$2007` write.
    pub fn write(&mut self, addr: u16, value: u8) {
        let addr = addr & ppu_mem::VRAM_MIRROR_MASK;
        if addr < ppu_mem::NAMETABLE_BASE {
            if self.chr_ram {
                self.patterns.write(addr as usize, value);
                self.pattern_dirty[pattern_table_of(addr)] = true;
            }
        } else if addr < ppu_mem::PALETTE_BASE {
            let (bank, offset) = self.nametable_cell(addr);
            self.nametables[bank].write(offset, value);
        } else {
            self.write_palette(addr, value);
        }
    }

    /// Reads without touching the read-ahead buffer.
    pub fn peek(&self, addr: u16) -> u8 {
        let addr = addr & ppu_mem::VRAM_MIRROR_MASK;
        if addr < ppu_mem::NAMETABLE_BASE {
            self.patterns.read(addr as usize)
        } else if addr < ppu_mem::PALETTE_BASE {
            let (bank, offset) = self.nametable_cell(addr);
            self.nametables[bank].read(offset)
        } else {
            self.read_palette(addr)
        }
    }

    /// Bulk-installs bank contents into pattern space starting at `dest`.
    ///
    /// Every pattern table the copy touches is flagged dirty.
    pub fn load_into(&mut self, source: &[u8], dest: u16) {
        let start = (dest as usize) % ppu_mem::CHR_SIZE;
        let len = source.len().min(ppu_mem::CHR_SIZE - start);
        if len == 0 {
            return;
        }
        self.patterns.load_into(&source[..len], start);
        let first = start / ppu_mem::PATTERN_TABLE_SIZE;
        let last = (start + len - 1) / ppu_mem::PATTERN_TABLE_SIZE;
        for table in first..=last {
            self.pattern_dirty[table] = true;
        }
    }

    pub fn set_mirroring(&mut self, mirroring: Mirroring) {
        self.mirroring = mirroring;
    }

    pub fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    pub fn set_chr_ram(&mut self, chr_ram: bool) {
        self.chr_ram = chr_ram;
    }

    pub fn has_chr_ram(&self) -> bool {
        self.chr_ram
    }

    pub fn is_pattern_dirty(&self, table: usize) -> bool {
        self.pattern_dirty[table & 1]
    }

    /// Returns and clears the dirty flags of both pattern tables.
    pub fn take_pattern_dirty(&mut self) -> [bool; 2] {
        std::mem::take(&mut self.pattern_dirty)
    }

    /// Raw bytes of pattern table `table` (0 or 1).
    pub fn pattern_table(&self, table: usize) -> &[u8] {
        let start = (table & 1) * ppu_mem::PATTERN_TABLE_SIZE;
        &self.patterns[start..start + ppu_mem::PATTERN_TABLE_SIZE]
    }

    /// Physical bank backing logical quadrant `quadrant` (0..=3).
    pub fn nametable(&self, quadrant: usize) -> &[u8] {
        let bank = self.mirroring.banks()[quadrant & 3] as usize;
        &self.nametables[bank]
    }

    pub fn bg_palette(&self, index: usize) -> [u8; 4] {
        self.bg_palette[index & 3]
    }

    pub fn sprite_palette(&self, index: usize) -> [u8; 4] {
        self.sprite_palette[index & 3]
    }

    /// The tagged universal background color.
    pub fn universal(&self) -> u8 {
        self.bg_palette[0][0]
    }

    fn nametable_cell(&self, addr: u16) -> (usize, usize) {
        let addr = if addr >= ppu_mem::NAMETABLE_MIRROR_BASE {
            addr - 0x1000
        } else {
            addr
        };
        let relative = (addr - ppu_mem::NAMETABLE_BASE) as usize;
        let quadrant = (relative / ppu_mem::NAMETABLE_SIZE) & 3;
        let bank = self.mirroring.banks()[quadrant] as usize;
        (bank, relative % ppu_mem::NAMETABLE_SIZE)
    }

    fn read_palette(&self, addr: u16) -> u8 {
        let (sprite, palette, entry) = palette_cell(addr);
        match (sprite, entry) {
            (false, _) => self.bg_palette[palette][entry],
            (true, 0) => self.universal(),
            (true, _) => self.sprite_palette[palette][entry],
        }
    }

    fn write_palette(&mut self, addr: u16, value: u8) {
        let value = value & COLOR_MASK;
        let (sprite, palette, entry) = palette_cell(addr);
        match (sprite, palette, entry) {
            // `$3F00` and its alias `$3F10` set the universal color.
            (_, 0, 0) => {
                for slot in &mut self.bg_palette {
                    slot[0] = value | UNIVERSAL_TAG;
                }
            }
            // Other entry-0 cells are not writable.
            (_, _, 0) => {}
            (false, _, _) => self.bg_palette[palette][entry] = value,
            (true, _, _) => self.sprite_palette[palette][entry] = value,
        }
    }
}

/// Splits a palette address into (is sprite palette, palette, entry).
fn palette_cell(addr: u16) -> (bool, usize, usize) {
    let cell = (addr & ppu_mem::PALETTE_MASK) as usize;
    (cell >= 0x10, (cell >> 2) & 3, cell & 3)
}

fn pattern_table_of(addr: u16) -> usize {
    (addr as usize / ppu_mem::PATTERN_TABLE_SIZE) & 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_mirroring_aliases_quadrants_zero_and_two() {
        let mut bus = VideoBus::new();
        bus.set_mirroring(Mirroring::Vertical);
        bus.write(0x2005, 0x42);
        assert_eq!(bus.peek(0x2805), 0x42);
        assert_eq!(bus.peek(0x2405), 0x00);
    }

    #[test]
    fn horizontal_mirroring_aliases_quadrants_zero_and_one() {
        let mut bus = VideoBus::new();
        bus.set_mirroring(Mirroring::Horizontal);
        bus.write(0x2005, 0x42);
        assert_eq!(bus.peek(0x2405), 0x42);
        assert_eq!(bus.peek(0x2805), 0x00);
    }

    #[test]
    fn upper_nametable_mirror_folds_down() {
        let mut bus = VideoBus::new();
        bus.set_mirroring(Mirroring::FourScreen);
        bus.write(0x3C10, 0x7E);
        assert_eq!(bus.peek(0x2C10), 0x7E);
        assert_eq!(bus.nametable(3)[0x10], 0x7E);
    }

    #[test]
    fn nametable_reads_are_buffered() {
        let mut bus = VideoBus::new();
        bus.write(0x2000, 0x11);
        bus.write(0x2001, 0x22);
        assert_eq!(bus.read(0x2000), 0x00);
        assert_eq!(bus.read(0x2001), 0x11);
        assert_eq!(bus.read(0x2002), 0x22);
    }

    #[test]
    fn palette_reads_are_immediate() {
        let mut bus = VideoBus::new();
        bus.write(0x3F01, 0x16);
        assert_eq!(bus.read(0x3F01), 0x16);
    }

    #[test]
    fn universal_color_is_shared_and_tagged() {
        let mut bus = VideoBus::new();
        bus.write(0x3F00, 0x21);
        assert_eq!(bus.universal(), 0x21 | UNIVERSAL_TAG);
        for palette in 0..4 {
            assert_eq!(bus.bg_palette(palette)[0], 0xA1);
        }
        // Sprite entry 0 reads back the universal color.
        assert_eq!(bus.read(0x3F14), 0x21);
    }

    #[test]
    fn sprite_alias_of_universal_is_writable() {
        let mut bus = VideoBus::new();
        bus.write(0x3F10, 0x05);
        assert_eq!(bus.read(0x3F00), 0x05);
        assert_eq!(bus.sprite_palette(0)[0], SPRITE_TRANSPARENT);
    }

    #[test]
    fn other_entry_zero_cells_ignore_writes() {
        let mut bus = VideoBus::new();
        bus.write(0x3F00, 0x0F);
        bus.write(0x3F04, 0x30);
        bus.write(0x3F18, 0x30);
        assert_eq!(bus.bg_palette(1)[0], 0x0F | UNIVERSAL_TAG);
        assert_eq!(bus.sprite_palette(2)[0], SPRITE_TRANSPARENT);
    }

    #[test]
    fn palette_mirrors_every_32_bytes() {
        let mut bus = VideoBus::new();
        bus.write(0x3F23, 0x2A);
        assert_eq!(bus.bg_palette(0)[3], 0x2A);
    }

    #[test]
    fn chr_rom_is_read_only() {
        let mut bus = VideoBus::new();
        bus.take_pattern_dirty();
        bus.write(0x0010, 0xFF);
        assert_eq!(bus.peek(0x0010), 0);
        assert_eq!(bus.take_pattern_dirty(), [false, false]);
    }

    #[test]
    fn chr_ram_write_marks_its_table_dirty() {
        let mut bus = VideoBus::new();
        bus.set_chr_ram(true);
        bus.take_pattern_dirty();
        bus.write(0x1234, 0xAB);
        assert_eq!(bus.peek(0x1234), 0xAB);
        assert_eq!(bus.take_pattern_dirty(), [false, true]);
    }

    #[test]
    fn bulk_load_marks_touched_tables() {
        let mut bus = VideoBus::new();
        bus.take_pattern_dirty();
        bus.load_into(&[0x55; 0x1000], 0x1000);
        assert!(!bus.is_pattern_dirty(0));
        assert!(bus.is_pattern_dirty(1));
        assert_eq!(bus.pattern_table(1)[0xFFF], 0x55);
    }
}

//! Picture Processing Unit.
//!
//! The PPU is not clocked dot by dot. Once per frame, when the CPU cycle
//! counter passes the end of vblank, [`Ppu::render`] produces the whole
//! 256x240 picture from the current register state:
//!
//! 1. re-decode dirty pattern tables,
//! 2. decode the nametable quadrants the scroll can reach into a 512x480
//!    super background,
//! 3. cut the visible window out of it at the scroll offset,
//! 4. draw all sprites into a front and a back layer and locate the sprite-0
//!    hit,
//! 5. composite sprites and background into the index frame.
//!
//! Register writes that move the picture while the frame is being scanned out
//! (scroll, address, nametable select, CHR bank swaps) re-run steps 2, 3 and 5
//! from the row the beam has reached, which is derived from the CPU cycle.

mod background;
pub mod palette;
mod registers;
mod sprite;
mod tiles;
pub mod timing;
mod video_bus;

use core::fmt;

use tracing::trace;

use crate::{
    cartridge::Mirroring,
    memory::ppu::Register as PpuRegister,
};
use background::{Background, SUPER_HEIGHT};
use registers::{Mask, Registers, Status};
use sprite::{SpriteLayers, sprite_zero_hit};
use tiles::TileCache;

pub use video_bus::{SPRITE_TRANSPARENT, UNIVERSAL_TAG, VideoBus};

pub const SCREEN_WIDTH: usize = 256;
pub const SCREEN_HEIGHT: usize = 240;
pub const FRAME_PIXELS: usize = SCREEN_WIDTH * SCREEN_HEIGHT;

/// Status value reported by the very first `$2002` read after power-on.
const POWER_ON_STATUS: u8 = 0xA0;
/// Background color used while background rendering is off.
const BLANK_BACKGROUND: u8 = 0x0F;

#[derive(Clone)]
pub struct Ppu {
    registers: Registers,
    video: VideoBus,
    tiles: TileCache,
    background: Background,
    sprites: SpriteLayers,
    /// Composited palette indices for the current frame.
    frame: Box<[u8]>,
    /// RGBA image of the last completed frame.
    rgba: Box<[u8]>,
    /// Set between [`Ppu::render`] and the end of vblank entry.
    rendering: bool,
    just_powered_on: bool,
    /// Vertical scroll the picture started with, adjusted by mid-frame
    /// `$2006` writes.
    render_scroll_y: i32,
    sprite_zero_hit: bool,
    /// CPU cycle after which the sprite-0 hit becomes visible in `$2002`.
    hit_after: u64,
}

impl fmt::Debug for Ppu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ppu")
            .field("registers", &self.registers)
            .field("rendering", &self.rendering)
            .field("render_scroll_y", &self.render_scroll_y)
            .field("sprite_zero_hit", &self.sprite_zero_hit)
            .field("hit_after", &self.hit_after)
            .finish_non_exhaustive()
    }
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

impl Ppu {
    pub fn new() -> Self {
        Self {
            registers: Registers::new(),
            video: VideoBus::new(),
            tiles: TileCache::new(),
            background: Background::new(),
            sprites: SpriteLayers::new(),
            frame: vec![SPRITE_TRANSPARENT; FRAME_PIXELS].into_boxed_slice(),
            rgba: vec![0; FRAME_PIXELS * 4].into_boxed_slice(),
            rendering: false,
            just_powered_on: true,
            render_scroll_y: 0,
            sprite_zero_hit: false,
            hit_after: 0,
        }
    }

    pub fn video(&self) -> &VideoBus {
        &self.video
    }

    pub fn video_mut(&mut self) -> &mut VideoBus {
        &mut self.video
    }

    /// Prepares for a freshly loaded cartridge: applies its mirroring and
    /// decodes both pattern tables from the installed CHR data.
    pub fn attach_cartridge(&mut self, mirroring: Mirroring, chr_ram: bool) {
        self.video.set_mirroring(mirroring);
        self.video.set_chr_ram(chr_ram);
        self.video.take_pattern_dirty();
        for table in 0..2 {
            self.tiles.rebuild(table, self.video.pattern_table(table));
        }
        self.background.invalidate();
    }

    /// Drops in-frame rendering state, as a console reset does.
    pub fn reset_rendering(&mut self) {
        self.rendering = false;
        self.sprite_zero_hit = false;
        self.hit_after = 0;
        self.registers.scroll.reset_latch();
    }

    pub fn is_rendering(&self) -> bool {
        self.rendering
    }

    pub fn nmi_enabled(&self) -> bool {
        self.registers.control.nmi_enabled()
    }

    /// Palette indices of the current frame, row-major.
    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    /// RGBA8888 image of the last frame that entered vblank.
    pub fn frame_rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// CPU read from `$2000-$3FFF`. `cycle` is the CPU cycle within the frame.
    pub fn cpu_read(&mut self, addr: u16, cycle: u64) -> u8 {
        match PpuRegister::from_cpu_addr(addr) {
            PpuRegister::Status => self.read_status(cycle),
            PpuRegister::OamData => self.registers.read_oam_data(),
            PpuRegister::Data => {
                let value = self.video.read(self.registers.vram_addr);
                self.registers.advance_vram_addr();
                value
            }
            _ => 0,
        }
    }

    /// CPU write to `$2000-$3FFF`. `cycle` is the CPU cycle within the frame.
    pub fn cpu_write(&mut self, addr: u16, value: u8, cycle: u64) {
        match PpuRegister::from_cpu_addr(addr) {
            PpuRegister::Control => self.write_control(value, cycle),
            PpuRegister::Mask => self.registers.mask = Mask::from_bits_retain(value),
            PpuRegister::Status => {}
            PpuRegister::OamAddr => self.registers.oam_addr = value,
            PpuRegister::OamData => self.registers.write_oam_data(value),
            PpuRegister::Scroll => {
                if self.registers.scroll.write_scroll(value) {
                    self.redraw(cycle);
                }
            }
            PpuRegister::Addr => self.write_addr(value, cycle),
            PpuRegister::Data => {
                self.video.write(self.registers.vram_addr, value);
                self.registers.advance_vram_addr();
            }
        }
    }

    /// `$4014` transfer: replaces all of OAM with `page`.
    pub fn oam_dma(&mut self, page: &[u8]) {
        self.registers.oam.load_into(page, 0);
    }

    fn read_status(&mut self, cycle: u64) -> u8 {
        if self.just_powered_on {
            self.just_powered_on = false;
            return POWER_ON_STATUS;
        }
        let mut status = self.registers.status & Status::VERTICAL_BLANK;
        if self.sprite_zero_hit && cycle > self.hit_after {
            status.insert(Status::SPRITE_ZERO_HIT);
        }
        self.registers.status.remove(Status::VERTICAL_BLANK);
        self.registers.scroll.reset_latch();
        status.bits()
    }

    fn write_control(&mut self, value: u8, cycle: u64) {
        let previous = self.registers.control.nametable_index();
        self.registers.control = registers::Control::from_bits_retain(value);
        if self.registers.control.nametable_index() != previous {
            self.redraw(cycle);
        }
    }

    fn write_addr(&mut self, value: u8, cycle: u64) {
        let scroll = &mut self.registers.scroll;
        if !scroll.w {
            self.registers.vram_addr = u16::from(value & 0x3F) << 8;
            scroll.t_hi = value & 0x3F;
            scroll.w = true;
            self.registers.control = self.registers.control.with_nametable((value >> 2) & 0b11);
        } else {
            scroll.t_lo = value;
            scroll.w = false;
            self.registers.vram_addr |= u16::from(value);
            // The beam has already advanced the vertical position by the
            // rows drawn so far; back that out to get the starting scroll.
            self.render_scroll_y = scroll.scroll_y() - timing::cycle_to_row(cycle) as i32;
            self.redraw(cycle);
        }
    }

    /// Renders the full picture for this frame and enters the rendering state.
    pub fn render(&mut self) {
        self.begin_frame();
        self.draw_nametables();
        self.clip_background();
        self.draw_sprites();
        self.composite(0);
    }

    /// Mid-frame redraw hook. Re-composites from the row the beam reached at
    /// `cycle`; does nothing outside rendering.
    pub(crate) fn redraw(&mut self, cycle: u64) {
        if !self.rendering {
            return;
        }
        trace!(cycle, "mid-frame redraw");
        self.draw_nametables();
        self.clip_background();
        self.composite(timing::redraw_start(cycle));
    }

    /// Publishes the finished frame and raises VBLANK.
    ///
    /// The machine runs one more CPU instruction and then decides on the NMI
    /// before calling [`Ppu::end_rendering`].
    pub fn enter_vblank(&mut self) {
        palette::to_rgba(&self.frame, &mut self.rgba);
        self.registers.status.insert(Status::VERTICAL_BLANK);
    }

    pub fn end_rendering(&mut self) {
        self.rendering = false;
    }

    fn begin_frame(&mut self) {
        self.rendering = true;
        self.refresh_tiles();
        self.background.invalidate();
        self.render_scroll_y = self.registers.scroll.scroll_y();
        self.sprite_zero_hit = false;
        self.hit_after = 0;
        self.registers.status.remove(Status::VERTICAL_BLANK);
    }

    /// Re-decodes dirty pattern tables. Returns `true` if anything changed.
    fn refresh_tiles(&mut self) -> bool {
        let dirty = self.video.take_pattern_dirty();
        for table in 0..2 {
            if dirty[table] {
                self.tiles.rebuild(table, self.video.pattern_table(table));
            }
        }
        dirty.contains(&true)
    }

    fn draw_nametables(&mut self) {
        if !self.registers.mask.background() {
            return;
        }
        if self.refresh_tiles() {
            self.background.invalidate();
        }

        let nametable = self.registers.control.nametable_index();
        // Any scroll at all means the neighbouring quadrant shows up.
        let scrolls_x = i32::from(self.registers.scroll.scroll_x()) + i32::from(nametable & 1) != 0;
        let scrolls_y = self.render_scroll_y + i32::from(nametable >> 1) != 0;
        let needed = [true, scrolls_x, scrolls_y, scrolls_x && scrolls_y];

        let table = self.registers.control.background_table();
        let palettes = [0, 1, 2, 3].map(|i| self.video.bg_palette(i));
        for quadrant in 0..4 {
            if needed[quadrant] && !self.background.is_drawn(quadrant) {
                self.background.draw_quadrant(
                    quadrant,
                    self.video.nametable(quadrant),
                    &self.tiles,
                    table,
                    palettes,
                );
            }
        }
    }

    fn clip_background(&mut self) {
        let nametable = usize::from(self.registers.control.nametable_index());
        let scroll_x = usize::from(self.registers.scroll.scroll_x()) + (nametable & 1) * SCREEN_WIDTH;
        let scroll_y = (self.render_scroll_y + ((nametable >> 1) * SCREEN_HEIGHT) as i32)
            .rem_euclid(SUPER_HEIGHT as i32) as usize;
        let blank_left = (!self.registers.mask.contains(Mask::SHOW_BACKGROUND_LEFT))
            .then(|| self.video.universal());
        self.background.clip(scroll_x, scroll_y, blank_left);
    }

    fn draw_sprites(&mut self) {
        self.sprites.clear();
        let mask = self.registers.mask;
        if mask.sprites() {
            let palettes = [0, 1, 2, 3].map(|i| self.video.sprite_palette(i));
            self.sprites.draw_all(
                &self.registers.oam,
                &self.tiles,
                self.registers.control,
                palettes,
            );
        }
        if !mask.contains(Mask::SHOW_SPRITES_LEFT) {
            self.sprites.mask_left();
        }

        let hit = if mask.sprites() && mask.background() {
            sprite_zero_hit(
                &self.registers.oam,
                &self.tiles,
                self.registers.control,
                self.background.view(),
                self.video.universal(),
            )
        } else {
            None
        };
        self.sprite_zero_hit = hit.is_some();
        if let Some(index) = hit {
            self.hit_after = timing::pixel_to_cycle(index);
            trace!(index, hit_after = self.hit_after, "sprite zero hit scheduled");
        }
    }

    /// Merges the layers into the frame from pixel `start` onwards.
    fn composite(&mut self, start: usize) {
        let mask = self.registers.mask;
        if !mask.rendering_enabled() {
            self.frame.fill(SPRITE_TRANSPARENT);
            return;
        }

        let universal = self.video.universal();
        for index in start.min(FRAME_PIXELS)..FRAME_PIXELS {
            let bg = if mask.background() {
                self.background.view()[index]
            } else {
                BLANK_BACKGROUND
            };
            let (front, back) = if mask.sprites() {
                (self.sprites.front[index], self.sprites.back[index])
            } else {
                (SPRITE_TRANSPARENT, SPRITE_TRANSPARENT)
            };

            self.frame[index] = if front != SPRITE_TRANSPARENT {
                front
            } else if back != SPRITE_TRANSPARENT && bg == universal {
                back
            } else {
                bg
            };
        }
    }
}

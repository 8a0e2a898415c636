use std::path::Path;

use tracing::debug;

use crate::{
    audio::{Audio, SilentAudio},
    bus::CpuBus,
    cartridge::{Cartridge, Rom},
    controller::Button,
    cpu::Cpu,
    ppu::timing,
};

pub mod audio;
pub mod bus;
pub mod cartridge;
pub mod controller;
pub mod cpu;
pub mod error;
pub mod memory;
pub mod ppu;
pub mod ram;

pub use error::Error;

/// The console: a CPU driving a [`CpuBus`] that owns everything else.
///
/// Time is kept in CPU cycles within the current frame. The picture is
/// rendered in one go once the counter passes the end of vblank, and vblank
/// is entered when the counter reaches the frame length, after which the
/// counter starts over from zero.
#[derive(Debug, Clone)]
pub struct Nes {
    cpu: Cpu,
    bus: CpuBus,
    frame_count: u64,
}

impl Default for Nes {
    fn default() -> Self {
        Self::new()
    }
}

impl Nes {
    /// Constructs a powered-on console with no cartridge and silent audio.
    pub fn new() -> Self {
        Self::with_audio(Box::new(SilentAudio::new()))
    }

    /// Constructs a powered-on console feeding the sound registers to `audio`.
    pub fn with_audio(audio: Box<dyn Audio>) -> Self {
        Self {
            cpu: Cpu::new(),
            bus: CpuBus::new(audio),
            frame_count: 0,
        }
    }

    /// Parses an iNES image and inserts it.
    pub fn load_rom(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let rom = Rom::from_ines(bytes)?;
        self.insert_rom(rom)
    }

    /// Reads an iNES file from disk and inserts it.
    pub fn load_rom_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), Error> {
        let rom = cartridge::load_rom_from_file(path)?;
        self.insert_rom(rom)
    }

    /// Inserts a cartridge and power cycles the console.
    ///
    /// Nothing is touched if the ROM names a mapper that is not implemented.
    pub fn insert_rom(&mut self, rom: Rom) -> Result<(), Error> {
        let cartridge = Cartridge::new(rom)?;
        self.bus.insert_cartridge(cartridge);
        self.cpu = Cpu::new();
        self.frame_count = 0;
        self.cpu.request_reset();
        self.cpu.step(&mut self.bus);
        debug!(pc = format_args!("{:#06x}", self.cpu.pc()), "power on");
        Ok(())
    }

    /// Warm reset: CPU registers, mapper banks and PPU rendering state start
    /// over, RAM keeps its contents.
    pub fn reset(&mut self) {
        self.bus.reset();
        self.cpu.request_reset();
        self.cpu.step(&mut self.bus);
    }

    /// Runs one CPU step, rendering and ending the frame when their cycle
    /// thresholds are crossed.
    pub fn step(&mut self) {
        self.render_if_due();
        self.cpu.step(&mut self.bus);
        if self.cpu.cycles() >= timing::CPU_CYCLES_PER_FRAME {
            self.finish_frame();
        }
    }

    /// Runs the CPU to the end of the frame and enters vblank.
    pub fn run_frame(&mut self) {
        while self.cpu.cycles() < timing::CPU_CYCLES_PER_FRAME {
            self.render_if_due();
            self.cpu.step(&mut self.bus);
        }
        self.finish_frame();
    }

    pub fn set_button(&mut self, button: Button, pressed: bool) {
        self.bus.controller_mut().set_button(button, pressed);
    }

    /// Palette indices of the last published frame, 256x240.
    pub fn frame(&self) -> &[u8] {
        self.bus.ppu().frame()
    }

    /// RGBA8888 pixels of the last published frame.
    pub fn frame_rgba(&self) -> &[u8] {
        self.bus.ppu().frame_rgba()
    }

    /// Frames completed since the last cartridge load.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub fn bus(&self) -> &CpuBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut CpuBus {
        &mut self.bus
    }

    fn render_if_due(&mut self) {
        let ppu = self.bus.ppu_mut();
        if !ppu.is_rendering() && self.cpu.cycles() > timing::RENDER_START_CYCLE {
            ppu.render();
        }
    }

    /// Vblank entry. One more instruction runs before the NMI is latched so a
    /// program spinning on `$2002` gets to see the flag.
    fn finish_frame(&mut self) {
        self.bus.audio_mut().end_frame();
        self.bus.ppu_mut().enter_vblank();
        self.cpu.step(&mut self.bus);
        if self.bus.ppu().nmi_enabled() {
            self.cpu.request_nmi();
        }
        self.bus.ppu_mut().end_rendering();
        self.frame_count += 1;
        self.cpu.reset_cycles();
    }
}

//! Boundary to the sound unit.
//!
//! The core does not synthesize audio. It forwards the APU register traffic
//! and the elapsed instruction lengths to whatever implements [`Audio`], and
//! tells it when a frame is complete.

use std::fmt::Debug;

use dyn_clone::DynClone;

use crate::memory::cpu as cpu_mem;

/// Number of registers between `$4000` and `$4017`.
const REGISTER_COUNT: usize = (cpu_mem::APU_FRAME_COUNTER - cpu_mem::APU_REGISTER_BASE) as usize + 1;

pub trait Audio: DynClone + Debug {
    /// Called once per retired instruction with its length in bytes.
    fn tick(&mut self, len: u8);

    /// Writes to `$4000-$4013`, `$4015` and `$4017`.
    fn write_register(&mut self, addr: u16, value: u8);

    /// `$4015` read.
    fn read_status(&mut self) -> u8;

    /// The machine finished a frame.
    fn end_frame(&mut self);
}

dyn_clone::clone_trait_object!(Audio);

/// Sound unit that produces nothing.
///
/// It still records the register file so frontends and tests can see what the
/// program asked for.
#[derive(Debug, Clone)]
pub struct SilentAudio {
    registers: [u8; REGISTER_COUNT],
    ticks: u64,
    frames: u64,
}

impl Default for SilentAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl SilentAudio {
    pub fn new() -> Self {
        Self {
            registers: [0; REGISTER_COUNT],
            ticks: 0,
            frames: 0,
        }
    }

    /// Last value written to `addr`, if it is an APU register.
    pub fn register(&self, addr: u16) -> Option<u8> {
        register_index(addr).map(|index| self.registers[index])
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Audio for SilentAudio {
    fn tick(&mut self, len: u8) {
        self.ticks += u64::from(len);
    }

    fn write_register(&mut self, addr: u16, value: u8) {
        if let Some(index) = register_index(addr) {
            self.registers[index] = value;
        }
    }

    fn read_status(&mut self) -> u8 {
        0
    }

    fn end_frame(&mut self) {
        self.frames += 1;
    }
}

fn register_index(addr: u16) -> Option<usize> {
    (cpu_mem::APU_REGISTER_BASE..=cpu_mem::APU_FRAME_COUNTER)
        .contains(&addr)
        .then(|| (addr - cpu_mem::APU_REGISTER_BASE) as usize)
}

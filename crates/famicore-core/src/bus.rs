use std::fmt::Debug;

use crate::{cpu::Cpu, memory};

pub mod cpu;
#[cfg(test)]
pub(crate) mod mock;

pub use cpu::CpuBus;

/// Expose the CPU stack page start address for stack helpers.
pub(crate) const STACK_ADDR: u16 = memory::cpu::STACK_PAGE_START;

/// CPU-side bus.
///
/// Accesses take the CPU so that devices can see the cycle counter and charge
/// stall cycles (OAM DMA) while the instruction is still executing.
pub trait Bus: Debug {
    fn read(&mut self, cpu: &mut Cpu, addr: u16) -> u8;

    fn write(&mut self, cpu: &mut Cpu, addr: u16, value: u8);

    /// Reads `$0100 + sp`.
    fn read_stack(&mut self, sp: u8) -> u8;

    /// Writes `$0100 + sp`.
    fn write_stack(&mut self, sp: u8, value: u8);

    /// Instruction length of every retired instruction, for the audio unit.
    fn audio_tick(&mut self, len: u8);
}

// Allow mutable references to Bus implementors (including trait objects) to be used
// wherever a Bus is expected.
impl<T: Bus + ?Sized> Bus for &mut T {
    fn read(&mut self, cpu: &mut Cpu, addr: u16) -> u8 {
        (**self).read(cpu, addr)
    }

    fn write(&mut self, cpu: &mut Cpu, addr: u16, value: u8) {
        (**self).write(cpu, addr, value)
    }

    fn read_stack(&mut self, sp: u8) -> u8 {
        (**self).read_stack(sp)
    }

    fn write_stack(&mut self, sp: u8, value: u8) {
        (**self).write_stack(sp, value)
    }

    fn audio_tick(&mut self, len: u8) {
        (**self).audio_tick(len)
    }
}

/// Address of stack slot `sp`.
pub(crate) const fn stack_addr(sp: u8) -> u16 {
    STACK_ADDR | sp as u16
}

use crate::{
    bus::{Bus, stack_addr},
    cpu::Cpu,
    memory::cpu as cpu_mem,
};

/// Flat 64 KiB RAM with no devices mapped, for CPU tests.
#[derive(Debug)]
pub(crate) struct MockBus {
    pub(crate) mem: Box<[u8; cpu_mem::ADDRESS_SPACE_SIZE]>,
    pub(crate) ticks: u64,
}

impl Default for MockBus {
    fn default() -> Self {
        Self {
            mem: Box::new([0; cpu_mem::ADDRESS_SPACE_SIZE]),
            ticks: 0,
        }
    }
}

impl Bus for MockBus {
    fn read(&mut self, _cpu: &mut Cpu, addr: u16) -> u8 {
        self.mem[addr as usize]
    }

    fn write(&mut self, _cpu: &mut Cpu, addr: u16, value: u8) {
        self.mem[addr as usize] = value;
    }

    fn read_stack(&mut self, sp: u8) -> u8 {
        self.mem[stack_addr(sp) as usize]
    }

    fn write_stack(&mut self, sp: u8, value: u8) {
        self.mem[stack_addr(sp) as usize] = value;
    }

    fn audio_tick(&mut self, len: u8) {
        self.ticks += u64::from(len);
    }
}

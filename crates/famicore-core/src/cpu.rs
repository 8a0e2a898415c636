//! Ricoh 2A03 CPU core (6502 without decimal mode).
//!
//! Execution is instruction-granular. [`Cpu::step`] services at most one
//! pending interrupt or retires exactly one instruction, charging its base
//! cost from the opcode table up front:
//!
//! 1. fetch the opcode and operand bytes at PC,
//! 2. advance PC by the instruction size and add the base cycles,
//! 3. report the instruction size to the audio unit through the bus,
//! 4. resolve the addressing mode and run the operation.
//!
//! Taken branches add one cycle. Page-crossing penalties are not modelled.

use std::fmt::Display;

use bitflags::bitflags;
use tracing::{trace, warn};

use crate::{bus::Bus, memory::cpu as cpu_mem};

mod addressing;
mod instruction;
mod lookup;
mod mnemonic;
mod status;

pub use addressing::Addressing;
pub use instruction::Instruction;
pub use lookup::LOOKUP_TABLE;
pub use mnemonic::Mnemonic;
pub use status::Status;

/// Cycles consumed by servicing NMI or IRQ.
const INTERRUPT_CYCLES: u64 = 7;
/// Stack pointer loaded by reset.
const RESET_STACK_POINTER: u8 = 0xFD;

bitflags! {
    /// Latched interrupt requests, serviced in the order reset > NMI > IRQ.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Interrupt: u8 {
        const RESET = 0b001;
        const NMI   = 0b010;
        const IRQ   = 0b100;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cpu {
    // Registers
    a: u8,     //Accumulator
    x: u8,     //X Index Register
    y: u8,     //Y Index Register
    s: u8,     //Stack Pointer
    p: Status, //Processor Status
    pc: u16,   //Program Counter

    /// Cycles elapsed in the current frame.
    cycles: u64,
    pending: Interrupt,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    /// Power-on register state. PC stays at zero until a reset is serviced.
    pub fn new() -> Self {
        Self {
            a: 0x00,
            x: 0x00,
            y: 0x00,
            s: RESET_STACK_POINTER,
            p: Status::RESET,
            pc: 0x0000,
            cycles: 0,
            pending: Interrupt::empty(),
        }
    }

    pub fn a(&self) -> u8 {
        self.a
    }

    pub fn x(&self) -> u8 {
        self.x
    }

    pub fn y(&self) -> u8 {
        self.y
    }

    pub fn sp(&self) -> u8 {
        self.s
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn status(&self) -> Status {
        self.p
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Charges extra cycles, e.g. the OAM-DMA stall.
    pub fn add_cycles(&mut self, cycles: u64) {
        self.cycles += cycles;
    }

    /// Rewinds the counter at the end of a frame.
    pub(crate) fn reset_cycles(&mut self) {
        self.cycles = 0;
    }

    pub fn pending_interrupts(&self) -> Interrupt {
        self.pending
    }

    pub fn request_nmi(&mut self) {
        self.pending.insert(Interrupt::NMI);
    }

    pub fn request_irq(&mut self) {
        self.pending.insert(Interrupt::IRQ);
    }

    pub fn request_reset(&mut self) {
        self.pending.insert(Interrupt::RESET);
    }

    /// Services one pending interrupt or executes one instruction.
    pub fn step<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        if self.service_interrupt(bus) {
            return;
        }

        let at = self.pc;
        let opcode = bus.read(self, at);
        let instr = &LOOKUP_TABLE[opcode as usize];
        let size = instr.size();
        let operand = match size {
            2 => u16::from(bus.read(self, at.wrapping_add(1))),
            3 => {
                let lo = bus.read(self, at.wrapping_add(1));
                let hi = bus.read(self, at.wrapping_add(2));
                u16::from_le_bytes([lo, hi])
            }
            _ => 0,
        };

        self.pc = at.wrapping_add(u16::from(size));
        self.cycles += u64::from(instr.cycles);
        bus.audio_tick(size);

        if !instr.official {
            warn!(
                opcode = format_args!("{opcode:#04x}"),
                pc = format_args!("{at:#06x}"),
                cycle = self.cycles,
                "illegal opcode {instr}, skipped"
            );
            return;
        }

        let target = instr.addressing.resolve(self, bus, operand);
        self.execute(bus, instr.mnemonic, target);
    }

    /// Steps until the cycle counter reaches `target`.
    pub fn run_to_cycle<B: Bus + ?Sized>(&mut self, bus: &mut B, target: u64) {
        while self.cycles < target {
            self.step(bus);
        }
    }

    /// Reset sequence: registers and PC only, memory is left alone.
    fn reset<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        self.cycles = 0;
        self.pending = Interrupt::empty();
        self.s = RESET_STACK_POINTER;
        self.p = Status::RESET;
        self.pc = self.read_vector(bus, cpu_mem::RESET_VECTOR_LO);
        trace!(pc = format_args!("{:#06x}", self.pc), "reset");
    }

    /// Returns `true` when an interrupt consumed this step.
    fn service_interrupt<B: Bus + ?Sized>(&mut self, bus: &mut B) -> bool {
        if self.pending.contains(Interrupt::RESET) {
            self.reset(bus);
            return true;
        }
        if self.pending.contains(Interrupt::NMI) {
            self.pending.remove(Interrupt::NMI);
            self.interrupt(bus, cpu_mem::NMI_VECTOR_LO);
            trace!(pc = format_args!("{:#06x}", self.pc), cycle = self.cycles, "nmi");
            return true;
        }
        if self.pending.contains(Interrupt::IRQ) {
            // A masked request is dropped rather than held.
            self.pending.remove(Interrupt::IRQ);
            if !self.p.contains(Status::INTERRUPT) {
                self.interrupt(bus, cpu_mem::IRQ_VECTOR_LO);
                trace!(pc = format_args!("{:#06x}", self.pc), cycle = self.cycles, "irq");
                return true;
            }
        }
        false
    }

    fn interrupt<B: Bus + ?Sized>(&mut self, bus: &mut B, vector: u16) {
        self.cycles += INTERRUPT_CYCLES;
        self.push_word(bus, self.pc);
        self.push(bus, (self.p - Status::BREAK).bits());
        self.p.insert(Status::INTERRUPT);
        self.pc = self.read_vector(bus, vector);
    }

    fn read_vector<B: Bus + ?Sized>(&mut self, bus: &mut B, lo_addr: u16) -> u16 {
        let lo = bus.read(self, lo_addr);
        let hi = bus.read(self, lo_addr.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    pub(crate) fn push<B: Bus + ?Sized>(&mut self, bus: &mut B, value: u8) {
        bus.write_stack(self.s, value);
        self.s = self.s.wrapping_sub(1);
    }

    pub(crate) fn pop<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u8 {
        self.s = self.s.wrapping_add(1);
        bus.read_stack(self.s)
    }

    fn push_word<B: Bus + ?Sized>(&mut self, bus: &mut B, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.push(bus, hi);
        self.push(bus, lo);
    }

    fn pop_word<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let lo = self.pop(bus);
        let hi = self.pop(bus);
        u16::from_le_bytes([lo, hi])
    }
}

impl Display for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[a:0x{:02x},x:0x{:02x},y:0x{:02x},s:0x{:02x},p:0x{:02x},pc:0x{:04x},cyc:{}]",
            self.a,
            self.x,
            self.y,
            self.s,
            self.p.bits(),
            self.pc,
            self.cycles
        )
    }
}

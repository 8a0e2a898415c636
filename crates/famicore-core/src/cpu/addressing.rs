use std::fmt::Display;

use crate::{bus::Bus, cpu::Cpu};

/// Addressing modes of the 6502.
///
/// A mode fixes the operand length of an instruction and tells
/// [`Addressing::resolve`] how to turn the operand bytes into a [`Target`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Addressing {
    /// No operand (`CLC`, `RTS`, ...).
    Implied,

    /// Operates on the accumulator (`ASL A`).
    Accumulator,

    /// The operand byte is the value (`LDA #$42`).
    Immediate,

    /// `LDA $1234`
    Absolute,

    /// `LDA $1234,X`. Wraps at `$FFFF`; no page-cross penalty is charged.
    AbsoluteX,

    /// `LDA $1234,Y`
    AbsoluteY,

    /// `JMP ($1234)`.
    ///
    /// Reproduces the pointer bug: a pointer at `$xxFF` takes its high byte
    /// from `$xx00` instead of the next page.
    Indirect,

    /// `LDA $42`
    ZeroPage,

    /// `LDA $42,X`. The sum wraps inside the zero page.
    ZeroPageX,

    /// `LDX $42,Y`. The sum wraps inside the zero page.
    ZeroPageY,

    /// `LDA ($42,X)`: pointer at `($42 + X) & 0xFF`.
    IndirectX,

    /// `LDA ($42),Y`: pointer at `$42`, then `+ Y`.
    IndirectY,

    /// Branch offset, a signed byte relative to the next instruction.
    Relative,
}

/// Where an instruction's operand lives once its mode has been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target {
    Implied,
    Accumulator,
    /// Immediate value or branch offset.
    Value(u8),
    Address(u16),
}

impl Addressing {
    /// Operand bytes following the opcode.
    pub const fn operand_len(self) -> u8 {
        match self {
            Addressing::Implied | Addressing::Accumulator => 0,
            Addressing::Immediate
            | Addressing::ZeroPage
            | Addressing::ZeroPageX
            | Addressing::ZeroPageY
            | Addressing::IndirectX
            | Addressing::IndirectY
            | Addressing::Relative => 1,
            Addressing::Absolute
            | Addressing::AbsoluteX
            | Addressing::AbsoluteY
            | Addressing::Indirect => 2,
        }
    }

    /// Computes the effective target. Pointer fetches for the indirect modes
    /// go through the bus; the target itself is never read here.
    pub(crate) fn resolve<B: Bus + ?Sized>(self, cpu: &mut Cpu, bus: &mut B, operand: u16) -> Target {
        let zp = operand as u8;
        match self {
            Addressing::Implied => Target::Implied,
            Addressing::Accumulator => Target::Accumulator,
            Addressing::Immediate | Addressing::Relative => Target::Value(zp),
            Addressing::Absolute => Target::Address(operand),
            Addressing::AbsoluteX => Target::Address(operand.wrapping_add(u16::from(cpu.x))),
            Addressing::AbsoluteY => Target::Address(operand.wrapping_add(u16::from(cpu.y))),
            Addressing::ZeroPage => Target::Address(u16::from(zp)),
            Addressing::ZeroPageX => Target::Address(u16::from(zp.wrapping_add(cpu.x))),
            Addressing::ZeroPageY => Target::Address(u16::from(zp.wrapping_add(cpu.y))),
            Addressing::Indirect => {
                let lo = bus.read(cpu, operand);
                let hi_addr = (operand & 0xFF00) | (operand.wrapping_add(1) & 0x00FF);
                let hi = bus.read(cpu, hi_addr);
                Target::Address(u16::from_le_bytes([lo, hi]))
            }
            Addressing::IndirectX => {
                let ptr = zp.wrapping_add(cpu.x);
                Target::Address(read_zp_word(cpu, bus, ptr))
            }
            Addressing::IndirectY => {
                let base = read_zp_word(cpu, bus, zp);
                Target::Address(base.wrapping_add(u16::from(cpu.y)))
            }
        }
    }
}

/// Little-endian pointer whose high byte wraps inside the zero page.
fn read_zp_word<B: Bus + ?Sized>(cpu: &mut Cpu, bus: &mut B, ptr: u8) -> u16 {
    let lo = bus.read(cpu, u16::from(ptr));
    let hi = bus.read(cpu, u16::from(ptr.wrapping_add(1)));
    u16::from_le_bytes([lo, hi])
}

impl Display for Addressing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Addressing::Implied => "implied".fmt(f),
            Addressing::Accumulator => "accumulator".fmt(f),
            Addressing::Immediate => "immediate".fmt(f),
            Addressing::Absolute => "absolute".fmt(f),
            Addressing::AbsoluteX => "absolute_x".fmt(f),
            Addressing::AbsoluteY => "absolute_y".fmt(f),
            Addressing::Indirect => "indirect".fmt(f),
            Addressing::ZeroPage => "zero_page".fmt(f),
            Addressing::ZeroPageX => "zero_page_x".fmt(f),
            Addressing::ZeroPageY => "zero_page_y".fmt(f),
            Addressing::IndirectX => "indirect_x".fmt(f),
            Addressing::IndirectY => "indirect_y".fmt(f),
            Addressing::Relative => "relative".fmt(f),
        }
    }
}

use crate::cpu::addressing::Addressing as A;
use crate::cpu::instruction::Instruction as I;
use crate::cpu::mnemonic::Mnemonic as M;

// Short aliases for addressing modes (to keep the 16x16 table readable)
const IMP: A = A::Implied;
const ACC: A = A::Accumulator;
const IMM: A = A::Immediate;
const REL: A = A::Relative;
const ZP: A = A::ZeroPage;
const ZPX: A = A::ZeroPageX;
const ZPY: A = A::ZeroPageY;
const ABS: A = A::Absolute;
const ABX: A = A::AbsoluteX;
const ABY: A = A::AbsoluteY;
const IND: A = A::Indirect;
const INX: A = A::IndirectX;
const INY: A = A::IndirectY;

macro_rules! op {
    ($ins:ident, $addr:ident, $cycles:literal) => {
        I::official(M::$ins, $addr, $cycles)
    };
}

macro_rules! ill {
    ($ins:ident, $addr:ident, $cycles:literal) => {
        I::illegal(M::$ins, $addr, $cycles)
    };
}

#[rustfmt::skip]
pub static LOOKUP_TABLE: [I; 256] = [
    // 0                  1                  2                  3                  4                  5                  6                  7
    // 8                  9                  A                  B                  C                  D                  E                  F

    // 0x00
    op!(BRK, IMM, 7),  op!(ORA, INX, 6),  ill!(JAM, IMP, 2), ill!(SLO, INX, 8), ill!(NOP, ZP, 3),  op!(ORA, ZP, 3),   op!(ASL, ZP, 5),   ill!(SLO, ZP, 5),
    op!(PHP, IMP, 3),  op!(ORA, IMM, 2),  op!(ASL, ACC, 2),  ill!(ANC, IMM, 2), ill!(NOP, ABS, 4), op!(ORA, ABS, 4),  op!(ASL, ABS, 6),  ill!(SLO, ABS, 6),

    // 0x10
    op!(BPL, REL, 2),  op!(ORA, INY, 5),  ill!(JAM, IMP, 2), ill!(SLO, INY, 8), ill!(NOP, ZPX, 4), op!(ORA, ZPX, 4),  op!(ASL, ZPX, 6),  ill!(SLO, ZPX, 6),
    op!(CLC, IMP, 2),  op!(ORA, ABY, 4),  ill!(NOP, IMP, 2), ill!(SLO, ABY, 7), ill!(NOP, ABX, 4), op!(ORA, ABX, 4),  op!(ASL, ABX, 7),  ill!(SLO, ABX, 7),

    // 0x20
    op!(JSR, ABS, 6),  op!(AND, INX, 6),  ill!(JAM, IMP, 2), ill!(RLA, INX, 8), op!(BIT, ZP, 3),   op!(AND, ZP, 3),   op!(ROL, ZP, 5),   ill!(RLA, ZP, 5),
    op!(PLP, IMP, 4),  op!(AND, IMM, 2),  op!(ROL, ACC, 2),  ill!(ANC, IMM, 2), op!(BIT, ABS, 4),  op!(AND, ABS, 4),  op!(ROL, ABS, 6),  ill!(RLA, ABS, 6),

    // 0x30
    op!(BMI, REL, 2),  op!(AND, INY, 5),  ill!(JAM, IMP, 2), ill!(RLA, INY, 8), ill!(NOP, ZPX, 4), op!(AND, ZPX, 4),  op!(ROL, ZPX, 6),  ill!(RLA, ZPX, 6),
    op!(SEC, IMP, 2),  op!(AND, ABY, 4),  ill!(NOP, IMP, 2), ill!(RLA, ABY, 7), ill!(NOP, ABX, 4), op!(AND, ABX, 4),  op!(ROL, ABX, 7),  ill!(RLA, ABX, 7),

    // 0x40
    op!(RTI, IMP, 6),  op!(EOR, INX, 6),  ill!(JAM, IMP, 2), ill!(SRE, INX, 8), ill!(NOP, ZP, 3),  op!(EOR, ZP, 3),   op!(LSR, ZP, 5),   ill!(SRE, ZP, 5),
    op!(PHA, IMP, 3),  op!(EOR, IMM, 2),  op!(LSR, ACC, 2),  ill!(ASR, IMM, 2), op!(JMP, ABS, 3),  op!(EOR, ABS, 4),  op!(LSR, ABS, 6),  ill!(SRE, ABS, 6),

    // 0x50
    op!(BVC, REL, 2),  op!(EOR, INY, 5),  ill!(JAM, IMP, 2), ill!(SRE, INY, 8), ill!(NOP, ZPX, 4), op!(EOR, ZPX, 4),  op!(LSR, ZPX, 6),  ill!(SRE, ZPX, 6),
    op!(CLI, IMP, 2),  op!(EOR, ABY, 4),  ill!(NOP, IMP, 2), ill!(SRE, ABY, 7), ill!(NOP, ABX, 4), op!(EOR, ABX, 4),  op!(LSR, ABX, 7),  ill!(SRE, ABX, 7),

    // 0x60
    op!(RTS, IMP, 6),  op!(ADC, INX, 6),  ill!(JAM, IMP, 2), ill!(RRA, INX, 8), ill!(NOP, ZP, 3),  op!(ADC, ZP, 3),   op!(ROR, ZP, 5),   ill!(RRA, ZP, 5),
    op!(PLA, IMP, 4),  op!(ADC, IMM, 2),  op!(ROR, ACC, 2),  ill!(ARR, IMM, 2), op!(JMP, IND, 5),  op!(ADC, ABS, 4),  op!(ROR, ABS, 6),  ill!(RRA, ABS, 6),

    // 0x70
    op!(BVS, REL, 2),  op!(ADC, INY, 5),  ill!(JAM, IMP, 2), ill!(RRA, INY, 8), ill!(NOP, ZPX, 4), op!(ADC, ZPX, 4),  op!(ROR, ZPX, 6),  ill!(RRA, ZPX, 6),
    op!(SEI, IMP, 2),  op!(ADC, ABY, 4),  ill!(NOP, IMP, 2), ill!(RRA, ABY, 7), ill!(NOP, ABX, 4), op!(ADC, ABX, 4),  op!(ROR, ABX, 7),  ill!(RRA, ABX, 7),

    // 0x80
    ill!(NOP, IMM, 2), op!(STA, INX, 6),  ill!(NOP, IMM, 2), ill!(SAX, INX, 6), op!(STY, ZP, 3),   op!(STA, ZP, 3),   op!(STX, ZP, 3),   ill!(SAX, ZP, 3),
    op!(DEY, IMP, 2),  ill!(NOP, IMM, 2), op!(TXA, IMP, 2),  ill!(XAA, IMM, 2), op!(STY, ABS, 4),  op!(STA, ABS, 4),  op!(STX, ABS, 4),  ill!(SAX, ABS, 4),

    // 0x90
    op!(BCC, REL, 2),  op!(STA, INY, 6),  ill!(JAM, IMP, 2), ill!(SHA, INY, 6), op!(STY, ZPX, 4),  op!(STA, ZPX, 4),  op!(STX, ZPY, 4),  ill!(SAX, ZPY, 4),
    op!(TYA, IMP, 2),  op!(STA, ABY, 5),  op!(TXS, IMP, 2),  ill!(SHS, ABY, 5), ill!(SHY, ABX, 5), op!(STA, ABX, 5),  ill!(SHX, ABY, 5), ill!(SHA, ABY, 5),

    // 0xA0
    op!(LDY, IMM, 2),  op!(LDA, INX, 6),  op!(LDX, IMM, 2),  ill!(LAX, INX, 6), op!(LDY, ZP, 3),   op!(LDA, ZP, 3),   op!(LDX, ZP, 3),   ill!(LAX, ZP, 3),
    op!(TAY, IMP, 2),  op!(LDA, IMM, 2),  op!(TAX, IMP, 2),  ill!(LAX, IMM, 2), op!(LDY, ABS, 4),  op!(LDA, ABS, 4),  op!(LDX, ABS, 4),  ill!(LAX, ABS, 4),

    // 0xB0
    op!(BCS, REL, 2),  op!(LDA, INY, 5),  ill!(JAM, IMP, 2), ill!(LAX, INY, 5), op!(LDY, ZPX, 4),  op!(LDA, ZPX, 4),  op!(LDX, ZPY, 4),  ill!(LAX, ZPY, 4),
    op!(CLV, IMP, 2),  op!(LDA, ABY, 4),  op!(TSX, IMP, 2),  ill!(LAS, ABY, 4), op!(LDY, ABX, 4),  op!(LDA, ABX, 4),  op!(LDX, ABY, 4),  ill!(LAX, ABY, 4),

    // 0xC0
    op!(CPY, IMM, 2),  op!(CMP, INX, 6),  ill!(NOP, IMM, 2), ill!(DCP, INX, 8), op!(CPY, ZP, 3),   op!(CMP, ZP, 3),   op!(DEC, ZP, 5),   ill!(DCP, ZP, 5),
    op!(INY, IMP, 2),  op!(CMP, IMM, 2),  op!(DEX, IMP, 2),  ill!(SBX, IMM, 2), op!(CPY, ABS, 4),  op!(CMP, ABS, 4),  op!(DEC, ABS, 6),  ill!(DCP, ABS, 6),

    // 0xD0
    op!(BNE, REL, 2),  op!(CMP, INY, 5),  ill!(JAM, IMP, 2), ill!(DCP, INY, 8), ill!(NOP, ZPX, 4), op!(CMP, ZPX, 4),  op!(DEC, ZPX, 6),  ill!(DCP, ZPX, 6),
    op!(CLD, IMP, 2),  op!(CMP, ABY, 4),  ill!(NOP, IMP, 2), ill!(DCP, ABY, 7), ill!(NOP, ABX, 4), op!(CMP, ABX, 4),  op!(DEC, ABX, 7),  ill!(DCP, ABX, 7),

    // 0xE0
    op!(CPX, IMM, 2),  op!(SBC, INX, 6),  ill!(NOP, IMM, 2), ill!(ISC, INX, 8), op!(CPX, ZP, 3),   op!(SBC, ZP, 3),   op!(INC, ZP, 5),   ill!(ISC, ZP, 5),
    op!(INX, IMP, 2),  op!(SBC, IMM, 2),  op!(NOP, IMP, 2),  ill!(SBC, IMM, 2), op!(CPX, ABS, 4),  op!(SBC, ABS, 4),  op!(INC, ABS, 6),  ill!(ISC, ABS, 6),

    // 0xF0
    op!(BEQ, REL, 2),  op!(SBC, INY, 5),  ill!(JAM, IMP, 2), ill!(ISC, INY, 8), ill!(NOP, ZPX, 4), op!(SBC, ZPX, 4),  op!(INC, ZPX, 6),  ill!(ISC, ZPX, 6),
    op!(SED, IMP, 2),  op!(SBC, ABY, 4),  ill!(NOP, IMP, 2), ill!(ISC, ABY, 7), ill!(NOP, ABX, 4), op!(SBC, ABX, 4),  op!(INC, ABX, 7),  ill!(ISC, ABX, 7),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bus::mock::MockBus, cpu::Cpu};

    #[rustfmt::skip]
    const SIZES: [u8; 256] = [
        2, 2, 1, 2, 2, 2, 2, 2, 1, 2, 1, 2, 3, 3, 3, 3,
        2, 2, 1, 2, 2, 2, 2, 2, 1, 3, 1, 3, 3, 3, 3, 3,
        3, 2, 1, 2, 2, 2, 2, 2, 1, 2, 1, 2, 3, 3, 3, 3,
        2, 2, 1, 2, 2, 2, 2, 2, 1, 3, 1, 3, 3, 3, 3, 3,
        1, 2, 1, 2, 2, 2, 2, 2, 1, 2, 1, 2, 3, 3, 3, 3,
        2, 2, 1, 2, 2, 2, 2, 2, 1, 3, 1, 3, 3, 3, 3, 3,
        1, 2, 1, 2, 2, 2, 2, 2, 1, 2, 1, 2, 3, 3, 3, 3,
        2, 2, 1, 2, 2, 2, 2, 2, 1, 3, 1, 3, 3, 3, 3, 3,
        2, 2, 2, 2, 2, 2, 2, 2, 1, 2, 1, 2, 3, 3, 3, 3,
        2, 2, 1, 2, 2, 2, 2, 2, 1, 3, 1, 3, 3, 3, 3, 3,
        2, 2, 2, 2, 2, 2, 2, 2, 1, 2, 1, 2, 3, 3, 3, 3,
        2, 2, 1, 2, 2, 2, 2, 2, 1, 3, 1, 3, 3, 3, 3, 3,
        2, 2, 2, 2, 2, 2, 2, 2, 1, 2, 1, 2, 3, 3, 3, 3,
        2, 2, 1, 2, 2, 2, 2, 2, 1, 3, 1, 3, 3, 3, 3, 3,
        2, 2, 2, 2, 2, 2, 2, 2, 1, 2, 1, 2, 3, 3, 3, 3,
        2, 2, 1, 2, 2, 2, 2, 2, 1, 3, 1, 3, 3, 3, 3, 3,
    ];

    #[rustfmt::skip]
    const CYCLES: [u8; 256] = [
        7, 6, 2, 8, 3, 3, 5, 5, 3, 2, 2, 2, 4, 4, 6, 6,
        2, 5, 2, 8, 4, 4, 6, 6, 2, 4, 2, 7, 4, 4, 7, 7,
        6, 6, 2, 8, 3, 3, 5, 5, 4, 2, 2, 2, 4, 4, 6, 6,
        2, 5, 2, 8, 4, 4, 6, 6, 2, 4, 2, 7, 4, 4, 7, 7,
        6, 6, 2, 8, 3, 3, 5, 5, 3, 2, 2, 2, 3, 4, 6, 6,
        2, 5, 2, 8, 4, 4, 6, 6, 2, 4, 2, 7, 4, 4, 7, 7,
        6, 6, 2, 8, 3, 3, 5, 5, 4, 2, 2, 2, 5, 4, 6, 6,
        2, 5, 2, 8, 4, 4, 6, 6, 2, 4, 2, 7, 4, 4, 7, 7,
        2, 6, 2, 6, 3, 3, 3, 3, 2, 2, 2, 2, 4, 4, 4, 4,
        2, 6, 2, 6, 4, 4, 4, 4, 2, 5, 2, 5, 5, 5, 5, 5,
        2, 6, 2, 6, 3, 3, 3, 3, 2, 2, 2, 2, 4, 4, 4, 4,
        2, 5, 2, 5, 4, 4, 4, 4, 2, 4, 2, 4, 4, 4, 4, 4,
        2, 6, 2, 8, 3, 3, 5, 5, 2, 2, 2, 2, 4, 4, 6, 6,
        2, 5, 2, 8, 4, 4, 6, 6, 2, 4, 2, 7, 4, 4, 7, 7,
        2, 6, 2, 8, 3, 3, 5, 5, 2, 2, 2, 2, 4, 4, 6, 6,
        2, 5, 2, 8, 4, 4, 6, 6, 2, 4, 2, 7, 4, 4, 7, 7,
    ];

    #[test]
    fn table_matches_reference_sizes_and_cycles() {
        for (opcode, instr) in LOOKUP_TABLE.iter().enumerate() {
            assert_eq!(instr.size(), SIZES[opcode], "size of {opcode:#04x} {instr}");
            assert_eq!(instr.cycles, CYCLES[opcode], "cycles of {opcode:#04x} {instr}");
        }
    }

    #[test]
    fn official_opcode_count() {
        let official = LOOKUP_TABLE.iter().filter(|instr| instr.official).count();
        assert_eq!(official, 151);
        assert!(!LOOKUP_TABLE[0xEB].official);
        assert!(LOOKUP_TABLE[0xEA].official);
    }

    #[test]
    fn every_opcode_retires_with_its_size_and_cost() {
        for (opcode, instr) in LOOKUP_TABLE.iter().enumerate() {
            let mut bus = MockBus::default();
            bus.mem[0x0400] = opcode as u8;
            let mut cpu = Cpu::new();
            cpu.pc = 0x0400;
            cpu.step(&mut bus);

            let control_flow = matches!(
                instr.mnemonic,
                M::BRK | M::JMP | M::JSR | M::RTI | M::RTS
            ) && instr.official;
            if instr.addressing == REL {
                let cost = cpu.cycles() - u64::from(instr.cycles);
                assert!(cost <= 1, "branch {opcode:#04x} cost {cost} extra cycles");
            } else {
                assert_eq!(cpu.cycles(), u64::from(instr.cycles), "cycles of {opcode:#04x}");
            }
            if !control_flow && instr.addressing != REL {
                assert_eq!(
                    cpu.pc(),
                    0x0400 + u16::from(instr.size()),
                    "pc after {opcode:#04x} {instr}"
                );
            }
        }
    }
}

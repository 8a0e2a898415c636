use std::fmt::Display;

use crate::{
    bus::Bus,
    cpu::{Cpu, addressing::Target, status::Status},
    memory::cpu as cpu_mem,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    //Load/Store
    LAS,
    LAX,
    LDA,
    LDX,
    LDY,
    SAX,
    SHA,
    SHX,
    SHY,
    STA,
    STX,
    STY,
    //Transfer
    SHS,
    TAX,
    TAY,
    TSX,
    TXA,
    TXS,
    TYA,
    //Stack
    PHA,
    PHP,
    PLA,
    PLP,
    //Shift
    ASL,
    LSR,
    ROL,
    ROR,
    //Logic
    AND,
    BIT,
    EOR,
    ORA,
    //Arithmetic
    ADC,
    ANC,
    ARR,
    ASR,
    CMP,
    CPX,
    CPY,
    DCP,
    ISC,
    RLA,
    RRA,
    SBC,
    SBX,
    SLO,
    SRE,
    XAA,
    //Arithmetic: Inc/Dec
    DEC,
    DEX,
    DEY,
    INC,
    INX,
    INY,
    //Control Flow
    BRK,
    JMP,
    JSR,
    RTI,
    RTS,
    //Control Flow: Branch
    BCC,
    BCS,
    BEQ,
    BMI,
    BNE,
    BPL,
    BVC,
    BVS,
    //Flags
    CLC,
    CLD,
    CLI,
    CLV,
    SEC,
    SED,
    SEI,
    //KIL
    JAM,
    //NOP
    NOP,
}

impl Display for Mnemonic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format!("{:?}", self).to_lowercase())
    }
}

impl Cpu {
    /// Carries out `mnemonic` on an already resolved operand.
    ///
    /// The program counter already points past the instruction and the base
    /// cycle cost has been charged.
    pub(super) fn execute<B: Bus + ?Sized>(&mut self, bus: &mut B, mnemonic: Mnemonic, target: Target) {
        match mnemonic {
            // ===============================
            // Load / Store
            // ===============================
            Mnemonic::LDA => {
                self.a = self.load(bus, target);
                self.p.update_zn(self.a);
            }
            Mnemonic::LDX => {
                self.x = self.load(bus, target);
                self.p.update_zn(self.x);
            }
            Mnemonic::LDY => {
                self.y = self.load(bus, target);
                self.p.update_zn(self.y);
            }
            Mnemonic::STA => self.store(bus, target, self.a),
            Mnemonic::STX => self.store(bus, target, self.x),
            Mnemonic::STY => self.store(bus, target, self.y),

            // ===============================
            // Transfer
            // ===============================
            Mnemonic::TAX => {
                self.x = self.a;
                self.p.update_zn(self.x);
            }
            Mnemonic::TAY => {
                self.y = self.a;
                self.p.update_zn(self.y);
            }
            Mnemonic::TSX => {
                self.x = self.s;
                self.p.update_zn(self.x);
            }
            Mnemonic::TXA => {
                self.a = self.x;
                self.p.update_zn(self.a);
            }
            Mnemonic::TYA => {
                self.a = self.y;
                self.p.update_zn(self.a);
            }
            Mnemonic::TXS => self.s = self.x,

            // ===============================
            // Stack
            // ===============================
            Mnemonic::PHA => self.push(bus, self.a),
            Mnemonic::PHP => self.push(bus, (self.p | Status::BREAK).bits()),
            Mnemonic::PLA => {
                self.a = self.pop(bus);
                self.p.update_zn(self.a);
            }
            Mnemonic::PLP => {
                let pulled = self.pop(bus);
                self.p = self.p.pull(pulled);
            }

            // ===============================
            // Shift / Rotate
            // ===============================
            Mnemonic::ASL => self.modify(bus, target, |cpu, value| {
                cpu.p.set(Status::CARRY, value & 0x80 != 0);
                value << 1
            }),
            Mnemonic::LSR => self.modify(bus, target, |cpu, value| {
                cpu.p.set(Status::CARRY, value & 0x01 != 0);
                value >> 1
            }),
            Mnemonic::ROL => self.modify(bus, target, |cpu, value| {
                let carry_in = u8::from(cpu.p.contains(Status::CARRY));
                cpu.p.set(Status::CARRY, value & 0x80 != 0);
                (value << 1) | carry_in
            }),
            Mnemonic::ROR => self.modify(bus, target, |cpu, value| {
                let carry_in = u8::from(cpu.p.contains(Status::CARRY)) << 7;
                cpu.p.set(Status::CARRY, value & 0x01 != 0);
                (value >> 1) | carry_in
            }),

            // ===============================
            // Logical
            // ===============================
            Mnemonic::AND => {
                let value = self.load(bus, target);
                self.a &= value;
                self.p.update_zn(self.a);
            }
            Mnemonic::EOR => {
                let value = self.load(bus, target);
                self.a ^= value;
                self.p.update_zn(self.a);
            }
            Mnemonic::ORA => {
                let value = self.load(bus, target);
                self.a |= value;
                self.p.update_zn(self.a);
            }
            Mnemonic::BIT => {
                let value = self.load(bus, target);
                self.p.update_zero(self.a & value);
                self.p.update_negative(value);
                self.p.set(Status::OVERFLOW, value & 0x40 != 0);
            }

            // ===============================
            // Arithmetic
            // ===============================
            Mnemonic::ADC => {
                let value = self.load(bus, target);
                self.add_with_carry(value);
            }
            Mnemonic::SBC => {
                let value = self.load(bus, target);
                self.add_with_carry(!value);
            }
            Mnemonic::CMP => {
                let value = self.load(bus, target);
                self.compare(self.a, value);
            }
            Mnemonic::CPX => {
                let value = self.load(bus, target);
                self.compare(self.x, value);
            }
            Mnemonic::CPY => {
                let value = self.load(bus, target);
                self.compare(self.y, value);
            }

            // ===============================
            // Increment / Decrement
            // ===============================
            Mnemonic::INC => self.modify(bus, target, |_, value| value.wrapping_add(1)),
            Mnemonic::DEC => self.modify(bus, target, |_, value| value.wrapping_sub(1)),
            Mnemonic::INX => {
                self.x = self.x.wrapping_add(1);
                self.p.update_zn(self.x);
            }
            Mnemonic::INY => {
                self.y = self.y.wrapping_add(1);
                self.p.update_zn(self.y);
            }
            Mnemonic::DEX => {
                self.x = self.x.wrapping_sub(1);
                self.p.update_zn(self.x);
            }
            Mnemonic::DEY => {
                self.y = self.y.wrapping_sub(1);
                self.p.update_zn(self.y);
            }

            // ===============================
            // Control Flow
            // ===============================
            Mnemonic::BRK => {
                self.push_word(bus, self.pc);
                self.push(bus, (self.p | Status::BREAK).bits());
                self.p.insert(Status::INTERRUPT | Status::BREAK);
                self.pc = self.read_vector(bus, cpu_mem::IRQ_VECTOR_LO);
            }
            Mnemonic::JMP => {
                if let Target::Address(addr) = target {
                    self.pc = addr;
                }
            }
            Mnemonic::JSR => {
                if let Target::Address(addr) = target {
                    self.push_word(bus, self.pc.wrapping_sub(1));
                    self.pc = addr;
                }
            }
            Mnemonic::RTI => {
                let pulled = self.pop(bus);
                self.p = self.p.pull(pulled);
                self.pc = self.pop_word(bus);
            }
            Mnemonic::RTS => self.pc = self.pop_word(bus).wrapping_add(1),

            // ===============================
            // Branch
            // ===============================
            Mnemonic::BCC => self.branch(target, !self.p.contains(Status::CARRY)),
            Mnemonic::BCS => self.branch(target, self.p.contains(Status::CARRY)),
            Mnemonic::BNE => self.branch(target, !self.p.contains(Status::ZERO)),
            Mnemonic::BEQ => self.branch(target, self.p.contains(Status::ZERO)),
            Mnemonic::BPL => self.branch(target, !self.p.contains(Status::NEGATIVE)),
            Mnemonic::BMI => self.branch(target, self.p.contains(Status::NEGATIVE)),
            Mnemonic::BVC => self.branch(target, !self.p.contains(Status::OVERFLOW)),
            Mnemonic::BVS => self.branch(target, self.p.contains(Status::OVERFLOW)),

            // ===============================
            // Flags
            // ===============================
            Mnemonic::CLC => self.p.remove(Status::CARRY),
            Mnemonic::CLD => self.p.remove(Status::DECIMAL),
            Mnemonic::CLI => self.p.remove(Status::INTERRUPT),
            Mnemonic::CLV => self.p.remove(Status::OVERFLOW),
            Mnemonic::SEC => self.p.insert(Status::CARRY),
            Mnemonic::SED => self.p.insert(Status::DECIMAL),
            Mnemonic::SEI => self.p.insert(Status::INTERRUPT),

            Mnemonic::NOP => {}

            // Undocumented opcodes retire without touching registers or memory.
            Mnemonic::LAS
            | Mnemonic::LAX
            | Mnemonic::SAX
            | Mnemonic::SHA
            | Mnemonic::SHX
            | Mnemonic::SHY
            | Mnemonic::SHS
            | Mnemonic::ANC
            | Mnemonic::ARR
            | Mnemonic::ASR
            | Mnemonic::DCP
            | Mnemonic::ISC
            | Mnemonic::RLA
            | Mnemonic::RRA
            | Mnemonic::SBX
            | Mnemonic::SLO
            | Mnemonic::SRE
            | Mnemonic::XAA
            | Mnemonic::JAM => {}
        }
    }

    fn load<B: Bus + ?Sized>(&mut self, bus: &mut B, target: Target) -> u8 {
        match target {
            Target::Implied => 0,
            Target::Accumulator => self.a,
            Target::Value(value) => value,
            Target::Address(addr) => bus.read(self, addr),
        }
    }

    fn store<B: Bus + ?Sized>(&mut self, bus: &mut B, target: Target, value: u8) {
        match target {
            Target::Accumulator => self.a = value,
            Target::Address(addr) => bus.write(self, addr, value),
            Target::Implied | Target::Value(_) => {}
        }
    }

    /// Read-modify-write: applies `op`, updates Z/N from the result and
    /// writes it back.
    fn modify<B, F>(&mut self, bus: &mut B, target: Target, op: F)
    where
        B: Bus + ?Sized,
        F: FnOnce(&mut Cpu, u8) -> u8,
    {
        let value = self.load(bus, target);
        let result = op(self, value);
        self.p.update_zn(result);
        self.store(bus, target, result);
    }

    fn add_with_carry(&mut self, value: u8) {
        let carry = u16::from(self.p.contains(Status::CARRY));
        let sum = u16::from(self.a) + u16::from(value) + carry;
        let result = sum as u8;
        let overflow = !(self.a ^ value) & (self.a ^ result) & 0x80 != 0;
        self.p.set(Status::CARRY, sum > 0xFF);
        self.p.set(Status::OVERFLOW, overflow);
        self.a = result;
        self.p.update_zn(result);
    }

    fn compare(&mut self, register: u8, value: u8) {
        self.p.set(Status::CARRY, register >= value);
        self.p.update_zero(register ^ value);
        self.p.update_negative(register.wrapping_sub(value));
    }

    fn branch(&mut self, target: Target, taken: bool) {
        if let (true, Target::Value(offset)) = (taken, target) {
            self.pc = self.pc.wrapping_add(offset as i8 as u16);
            self.cycles += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};

    use crate::{
        bus::mock::MockBus,
        cpu::{Cpu, status::Status},
        tests::TEST_COUNT,
    };

    /// Places `program` at `$0200` and points the CPU at it.
    fn setup(program: &[u8]) -> (Cpu, MockBus) {
        let mut bus = MockBus::default();
        bus.mem[0x0200..0x0200 + program.len()].copy_from_slice(program);
        let mut cpu = Cpu::new();
        cpu.pc = 0x0200;
        cpu.p = Status::empty();
        (cpu, bus)
    }

    #[test]
    fn adc_signed_overflow_vector() {
        let (mut cpu, mut bus) = setup(&[0x69, 0x50]);
        cpu.a = 0x50;
        cpu.step(&mut bus);

        assert_eq!(cpu.a, 0xA0);
        assert!(!cpu.p.contains(Status::CARRY));
        assert!(!cpu.p.contains(Status::ZERO));
        assert!(cpu.p.contains(Status::NEGATIVE));
        assert!(cpu.p.contains(Status::OVERFLOW));
    }

    #[test]
    fn adc_and_sbc_match_wide_arithmetic() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(0x6502);
        for _ in 0..TEST_COUNT {
            let a: u8 = rng.random();
            let m: u8 = rng.random();
            let carry: bool = rng.random();
            let subtract: bool = rng.random();

            let opcode = if subtract { 0xE9 } else { 0x69 };
            let (mut cpu, mut bus) = setup(&[opcode, m]);
            cpu.a = a;
            cpu.p.set(Status::CARRY, carry);
            cpu.step(&mut bus);

            let (expected, carry_out, overflow) = if subtract {
                let wide = i16::from(a) - i16::from(m) - i16::from(!carry);
                let signed = i16::from(a as i8) - i16::from(m as i8) - i16::from(!carry);
                (wide as u8, wide >= 0, !(-128..=127).contains(&signed))
            } else {
                let wide = u16::from(a) + u16::from(m) + u16::from(carry);
                let signed = i16::from(a as i8) + i16::from(m as i8) + i16::from(carry);
                (wide as u8, wide > 0xFF, !(-128..=127).contains(&signed))
            };
            assert_eq!(cpu.a, expected, "a={a:#04x} m={m:#04x} c={carry} sub={subtract}");
            assert_eq!(cpu.p.contains(Status::CARRY), carry_out);
            assert_eq!(cpu.p.contains(Status::OVERFLOW), overflow);
            assert_eq!(cpu.p.contains(Status::ZERO), expected == 0);
            assert_eq!(cpu.p.contains(Status::NEGATIVE), expected & 0x80 != 0);
        }
    }

    #[test]
    fn compare_sets_carry_zero_and_negative() {
        let (mut cpu, mut bus) = setup(&[0xC9, 0x10, 0xC9, 0x20, 0xC9, 0x30]);
        cpu.a = 0x20;
        cpu.step(&mut bus);
        assert!(cpu.p.contains(Status::CARRY));
        assert!(!cpu.p.contains(Status::ZERO));

        cpu.step(&mut bus);
        assert!(cpu.p.contains(Status::CARRY | Status::ZERO));

        cpu.step(&mut bus);
        assert!(!cpu.p.contains(Status::CARRY));
        assert!(cpu.p.contains(Status::NEGATIVE));
    }

    #[test]
    fn ror_takes_negative_from_result() {
        let (mut cpu, mut bus) = setup(&[0x6A, 0x6A]);
        cpu.a = 0x01;
        cpu.p.insert(Status::CARRY);
        cpu.step(&mut bus);
        assert_eq!(cpu.a, 0x80);
        assert!(cpu.p.contains(Status::CARRY | Status::NEGATIVE));

        cpu.p.remove(Status::CARRY);
        cpu.a = 0x02;
        cpu.step(&mut bus);
        assert_eq!(cpu.a, 0x01);
        assert!(!cpu.p.contains(Status::NEGATIVE));
        assert!(!cpu.p.contains(Status::CARRY));
    }

    #[test]
    fn read_modify_write_on_memory() {
        let (mut cpu, mut bus) = setup(&[0x06, 0x10, 0xE6, 0x11, 0xC6, 0x12]);
        bus.mem[0x10] = 0x81;
        bus.mem[0x11] = 0xFF;
        bus.mem[0x12] = 0x01;

        cpu.step(&mut bus);
        assert_eq!(bus.mem[0x10], 0x02);
        assert!(cpu.p.contains(Status::CARRY));

        cpu.step(&mut bus);
        assert_eq!(bus.mem[0x11], 0x00);
        assert!(cpu.p.contains(Status::ZERO));

        cpu.step(&mut bus);
        assert_eq!(bus.mem[0x12], 0x00);
    }

    #[test]
    fn bit_copies_operand_bits() {
        let (mut cpu, mut bus) = setup(&[0x24, 0x40]);
        bus.mem[0x40] = 0xC0;
        cpu.a = 0x01;
        cpu.step(&mut bus);
        assert!(cpu.p.contains(Status::ZERO | Status::NEGATIVE | Status::OVERFLOW));
        assert_eq!(cpu.a, 0x01);
    }

    #[test]
    fn taken_branch_costs_one_more_cycle() {
        let (mut cpu, mut bus) = setup(&[0xD0, 0xFC, 0xF0, 0x10]);
        cpu.step(&mut bus);
        assert_eq!(cpu.pc, 0x01FE);
        assert_eq!(cpu.cycles, 3);

        let (mut cpu, mut bus) = setup(&[0xF0, 0x10]);
        cpu.step(&mut bus);
        assert_eq!(cpu.pc, 0x0202);
        assert_eq!(cpu.cycles, 2);
    }

    #[test]
    fn jsr_and_rts_round_trip() {
        let (mut cpu, mut bus) = setup(&[0x20, 0x00, 0x03]);
        bus.mem[0x0300] = 0x60;
        cpu.s = 0xFF;

        cpu.step(&mut bus);
        assert_eq!(cpu.pc, 0x0300);
        assert_eq!(bus.mem[0x01FF], 0x02);
        assert_eq!(bus.mem[0x01FE], 0x02);

        cpu.step(&mut bus);
        assert_eq!(cpu.pc, 0x0203);
        assert_eq!(cpu.s, 0xFF);
    }

    #[test]
    fn jmp_indirect_page_wrap_bug() {
        let (mut cpu, mut bus) = setup(&[0x6C, 0xFF, 0x10]);
        bus.mem[0x10FF] = 0x80;
        bus.mem[0x1000] = 0x40;
        bus.mem[0x1100] = 0x50;
        cpu.step(&mut bus);
        assert_eq!(cpu.pc, 0x4080);
    }

    #[test]
    fn php_sets_break_and_plp_keeps_it() {
        let (mut cpu, mut bus) = setup(&[0x08, 0x28]);
        cpu.s = 0xFF;
        cpu.p = Status::CARRY;
        cpu.step(&mut bus);
        assert_eq!(bus.mem[0x01FF], 0x11);

        bus.mem[0x01FF] = 0xFF;
        cpu.step(&mut bus);
        assert_eq!(cpu.p.bits(), 0xCF);
    }

    #[test]
    fn brk_pushes_status_with_break_set() {
        let (mut cpu, mut bus) = setup(&[0x00, 0xEA]);
        bus.mem[0xFFFE] = 0x00;
        bus.mem[0xFFFF] = 0x90;
        cpu.s = 0xFF;
        cpu.step(&mut bus);

        assert_eq!(cpu.pc, 0x9000);
        assert_eq!(bus.mem[0x01FF], 0x02);
        assert_eq!(bus.mem[0x01FE], 0x02);
        assert_eq!(bus.mem[0x01FD] & Status::BREAK.bits(), Status::BREAK.bits());
        assert!(cpu.p.contains(Status::INTERRUPT));
        assert_eq!(cpu.cycles, 7);
    }

    #[test]
    fn rti_restores_status_and_pc() {
        let (mut cpu, mut bus) = setup(&[0x40]);
        cpu.s = 0xFC;
        bus.mem[0x01FD] = 0xC3;
        bus.mem[0x01FE] = 0x34;
        bus.mem[0x01FF] = 0x12;
        cpu.step(&mut bus);
        assert_eq!(cpu.pc, 0x1234);
        assert_eq!(cpu.p.bits(), 0xC3);
        assert_eq!(cpu.s, 0xFF);
    }

    #[test]
    fn undocumented_opcode_is_a_sized_no_op() {
        let (mut cpu, mut bus) = setup(&[0x07, 0x10]);
        bus.mem[0x10] = 0x55;
        cpu.a = 0x12;
        cpu.step(&mut bus);

        assert_eq!(cpu.pc, 0x0202);
        assert_eq!(cpu.cycles, 5);
        assert_eq!(cpu.a, 0x12);
        assert_eq!(bus.mem[0x10], 0x55);
        assert_eq!(cpu.p, Status::empty());
    }
}

use bitflags::bitflags;

bitflags! {
    /// Processor status register (P).
    ///
    /// Bit layout:
    /// 7 6 5 4 3 2 1 0
    /// N V _ B D I Z C
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Status: u8 {
        /// Carry (C). Set on unsigned overflow out of bit 7, cleared on borrow.
        const CARRY     = 0b0000_0001;

        /// Zero (Z).
        const ZERO      = 0b0000_0010;

        /// Interrupt disable (I). Masks IRQ, never NMI or reset.
        const INTERRUPT = 0b0000_0100;

        /// Decimal mode (D). Stored but ignored by the 2A03 adder.
        const DECIMAL   = 0b0000_1000;

        /// Break (B). Only meaningful in copies pushed to the stack.
        const BREAK     = 0b0001_0000;

        /// Unused bit 5.
        const UNUSED    = 0b0010_0000;

        /// Overflow (V). Signed overflow of ADC/SBC, bit 6 of the operand for BIT.
        const OVERFLOW  = 0b0100_0000;

        /// Negative (N). Bit 7 of the last result.
        const NEGATIVE  = 0b1000_0000;
    }
}

impl Status {
    /// Value loaded by a reset: I, B and bit 5 set.
    pub const RESET: Status = Status::from_bits_retain(0x34);

    /// Bits that survive `PLP`/`RTI`; the rest come from the stack.
    pub(crate) const PRESERVED_ON_PULL: Status = Status::BREAK.union(Status::UNUSED);

    pub fn update_zero(&mut self, value: u8) {
        self.set(Status::ZERO, value == 0);
    }

    pub fn update_negative(&mut self, value: u8) {
        self.set(Status::NEGATIVE, value & 0x80 != 0);
    }

    /// Updates Z and N from a result byte.
    pub fn update_zn(&mut self, value: u8) {
        self.update_zero(value);
        self.update_negative(value);
    }

    /// Merges a byte pulled from the stack, keeping B and bit 5 as they are.
    pub(crate) fn pull(self, byte: u8) -> Status {
        (self & Self::PRESERVED_ON_PULL) | (Status::from_bits_retain(byte) - Self::PRESERVED_ON_PULL)
    }
}

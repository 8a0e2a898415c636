use std::fmt::Display;

use crate::cpu::{addressing::Addressing, mnemonic::Mnemonic};

/// One row of the opcode table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction {
    pub mnemonic: Mnemonic,
    pub addressing: Addressing,
    /// Base cost in CPU cycles. Taken branches add one more.
    pub cycles: u8,
    /// `false` for undocumented opcodes, which retire as no-ops.
    pub official: bool,
}

impl Instruction {
    pub(crate) const fn official(mnemonic: Mnemonic, addressing: Addressing, cycles: u8) -> Self {
        Self {
            mnemonic,
            addressing,
            cycles,
            official: true,
        }
    }

    pub(crate) const fn illegal(mnemonic: Mnemonic, addressing: Addressing, cycles: u8) -> Self {
        Self {
            mnemonic,
            addressing,
            cycles,
            official: false,
        }
    }

    /// Total length in bytes, opcode included.
    pub const fn size(&self) -> u8 {
        1 + self.addressing.operand_len()
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.mnemonic, self.addressing)?;
        if !self.official {
            f.write_str(" (undocumented)")?;
        }
        Ok(())
    }
}

use core::ops::{Deref, DerefMut};

/// Fixed-size, heap-backed byte store shared by every memory owner.
///
/// Addresses are reduced modulo `N` on every access, so no caller can reach
/// past the end of a region.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ram<const N: usize>(Box<[u8; N]>);

pub mod cpu {
    use crate::memory::cpu as cpu_mem;

    /// The flat 64 KiB CPU view (RAM, mirrors and the PRG windows).
    pub type AddressSpace = super::Ram<{ cpu_mem::ADDRESS_SPACE_SIZE }>;
}

pub mod ppu {
    use crate::memory::ppu as ppu_mem;

    /// Pattern table bytes (`$0000-$1FFF`).
    pub type PatternRam = super::Ram<{ ppu_mem::CHR_SIZE }>;
    /// One physical 1 KiB nametable bank.
    pub type NametableRam = super::Ram<{ ppu_mem::NAMETABLE_SIZE }>;
    /// Primary sprite memory.
    pub type OamRam = super::Ram<{ ppu_mem::OAM_RAM_SIZE }>;
}

impl<const N: usize> Ram<N> {
    pub fn new() -> Self {
        Self(Box::new([0; N]))
    }

    pub fn read(&self, addr: usize) -> u8 {
        self.0[addr % N]
    }

    pub fn write(&mut self, addr: usize, value: u8) {
        self.0[addr % N] = value;
    }

    /// Copies `source` in starting at `offset`, truncating at the end of the block.
    pub fn load_into(&mut self, source: &[u8], offset: usize) {
        let start = offset % N;
        let len = source.len().min(N - start);
        self.0[start..start + len].copy_from_slice(&source[..len]);
    }
}

impl<const N: usize> Default for Ram<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Deref for Ram<N> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.0.as_slice()
    }
}

impl<const N: usize> DerefMut for Ram<N> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0.as_mut_slice()
    }
}

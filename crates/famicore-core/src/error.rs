use thiserror::Error;

use crate::cartridge::header::INES_HEADER_LEN;

/// Failures raised while turning a cartridge image into a playable machine.
///
/// Nothing at run time is represented here: address arithmetic always wraps and
/// illegal opcodes are reported through `tracing` instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Provided buffer is shorter than the 16-byte header.
    #[error("header expected {INES_HEADER_LEN} bytes, got {actual}")]
    TooShort { actual: usize },
    /// Magic number ("NES<EOF>") is missing.
    #[error("missing NES magic bytes")]
    InvalidMagic,
    /// A ROM section (trainer/PRG/CHR) is shorter than advertised.
    #[error("{section} section expected {expected} bytes, got {actual}")]
    SectionTooShort {
        section: &'static str,
        expected: usize,
        actual: usize,
    },
    /// Header declares no program banks at all.
    #[error("cartridge has no PRG ROM banks")]
    MissingPrgRom,
    /// The header names a mapper that has no bank-switch variant here.
    #[error("mapper {0} is not supported")]
    UnsupportedMapper(u16),
    /// Wrapper for I/O errors raised while reading ROMs from disk.
    #[error("i/o error while reading cartridge: {0}")]
    Io(#[from] std::io::Error),
}

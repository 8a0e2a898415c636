/// Layout mirroring type for the PPU nametables.
///
/// Each variant fully determines which of the four physical 1 KiB banks backs
/// each logical quadrant (`$2000`, `$2400`, `$2800`, `$2C00`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mirroring {
    /// Two horizontal nametables that mirror vertically (quadrant 1 aliases 0).
    Horizontal,
    /// Two vertical nametables that mirror horizontally (quadrant 2 aliases 0).
    Vertical,
    /// Single-screen mirroring using the first physical bank.
    SingleScreenLower,
    /// Single-screen mirroring using the second physical bank.
    SingleScreenUpper,
    /// Cartridge supplies its own four nametables.
    FourScreen,
}

impl Mirroring {
    /// Physical bank index backing each logical quadrant.
    pub const fn banks(self) -> [u8; 4] {
        match self {
            Mirroring::Horizontal => [0, 0, 2, 2],
            Mirroring::Vertical => [0, 1, 0, 1],
            Mirroring::SingleScreenLower => [0, 0, 0, 0],
            Mirroring::SingleScreenUpper => [1, 1, 1, 1],
            Mirroring::FourScreen => [0, 1, 2, 3],
        }
    }
}

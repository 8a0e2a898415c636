//! Standard 8-button pad on port 1 (`$4016`).
//!
//! Any write to the port snapshots the held buttons. Each read then shifts out
//! one button, A first; once all eight are out the port reads back `1` until
//! the next write.

use std::{fmt, str::FromStr};

/// Button ordering follows the pad's shift register (A first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    A = 0,
    B = 1,
    Select = 2,
    Start = 3,
    Up = 4,
    Down = 5,
    Left = 6,
    Right = 7,
}

impl Button {
    pub const ALL: [Button; 8] = [
        Button::A,
        Button::B,
        Button::Select,
        Button::Start,
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
    ];

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Button::A => "a",
            Button::B => "b",
            Button::Select => "select",
            Button::Start => "start",
            Button::Up => "up",
            Button::Down => "down",
            Button::Left => "left",
            Button::Right => "right",
        };
        f.write_str(name)
    }
}

impl FromStr for Button {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Button::ALL
            .into_iter()
            .find(|button| button.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown button `{s}`"))
    }
}

/// Pad state plus the snapshot being shifted out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Controller {
    held: u8,
    latched: u8,
    reads: u8,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_button(&mut self, button: Button, pressed: bool) {
        if pressed {
            self.held |= button.bit();
        } else {
            self.held &= !button.bit();
        }
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        self.held & button.bit() != 0
    }

    /// `$4016` write. The value itself is ignored.
    pub fn write(&mut self, _value: u8) {
        self.latched = self.held;
        self.reads = 0;
    }

    /// `$4016` read.
    pub fn read(&mut self) -> u8 {
        if self.reads >= 8 {
            return 1;
        }
        let bit = (self.latched >> self.reads) & 1;
        self.reads += 1;
        bit
    }
}

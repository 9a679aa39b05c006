//! # Processor Status Register
//!
//! The P register of the 6502. Bit 5 is not wired to a latch and always
//! reads back as 1; bit 4 (Break) only exists in copies pushed to the stack.

use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Flag {
    Carry            = 0b0000_0001,
    Zero             = 0b0000_0010,
    InterruptDisable = 0b0000_0100,
    Decimal          = 0b0000_1000,
    Break            = 0b0001_0000,
    Unused           = 0b0010_0000,
    Overflow         = 0b0100_0000,
    Negative         = 0b1000_0000,
}

impl Flag {
    pub const fn mask(self) -> u8 {
        self as u8
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Status(u8);

impl Status {
    /// Unused and InterruptDisable set.
    pub const POWER_ON: Status = Status(0b0010_0100);

    pub const fn from_bits(bits: u8) -> Self {
        Status(bits | Flag::Unused.mask())
    }

    pub const fn bits(self) -> u8 {
        self.0 | Flag::Unused.mask()
    }

    pub fn get(self, flag: Flag) -> bool {
        self.0 & flag.mask() != 0 || flag == Flag::Unused
    }

    /// The flag as a 0/1 value, handy for arithmetic with the carry.
    pub fn bit(self, flag: Flag) -> u8 {
        self.get(flag) as u8
    }

    pub fn set(&mut self, flag: Flag) {
        self.0 |= flag.mask();
    }

    pub fn clear(&mut self, flag: Flag) {
        if flag != Flag::Unused {
            self.0 &= !flag.mask();
        }
    }

    pub fn set_to(&mut self, flag: Flag, value: bool) {
        if value {
            self.set(flag);
        } else {
            self.clear(flag);
        }
    }

    pub fn set_all(&mut self, flags: &[Flag]) {
        for &flag in flags {
            self.set(flag);
        }
    }

    pub fn clear_all(&mut self, flags: &[Flag]) {
        for &flag in flags {
            self.clear(flag);
        }
    }

    /// Zero and Negative are decided separately; 0x80 sets N and clears Z.
    pub fn update_zero_negative(&mut self, value: u8) {
        self.set_to(Flag::Zero, value == 0);
        self.set_to(Flag::Negative, value & 0b1000_0000 != 0);
    }

    /// Image written to the stack by PHP/BRK (`brk == true`) or NMI/IRQ.
    pub fn to_stack(self, brk: bool) -> u8 {
        let bits = self.bits();
        if brk {
            bits | Flag::Break.mask()
        } else {
            bits & !Flag::Break.mask()
        }
    }

    /// Value restored by PLP/RTI: Break is dropped, Unused forced on.
    pub fn from_stack(byte: u8) -> Self {
        Status::from_bits(byte & !Flag::Break.mask())
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::POWER_ON
    }
}

impl fmt::Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Status({:#04x} {})", self.bits(), self)
    }
}

/// `NV-BDIZC` with lowercase for cleared flags.
impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(Flag, char); 8] = [
            (Flag::Negative, 'N'),
            (Flag::Overflow, 'V'),
            (Flag::Unused, '-'),
            (Flag::Break, 'B'),
            (Flag::Decimal, 'D'),
            (Flag::InterruptDisable, 'I'),
            (Flag::Zero, 'Z'),
            (Flag::Carry, 'C'),
        ];
        for (flag, name) in NAMES {
            let c = if self.get(flag) { name } else { name.to_ascii_lowercase() };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

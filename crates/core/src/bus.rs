//! # Memory Bus
//!
//! The CPU only sees a 64KB address space through [`Bus`]. How addresses
//! are routed (RAM mirrors, PPU registers, mapper windows) belongs to the
//! host; every address must be readable and writable without failing.

use crate::error::{CpuError, Result};

pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;
pub const PROGRAM_START: u16 = 0x8000;

/// Largest program `load_program` accepts: everything below the NMI vector.
pub const MAX_PROGRAM_LEN: usize = NMI_VECTOR as usize - PROGRAM_START as usize;

pub trait Bus {
    fn read_byte(&mut self, address: u16) -> u8;

    fn write_byte(&mut self, address: u16, value: u8);

    /// Debugger read. Must not disturb device state; buses with
    /// read-sensitive registers override this.
    fn peek_byte(&mut self, address: u16) -> u8 {
        self.read_byte(address)
    }

    /// Reads a little-endian word whose bytes live at two unrelated addresses.
    fn read_noncontinuous_word(&mut self, lo: u16, hi: u16) -> u16 {
        (self.read_byte(lo) as u16) | (self.read_byte(hi) as u16) << 8
    }

    fn read_word(&mut self, address: u16) -> u16 {
        self.read_noncontinuous_word(address, address.wrapping_add(1))
    }

    fn write_word(&mut self, address: u16, value: u16) {
        self.write_byte(address, value as u8);
        self.write_byte(address.wrapping_add(1), (value >> 8) as u8);
    }
}

impl<B: Bus + ?Sized> Bus for &mut B {
    fn read_byte(&mut self, address: u16) -> u8 {
        (**self).read_byte(address)
    }

    fn write_byte(&mut self, address: u16, value: u8) {
        (**self).write_byte(address, value)
    }

    fn peek_byte(&mut self, address: u16) -> u8 {
        (**self).peek_byte(address)
    }
}

/// Copies `program` to $8000 and points the reset vector at it.
pub fn load_program<B: Bus + ?Sized>(bus: &mut B, program: &[u8]) -> Result<()> {
    load_program_at(bus, PROGRAM_START, program)
}

/// Copies `program` to `origin` and points the reset vector at it.
/// The image has to end below the vectors.
pub fn load_program_at<B: Bus + ?Sized>(bus: &mut B, origin: u16, program: &[u8]) -> Result<()> {
    if origin as usize + program.len() > NMI_VECTOR as usize {
        return Err(CpuError::ProgramTooLarge(program.len()));
    }
    for (i, &byte) in program.iter().enumerate() {
        bus.write_byte(origin + i as u16, byte);
    }
    bus.write_word(RESET_VECTOR, origin);
    log::debug!("Loaded {} byte program at ${:04X}", program.len(), origin);
    Ok(())
}

/// Flat 64KB of RAM with no mirroring or devices.
pub struct Ram {
    memory: Box<[u8; 0x10000]>,
}

impl Ram {
    pub fn new() -> Self {
        Ram {
            memory: Box::new([0; 0x10000]),
        }
    }

    pub fn with_program(program: &[u8]) -> Result<Self> {
        let mut ram = Ram::new();
        load_program(&mut ram, program)?;
        Ok(ram)
    }

    /// Writes `data` starting at `start`, wrapping past $FFFF.
    pub fn load(&mut self, start: u16, data: &[u8]) {
        for (i, &value) in data.iter().enumerate() {
            let address = start.wrapping_add(i as u16);
            self.memory[address as usize] = value;
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.memory[..]
    }
}

impl Bus for Ram {
    fn read_byte(&mut self, address: u16) -> u8 {
        self.memory[address as usize]
    }

    fn write_byte(&mut self, address: u16, value: u8) {
        self.memory[address as usize] = value;
    }
}

impl Default for Ram {
    fn default() -> Self {
        Self::new()
    }
}

//! # 6502 CPU Implementation
//!
//! Fetch/decode/execute core of the NES 2A03. Decoding goes through the
//! [`OPCODES`](crate::opcode::OPCODES) table; the addressing-mode resolver
//! only peeks at the operand bytes and the loop skips over them afterwards,
//! unless the instruction already moved the program counter itself.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::bus::{self, Bus, Ram, IRQ_VECTOR, NMI_VECTOR, RESET_VECTOR};
use crate::error::{CpuError, Result};
use crate::opcode::{decode, AddressingMode, Instruction, Mnemonic};
use crate::status::{Flag, Status};

pub const STACK_BASE: u16 = 0x0100;
pub const STACK_RESET: u8 = 0xFD;

const INTERRUPT_CYCLES: u64 = 7;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Interrupt {
    Nmi,
    Reset,
    Irq,
    Break,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RunState {
    Fetching,
    Executing,
    Halted,
}

/// What to do when the fetched byte is not a documented opcode.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum UndefinedOpcodePolicy {
    /// Stop the CPU and report the opcode and its address.
    #[default]
    Halt,
    /// Log a warning and treat the byte as a one-byte, two-cycle NOP.
    Nop,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct CpuConfig {
    pub undefined_opcode: UndefinedOpcodePolicy,
}

/// Stop request shared with other threads; checked between instructions.
#[derive(Debug, Clone, Default)]
pub struct HaltHandle(Arc<AtomicBool>);

impl HaltHandle {
    pub fn halt(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Register snapshot for debuggers and state dumps.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct Registers {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub p: u8,
    pub cycles: u64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Operand {
    Address(u16),
    Accumulator,
    None,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Flow {
    Next,
    Jump,
}

pub struct Cpu<B: Bus = Ram> {
    pub bus: B,
    pc: u16,
    sp: u8,
    a: u8,
    x: u8,
    y: u8,
    p: Status,
    cycles: u64,
    state: RunState,
    config: CpuConfig,
    halt: HaltHandle,
    pending_nmi: bool,
    irq_line: bool,
    page_crossed: bool,
    extra_cycles: u64,
}

impl<B: Bus> Cpu<B> {
    /// Power-on state. Nothing runs until [`Cpu::reset`] loads the reset vector.
    pub fn new(bus: B) -> Self {
        Self::with_config(bus, CpuConfig::default())
    }

    pub fn with_config(bus: B, config: CpuConfig) -> Self {
        Cpu {
            bus,
            pc: 0,
            sp: STACK_RESET,
            a: 0,
            x: 0,
            y: 0,
            p: Status::POWER_ON,
            cycles: 0,
            state: RunState::Halted,
            config,
            halt: HaltHandle::default(),
            pending_nmi: false,
            irq_line: false,
            page_crossed: false,
            extra_cycles: 0,
        }
    }

    pub fn reset(&mut self) {
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.sp = STACK_RESET;
        self.p = Status::POWER_ON;
        self.pc = self.bus.read_word(RESET_VECTOR);
        self.cycles = INTERRUPT_CYCLES;
        self.pending_nmi = false;
        self.irq_line = false;
        self.halt.clear();
        self.state = RunState::Fetching;
        log::debug!("CPU reset, PC=${:04X}", self.pc);
    }

    /// Places `program` at $8000 and points the reset vector at it.
    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        bus::load_program(&mut self.bus, program)
    }

    pub fn load_program_at(&mut self, origin: u16, program: &[u8]) -> Result<()> {
        bus::load_program_at(&mut self.bus, origin, program)
    }

    pub fn config(&self) -> CpuConfig {
        self.config
    }

    pub fn set_config(&mut self, config: CpuConfig) {
        self.config = config;
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn sp(&self) -> u8 {
        self.sp
    }

    pub fn a(&self) -> u8 {
        self.a
    }

    pub fn x(&self) -> u8 {
        self.x
    }

    pub fn y(&self) -> u8 {
        self.y
    }

    pub fn status(&self) -> u8 {
        self.p.bits()
    }

    pub fn flags(&self) -> Status {
        self.p
    }

    pub fn flag(&self, flag: Flag) -> bool {
        self.p.get(flag)
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn registers(&self) -> Registers {
        Registers {
            a: self.a,
            x: self.x,
            y: self.y,
            sp: self.sp,
            pc: self.pc,
            p: self.p.bits(),
            cycles: self.cycles,
        }
    }

    pub fn halt_handle(&self) -> HaltHandle {
        self.halt.clone()
    }

    pub fn halt(&mut self) {
        self.halt.halt();
        self.state = RunState::Halted;
        log::debug!("CPU halted at PC=${:04X}", self.pc);
    }

    /// Continues from the current PC after an external halt.
    pub fn resume(&mut self) {
        self.halt.clear();
        if self.state == RunState::Halted {
            self.state = RunState::Fetching;
        }
    }

    /// Latches an NMI; it is taken before the next instruction.
    pub fn trigger_nmi(&mut self) {
        self.pending_nmi = true;
    }

    /// Drives the level-sensitive IRQ line.
    pub fn set_irq(&mut self, asserted: bool) {
        self.irq_line = asserted;
    }

    fn next_byte(&mut self) -> u8 {
        let value = self.bus.read_byte(self.pc);
        self.increment_pc();
        value
    }

    fn increment_pc(&mut self) {
        self.pc = self.pc.wrapping_add(1);
    }

    pub(crate) fn push_byte(&mut self, value: u8) {
        let address = STACK_BASE + self.sp as u16;
        self.bus.write_byte(address, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    pub(crate) fn pop_byte(&mut self) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        let address = STACK_BASE + self.sp as u16;
        self.bus.read_byte(address)
    }

    pub(crate) fn push_word(&mut self, value: u16) {
        self.push_byte((value >> 8) as u8);
        self.push_byte(value as u8);
    }

    pub(crate) fn pop_word(&mut self) -> u16 {
        let lo = self.pop_byte() as u16;
        let hi = self.pop_byte() as u16;
        (hi << 8) | lo
    }

    fn set_flags_carry_overflow(&mut self, m: u8, n: u8, result: u16) {
        self.p.set_to(Flag::Carry, result > 0xFF);
        self.p.set_to(
            Flag::Overflow,
            (m ^ result as u8) & (n ^ result as u8) & 0x80 != 0,
        );
    }

    /// Resolves the operand of the instruction whose operand bytes start at PC.
    /// Does not move PC.
    fn operand(&mut self, mode: AddressingMode) -> Operand {
        let pc = self.pc;
        let address = match mode {
            AddressingMode::Immediate | AddressingMode::Relative => pc,
            AddressingMode::ZeroPage => self.bus.read_byte(pc) as u16,
            AddressingMode::ZeroPageX => low_byte(offset(self.bus.read_byte(pc), self.x)),
            AddressingMode::ZeroPageY => low_byte(offset(self.bus.read_byte(pc), self.y)),
            AddressingMode::Absolute => self.bus.read_word(pc),
            AddressingMode::AbsoluteX => {
                let base = self.bus.read_word(pc);
                self.page_crossed = cross(base, self.x);
                offset(base, self.x)
            }
            AddressingMode::AbsoluteY => {
                let base = self.bus.read_word(pc);
                self.page_crossed = cross(base, self.y);
                offset(base, self.y)
            }
            AddressingMode::Indirect => {
                // The high byte never carries into the next page.
                let i = self.bus.read_word(pc);
                self.bus
                    .read_noncontinuous_word(i, high_byte(i) | low_byte(i.wrapping_add(1)))
            }
            AddressingMode::IndirectX => {
                let i = offset(self.bus.read_byte(pc), self.x);
                self.bus
                    .read_noncontinuous_word(low_byte(i), low_byte(i.wrapping_add(1)))
            }
            AddressingMode::IndirectY => {
                let i = self.bus.read_byte(pc) as u16;
                let base = self.bus.read_noncontinuous_word(i, low_byte(i + 1));
                self.page_crossed = cross(base, self.y);
                offset(base, self.y)
            }
            AddressingMode::Accumulator => return Operand::Accumulator,
            AddressingMode::Implied => return Operand::None,
        };
        Operand::Address(address)
    }

    fn read_operand(&mut self, operand: Operand) -> u8 {
        match operand {
            Operand::Address(address) => self.bus.read_byte(address),
            Operand::Accumulator => self.a,
            Operand::None => 0,
        }
    }

    fn write_operand(&mut self, operand: Operand, value: u8) {
        match operand {
            Operand::Address(address) => self.bus.write_byte(address, value),
            Operand::Accumulator => self.a = value,
            Operand::None => {}
        }
    }

    pub fn interrupt(&mut self, kind: Interrupt) {
        match kind {
            Interrupt::Reset => {
                self.reset();
                return;
            }
            Interrupt::Irq if self.p.get(Flag::InterruptDisable) => {
                log::trace!("IRQ masked at PC=${:04X}", self.pc);
                return;
            }
            _ => {}
        }

        self.push_word(self.pc);
        let status = self.p.to_stack(kind == Interrupt::Break);
        self.push_byte(status);
        self.p.set(Flag::InterruptDisable);

        let vector = match kind {
            Interrupt::Nmi => NMI_VECTOR,
            _ => IRQ_VECTOR,
        };
        let from = self.pc;
        self.pc = self.bus.read_word(vector);

        // BRK's cycles come from the opcode table.
        if kind != Interrupt::Break {
            self.cycles += INTERRUPT_CYCLES;
        }
        log::debug!("{:?} from ${:04X} to ${:04X}", kind, from, self.pc);
    }

    fn poll_interrupts(&mut self) {
        if self.pending_nmi {
            self.pending_nmi = false;
            self.interrupt(Interrupt::Nmi);
        } else if self.irq_line && !self.p.get(Flag::InterruptDisable) {
            self.interrupt(Interrupt::Irq);
        }
    }

    /// Executes exactly one instruction, taking a pending interrupt first.
    /// Returns the number of instructions executed.
    pub fn step(&mut self) -> Result<u32> {
        if self.halt.is_requested() {
            self.state = RunState::Halted;
        }
        if self.state == RunState::Halted {
            return Err(CpuError::Halted);
        }

        self.poll_interrupts();

        if log::log_enabled!(log::Level::Trace) {
            let line = crate::disasm::trace_line(self);
            log::trace!("{}", line);
        }

        let pc = self.pc;
        let opcode = self.next_byte();
        self.state = RunState::Executing;

        match decode(opcode) {
            Some(instruction) => self.execute(instruction),
            None => return self.undefined_opcode(opcode, pc),
        }

        self.state = RunState::Fetching;
        Ok(1)
    }

    fn undefined_opcode(&mut self, opcode: u8, address: u16) -> Result<u32> {
        match self.config.undefined_opcode {
            UndefinedOpcodePolicy::Halt => {
                log::error!("Undefined opcode 0x{:02X} at PC: 0x{:04X}", opcode, address);
                self.pc = address;
                self.state = RunState::Halted;
                Err(CpuError::UndefinedOpcode { opcode, address })
            }
            UndefinedOpcodePolicy::Nop => {
                log::warn!("Undefined opcode 0x{:02X} at PC: 0x{:04X} treated as NOP", opcode, address);
                self.cycles += 2;
                self.state = RunState::Fetching;
                Ok(1)
            }
        }
    }

    /// Steps until halted from outside. Returns the number of instructions run.
    pub fn run(&mut self) -> Result<u64> {
        self.run_until(|_| false)
    }

    /// Runs at most `budget` instructions.
    pub fn run_for(&mut self, budget: u64) -> Result<u64> {
        let mut seen = 0;
        self.run_until(|_| {
            let done = seen >= budget;
            seen += 1;
            done
        })
    }

    /// Steps until `stop` returns true for the state before an instruction,
    /// or until halted from outside.
    pub fn run_until<F>(&mut self, mut stop: F) -> Result<u64>
    where
        F: FnMut(&Self) -> bool,
    {
        let mut executed = 0;
        loop {
            if self.halt.is_requested() {
                self.state = RunState::Halted;
                log::debug!("Run stopped after {} instructions", executed);
                return Ok(executed);
            }
            if stop(&*self) {
                return Ok(executed);
            }
            match self.step() {
                Ok(n) => executed += n as u64,
                // Halt landed between the check above and the step.
                Err(CpuError::Halted) if self.halt.is_requested() => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn execute(&mut self, instruction: Instruction) {
        self.page_crossed = false;
        self.extra_cycles = 0;

        let operand = self.operand(instruction.mode);
        let flow = match instruction.mnemonic {
            // Loads and stores
            Mnemonic::Lda => self.lda(operand),
            Mnemonic::Ldx => self.ldx(operand),
            Mnemonic::Ldy => self.ldy(operand),
            Mnemonic::Sta => self.sta(operand),
            Mnemonic::Stx => self.stx(operand),
            Mnemonic::Sty => self.sty(operand),

            // Arithmetic and comparisons
            Mnemonic::Adc => self.adc(operand),
            Mnemonic::Sbc => self.sbc(operand),
            Mnemonic::Cmp => self.cmp(operand),
            Mnemonic::Cpx => self.cpx(operand),
            Mnemonic::Cpy => self.cpy(operand),

            // Bitwise operations
            Mnemonic::And => self.and(operand),
            Mnemonic::Ora => self.ora(operand),
            Mnemonic::Eor => self.eor(operand),
            Mnemonic::Bit => self.bit(operand),

            // Shifts and rotates
            Mnemonic::Asl => self.asl(operand),
            Mnemonic::Lsr => self.lsr(operand),
            Mnemonic::Rol => self.rol(operand),
            Mnemonic::Ror => self.ror(operand),

            // Increments and decrements
            Mnemonic::Inc => self.inc(operand),
            Mnemonic::Dec => self.dec(operand),
            Mnemonic::Inx => self.inx(),
            Mnemonic::Dex => self.dex(),
            Mnemonic::Iny => self.iny(),
            Mnemonic::Dey => self.dey(),

            // Register moves
            Mnemonic::Tax => self.tax(),
            Mnemonic::Tay => self.tay(),
            Mnemonic::Txa => self.txa(),
            Mnemonic::Tya => self.tya(),
            Mnemonic::Txs => self.txs(),
            Mnemonic::Tsx => self.tsx(),

            // Flag operations
            Mnemonic::Clc => self.set_flag(Flag::Carry, false),
            Mnemonic::Sec => self.set_flag(Flag::Carry, true),
            Mnemonic::Cli => self.set_flag(Flag::InterruptDisable, false),
            Mnemonic::Sei => self.set_flag(Flag::InterruptDisable, true),
            Mnemonic::Clv => self.set_flag(Flag::Overflow, false),
            Mnemonic::Cld => self.set_flag(Flag::Decimal, false),
            Mnemonic::Sed => self.set_flag(Flag::Decimal, true),

            // Branches
            Mnemonic::Bpl => self.branch(operand, !self.p.get(Flag::Negative)),
            Mnemonic::Bmi => self.branch(operand, self.p.get(Flag::Negative)),
            Mnemonic::Bvc => self.branch(operand, !self.p.get(Flag::Overflow)),
            Mnemonic::Bvs => self.branch(operand, self.p.get(Flag::Overflow)),
            Mnemonic::Bcc => self.branch(operand, !self.p.get(Flag::Carry)),
            Mnemonic::Bcs => self.branch(operand, self.p.get(Flag::Carry)),
            Mnemonic::Bne => self.branch(operand, !self.p.get(Flag::Zero)),
            Mnemonic::Beq => self.branch(operand, self.p.get(Flag::Zero)),

            // Jumps and procedure calls
            Mnemonic::Jmp => self.jmp(operand),
            Mnemonic::Jsr => self.jsr(operand),
            Mnemonic::Rts => self.rts(),
            Mnemonic::Brk => self.brk(),
            Mnemonic::Rti => self.rti(),

            // Stack operations
            Mnemonic::Pha => self.pha(),
            Mnemonic::Pla => self.pla(),
            Mnemonic::Php => self.php(),
            Mnemonic::Plp => self.plp(),

            Mnemonic::Nop => Flow::Next,
        };

        if flow == Flow::Next {
            self.pc = self.pc.wrapping_add(instruction.mode.operand_bytes() as u16);
        }

        let mut cycles = instruction.cycles as u64 + self.extra_cycles;
        if instruction.page_penalty && self.page_crossed {
            cycles += 1;
        }
        self.cycles += cycles;
    }

    // Instruction implementations
    fn lda(&mut self, operand: Operand) -> Flow {
        let value = self.read_operand(operand);
        self.p.update_zero_negative(value);
        self.a = value;
        Flow::Next
    }

    fn ldx(&mut self, operand: Operand) -> Flow {
        let value = self.read_operand(operand);
        self.p.update_zero_negative(value);
        self.x = value;
        Flow::Next
    }

    fn ldy(&mut self, operand: Operand) -> Flow {
        let value = self.read_operand(operand);
        self.p.update_zero_negative(value);
        self.y = value;
        Flow::Next
    }

    fn sta(&mut self, operand: Operand) -> Flow {
        self.write_operand(operand, self.a);
        Flow::Next
    }

    fn stx(&mut self, operand: Operand) -> Flow {
        self.write_operand(operand, self.x);
        Flow::Next
    }

    fn sty(&mut self, operand: Operand) -> Flow {
        self.write_operand(operand, self.y);
        Flow::Next
    }

    /// ADC core. The sum is kept 9 bits wide so carry and overflow are
    /// computed before truncation. Decimal mode does not exist on the 2A03.
    fn add_with_carry(&mut self, operand: u8) {
        let a = self.a;
        let result = a as u16 + operand as u16 + self.p.bit(Flag::Carry) as u16;
        self.set_flags_carry_overflow(a, operand, result);
        self.p.update_zero_negative(result as u8);
        self.a = result as u8;
    }

    fn adc(&mut self, operand: Operand) -> Flow {
        let value = self.read_operand(operand);
        self.add_with_carry(value);
        Flow::Next
    }

    /// A - M - (1 - C) == A + !M + C, so carry means "no borrow".
    fn sbc(&mut self, operand: Operand) -> Flow {
        let value = self.read_operand(operand);
        self.add_with_carry(!value);
        Flow::Next
    }

    fn compare(&mut self, register: u8, operand: Operand) -> Flow {
        let value = self.read_operand(operand);
        self.p.update_zero_negative(register.wrapping_sub(value));
        self.p.set_to(Flag::Carry, register >= value);
        Flow::Next
    }

    fn cmp(&mut self, operand: Operand) -> Flow {
        self.compare(self.a, operand)
    }

    fn cpx(&mut self, operand: Operand) -> Flow {
        self.compare(self.x, operand)
    }

    fn cpy(&mut self, operand: Operand) -> Flow {
        self.compare(self.y, operand)
    }

    fn and(&mut self, operand: Operand) -> Flow {
        let result = self.a & self.read_operand(operand);
        self.p.update_zero_negative(result);
        self.a = result;
        Flow::Next
    }

    fn ora(&mut self, operand: Operand) -> Flow {
        let result = self.a | self.read_operand(operand);
        self.p.update_zero_negative(result);
        self.a = result;
        Flow::Next
    }

    fn eor(&mut self, operand: Operand) -> Flow {
        let result = self.a ^ self.read_operand(operand);
        self.p.update_zero_negative(result);
        self.a = result;
        Flow::Next
    }

    fn bit(&mut self, operand: Operand) -> Flow {
        let value = self.read_operand(operand);
        self.p.set_to(Flag::Zero, self.a & value == 0);
        self.p.set_to(Flag::Overflow, value & 0b0100_0000 != 0);
        self.p.set_to(Flag::Negative, value & 0b1000_0000 != 0);
        Flow::Next
    }

    fn asl(&mut self, operand: Operand) -> Flow {
        let value = self.read_operand(operand);
        let result = value << 1;
        self.p.set_to(Flag::Carry, value & 0b1000_0000 != 0);
        self.p.update_zero_negative(result);
        self.write_operand(operand, result);
        Flow::Next
    }

    fn lsr(&mut self, operand: Operand) -> Flow {
        let value = self.read_operand(operand);
        let result = value >> 1;
        self.p.set_to(Flag::Carry, value & 0b0000_0001 != 0);
        self.p.update_zero_negative(result);
        self.write_operand(operand, result);
        Flow::Next
    }

    fn rol(&mut self, operand: Operand) -> Flow {
        let value = self.read_operand(operand);
        let result = (value << 1) | self.p.bit(Flag::Carry);
        self.p.set_to(Flag::Carry, value & 0b1000_0000 != 0);
        self.p.update_zero_negative(result);
        self.write_operand(operand, result);
        Flow::Next
    }

    fn ror(&mut self, operand: Operand) -> Flow {
        let value = self.read_operand(operand);
        let result = (value >> 1) | (self.p.bit(Flag::Carry) << 7);
        self.p.set_to(Flag::Carry, value & 0b0000_0001 != 0);
        self.p.update_zero_negative(result);
        self.write_operand(operand, result);
        Flow::Next
    }

    fn inc(&mut self, operand: Operand) -> Flow {
        let result = self.read_operand(operand).wrapping_add(1);
        self.p.update_zero_negative(result);
        self.write_operand(operand, result);
        Flow::Next
    }

    fn dec(&mut self, operand: Operand) -> Flow {
        let result = self.read_operand(operand).wrapping_sub(1);
        self.p.update_zero_negative(result);
        self.write_operand(operand, result);
        Flow::Next
    }

    fn inx(&mut self) -> Flow {
        self.x = self.x.wrapping_add(1);
        self.p.update_zero_negative(self.x);
        Flow::Next
    }

    fn dex(&mut self) -> Flow {
        self.x = self.x.wrapping_sub(1);
        self.p.update_zero_negative(self.x);
        Flow::Next
    }

    fn iny(&mut self) -> Flow {
        self.y = self.y.wrapping_add(1);
        self.p.update_zero_negative(self.y);
        Flow::Next
    }

    fn dey(&mut self) -> Flow {
        self.y = self.y.wrapping_sub(1);
        self.p.update_zero_negative(self.y);
        Flow::Next
    }

    fn tax(&mut self) -> Flow {
        self.x = self.a;
        self.p.update_zero_negative(self.x);
        Flow::Next
    }

    fn tay(&mut self) -> Flow {
        self.y = self.a;
        self.p.update_zero_negative(self.y);
        Flow::Next
    }

    fn txa(&mut self) -> Flow {
        self.a = self.x;
        self.p.update_zero_negative(self.a);
        Flow::Next
    }

    fn tya(&mut self) -> Flow {
        self.a = self.y;
        self.p.update_zero_negative(self.a);
        Flow::Next
    }

    // TXS is the only transfer that leaves the flags alone.
    fn txs(&mut self) -> Flow {
        self.sp = self.x;
        Flow::Next
    }

    fn tsx(&mut self) -> Flow {
        self.x = self.sp;
        self.p.update_zero_negative(self.x);
        Flow::Next
    }

    fn set_flag(&mut self, flag: Flag, value: bool) -> Flow {
        self.p.set_to(flag, value);
        Flow::Next
    }

    /// The displacement is signed and relative to the instruction after the branch.
    fn branch(&mut self, operand: Operand, condition: bool) -> Flow {
        if !condition {
            return Flow::Next;
        }
        let displacement = self.read_operand(operand) as i8;
        let next = self.pc.wrapping_add(1);
        let target = next.wrapping_add(displacement as u16);
        self.extra_cycles += 1;
        if high_byte(next) != high_byte(target) {
            self.extra_cycles += 1;
        }
        self.pc = target;
        Flow::Jump
    }

    fn jmp(&mut self, operand: Operand) -> Flow {
        if let Operand::Address(target) = operand {
            self.pc = target;
        }
        Flow::Jump
    }

    /// Pushes the address of the JSR's last byte; RTS adds the missing 1.
    fn jsr(&mut self, operand: Operand) -> Flow {
        let return_address = self.pc.wrapping_add(1);
        self.push_word(return_address);
        self.jmp(operand)
    }

    fn rts(&mut self) -> Flow {
        self.pc = self.pop_word().wrapping_add(1);
        Flow::Jump
    }

    /// BRK is two bytes long; the padding byte is skipped on return.
    fn brk(&mut self) -> Flow {
        self.increment_pc();
        self.interrupt(Interrupt::Break);
        Flow::Jump
    }

    fn rti(&mut self) -> Flow {
        self.p = Status::from_stack(self.pop_byte());
        self.pc = self.pop_word();
        Flow::Jump
    }

    fn pha(&mut self) -> Flow {
        self.push_byte(self.a);
        Flow::Next
    }

    fn pla(&mut self) -> Flow {
        self.a = self.pop_byte();
        self.p.update_zero_negative(self.a);
        Flow::Next
    }

    fn php(&mut self) -> Flow {
        self.push_byte(self.p.to_stack(true));
        Flow::Next
    }

    fn plp(&mut self) -> Flow {
        self.p = Status::from_stack(self.pop_byte());
        Flow::Next
    }
}

impl Default for Cpu<Ram> {
    fn default() -> Self {
        Self::new(Ram::new())
    }
}

fn cross(base: u16, offset: u8) -> bool {
    (base & 0xFF) + offset as u16 > 0xFF
}

fn offset<T: Into<u16>>(base: T, offset: u8) -> u16 {
    base.into().wrapping_add(offset as u16)
}

fn low_byte<T: Into<u16>>(value: T) -> u16 {
    value.into() & 0xFF
}

fn high_byte(value: u16) -> u16 {
    value & 0xFF00
}

//! # Opcode Table
//!
//! 256-entry decode table: opcode byte to mnemonic, addressing mode and
//! timing. Bytes with no documented instruction are `None` so the CPU can
//! report them instead of running them as a NOP.

use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndirectX,
    IndirectY,
    Relative,
    Accumulator,
    Implied,
}

impl AddressingMode {
    /// Operand bytes following the opcode.
    pub const fn operand_bytes(self) -> u8 {
        match self {
            AddressingMode::Accumulator | AddressingMode::Implied => 0,
            AddressingMode::Absolute
            | AddressingMode::AbsoluteX
            | AddressingMode::AbsoluteY
            | AddressingMode::Indirect => 2,
            _ => 1,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rol,
    Ror,
    Rti,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
}

impl Mnemonic {
    pub const fn as_str(self) -> &'static str {
        match self {
            Mnemonic::Adc => "ADC",
            Mnemonic::And => "AND",
            Mnemonic::Asl => "ASL",
            Mnemonic::Bcc => "BCC",
            Mnemonic::Bcs => "BCS",
            Mnemonic::Beq => "BEQ",
            Mnemonic::Bit => "BIT",
            Mnemonic::Bmi => "BMI",
            Mnemonic::Bne => "BNE",
            Mnemonic::Bpl => "BPL",
            Mnemonic::Brk => "BRK",
            Mnemonic::Bvc => "BVC",
            Mnemonic::Bvs => "BVS",
            Mnemonic::Clc => "CLC",
            Mnemonic::Cld => "CLD",
            Mnemonic::Cli => "CLI",
            Mnemonic::Clv => "CLV",
            Mnemonic::Cmp => "CMP",
            Mnemonic::Cpx => "CPX",
            Mnemonic::Cpy => "CPY",
            Mnemonic::Dec => "DEC",
            Mnemonic::Dex => "DEX",
            Mnemonic::Dey => "DEY",
            Mnemonic::Eor => "EOR",
            Mnemonic::Inc => "INC",
            Mnemonic::Inx => "INX",
            Mnemonic::Iny => "INY",
            Mnemonic::Jmp => "JMP",
            Mnemonic::Jsr => "JSR",
            Mnemonic::Lda => "LDA",
            Mnemonic::Ldx => "LDX",
            Mnemonic::Ldy => "LDY",
            Mnemonic::Lsr => "LSR",
            Mnemonic::Nop => "NOP",
            Mnemonic::Ora => "ORA",
            Mnemonic::Pha => "PHA",
            Mnemonic::Php => "PHP",
            Mnemonic::Pla => "PLA",
            Mnemonic::Plp => "PLP",
            Mnemonic::Rol => "ROL",
            Mnemonic::Ror => "ROR",
            Mnemonic::Rti => "RTI",
            Mnemonic::Rts => "RTS",
            Mnemonic::Sbc => "SBC",
            Mnemonic::Sec => "SEC",
            Mnemonic::Sed => "SED",
            Mnemonic::Sei => "SEI",
            Mnemonic::Sta => "STA",
            Mnemonic::Stx => "STX",
            Mnemonic::Sty => "STY",
            Mnemonic::Tax => "TAX",
            Mnemonic::Tay => "TAY",
            Mnemonic::Tsx => "TSX",
            Mnemonic::Txa => "TXA",
            Mnemonic::Txs => "TXS",
            Mnemonic::Tya => "TYA",
        }
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: u8,
    pub mnemonic: Mnemonic,
    pub mode: AddressingMode,
    /// Base cycle count, before page-crossing and branch penalties.
    pub cycles: u8,
    /// One extra cycle when the indexed address crosses a page.
    pub page_penalty: bool,
}

impl Instruction {
    /// Total length in bytes, opcode included.
    pub const fn len(&self) -> u8 {
        1 + self.mode.operand_bytes()
    }
}

pub const OPCODES: [Option<Instruction>; 256] = build_table();

pub fn decode(opcode: u8) -> Option<Instruction> {
    OPCODES[opcode as usize]
}

const fn build_table() -> [Option<Instruction>; 256] {
    let mut table = [None; 256];
    let mut i = 0;
    while i < 256 {
        let opcode = i as u8;
        table[i] = match lookup(opcode) {
            Some((mnemonic, mode, cycles, page_penalty)) => Some(Instruction {
                opcode,
                mnemonic,
                mode,
                cycles,
                page_penalty,
            }),
            None => None,
        };
        i += 1;
    }
    table
}

const fn lookup(opcode: u8) -> Option<(Mnemonic, AddressingMode, u8, bool)> {
    use AddressingMode::*;
    use Mnemonic::*;

    let entry = match opcode {
        // Loads
        0xa9 => (Lda, Immediate, 2, false),
        0xa5 => (Lda, ZeroPage, 3, false),
        0xb5 => (Lda, ZeroPageX, 4, false),
        0xad => (Lda, Absolute, 4, false),
        0xbd => (Lda, AbsoluteX, 4, true),
        0xb9 => (Lda, AbsoluteY, 4, true),
        0xa1 => (Lda, IndirectX, 6, false),
        0xb1 => (Lda, IndirectY, 5, true),

        0xa2 => (Ldx, Immediate, 2, false),
        0xa6 => (Ldx, ZeroPage, 3, false),
        0xb6 => (Ldx, ZeroPageY, 4, false),
        0xae => (Ldx, Absolute, 4, false),
        0xbe => (Ldx, AbsoluteY, 4, true),

        0xa0 => (Ldy, Immediate, 2, false),
        0xa4 => (Ldy, ZeroPage, 3, false),
        0xb4 => (Ldy, ZeroPageX, 4, false),
        0xac => (Ldy, Absolute, 4, false),
        0xbc => (Ldy, AbsoluteX, 4, true),

        // Stores
        0x85 => (Sta, ZeroPage, 3, false),
        0x95 => (Sta, ZeroPageX, 4, false),
        0x8d => (Sta, Absolute, 4, false),
        0x9d => (Sta, AbsoluteX, 5, false),
        0x99 => (Sta, AbsoluteY, 5, false),
        0x81 => (Sta, IndirectX, 6, false),
        0x91 => (Sta, IndirectY, 6, false),

        0x86 => (Stx, ZeroPage, 3, false),
        0x96 => (Stx, ZeroPageY, 4, false),
        0x8e => (Stx, Absolute, 4, false),

        0x84 => (Sty, ZeroPage, 3, false),
        0x94 => (Sty, ZeroPageX, 4, false),
        0x8c => (Sty, Absolute, 4, false),

        // Arithmetic
        0x69 => (Adc, Immediate, 2, false),
        0x65 => (Adc, ZeroPage, 3, false),
        0x75 => (Adc, ZeroPageX, 4, false),
        0x6d => (Adc, Absolute, 4, false),
        0x7d => (Adc, AbsoluteX, 4, true),
        0x79 => (Adc, AbsoluteY, 4, true),
        0x61 => (Adc, IndirectX, 6, false),
        0x71 => (Adc, IndirectY, 5, true),

        0xe9 => (Sbc, Immediate, 2, false),
        0xe5 => (Sbc, ZeroPage, 3, false),
        0xf5 => (Sbc, ZeroPageX, 4, false),
        0xed => (Sbc, Absolute, 4, false),
        0xfd => (Sbc, AbsoluteX, 4, true),
        0xf9 => (Sbc, AbsoluteY, 4, true),
        0xe1 => (Sbc, IndirectX, 6, false),
        0xf1 => (Sbc, IndirectY, 5, true),

        // Comparisons
        0xc9 => (Cmp, Immediate, 2, false),
        0xc5 => (Cmp, ZeroPage, 3, false),
        0xd5 => (Cmp, ZeroPageX, 4, false),
        0xcd => (Cmp, Absolute, 4, false),
        0xdd => (Cmp, AbsoluteX, 4, true),
        0xd9 => (Cmp, AbsoluteY, 4, true),
        0xc1 => (Cmp, IndirectX, 6, false),
        0xd1 => (Cmp, IndirectY, 5, true),

        0xe0 => (Cpx, Immediate, 2, false),
        0xe4 => (Cpx, ZeroPage, 3, false),
        0xec => (Cpx, Absolute, 4, false),

        0xc0 => (Cpy, Immediate, 2, false),
        0xc4 => (Cpy, ZeroPage, 3, false),
        0xcc => (Cpy, Absolute, 4, false),

        // Bitwise operations
        0x29 => (And, Immediate, 2, false),
        0x25 => (And, ZeroPage, 3, false),
        0x35 => (And, ZeroPageX, 4, false),
        0x2d => (And, Absolute, 4, false),
        0x3d => (And, AbsoluteX, 4, true),
        0x39 => (And, AbsoluteY, 4, true),
        0x21 => (And, IndirectX, 6, false),
        0x31 => (And, IndirectY, 5, true),

        0x09 => (Ora, Immediate, 2, false),
        0x05 => (Ora, ZeroPage, 3, false),
        0x15 => (Ora, ZeroPageX, 4, false),
        0x0d => (Ora, Absolute, 4, false),
        0x1d => (Ora, AbsoluteX, 4, true),
        0x19 => (Ora, AbsoluteY, 4, true),
        0x01 => (Ora, IndirectX, 6, false),
        0x11 => (Ora, IndirectY, 5, true),

        0x49 => (Eor, Immediate, 2, false),
        0x45 => (Eor, ZeroPage, 3, false),
        0x55 => (Eor, ZeroPageX, 4, false),
        0x4d => (Eor, Absolute, 4, false),
        0x5d => (Eor, AbsoluteX, 4, true),
        0x59 => (Eor, AbsoluteY, 4, true),
        0x41 => (Eor, IndirectX, 6, false),
        0x51 => (Eor, IndirectY, 5, true),

        0x24 => (Bit, ZeroPage, 3, false),
        0x2c => (Bit, Absolute, 4, false),

        // Shifts and rotates
        0x0a => (Asl, Accumulator, 2, false),
        0x06 => (Asl, ZeroPage, 5, false),
        0x16 => (Asl, ZeroPageX, 6, false),
        0x0e => (Asl, Absolute, 6, false),
        0x1e => (Asl, AbsoluteX, 7, false),

        0x4a => (Lsr, Accumulator, 2, false),
        0x46 => (Lsr, ZeroPage, 5, false),
        0x56 => (Lsr, ZeroPageX, 6, false),
        0x4e => (Lsr, Absolute, 6, false),
        0x5e => (Lsr, AbsoluteX, 7, false),

        0x2a => (Rol, Accumulator, 2, false),
        0x26 => (Rol, ZeroPage, 5, false),
        0x36 => (Rol, ZeroPageX, 6, false),
        0x2e => (Rol, Absolute, 6, false),
        0x3e => (Rol, AbsoluteX, 7, false),

        0x6a => (Ror, Accumulator, 2, false),
        0x66 => (Ror, ZeroPage, 5, false),
        0x76 => (Ror, ZeroPageX, 6, false),
        0x6e => (Ror, Absolute, 6, false),
        0x7e => (Ror, AbsoluteX, 7, false),

        // Increments and decrements
        0xe6 => (Inc, ZeroPage, 5, false),
        0xf6 => (Inc, ZeroPageX, 6, false),
        0xee => (Inc, Absolute, 6, false),
        0xfe => (Inc, AbsoluteX, 7, false),

        0xc6 => (Dec, ZeroPage, 5, false),
        0xd6 => (Dec, ZeroPageX, 6, false),
        0xce => (Dec, Absolute, 6, false),
        0xde => (Dec, AbsoluteX, 7, false),

        0xe8 => (Inx, Implied, 2, false),
        0xca => (Dex, Implied, 2, false),
        0xc8 => (Iny, Implied, 2, false),
        0x88 => (Dey, Implied, 2, false),

        // Register moves
        0xaa => (Tax, Implied, 2, false),
        0xa8 => (Tay, Implied, 2, false),
        0x8a => (Txa, Implied, 2, false),
        0x98 => (Tya, Implied, 2, false),
        0x9a => (Txs, Implied, 2, false),
        0xba => (Tsx, Implied, 2, false),

        // Flag operations
        0x18 => (Clc, Implied, 2, false),
        0x38 => (Sec, Implied, 2, false),
        0x58 => (Cli, Implied, 2, false),
        0x78 => (Sei, Implied, 2, false),
        0xb8 => (Clv, Implied, 2, false),
        0xd8 => (Cld, Implied, 2, false),
        0xf8 => (Sed, Implied, 2, false),

        // Branches
        0x10 => (Bpl, Relative, 2, false),
        0x30 => (Bmi, Relative, 2, false),
        0x50 => (Bvc, Relative, 2, false),
        0x70 => (Bvs, Relative, 2, false),
        0x90 => (Bcc, Relative, 2, false),
        0xb0 => (Bcs, Relative, 2, false),
        0xd0 => (Bne, Relative, 2, false),
        0xf0 => (Beq, Relative, 2, false),

        // Jumps
        0x4c => (Jmp, Absolute, 3, false),
        0x6c => (Jmp, Indirect, 5, false),

        // Procedure calls
        0x20 => (Jsr, Absolute, 6, false),
        0x60 => (Rts, Implied, 6, false),
        0x00 => (Brk, Implied, 7, false),
        0x40 => (Rti, Implied, 6, false),

        // Stack operations
        0x48 => (Pha, Implied, 3, false),
        0x68 => (Pla, Implied, 4, false),
        0x08 => (Php, Implied, 3, false),
        0x28 => (Plp, Implied, 4, false),

        0xea => (Nop, Implied, 2, false),

        _ => return None,
    };
    Some(entry)
}

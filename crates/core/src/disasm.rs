//! # Disassembler
//! 逆アセンブルとトレース出力

use crate::bus::Bus;
use crate::cpu::Cpu;
use crate::opcode::{decode, AddressingMode};

/// Disassembles the instruction at `address`. Returns the text and its
/// length in bytes. Undefined opcodes come out as a `.db` byte.
///
/// Memory is only peeked, and only the bytes the instruction occupies.
pub fn disassemble_one<B: Bus + ?Sized>(bus: &mut B, address: u16) -> (String, u8) {
    let opcode = bus.peek_byte(address);
    let instruction = match decode(opcode) {
        Some(instruction) => instruction,
        None => return (format!(".db ${:02X}", opcode), 1),
    };

    let len = instruction.len();
    let lo = if len > 1 {
        bus.peek_byte(address.wrapping_add(1))
    } else {
        0
    };
    let hi = if len > 2 {
        bus.peek_byte(address.wrapping_add(2))
    } else {
        0
    };
    let word = (hi as u16) << 8 | lo as u16;

    let operand = match instruction.mode {
        AddressingMode::Implied => String::new(),
        AddressingMode::Accumulator => " A".to_string(),
        AddressingMode::Immediate => format!(" #${:02X}", lo),
        AddressingMode::ZeroPage => format!(" ${:02X}", lo),
        AddressingMode::ZeroPageX => format!(" ${:02X},X", lo),
        AddressingMode::ZeroPageY => format!(" ${:02X},Y", lo),
        AddressingMode::Absolute => format!(" ${:04X}", word),
        AddressingMode::AbsoluteX => format!(" ${:04X},X", word),
        AddressingMode::AbsoluteY => format!(" ${:04X},Y", word),
        AddressingMode::Indirect => format!(" (${:04X})", word),
        AddressingMode::IndirectX => format!(" (${:02X},X)", lo),
        AddressingMode::IndirectY => format!(" (${:02X}),Y", lo),
        AddressingMode::Relative => {
            let target = address
                .wrapping_add(2)
                .wrapping_add(lo as i8 as u16);
            format!(" ${:04X}", target)
        }
    };

    (format!("{}{}", instruction.mnemonic, operand), len)
}

pub fn disassemble<B: Bus + ?Sized>(bus: &mut B, start: u16, count: usize) -> Vec<(u16, String)> {
    let mut result = Vec::with_capacity(count);
    let mut pc = start;

    for _ in 0..count {
        let (text, len) = disassemble_one(bus, pc);
        result.push((pc, text));
        pc = pc.wrapping_add(len as u16);
    }

    result
}

/// One line per instruction in the nestest log layout.
pub fn trace_line<B: Bus>(cpu: &mut Cpu<B>) -> String {
    let pc = cpu.pc();
    let (text, len) = disassemble_one(&mut cpu.bus, pc);

    let bytes = (0..len as u16)
        .map(|i| format!("{:02X}", cpu.bus.peek_byte(pc.wrapping_add(i))))
        .collect::<Vec<_>>()
        .join(" ");

    let r = cpu.registers();
    format!(
        "{:04X}  {:<8}  {:<30}  A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
        pc, bytes, text, r.a, r.x, r.y, r.p, r.sp, r.cycles
    )
}

/// メモリダンプを16進数文字列で取得
pub fn hex_dump(memory: &[u8], base: u16) -> String {
    let mut result = String::new();

    for (row, chunk) in memory.chunks(16).enumerate() {
        let address = base.wrapping_add((row * 16) as u16);
        result.push_str(&format!("{:04X}: ", address));

        for i in 0..16 {
            match chunk.get(i) {
                Some(b) => result.push_str(&format!("{:02X} ", b)),
                None => result.push_str("   "),
            }
            if i == 7 {
                result.push(' ');
            }
        }

        result.push_str(" |");
        for &b in chunk {
            if b.is_ascii_graphic() || b == b' ' {
                result.push(b as char);
            } else {
                result.push('.');
            }
        }
        result.push_str("|\n");
    }

    result
}

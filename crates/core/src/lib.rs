//! # NES CPU
//! NESの6502 CPUコア（命令デコード、実行、スタック、割り込み）

pub mod bus;
pub mod cpu;
pub mod disasm;
pub mod error;
pub mod opcode;
pub mod status;

pub use bus::{Bus, Ram};
pub use cpu::{Cpu, CpuConfig, HaltHandle, Interrupt, Registers, RunState, UndefinedOpcodePolicy};
pub use error::{CpuError, Result};
pub use opcode::{AddressingMode, Instruction, Mnemonic, OPCODES};
pub use status::{Flag, Status};

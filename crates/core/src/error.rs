//! エラー型の定義

use thiserror::Error;

/// CPUコアのエラー型
#[derive(Error, Debug)]
pub enum CpuError {
    #[error("Undefined opcode {opcode:#04x} at address {address:#06x}")]
    UndefinedOpcode { opcode: u8, address: u16 },

    #[error("CPU is halted")]
    Halted,

    #[error("Program of {0} bytes does not fit below the interrupt vectors")]
    ProgramTooLarge(usize),
}

/// Result型のエイリアス
pub type Result<T> = std::result::Result<T, CpuError>;

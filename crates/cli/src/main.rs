//! # NES CPU CLI
//!
//! 生のプログラムをロード（既定は$8000）して6502コアを実行するヘッドレスドライバ

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use nes_cpu::bus::PROGRAM_START;
use nes_cpu::{disasm, Cpu, CpuConfig, Ram, UndefinedOpcodePolicy};
use std::path::PathBuf;
use std::time::Duration;

/// NES 6502 CPU ランナー
#[derive(Parser, Debug)]
#[command(name = "nes_cpu_cli")]
#[command(about = "Run a raw 6502 program on the NES CPU core", long_about = None)]
struct Args {
    /// プログラムファイルのパス（生のバイナリ）
    #[arg(value_name = "PROGRAM")]
    program: PathBuf,

    /// ロードアドレス（省略時は$8000）。リセットベクタもこのアドレスを指す
    #[arg(short, long, value_parser = parse_address)]
    load_address: Option<u16>,

    /// 実行する最大命令数
    #[arg(short = 'n', long)]
    max_instructions: Option<u64>,

    /// このアドレスに到達したら停止（例: $8010, 0x8010）
    #[arg(short, long, value_parser = parse_address)]
    breakpoint: Option<u16>,

    /// 指定ミリ秒後に外部から停止
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// 未定義オペコードをNOPとして扱う
    #[arg(long)]
    illegal_as_nop: bool,

    /// 命令ごとのトレースを出力
    #[arg(short, long)]
    trace: bool,

    /// 終了時のレジスタをJSONで出力
    #[arg(long)]
    json: bool,

    /// 終了時にゼロページをダンプ
    #[arg(long)]
    dump_zero_page: bool,
}

fn parse_address(s: &str) -> std::result::Result<u16, String> {
    let digits = s
        .trim_start_matches('$')
        .trim_start_matches("0x")
        .trim_start_matches("0X");
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid address '{}': {}", s, e))
}

fn init_logger(trace: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if trace {
        builder.filter_module("nes_cpu::cpu", LevelFilter::Trace);
    }
    builder.init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.trace);

    let program = std::fs::read(&args.program)
        .with_context(|| format!("failed to read {}", args.program.display()))?;
    log::info!("Loaded program: {:?} ({} bytes)", args.program, program.len());

    let config = CpuConfig {
        undefined_opcode: if args.illegal_as_nop {
            UndefinedOpcodePolicy::Nop
        } else {
            UndefinedOpcodePolicy::Halt
        },
    };
    let mut cpu = Cpu::with_config(Ram::new(), config);
    let origin = args.load_address.unwrap_or(PROGRAM_START);
    cpu.load_program_at(origin, &program).with_context(|| {
        format!("cannot load {} at ${:04X}", args.program.display(), origin)
    })?;
    cpu.reset();

    if let Some(ms) = args.timeout_ms {
        let handle = cpu.halt_handle();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(ms));
            log::warn!("Timeout after {} ms, halting", ms);
            handle.halt();
        });
    }

    log::info!("Starting execution...");
    let outcome = run(&mut cpu, args.max_instructions, args.breakpoint);

    match &outcome {
        Ok(executed) => log::info!("Executed {} instructions", executed),
        Err(e) => log::error!("Execution stopped: {}", e),
    }

    print_state(&cpu, &args)?;

    match outcome {
        Ok(_) => Ok(()),
        Err(e) => Err(e).context("emulation error"),
    }
}

fn run(cpu: &mut Cpu, budget: Option<u64>, breakpoint: Option<u16>) -> nes_cpu::Result<u64> {
    let budget = budget.unwrap_or(u64::MAX);
    let mut seen = 0u64;
    cpu.run_until(|cpu| {
        if breakpoint == Some(cpu.pc()) {
            log::info!("Breakpoint hit at ${:04X}", cpu.pc());
            return true;
        }
        let done = seen >= budget;
        seen += 1;
        done
    })
}

fn print_state(cpu: &Cpu, args: &Args) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(&cpu.registers())?);
    } else {
        let r = cpu.registers();
        println!(
            "PC:{:04X} A:{:02X} X:{:02X} Y:{:02X} P:{:02X} [{}] SP:{:02X} CYC:{}",
            r.pc,
            r.a,
            r.x,
            r.y,
            r.p,
            cpu.flags(),
            r.sp,
            r.cycles
        );
    }

    if args.dump_zero_page {
        print!("{}", disasm::hex_dump(&cpu.bus.as_slice()[..0x100], 0x0000));
    }
    Ok(())
}

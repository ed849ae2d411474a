mod logging;

use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use lazy_static::lazy_static;
use rv32_stub_emulator::{
    Emulator, EmulatorConfig, EnvCallMode, debugger::TcpChannel, host::StdHost, load,
    ram_config,
};

use crate::logging::LogLevel;

lazy_static! {
    static ref cli_args: Args = Args::parse();
}

/// Accept decimal or `0x`-prefixed hex.
fn parse_size(s: &str) -> Result<usize, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|err| format!("invalid size {:?}: {}", s, err))
}

#[derive(Parser, Debug)]
#[command(version, about = "RV32IM emulator with a GDB remote stub", long_about = None)]
struct Args {
    /// Raw binary image, loaded at address 0.
    #[arg(default_value = "rom.bin")]
    path: PathBuf,

    /// Guest memory size in bytes.
    #[arg(short, long = "mem-size", value_parser = parse_size, default_value_t = ram_config::DEFAULT_SIZE)]
    mem_size: usize,

    /// Wait for a GDB connection on this address, e.g. 127.0.0.1:1234.
    #[arg(short, long = "debug", value_name = "ADDR")]
    debug: Option<String>,

    /// Switch log level.
    #[arg(value_enum, long = "loglevel", default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// What `ecall` does.
    #[arg(value_enum, long = "ecall", default_value_t = EnvCallMode::Host)]
    env_call: EnvCallMode,
}

fn main() -> ExitCode {
    let _logger_handle = match logging::init(cli_args.log_level) {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("logging disabled: {}", err);
            None
        }
    };

    let config = EmulatorConfig::new()
        .mem_size(cli_args.mem_size)
        .env_call(cli_args.env_call)
        .break_on_attach(true);

    let image = match load::read_image(&cli_args.path) {
        Ok(image) => image,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    let mut emulator = match Emulator::from_binary(&image, config) {
        Ok(emulator) => emulator,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    };
    emulator.attach_host(StdHost::new());

    if let Some(addr) = cli_args.debug.as_deref() {
        match TcpChannel::accept(addr) {
            Ok(channel) => emulator.attach_debugger(channel),
            Err(err) => {
                eprintln!("cannot serve the debugger on {}: {}", addr, err);
                return ExitCode::FAILURE;
            }
        }
    }

    emulator.run()
}

//! Headless VT102 shell
//!
//! Feeds stdin through the emulator byte by byte, forwards anything the
//! terminal transmits to stdout, and logs interpreter errors without
//! stopping. With --snapshot, dumps a JSON screen snapshot at end of
//! input; used for golden tests and for driving the emulator from
//! scripts.

use std::env;
use std::error::Error;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;

use vt102_term::{CliArgs, Config, Emulator};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const HELP_TEXT: &str = r#"vt102 - a VT102 terminal emulation engine

USAGE:
    vt102 [OPTIONS]

Reads host output from stdin, writes terminal transmissions to stdout.

OPTIONS:
    -c, --config <PATH>  Path to config file (default: ~/.config/vt102/config.toml)
        --trace          Trace interpreter decisions to stderr
        --snapshot       Print a JSON screen snapshot at end of input
    -h, --help           Print help information
    -V, --version        Print version information

ENVIRONMENT VARIABLES:
    VT102_TRACE          Enable tracing ("1" or "true")
    VT102_ANSWERBACK     Power-up answerback message
    VT102_132_COLUMNS    Power up in 132-column mode ("1" or "true")
"#;

fn parse_args() -> Result<CliArgs, String> {
    let args: Vec<String> = env::args().collect();
    let mut cli_args = CliArgs::default();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            "-V" | "--version" => {
                println!("vt102 {VERSION}");
                process::exit(0);
            }
            "-c" | "--config" => {
                i += 1;
                if i >= args.len() {
                    return Err("--config requires a path argument".to_string());
                }
                cli_args.config_path = Some(PathBuf::from(&args[i]));
            }
            "--trace" => cli_args.trace = true,
            "--snapshot" => cli_args.snapshot = true,
            arg => {
                return Err(format!("unknown option: {arg}. Use --help for usage."));
            }
        }
        i += 1;
    }

    Ok(cli_args)
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli_args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    let config = match Config::load_with_args(&cli_args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            log::warn!("using default configuration: {e}");
            Config::default()
        }
    };

    let default_filter = if config.trace { "trace" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    log::info!("vt102 {VERSION} starting");

    let mut emu = Emulator::new();
    emu.set_answerback(config.answerback.as_bytes());
    if config.columns_132 {
        emu.screen.set_column_mode(true);
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut buf = [0u8; 4096];

    loop {
        let n = stdin.lock().read(&mut buf)?;
        if n == 0 {
            break;
        }
        for &byte in &buf[..n] {
            if let Err(e) = emu.interpret(byte) {
                // the interpreter has already recovered; only this
                // byte's effect is lost
                log::error!("interpret: {e}");
            }
        }
        let pending = emu.drain();
        if !pending.is_empty() {
            stdout.write_all(&pending)?;
            stdout.flush()?;
        }
    }

    if cli_args.snapshot {
        let json = serde_json::to_string_pretty(&emu.snapshot())?;
        println!("{json}");
    }

    log::info!("end of input");
    Ok(())
}

//! RV32I datapath simulator CLI.
//!
//! Assembles a source file, places the text and data segments, runs the
//! machine until the terminator word is reached, and prints the final
//! register file and run statistics.

use clap::Parser;
use std::{fs, process};
use tracing_subscriber::EnvFilter;

use rv32sim::asm;
use rv32sim::config::Config;
use rv32sim::core::Machine;

#[derive(Parser, Debug)]
#[command(author, version, about = "RV32I cycle-stepped datapath simulator")]
struct Args {
    /// Assembly source file.
    file: String,

    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<String>,

    /// Trace every clock cycle to stderr.
    #[arg(long)]
    trace: bool,

    /// Dump all written RAM bytes after the run.
    #[arg(long)]
    dump_ram: bool,
}

fn main() {
    let args = Args::parse();

    let config: Config = match &args.config {
        Some(path) => {
            let content = fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("[!] Could not read config '{path}': {e}");
                process::exit(1);
            });
            toml::from_str(&content).unwrap_or_else(|e| {
                eprintln!("[!] Could not parse config '{path}': {e}");
                process::exit(1);
            })
        }
        None => Config::default(),
    };

    let default_level = if args.trace || config.general.trace_cycles {
        "trace"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let source = fs::read_to_string(&args.file).unwrap_or_else(|e| {
        eprintln!("[!] Could not read '{}': {e}", args.file);
        process::exit(1);
    });

    let text_start = config.memory.text_start_val();
    let data_start = config.memory.data_start_val();
    let program = asm::assemble_at(&source, text_start, data_start).unwrap_or_else(|e| {
        eprintln!("{}: {e}", args.file);
        process::exit(1);
    });

    let mut machine = Machine::with_program(&config, &program.words());
    machine.load_bytes(data_start, &program.data);

    println!(
        "[*] {} instructions at {:#010x}, {} data bytes at {:#010x}",
        program.text.len(),
        text_start,
        program.data.len(),
        data_start
    );

    if let Err(e) = machine.run() {
        eprintln!("\n[!] SIMULATION ERROR: {e}");
        dump_registers(&machine);
        process::exit(1);
    }

    dump_registers(&machine);
    if args.dump_ram {
        println!("RAM:");
        for (addr, byte) in machine.ram_iter() {
            println!("  {addr:#010x} = {byte:#04x}");
        }
    }
    machine.stats().print();
}

fn dump_registers(machine: &Machine) {
    println!("PC = {:#010x}", machine.pc());
    for i in (0..32).step_by(2) {
        println!(
            "x{:<2}={:#010x} x{:<2}={:#010x}",
            i,
            machine.register(i),
            i + 1,
            machine.register(i + 1)
        );
    }
}

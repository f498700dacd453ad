//! Cycle-stepped RV32I datapath simulator.
//!
//! This crate simulates a single-hart RV32I core as a collection of
//! discrete hardware-like components (control FSM, instruction decoder,
//! ALU, register file, RAM, program counter, jump resolver, and routing
//! muxes) exchanging values over a shared wire record. One call to
//! `tick()` is one clock cycle; each instruction takes five cycles
//! through the control states FETCH, DECODE, EXECUTE, MEMORY, and
//! WRITEBACK. Intermediate signal values are exposed every cycle, which
//! makes the machine suitable for driving datapath visualizations.
//!
//! An RV32I assembler front-end turns a small textual dialect (labels,
//! pseudo-ops, data directives) into the machine words the core
//! executes. The all-zero word terminates a program.
//!
//! # Modules
//!
//! * `asm`: two-pass RV32I assembler.
//! * `common`: bit vectors, truth tables, error types.
//! * `config`: TOML-backed configuration.
//! * `core`: the machine and its components.
//! * `stats`: run statistics.

/// Two-pass RV32I assembler front-end.
pub mod asm;

/// Bit vectors, decode tables, and error types.
pub mod common;

/// Configuration loading and defaults.
pub mod config;

/// The machine: wires, control FSM, and datapath components.
pub mod core;

/// Cycle and instruction statistics.
pub mod stats;

pub use self::common::{Bits, SimError, TruthTable};
pub use self::config::Config;
pub use self::core::control::FsmState;
pub use self::core::Machine;

//! Datapath components.

/// The 32-bit integer ALU.
pub mod alu;

/// Instruction latch and field decoder.
pub mod imem;

/// The five routing muxes.
pub mod mux;

/// Program counter and jump resolution.
pub mod pc;

/// Sparse byte-addressable memory.
pub mod ram;

/// The 32-entry register file.
pub mod regfile;

pub use alu::Alu;
pub use imem::InstructionMemory;
pub use mux::Muxes;
pub use pc::{JumpControl, ProgramCounter};
pub use ram::Ram;
pub use regfile::RegisterFile;

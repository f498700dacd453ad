//! Engine errors.

use thiserror::Error;

/// Errors surfaced by the simulation engine.
///
/// Termination by the all-zero sentinel is not an error; `Machine::tick`
/// reports it through its boolean return value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// An opcode/funct combination fell through every decode table row.
    /// The control FSM does not advance past such a cycle.
    #[error("undefined decode: opcode {opcode:#09b} funct3 {funct3:#05b} in {state}")]
    UndefinedDecode {
        opcode: u8,
        funct3: u8,
        state: &'static str,
    },

    /// A register index outside x0-x31 was supplied to the machine.
    #[error("register index {0} out of range")]
    RegisterOutOfRange(usize),

    /// Register x0 is hardwired to zero and cannot hold another value.
    #[error("cannot preset x0 to {0:#010x}")]
    ZeroRegisterWrite(u32),
}

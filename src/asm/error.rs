//! Assembler errors with source positions.

use thiserror::Error;

/// What went wrong while assembling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AsmErrorKind {
    #[error("unknown instruction {0:?}")]
    UnknownMnemonic(String),

    #[error("unknown directive {0:?}")]
    UnknownDirective(String),

    #[error("unknown register {0:?}")]
    UnknownRegister(String),

    #[error("unknown label {0:?}")]
    UnknownLabel(String),

    #[error("duplicate label {0:?}")]
    DuplicateLabel(String),

    #[error("immediate {value} does not fit in {width} bits")]
    ImmediateRange { value: i64, width: u32 },

    #[error("branch/jump displacement {0} is not even")]
    OddDisplacement(i64),

    #[error("expected {0}")]
    Expected(&'static str),

    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("instructions are only allowed in the text section")]
    InstructionOutsideText,

    #[error("data directives are only allowed in the data section")]
    DataOutsideData,
}

/// An assembler diagnostic: the error kind plus the 1-based line and
/// column it was detected at.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}:{col}: {kind}")]
pub struct AsmError {
    pub line: usize,
    pub col: usize,
    pub kind: AsmErrorKind,
}

impl AsmError {
    pub fn new(line: usize, col: usize, kind: AsmErrorKind) -> Self {
        Self { line, col, kind }
    }
}

//! Common utilities shared across the simulator.
//!
//! Provides the fixed-width bit vector used on every multi-bit wire, the
//! pattern-matching truth table that backs the decode logic, and the
//! engine error type.

/// Fixed-width bit vectors.
pub mod bits;

/// Engine error types.
pub mod error;

/// Ordered `0/1/X` pattern tables.
pub mod truth_table;

pub use bits::Bits;
pub use error::SimError;
pub use truth_table::TruthTable;

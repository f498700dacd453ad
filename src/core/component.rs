//! The clocked component capability.

use super::wires::Wires;
use crate::common::SimError;

/// A datapath component driven by the two-phase clock.
///
/// On the rising edge a component samples its inputs from the wire
/// record and latched internal state, computes, and may publish
/// combinational outputs. On the falling edge it finalizes its outputs
/// on the wire record. The machine invokes components in a fixed order
/// each phase; that order is part of the machine's semantics.
pub trait Component {
    fn rising_edge(&mut self, wires: &mut Wires) -> Result<(), SimError>;

    fn falling_edge(&mut self, _wires: &mut Wires) {}
}

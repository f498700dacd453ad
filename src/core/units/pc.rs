//! Program counter and jump resolution.

use super::super::component::Component;
use super::super::wires::{JumpSrc, PcSrc, Wires};
use crate::common::SimError;

/// The 32-bit program counter register.
///
/// Commits `pc_in` on the falling edge when `load_pc` is asserted; the
/// PC-source mux has settled by then, so the write-back-cycle jump
/// decision lands in the same cycle. Publishes the current value
/// together with the next sequential address. Address arithmetic wraps
/// modulo 2^32.
pub struct ProgramCounter {
    value: u32,
}

impl ProgramCounter {
    pub fn new(reset_vector: u32) -> Self {
        Self { value: reset_vector }
    }

    pub fn value(&self) -> u32 {
        self.value
    }
}

impl Component for ProgramCounter {
    fn rising_edge(&mut self, _wires: &mut Wires) -> Result<(), SimError> {
        Ok(())
    }

    fn falling_edge(&mut self, wires: &mut Wires) {
        if wires.load_pc {
            self.value = wires.pc_in;
        }
        wires.pc_val = self.value;
        wires.pc_val4 = self.value.wrapping_add(4);
    }
}

/// Combinational branch/jump resolver.
///
/// Combines the ALU zero flag with the branch predicate masks and
/// publishes both the next-PC source selection and the resolved jump
/// address. The jump base is the PC for branches and JAL, and rs1 for
/// JALR; the immediate is already sign-extended, so two's-complement
/// wrapping addition applies the displacement.
pub struct JumpControl;

impl JumpControl {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JumpControl {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for JumpControl {
    fn rising_edge(&mut self, wires: &mut Wires) -> Result<(), SimError> {
        let taken = (wires.branch_zero && wires.alu_zero)
            || (wires.branch_not_zero && !wires.alu_zero);
        wires.pc_src = if taken { PcSrc::Jump } else { PcSrc::Pc4 };

        let base = match wires.jump_src {
            JumpSrc::PcImm => wires.pc_val,
            JumpSrc::Rs1Imm => wires.read_data1,
        };
        wires.jump_addr = base.wrapping_add(wires.immediate);
        Ok(())
    }
}

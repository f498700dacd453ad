//! The register file.
//!
//! Thirty-two 32-bit registers. Register x0 is hardwired to zero: reads
//! return zero and writes are silently discarded.

use super::super::component::Component;
use super::super::wires::Wires;
use crate::common::SimError;

/// The 32-entry general-purpose register file.
pub struct RegisterFile {
    regs: [u32; 32],
    out1: u32,
    out2: u32,
}

impl RegisterFile {
    pub fn new() -> Self {
        Self {
            regs: [0; 32],
            out1: 0,
            out2: 0,
        }
    }

    /// Reads a register. x0 always returns 0.
    pub fn read(&self, idx: usize) -> u32 {
        if idx == 0 {
            0
        } else {
            self.regs[idx]
        }
    }

    /// Writes a register. Writes to x0 are discarded.
    pub fn write(&mut self, idx: usize, val: u32) {
        if idx != 0 {
            self.regs[idx] = val;
        }
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for RegisterFile {
    /// Samples both read ports, then applies the write so the sampled
    /// outputs never reflect a same-cycle write.
    fn rising_edge(&mut self, wires: &mut Wires) -> Result<(), SimError> {
        self.out1 = self.read(wires.read_reg1);
        self.out2 = self.read(wires.read_reg2);
        if wires.reg_write {
            self.write(wires.write_reg, wires.write_data);
        }
        Ok(())
    }

    fn falling_edge(&mut self, wires: &mut Wires) {
        wires.read_data1 = self.out1;
        wires.read_data2 = self.out2;
    }
}

//! The routing muxes.
//!
//! Five selectors route datapath values between producers and consumers:
//! write-back data, both ALU operands, the next PC, and the memory
//! address. Muxes are pure routing. They settle on the rising edge so
//! downstream components see fresh values within the phase, and settle
//! again on the falling edge, which finalizes routes whose select lines
//! were driven later in the rising order (the PC-source select in
//! particular).

use super::super::component::Component;
use super::super::wires::{AluSrc1, AluSrc2, MemAddrSrc, PcSrc, Wires, WriteDataSrc};
use crate::common::SimError;

/// The five datapath muxes, evaluated as one ordered block.
pub struct Muxes;

impl Muxes {
    pub fn new() -> Self {
        Self
    }

    fn route(wires: &mut Wires) {
        wires.write_data = match wires.write_data_src {
            WriteDataSrc::AluOut => wires.alu_out,
            WriteDataSrc::MemRead => wires.mem_read_data,
            WriteDataSrc::Pc4 => wires.pc_val4,
            WriteDataSrc::Imm => wires.immediate,
        };

        wires.alu_in1 = match wires.alu_src1 {
            AluSrc1::Reg1 => wires.read_data1,
            AluSrc1::Pc => wires.pc_val,
        };

        wires.alu_in2 = match wires.alu_src2 {
            AluSrc2::Reg2 => wires.read_data2,
            AluSrc2::Imm => wires.immediate,
        };

        wires.pc_in = match wires.pc_src {
            PcSrc::Pc4 => wires.pc_val4,
            PcSrc::Jump => wires.jump_addr,
        };

        // A jump may leave the PC misaligned; the fetch still reads the
        // aligned word at that address. Data addresses pass through
        // byte-exact.
        wires.mem_address = match wires.mem_addr_src {
            MemAddrSrc::Pc => wires.pc_val & !3,
            MemAddrSrc::AluOut => wires.alu_out,
        };
    }
}

impl Default for Muxes {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Muxes {
    fn rising_edge(&mut self, wires: &mut Wires) -> Result<(), SimError> {
        Self::route(wires);
        Ok(())
    }

    fn falling_edge(&mut self, wires: &mut Wires) {
        Self::route(wires);
    }
}

//! Instruction latch and field decoder.
//!
//! Holds the most recently fetched instruction word and, every rising
//! edge, publishes its fixed fields (opcode, registers, funct3/funct7)
//! and the immediate reconstructed from the format table. Re-decoding
//! the same latched word always yields the same outputs.
//!
//! Latching the all-zero word (not a valid RV32I encoding) marks the
//! end of the program; the driver polls [`InstructionMemory::halted`]
//! after this component's rising step.

use super::super::component::Component;
use super::super::wires::Wires;
use crate::common::{Bits, SimError, TruthTable};

/// Encoding of `addi x0, x0, 0`, the reset value of the latch.
pub const NOP: u32 = 0x0000_0013;

/// Immediate layout families of RV32I.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ImmFormat {
    /// 12 bits from [31:20] (OP-IMM, loads, JALR).
    I,
    /// 12 bits from [31:25] and [11:7] (stores).
    S,
    /// 13 bits, branch displacement with implicit zero LSB.
    Sb,
    /// Upper 20 bits shifted into [31:12] (LUI, AUIPC).
    U,
    /// 21 bits, jump displacement with implicit zero LSB (JAL).
    Uj,
    /// No immediate; decodes as zero (R-type and unknowns).
    None,
}

/// Instruction register plus combinational field extraction.
pub struct InstructionMemory {
    latched: Bits,
    format_table: TruthTable<ImmFormat>,
}

impl InstructionMemory {
    pub fn new() -> Self {
        let format_table = TruthTable::new(vec![
            (vec!["00X0011"], ImmFormat::I),
            (vec!["1100111"], ImmFormat::I),
            (vec!["0100011"], ImmFormat::S),
            (vec!["1100011"], ImmFormat::Sb),
            (vec!["0X10111"], ImmFormat::U),
            (vec!["1101111"], ImmFormat::Uj),
            (vec!["0110011"], ImmFormat::None),
            (vec!["XXXXXXX"], ImmFormat::None),
        ]);
        Self {
            latched: Bits::word(NOP),
            format_table,
        }
    }

    /// The currently latched instruction word.
    pub fn instruction(&self) -> u32 {
        self.latched.to_word()
    }

    /// True once the all-zero terminator word has been latched.
    pub fn halted(&self) -> bool {
        self.latched.to_unsigned() == 0
    }

    fn immediate(&self, instr: Bits, opcode: Bits) -> u32 {
        let format = self
            .format_table
            .lookup(&[opcode])
            .copied()
            .unwrap_or(ImmFormat::None);

        let raw = match format {
            ImmFormat::I => instr.slice(20, 32),
            ImmFormat::S => Bits::join(&[instr.slice(25, 32), instr.slice(7, 12)]),
            ImmFormat::Sb => Bits::join(&[
                instr.slice(31, 32),
                instr.slice(7, 8),
                instr.slice(25, 31),
                instr.slice(8, 12),
                Bits::zero(1),
            ]),
            ImmFormat::U => Bits::join(&[instr.slice(12, 32), Bits::zero(12)]),
            ImmFormat::Uj => Bits::join(&[
                instr.slice(31, 32),
                instr.slice(12, 20),
                instr.slice(20, 21),
                instr.slice(21, 31),
                Bits::zero(1),
            ]),
            ImmFormat::None => Bits::zero(32),
        };
        raw.sign_extend(32).to_word()
    }
}

impl Default for InstructionMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for InstructionMemory {
    fn rising_edge(&mut self, wires: &mut Wires) -> Result<(), SimError> {
        if wires.load_instr {
            self.latched = Bits::word(wires.mem_read_data);
        }

        let instr = self.latched;
        wires.opcode = instr.slice(0, 7);
        wires.write_reg = instr.slice(7, 12).to_unsigned() as usize;
        wires.funct3 = instr.slice(12, 15);
        wires.read_reg1 = instr.slice(15, 20).to_unsigned() as usize;
        wires.read_reg2 = instr.slice(20, 25).to_unsigned() as usize;
        wires.funct7 = instr.slice(25, 32);
        wires.immediate = self.immediate(instr, wires.opcode);
        Ok(())
    }
}

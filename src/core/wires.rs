//! The shared signal record connecting all datapath components.
//!
//! `Wires` holds the current-cycle value of every inter-component signal.
//! It is owned by the machine and handed to each component by exclusive
//! reference in the fixed evaluation order, so every read observes the
//! write of an earlier-positioned component within the same phase.
//!
//! Signal widths: `u32` fields are 32-bit buses, `bool` fields are
//! single control lines, `Bits` fields carry their width explicitly, and
//! register indices are 5-bit values held as `usize` for indexing.

use crate::common::Bits;

/// Source selection for the register write-back value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WriteDataSrc {
    /// ALU result (R-type, I-type arithmetic, AUIPC).
    #[default]
    AluOut,
    /// Extended memory read data (loads).
    MemRead,
    /// Address of the next sequential instruction (JAL/JALR link).
    Pc4,
    /// Decoded immediate (LUI).
    Imm,
}

/// Source selection for the first ALU operand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AluSrc1 {
    /// rs1 register value.
    #[default]
    Reg1,
    /// Current program counter (AUIPC, JAL).
    Pc,
}

/// Source selection for the second ALU operand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AluSrc2 {
    /// rs2 register value.
    #[default]
    Reg2,
    /// Decoded immediate.
    Imm,
}

/// Source selection for the next program counter value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PcSrc {
    /// Fall through to the next sequential instruction.
    #[default]
    Pc4,
    /// Take the resolved jump address.
    Jump,
}

/// Source selection for the memory address.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MemAddrSrc {
    /// Program counter (instruction fetch).
    #[default]
    Pc,
    /// ALU result (load/store effective address).
    AluOut,
}

/// Base address selection for the jump resolver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JumpSrc {
    /// Program counter plus immediate (branches, JAL).
    #[default]
    PcImm,
    /// rs1 plus immediate (JALR).
    Rs1Imm,
}

/// All inter-component signals for the current cycle.
#[derive(Clone, Debug)]
pub struct Wires {
    // Control FSM outputs, restored to defaults at the start of every
    // rising edge by the FSM before any other component runs.
    /// Latch `mem_read_data` into the instruction register this cycle.
    pub load_instr: bool,
    /// Commit `pc_in` into the program counter this cycle.
    pub load_pc: bool,
    /// Write `write_data` into the register file this cycle.
    pub reg_write: bool,
    /// Perform a memory store this cycle.
    pub mem_write: bool,
    /// Zero-extend (rather than sign-extend) sub-word loads.
    pub mem_unsigned: bool,
    /// Memory access size selector, the low two funct3 bits.
    pub mem_size: Bits,
    /// ALU computes this cycle; otherwise it holds its last result.
    pub alu_calc: bool,
    /// ALU operation selector, 3 bits.
    pub alu_op: Bits,
    /// ALU alternate-operation bit (sub / arithmetic shift).
    pub alu_alt: bool,
    /// Branch taken when the ALU zero flag is set.
    pub branch_zero: bool,
    /// Branch taken when the ALU zero flag is clear.
    pub branch_not_zero: bool,
    pub write_data_src: WriteDataSrc,
    pub alu_src1: AluSrc1,
    pub alu_src2: AluSrc2,
    pub mem_addr_src: MemAddrSrc,
    pub jump_src: JumpSrc,

    // Decoder outputs.
    /// Instruction bits [6:0].
    pub opcode: Bits,
    /// Instruction bits [14:12].
    pub funct3: Bits,
    /// Instruction bits [31:25].
    pub funct7: Bits,
    /// rs1 index, 5 bits.
    pub read_reg1: usize,
    /// rs2 index, 5 bits.
    pub read_reg2: usize,
    /// rd index, 5 bits.
    pub write_reg: usize,
    /// Decoded immediate, sign-extended to 32 bits.
    pub immediate: u32,

    // Datapath buses.
    pub mem_address: u32,
    pub mem_read_data: u32,
    pub write_data: u32,
    pub read_data1: u32,
    pub read_data2: u32,
    pub alu_in1: u32,
    pub alu_in2: u32,
    pub alu_out: u32,
    pub alu_zero: bool,
    pub pc_val: u32,
    pub pc_val4: u32,
    pub pc_in: u32,
    pub pc_src: PcSrc,
    pub jump_addr: u32,
}

impl Wires {
    /// Builds the power-on wire state for a machine whose program counter
    /// starts at `pc`.
    pub fn at_reset(pc: u32) -> Self {
        Self {
            load_instr: false,
            load_pc: false,
            reg_write: false,
            mem_write: false,
            mem_unsigned: false,
            mem_size: Bits::unsigned(0b10, 2),
            alu_calc: false,
            alu_op: Bits::zero(3),
            alu_alt: false,
            branch_zero: false,
            branch_not_zero: false,
            write_data_src: WriteDataSrc::default(),
            alu_src1: AluSrc1::default(),
            alu_src2: AluSrc2::default(),
            mem_addr_src: MemAddrSrc::default(),
            jump_src: JumpSrc::default(),
            opcode: Bits::zero(7),
            funct3: Bits::zero(3),
            funct7: Bits::zero(7),
            read_reg1: 0,
            read_reg2: 0,
            write_reg: 0,
            immediate: 0,
            mem_address: 0,
            mem_read_data: 0,
            write_data: 0,
            read_data1: 0,
            read_data2: 0,
            alu_in1: 0,
            alu_in2: 0,
            alu_out: 0,
            alu_zero: true,
            pc_val: pc,
            pc_val4: pc.wrapping_add(4),
            pc_in: pc,
            pc_src: PcSrc::default(),
            jump_addr: 0,
        }
    }
}

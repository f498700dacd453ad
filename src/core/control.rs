//! The control finite-state machine.
//!
//! Walks the five-state sequence FETCH → DECODE → EXECUTE → MEMORY →
//! WRITEBACK, one state per clock cycle, and derives every control
//! signal from the current state plus the latched instruction's opcode
//! and funct fields. The decode decisions live in ordered truth tables
//! (`0/1/X` patterns, first match wins, trailing catch-alls for safe
//! defaults) so the tables themselves stay the source of truth.
//!
//! The FSM runs first on every rising edge and is the only component
//! that mutates control signals before the others observe them; it
//! starts each rising edge by restoring every signal it owns to its
//! default value.

use tracing::debug;

use super::component::Component;
use super::wires::{AluSrc1, AluSrc2, JumpSrc, MemAddrSrc, Wires, WriteDataSrc};
use crate::common::{Bits, SimError, TruthTable};

/// The five control states, advanced by one per cycle with wrap-around.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FsmState {
    #[default]
    Fetch,
    Decode,
    Execute,
    Memory,
    Writeback,
}

impl FsmState {
    /// The successor state; WRITEBACK wraps to FETCH.
    pub fn next(self) -> Self {
        match self {
            FsmState::Fetch => FsmState::Decode,
            FsmState::Decode => FsmState::Execute,
            FsmState::Execute => FsmState::Memory,
            FsmState::Memory => FsmState::Writeback,
            FsmState::Writeback => FsmState::Fetch,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FsmState::Fetch => "FETCH",
            FsmState::Decode => "DECODE",
            FsmState::Execute => "EXECUTE",
            FsmState::Memory => "MEMORY",
            FsmState::Writeback => "WRITEBACK",
        }
    }
}

/// How the ALU alternate-operation bit is derived for an opcode family.
#[derive(Clone, Copy, Debug)]
enum AltRule {
    /// Always zero.
    Zero,
    /// Always one (branch comparisons subtract).
    One,
    /// funct7 bit 5 (R-type add/sub, srl/sra).
    Funct7Bit5,
    /// funct7 bit 5, but only when funct3 selects a shift; for other
    /// OP-IMM instructions that field belongs to the immediate.
    ShiftFunct7,
}

/// How the 3-bit ALU operation selector is derived.
#[derive(Clone, Copy, Debug)]
enum OpRule {
    /// Straight from funct3.
    Funct3,
    /// Fixed add (address arithmetic, AUIPC, jumps).
    Add,
    /// funct3 bits [2:1], mapping branch conditions onto sub/slt/sltu.
    BranchFunct3,
}

/// One row of the EXECUTE-stage setup table.
#[derive(Clone, Copy, Debug)]
struct AluPlan {
    alt: AltRule,
    op: OpRule,
    src1: AluSrc1,
    src2: AluSrc2,
    calc: bool,
}

/// One row of the MEMORY-stage table.
#[derive(Clone, Copy, Debug)]
struct MemPlan {
    /// This opcode accesses data memory; size and signedness come from
    /// funct3 and the address from the ALU.
    active: bool,
    write: bool,
}

/// One row of the jump-setup table.
#[derive(Clone, Copy, Debug)]
struct JumpPlan {
    branch_zero: bool,
    branch_not_zero: bool,
    src: JumpSrc,
}

/// The control FSM and its decode tables.
pub struct ControlFsm {
    state: FsmState,
    alu_table: TruthTable<AluPlan>,
    mem_table: TruthTable<MemPlan>,
    wb_table: TruthTable<(bool, WriteDataSrc)>,
    jump_table: TruthTable<JumpPlan>,
}

impl ControlFsm {
    pub fn new() -> Self {
        Self {
            state: FsmState::Fetch,
            alu_table: Self::build_alu_table(),
            mem_table: Self::build_mem_table(),
            wb_table: Self::build_wb_table(),
            jump_table: Self::build_jump_table(),
        }
    }

    pub fn state(&self) -> FsmState {
        self.state
    }

    /// EXECUTE setup, keyed on opcode.
    fn build_alu_table() -> TruthTable<AluPlan> {
        use AluSrc1::*;
        use AluSrc2::*;
        let row = |alt, op, src1, src2, calc| AluPlan {
            alt,
            op,
            src1,
            src2,
            calc,
        };
        TruthTable::new(vec![
            // R-type arithmetic.
            (
                vec!["0110011"],
                row(AltRule::Funct7Bit5, OpRule::Funct3, Reg1, Reg2, true),
            ),
            // OP-IMM; the alternate bit only exists for shifts.
            (
                vec!["0010011"],
                row(AltRule::ShiftFunct7, OpRule::Funct3, Reg1, Imm, true),
            ),
            // AUIPC adds the immediate to the PC.
            (
                vec!["0010111"],
                row(AltRule::Zero, OpRule::Add, Pc, Imm, true),
            ),
            // Loads and stores compute the effective address.
            (
                vec!["0X00011"],
                row(AltRule::Zero, OpRule::Add, Reg1, Imm, true),
            ),
            // Branches compare by subtracting (or set-less-than).
            (
                vec!["1100011"],
                row(AltRule::One, OpRule::BranchFunct3, Reg1, Reg2, true),
            ),
            // JALR.
            (
                vec!["1100111"],
                row(AltRule::Zero, OpRule::Add, Reg1, Imm, true),
            ),
            // JAL.
            (
                vec!["1101111"],
                row(AltRule::Zero, OpRule::Add, Pc, Imm, true),
            ),
            // LUI and anything unrecognized keep the ALU idle.
            (
                vec!["XXXXXXX"],
                row(AltRule::Zero, OpRule::Add, Reg1, Reg2, false),
            ),
        ])
    }

    /// MEMORY-stage behavior, keyed on opcode and funct3.
    fn build_mem_table() -> TruthTable<MemPlan> {
        TruthTable::new(vec![
            (
                vec!["0000011", "XXX"],
                MemPlan {
                    active: true,
                    write: false,
                },
            ),
            (
                vec!["0100011", "XXX"],
                MemPlan {
                    active: true,
                    write: true,
                },
            ),
            (
                vec!["XXXXXXX", "XXX"],
                MemPlan {
                    active: false,
                    write: false,
                },
            ),
        ])
    }

    /// WRITEBACK register-write selection, keyed on opcode.
    fn build_wb_table() -> TruthTable<(bool, WriteDataSrc)> {
        TruthTable::new(vec![
            (vec!["0110011"], (true, WriteDataSrc::AluOut)),
            (vec!["0010011"], (true, WriteDataSrc::AluOut)),
            (vec!["0010111"], (true, WriteDataSrc::AluOut)),
            (vec!["0110111"], (true, WriteDataSrc::Imm)),
            (vec!["0000011"], (true, WriteDataSrc::MemRead)),
            (vec!["1101111"], (true, WriteDataSrc::Pc4)),
            (vec!["1100111"], (true, WriteDataSrc::Pc4)),
            // Branches, stores, unknowns write nothing.
            (vec!["XXXXXXX"], (false, WriteDataSrc::AluOut)),
        ])
    }

    /// Jump predicates and base selection, keyed on opcode and funct3.
    fn build_jump_table() -> TruthTable<JumpPlan> {
        let row = |branch_zero, branch_not_zero, src| JumpPlan {
            branch_zero,
            branch_not_zero,
            src,
        };
        TruthTable::new(vec![
            // JAL and JALR are unconditional.
            (vec!["1101111", "XXX"], row(true, true, JumpSrc::PcImm)),
            (vec!["1100111", "XXX"], row(true, true, JumpSrc::Rs1Imm)),
            // BEQ takes on zero; BNE on nonzero.
            (vec!["1100011", "000"], row(true, false, JumpSrc::PcImm)),
            (vec!["1100011", "001"], row(false, true, JumpSrc::PcImm)),
            // BLT/BLTU take when the set-less-than result is 1 (nonzero);
            // BGE/BGEU when it is 0.
            (vec!["1100011", "100"], row(false, true, JumpSrc::PcImm)),
            (vec!["1100011", "101"], row(true, false, JumpSrc::PcImm)),
            (vec!["1100011", "110"], row(false, true, JumpSrc::PcImm)),
            (vec!["1100011", "111"], row(true, false, JumpSrc::PcImm)),
            (vec!["XXXXXXX", "XXX"], row(false, false, JumpSrc::PcImm)),
        ])
    }

    /// Restores every FSM-owned signal to its default value. Runs at the
    /// start of each rising edge, before any state-specific assertion,
    /// so signals have defined values for the whole cycle.
    pub fn reset_outputs(&self, wires: &mut Wires) {
        wires.load_instr = false;
        wires.load_pc = false;
        wires.reg_write = false;
        wires.mem_write = false;
        wires.mem_unsigned = false;
        wires.mem_size = Bits::unsigned(0b10, 2);
        wires.alu_calc = false;
        wires.alu_op = Bits::zero(3);
        wires.alu_alt = false;
        wires.branch_zero = false;
        wires.branch_not_zero = false;
        wires.write_data_src = WriteDataSrc::AluOut;
        wires.alu_src1 = AluSrc1::Reg1;
        wires.alu_src2 = AluSrc2::Reg2;
        wires.mem_addr_src = MemAddrSrc::Pc;
        wires.jump_src = JumpSrc::PcImm;
    }

    fn undefined(&self, wires: &Wires) -> SimError {
        SimError::UndefinedDecode {
            opcode: wires.opcode.to_unsigned() as u8,
            funct3: wires.funct3.to_unsigned() as u8,
            state: self.state.name(),
        }
    }
}

impl Default for ControlFsm {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for ControlFsm {
    fn rising_edge(&mut self, wires: &mut Wires) -> Result<(), SimError> {
        self.reset_outputs(wires);

        match self.state {
            FsmState::Fetch => {
                wires.mem_addr_src = MemAddrSrc::Pc;
                wires.mem_size = Bits::unsigned(0b10, 2);
            }
            FsmState::Decode => {
                wires.load_instr = true;
            }
            FsmState::Execute => {
                let plan = *self
                    .alu_table
                    .lookup(&[wires.opcode])
                    .ok_or_else(|| self.undefined(wires))?;

                wires.alu_calc = plan.calc;
                wires.alu_src1 = plan.src1;
                wires.alu_src2 = plan.src2;
                wires.alu_op = match plan.op {
                    OpRule::Funct3 => wires.funct3,
                    OpRule::Add => Bits::zero(3),
                    OpRule::BranchFunct3 => wires.funct3.slice(1, 3).zero_extend(3),
                };
                wires.alu_alt = match plan.alt {
                    AltRule::Zero => false,
                    AltRule::One => true,
                    AltRule::Funct7Bit5 => wires.funct7.bit(5) == 1,
                    AltRule::ShiftFunct7 => {
                        let f3 = wires.funct3.to_unsigned();
                        (f3 == 0b001 || f3 == 0b101) && wires.funct7.bit(5) == 1
                    }
                };
                debug!(
                    opcode = %format_args!("{:07b}", wires.opcode.to_unsigned()),
                    op = wires.alu_op.to_unsigned(),
                    alt = wires.alu_alt,
                    calc = wires.alu_calc,
                    "execute setup"
                );
            }
            FsmState::Memory => {
                let plan = *self
                    .mem_table
                    .lookup(&[wires.opcode, wires.funct3])
                    .ok_or_else(|| self.undefined(wires))?;

                if plan.active {
                    wires.mem_addr_src = MemAddrSrc::AluOut;
                    wires.mem_size = wires.funct3.slice(0, 2);
                    wires.mem_unsigned = wires.funct3.bit(2) == 1;
                    wires.mem_write = plan.write;
                }
            }
            FsmState::Writeback => {
                let (reg_write, wd_src) = *self
                    .wb_table
                    .lookup(&[wires.opcode])
                    .ok_or_else(|| self.undefined(wires))?;
                let jump = *self
                    .jump_table
                    .lookup(&[wires.opcode, wires.funct3])
                    .ok_or_else(|| self.undefined(wires))?;

                wires.reg_write = reg_write;
                wires.write_data_src = wd_src;
                wires.branch_zero = jump.branch_zero;
                wires.branch_not_zero = jump.branch_not_zero;
                wires.jump_src = jump.src;
                wires.load_pc = true;
            }
        }
        Ok(())
    }

    fn falling_edge(&mut self, _wires: &mut Wires) {
        self.state = self.state.next();
    }
}

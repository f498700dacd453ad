//! The machine: datapath components under a two-phase clock.
//!
//! `Machine` owns the wire record and every component, and drives one
//! clock cycle per [`Machine::tick`]. Each cycle runs a rising-edge
//! phase and then a falling-edge phase over the components in a fixed
//! order:
//!
//! 1. control FSM (owns all control signals, so it must run first),
//! 2. the routing muxes,
//! 3. the instruction decoder,
//! 4. RAM, the program counter, the jump resolver, the ALU, and the
//!    register file.
//!
//! That order is a semantic invariant: every component reads signals
//! written by components positioned earlier in the same phase.

use tracing::trace;

use crate::common::SimError;
use crate::config::Config;
use crate::stats::SimStats;

/// The clocked component capability.
pub mod component;

/// The control finite-state machine and decode tables.
pub mod control;

/// Datapath components.
pub mod units;

/// The shared signal record.
pub mod wires;

use component::Component;
use control::{ControlFsm, FsmState};
use units::{Alu, InstructionMemory, JumpControl, Muxes, ProgramCounter, Ram, RegisterFile};
use wires::{PcSrc, Wires};

/// Opcode of the conditional branch family, used for statistics only.
const BRANCH_OPCODE: u64 = 0b1100011;
/// Opcode of the load family, used for statistics only.
const LOAD_OPCODE: u64 = 0b0000011;

/// A single-hart RV32I machine stepped one clock cycle at a time.
pub struct Machine {
    wires: Wires,
    control: ControlFsm,
    muxes: Muxes,
    imem: InstructionMemory,
    ram: Ram,
    pc: ProgramCounter,
    jump: JumpControl,
    alu: Alu,
    regs: RegisterFile,
    stats: SimStats,
    text_start: u32,
}

impl Machine {
    /// Builds a machine in its initial state: PC at `text_start`, all
    /// registers zero except the stack and global pointers, RAM empty.
    pub fn new(config: &Config) -> Self {
        let text_start = config.memory.text_start_val();
        let mut regs = RegisterFile::new();
        regs.write(2, config.memory.sp_init_val());
        regs.write(3, config.memory.gp_init_val());

        Self {
            wires: Wires::at_reset(text_start),
            control: ControlFsm::new(),
            muxes: Muxes::new(),
            imem: InstructionMemory::new(),
            ram: Ram::new(),
            pc: ProgramCounter::new(text_start),
            jump: JumpControl::new(),
            alu: Alu::new(),
            regs,
            stats: SimStats::default(),
            text_start,
        }
    }

    /// Builds a machine with `words` already placed at `text_start`.
    pub fn with_program(config: &Config, words: &[u32]) -> Self {
        let mut machine = Self::new(config);
        machine.set_code(words);
        machine
    }

    /// Loads program words into RAM starting at `text_start`.
    pub fn set_code(&mut self, words: &[u32]) {
        for (i, &word) in words.iter().enumerate() {
            self.ram
                .store(self.text_start.wrapping_add(4 * i as u32), 4, word);
        }
    }

    /// Places raw bytes at an arbitrary address (data segments).
    pub fn load_bytes(&mut self, addr: u32, bytes: &[u8]) {
        for (i, &byte) in bytes.iter().enumerate() {
            self.ram.store(addr.wrapping_add(i as u32), 1, byte as u32);
        }
    }

    /// Presets registers from `(index, value)` pairs.
    ///
    /// Values are unsigned words. Presetting x0 to anything but zero is
    /// an error, as is an index past x31.
    pub fn set_registers(&mut self, values: &[(usize, u32)]) -> Result<(), SimError> {
        for &(idx, val) in values {
            if idx >= 32 {
                return Err(SimError::RegisterOutOfRange(idx));
            }
            if idx == 0 && val != 0 {
                return Err(SimError::ZeroRegisterWrite(val));
            }
            self.regs.write(idx, val);
        }
        Ok(())
    }

    /// Runs one clock cycle. Returns `Ok(false)` once the all-zero
    /// terminator word has been latched; the FSM does not advance past
    /// that point, so further ticks keep returning `Ok(false)`.
    pub fn tick(&mut self) -> Result<bool, SimError> {
        let state = self.control.state();

        // Rising phase: sample and compute, in component order.
        self.control.rising_edge(&mut self.wires)?;
        self.muxes.rising_edge(&mut self.wires)?;
        self.imem.rising_edge(&mut self.wires)?;
        if self.imem.halted() {
            return Ok(false);
        }
        self.ram.rising_edge(&mut self.wires)?;
        self.pc.rising_edge(&mut self.wires)?;
        self.jump.rising_edge(&mut self.wires)?;
        self.alu.rising_edge(&mut self.wires)?;
        self.regs.rising_edge(&mut self.wires)?;

        self.update_stats(state);

        // Falling phase: finalize outputs, same order. The FSM advances
        // its state here, so a rising-edge error above leaves the state
        // unchanged.
        self.control.falling_edge(&mut self.wires);
        self.muxes.falling_edge(&mut self.wires);
        self.imem.falling_edge(&mut self.wires);
        self.ram.falling_edge(&mut self.wires);
        self.pc.falling_edge(&mut self.wires);
        self.jump.falling_edge(&mut self.wires);
        self.alu.falling_edge(&mut self.wires);
        self.regs.falling_edge(&mut self.wires);

        self.stats.cycles += 1;
        trace!(
            state = state.name(),
            pc = %format_args!("{:#010x}", self.wires.pc_val),
            instr = %format_args!("{:#010x}", self.imem.instruction()),
            "cycle"
        );
        Ok(true)
    }

    /// Ticks until the program terminates. Synchronous; a program that
    /// never reaches the terminator word runs forever.
    pub fn run(&mut self) -> Result<(), SimError> {
        while self.tick()? {}
        Ok(())
    }

    fn update_stats(&mut self, state: FsmState) {
        let opcode = self.wires.opcode.to_unsigned();
        match state {
            FsmState::Memory => {
                if self.wires.mem_write {
                    self.stats.stores += 1;
                } else if opcode == LOAD_OPCODE {
                    self.stats.loads += 1;
                }
            }
            FsmState::Writeback => {
                self.stats.instructions_retired += 1;
                if opcode == BRANCH_OPCODE {
                    if self.wires.pc_src == PcSrc::Jump {
                        self.stats.branches_taken += 1;
                    } else {
                        self.stats.branches_not_taken += 1;
                    }
                }
            }
            _ => {}
        }
    }

    /// Current program counter.
    pub fn pc(&self) -> u32 {
        self.pc.value()
    }

    /// Current FSM state.
    pub fn state(&self) -> FsmState {
        self.control.state()
    }

    /// The latched instruction word.
    pub fn instruction(&self) -> u32 {
        self.imem.instruction()
    }

    /// Reads a register.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is past x31.
    pub fn register(&self, idx: usize) -> u32 {
        self.regs.read(idx)
    }

    /// Iterates over all written RAM bytes in address order.
    pub fn ram_iter(&self) -> impl Iterator<Item = (u32, u8)> + '_ {
        self.ram.iter()
    }

    /// The current-cycle signal values, for visualization consumers.
    pub fn wires(&self) -> &Wires {
        &self.wires
    }

    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Address of the first program word.
    pub fn text_start(&self) -> u32 {
        self.text_start
    }
}

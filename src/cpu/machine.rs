//! The complete computer: CPU chip, data memory and program ROM.
//!
//! The CPU and data memory are one gate-level circuit. The ROM sits outside
//! it: each tick the harness drives the instruction bus with the word at the
//! current PC, then advances the clock.

use super::chip::{cpu, CpuPorts};
use super::decode::{decode, Instruction, Jump};
use crate::config::{ConfigError, MachineConfig};
use crate::logic::gates::{and, gate_bus, not, or_many};
use crate::logic::ram::ram_dyn;
use crate::logic::Word;
use crate::netlist::{CircuitStats, Netlist, NetlistError, Simulation, Wire};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, trace};

/// Number of words the 15-bit PC can address.
pub const ROM_WORDS: usize = 1 << 15;

/// Execution state as seen from outside the circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuState {
    Running,
    /// Parked in a jump-to-self idle loop.
    Halted,
}

/// Result of [`Computer::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Ticks executed by this call.
    pub cycles: u64,
    pub state: CpuState,
    pub pc: u16,
    pub a: u16,
    pub d: u16,
}

/// Errors building or loading a computer.
#[derive(Debug, Error)]
pub enum MachineError {
    #[error("netlist error: {0}")]
    Netlist(#[from] NetlistError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("program has {0} words, ROM holds 32768")]
    ProgramTooLarge(usize),

    #[error("address {address} outside {size}-word data memory")]
    AddressOutOfRange { address: usize, size: usize },
}

/// Gate-level Hack computer.
#[derive(Debug, Clone)]
pub struct Computer {
    config: MachineConfig,
    sim: Simulation,
    rom: Vec<u16>,
    instruction: Word,
    reset: Wire,
    ports: CpuPorts,
    cells: Vec<Word>,
    state: CpuState,
}

impl Computer {
    /// Compose and compile the circuit described by `config`.
    pub fn new(config: MachineConfig) -> Result<Self, MachineError> {
        config.validate()?;
        let mut n = Netlist::new();
        let instruction = n.input::<16>("instruction");
        let reset = n.input_wire("reset");
        let in_m = n.forward_bus::<16>();
        let ports = cpu(&mut n, &in_m, &instruction, reset, config.alu);

        // addresses above the data memory neither store nor load
        let (low, high) = ports
            .address_m
            .as_slice()
            .split_at(config.data_address_bits as usize);
        let outside = or_many(&mut n, high);
        let inside = not(&mut n, outside);
        let load = and(&mut n, ports.write_m, inside);
        let memory = ram_dyn(&mut n, &ports.out_m, load, low);
        let visible = gate_bus(&mut n, &memory.out, inside);
        n.drive_bus(&in_m, &visible);

        n.expose("pc", ports.pc.as_slice());
        n.expose("a", ports.a.as_slice());
        n.expose("d", ports.d.as_slice());
        n.expose("outM", ports.out_m.as_slice());
        n.expose("writeM", &[ports.write_m]);
        n.expose("addressM", ports.address_m.as_slice());

        let circuit = Arc::new(n.compile()?);
        debug!(
            data_words = config.data_words(),
            alu = ?config.alu,
            "computer ready"
        );
        Ok(Self {
            config,
            sim: Simulation::new(circuit),
            rom: Vec::new(),
            instruction,
            reset,
            ports,
            cells: memory.cells,
            state: CpuState::Running,
        })
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn stats(&self) -> CircuitStats {
        self.sim.circuit().stats()
    }

    /// Replace the ROM contents.
    pub fn load_program(&mut self, program: &[u16]) -> Result<(), MachineError> {
        if program.len() > ROM_WORDS {
            return Err(MachineError::ProgramTooLarge(program.len()));
        }
        self.rom = program.to_vec();
        self.state = CpuState::Running;
        Ok(())
    }

    pub fn program(&self) -> &[u16] {
        &self.rom
    }

    /// ROM word at `address`; zero past the end of the program.
    pub fn fetch(&self, address: u16) -> u16 {
        self.rom.get(address as usize).copied().unwrap_or(0)
    }

    pub fn pc(&self) -> u16 {
        self.sim.peek(self.ports.pc.as_slice()) as u16
    }

    pub fn a(&self) -> u16 {
        self.sim.peek(self.ports.a.as_slice()) as u16
    }

    pub fn d(&self) -> u16 {
        self.sim.peek(self.ports.d.as_slice()) as u16
    }

    pub fn state(&self) -> CpuState {
        self.state
    }

    /// Ticks committed since construction.
    pub fn tick_count(&self) -> u64 {
        self.sim.tick_count()
    }

    pub fn memory_size(&self) -> usize {
        self.cells.len()
    }

    /// Contents of a data memory cell.
    pub fn memory(&self, address: usize) -> Option<u16> {
        self.cells
            .get(address)
            .map(|cell| self.sim.peek(cell.as_slice()) as u16)
    }

    /// Overwrite a data memory cell outside the clock.
    pub fn set_memory(&mut self, address: usize, value: u16) -> Result<(), MachineError> {
        let cell = self
            .cells
            .get(address)
            .ok_or(MachineError::AddressOutOfRange {
                address,
                size: self.cells.len(),
            })?;
        self.sim.load_state(cell.as_slice(), value as u64);
        Ok(())
    }

    /// Execute one tick. Returns the instruction that ran.
    pub fn step(&mut self) -> Instruction {
        let pc = self.pc();
        let word = self.fetch(pc);
        self.sim.set(&self.instruction, word as u64);
        let tick = self.sim.tick();
        trace!(tick, pc, word, a = self.a(), d = self.d(), "tick");
        if self.at_idle_loop() {
            if self.state == CpuState::Running {
                info!(tick, pc = self.pc(), "program halted");
            }
            self.state = CpuState::Halted;
        }
        decode(word)
    }

    /// Run until the program halts or `max_cycles` ticks have elapsed.
    pub fn run(&mut self, max_cycles: u64) -> RunSummary {
        if self.at_idle_loop() {
            self.state = CpuState::Halted;
        }
        let mut cycles = 0;
        while self.state == CpuState::Running && cycles < max_cycles {
            self.step();
            cycles += 1;
        }
        RunSummary {
            cycles,
            state: self.state,
            pc: self.pc(),
            a: self.a(),
            d: self.d(),
        }
    }

    /// Hold `reset` for one tick. The PC returns to 0; A, D and memory keep
    /// their values apart from the effects of the instruction that ran.
    pub fn reset(&mut self) {
        self.sim.set_wire(self.reset, true);
        self.step();
        self.sim.set_wire(self.reset, false);
        self.state = CpuState::Running;
        debug!(tick = self.tick_count(), "reset");
    }

    /// The PC sits on `@k; 0;JMP` with `k` its own address, or on a
    /// jump that targets itself through A.
    fn at_idle_loop(&self) -> bool {
        let pc = self.pc();
        let self_jump = |word: u16| {
            matches!(
                decode(word),
                Instruction::Compute { dest, jump: Jump::Jmp, .. } if dest.is_empty()
            )
        };
        match decode(self.fetch(pc)) {
            Instruction::Address(target) => target == pc && self_jump(self.fetch(pc.wrapping_add(1))),
            Instruction::Compute { .. } => self_jump(self.fetch(pc)) && self.a() & 0x7FFF == pc,
        }
    }
}

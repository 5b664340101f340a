//! # Hack Simulator
//!
//! A gate-level simulator of the Hack computer.
//!
//! Every chip, from the ALU to 16K words of RAM, is composed from a single
//! NAND primitive and a single flip-flop, compiled into an evaluation order
//! and clocked tick by tick.

pub mod asm;
pub mod config;
pub mod cpu;
pub mod logging;
pub mod logic;
pub mod netlist;

// Re-export commonly used types
pub use asm::{assemble, disassemble, load_hack, save_hack, AssemblerError, HackFile, HackFileError};
pub use config::{AluVariant, ConfigError, MachineConfig};
pub use cpu::{Computer, CpuState, Instruction, MachineError, ReferenceMachine, RunSummary};
pub use netlist::{Bus, Circuit, Netlist, NetlistError, Simulation, Wire};

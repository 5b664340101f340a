//! The Hack CPU and the computer around it.
//!
//! - [`decode`] - word-level instruction encoding
//! - [`chip`] - the CPU composed from ALU, registers and program counter
//! - [`machine`] - CPU + data memory + ROM as one runnable [`Computer`]
//! - [`reference`] - word-level model used to check the gate-level machine

pub mod chip;
pub mod decode;
pub mod machine;
pub mod reference;

pub use chip::{cpu, CpuPorts};
pub use decode::{decode, encode, Comp, Dest, Instruction, Jump};
pub use machine::{Computer, CpuState, MachineError, RunSummary, ROM_WORDS};
pub use reference::ReferenceMachine;

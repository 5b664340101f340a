//! Assembler and disassembler for Hack programs.
//!
//! This module provides:
//! - A two-pass assembler (text → machine words)
//! - A disassembler (machine words → readable text)
//! - Loading and saving the `.hack` text format

pub mod assembler;
pub mod disasm;
pub mod hackfile;

pub use assembler::{assemble, AssemblerError};
pub use disasm::{disassemble, disassemble_instruction};
pub use hackfile::{load_hack, save_hack, HackFile, HackFileError};

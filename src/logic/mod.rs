//! Chips composed from the NAND primitive.
//!
//! Every function here appends gates to a [`Netlist`] and returns the wires
//! that carry its outputs:
//! - [`gates`] - inverter, AND, OR, XOR, multiplexers and demultiplexers
//! - [`arith`] - adders, incrementer, shifters, multiplier
//! - [`alu`] - the Hack ALU and the extended ALU
//! - [`seq`] - Bit, Register and the program counter
//! - [`ram`] - recursively composed random-access memory
//!
//! [`Netlist`]: crate::netlist::Netlist

pub mod alu;
pub mod arith;
pub mod gates;
pub mod ram;
pub mod seq;

use crate::netlist::Bus;

/// Width of a data word.
pub const WORD_BITS: usize = 16;

/// A 16-bit data bus.
pub type Word = Bus<WORD_BITS>;

pub use alu::{alu, extended_alu, AluOut};
pub use arith::{add, full_adder, half_adder, increment, multiply, Sum};
pub use ram::{ram, Ram};
pub use seq::{bit, program_counter, register};

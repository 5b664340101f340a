//! The Hack CPU as a gate-level chip.
//!
//! Inputs are the current memory word, the current instruction and `reset`.
//! Everything the CPU drives towards memory (`out_m`, `write_m`,
//! `address_m`) is combinational and valid within the tick. The A, D and PC
//! registers commit at the tick boundary.

use crate::config::AluVariant;
use crate::logic::gates::{and, mux_bus, not, or};
use crate::logic::{alu, extended_alu, program_counter, register, AluOut, Word};
use crate::netlist::{Bus, Netlist, Wire};

/// Instruction bit positions.
const CLASS: usize = 15;
const A_OPERAND: usize = 12;
const DEST_A: usize = 5;
const DEST_D: usize = 4;
const DEST_M: usize = 3;
const JUMP_NEG: usize = 2;
const JUMP_ZERO: usize = 1;
const JUMP_POS: usize = 0;

/// Output ports of the CPU chip.
#[derive(Debug, Clone, Copy)]
pub struct CpuPorts {
    /// Value to write to memory (the raw ALU result).
    pub out_m: Word,
    /// Memory write enable.
    pub write_m: Wire,
    /// Memory address (low 15 bits of A).
    pub address_m: Bus<15>,
    /// Address of the next instruction to fetch.
    pub pc: Bus<15>,
    /// A register output.
    pub a: Word,
    /// D register output.
    pub d: Word,
}

pub fn cpu(
    n: &mut Netlist,
    in_m: &Word,
    instruction: &Word,
    reset: Wire,
    variant: AluVariant,
) -> CpuPorts {
    let is_c = instruction[CLASS];
    let is_a = not(n, is_c);

    // register outputs are needed by the ALU before the registers exist
    let a = n.forward_bus::<16>();
    let d = n.forward_bus::<16>();

    let y = mux_bus(n, &a, in_m, instruction[A_OPERAND]);
    let AluOut { out, zr, ng } = match variant {
        AluVariant::Standard => alu(n, &d, &y, &instruction.slice::<6>(6)),
        AluVariant::Extended => extended_alu(n, &d, &y, &instruction.slice::<9>(6)),
    };

    // A takes the literal on an A-instruction, the ALU result when dest A is set
    let to_a = and(n, is_c, instruction[DEST_A]);
    let a_in = mux_bus(n, instruction, &out, to_a);
    let a_load = or(n, is_a, to_a);
    let a_out = register(n, &a_in, a_load);
    n.drive_bus(&a, &a_out);

    let d_load = and(n, is_c, instruction[DEST_D]);
    let d_out = register(n, &out, d_load);
    n.drive_bus(&d, &d_out);

    let write_m = and(n, is_c, instruction[DEST_M]);

    // ===== Jump =====
    let neg = and(n, instruction[JUMP_NEG], ng);
    let zero = and(n, instruction[JUMP_ZERO], zr);
    let not_positive = or(n, zr, ng);
    let positive = not(n, not_positive);
    let pos = and(n, instruction[JUMP_POS], positive);
    let neg_or_zero = or(n, neg, zero);
    let any = or(n, neg_or_zero, pos);
    let jump = and(n, is_c, any);

    let address_m = a.slice::<15>(0);
    let inc = n.one();
    let pc = program_counter(n, &address_m, jump, inc, reset);

    CpuPorts {
        out_m: out,
        write_m,
        address_m,
        pc,
        a: a_out,
        d: d_out,
    }
}

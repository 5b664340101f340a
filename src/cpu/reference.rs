//! Word-level model of the Hack machine.
//!
//! Computes with native integers instead of gates. The gate-level
//! [`Computer`](super::Computer) is tested against it.

use super::decode::{decode, Comp, Instruction};
use crate::config::AluVariant;

/// Standard ALU on words. Returns `(out, zr, ng)`.
pub fn alu(x: u16, y: u16, control: u8) -> (u16, bool, bool) {
    let bit = |i: u8| control & (1 << i) != 0;
    let mut x = if bit(5) { 0 } else { x };
    if bit(4) {
        x = !x;
    }
    let mut y = if bit(3) { 0 } else { y };
    if bit(2) {
        y = !y;
    }
    let mut out = if bit(1) { x.wrapping_add(y) } else { x & y };
    if bit(0) {
        out = !out;
    }
    (out, out == 0, (out as i16) < 0)
}

/// Extended ALU on words, driven by the 9-bit control code.
pub fn extended_alu(x: u16, y: u16, control: u16) -> (u16, bool, bool) {
    let out = match (control >> 7) & 0b11 {
        0b01 => match (control >> 5) & 0b11 {
            0b00 => y >> 1,
            0b01 => x >> 1,
            0b10 => y << 1,
            _ => x << 1,
        },
        0b11 => alu(x, y, (control & 0x3F) as u8).0,
        _ => x.wrapping_mul(y),
    };
    (out, out == 0, (out as i16) < 0)
}

/// Architectural state of the word-level machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceMachine {
    pub a: u16,
    pub d: u16,
    pub pc: u16,
    pub ram: Vec<u16>,
    alu: AluVariant,
}

impl ReferenceMachine {
    pub fn new(ram_words: usize, alu: AluVariant) -> Self {
        Self {
            a: 0,
            d: 0,
            pc: 0,
            ram: vec![0; ram_words],
            alu,
        }
    }

    fn read(&self, address: u16) -> u16 {
        self.ram.get(address as usize).copied().unwrap_or(0)
    }

    fn compute(&self, comp: Comp) -> u16 {
        let y = if comp.a() { self.read(self.a & 0x7FFF) } else { self.a };
        match self.alu {
            AluVariant::Standard => alu(self.d, y, comp.alu()).0,
            AluVariant::Extended => extended_alu(self.d, y, comp.bits()).0,
        }
    }

    /// Execute one instruction.
    pub fn step(&mut self, word: u16) {
        match decode(word) {
            Instruction::Address(value) => {
                self.a = value;
                self.pc = (self.pc + 1) & 0x7FFF;
            }
            Instruction::Compute { comp, dest, jump } => {
                let out = self.compute(comp);
                let address = (self.a & 0x7FFF) as usize;
                if dest.m && address < self.ram.len() {
                    self.ram[address] = out;
                }
                self.pc = if jump.taken(out) {
                    self.a & 0x7FFF
                } else {
                    (self.pc + 1) & 0x7FFF
                };
                if dest.a {
                    self.a = out;
                }
                if dest.d {
                    self.d = out;
                }
            }
        }
    }

    /// Run `ticks` instructions fetched from `rom`.
    pub fn run(&mut self, rom: &[u16], ticks: u64) {
        for _ in 0..ticks {
            let word = rom.get(self.pc as usize).copied().unwrap_or(0);
            self.step(word);
        }
    }
}

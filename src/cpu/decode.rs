//! Word-level view of the Hack instruction encoding.
//!
//! ```text
//! bit 15      class: 0 = address/literal, 1 = computation
//! bits 14..13 extension selector (11 for every canonical instruction)
//! bit 12      a: y operand is M (memory) instead of A
//! bits 11..6  zx nx zy ny f no
//! bits 5..3   destination: A D M
//! bits 2..0   jump: negative zero positive
//! ```
//!
//! Every 16-bit word decodes to exactly one [`Instruction`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Computation field: the `a` bit, the six ALU bits and the two extension bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Comp {
    /// Bits 14..6 of the instruction (9 bits).
    bits: u16,
}

impl Comp {
    /// Extension bits of every canonical instruction.
    pub const STANDARD: u16 = 0b11;

    /// Build a canonical computation from the `a` bit and the 6 ALU bits.
    pub const fn new(a: bool, alu: u8) -> Self {
        Self {
            bits: (Self::STANDARD << 7) | ((a as u16) << 6) | (alu as u16 & 0x3F),
        }
    }

    /// Build from the raw 9-bit field.
    pub const fn from_bits(bits: u16) -> Self {
        Self { bits: bits & 0x1FF }
    }

    /// Raw 9-bit field (bits 14..6 of the instruction).
    pub const fn bits(self) -> u16 {
        self.bits
    }

    /// Whether `y` is the memory operand.
    pub const fn a(self) -> bool {
        self.bits & (1 << 6) != 0
    }

    /// The six standard ALU control bits.
    pub const fn alu(self) -> u8 {
        (self.bits & 0x3F) as u8
    }

    /// Extension selector (bits 14..13).
    pub const fn extension(self) -> u16 {
        self.bits >> 7
    }

    pub const fn is_standard(self) -> bool {
        self.extension() == Self::STANDARD
    }
}

/// Destination mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dest {
    pub a: bool,
    pub d: bool,
    pub m: bool,
}

impl Dest {
    pub const NONE: Dest = Dest {
        a: false,
        d: false,
        m: false,
    };

    pub const fn from_bits(bits: u16) -> Self {
        Self {
            a: bits & 0b100 != 0,
            d: bits & 0b010 != 0,
            m: bits & 0b001 != 0,
        }
    }

    pub const fn bits(self) -> u16 {
        ((self.a as u16) << 2) | ((self.d as u16) << 1) | self.m as u16
    }

    pub const fn is_empty(self) -> bool {
        !(self.a || self.d || self.m)
    }
}

impl fmt::Display for Dest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a {
            write!(f, "A")?;
        }
        if self.m {
            write!(f, "M")?;
        }
        if self.d {
            write!(f, "D")?;
        }
        Ok(())
    }
}

/// Jump condition on the ALU result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Jump {
    Never,
    Jgt,
    Jeq,
    Jge,
    Jlt,
    Jne,
    Jle,
    Jmp,
}

impl Jump {
    pub const ALL: [Jump; 8] = [
        Jump::Never,
        Jump::Jgt,
        Jump::Jeq,
        Jump::Jge,
        Jump::Jlt,
        Jump::Jne,
        Jump::Jle,
        Jump::Jmp,
    ];

    /// Bits are (negative, zero, positive), MSB first.
    pub const fn from_bits(bits: u16) -> Self {
        Self::ALL[(bits & 0b111) as usize]
    }

    pub const fn bits(self) -> u16 {
        self as u16
    }

    /// Evaluate against an ALU result.
    pub const fn taken(self, value: u16) -> bool {
        let signed = value as i16;
        let bits = self.bits();
        (bits & 0b100 != 0 && signed < 0)
            || (bits & 0b010 != 0 && signed == 0)
            || (bits & 0b001 != 0 && signed > 0)
    }

    pub const fn mnemonic(self) -> Option<&'static str> {
        match self {
            Jump::Never => None,
            Jump::Jgt => Some("JGT"),
            Jump::Jeq => Some("JEQ"),
            Jump::Jge => Some("JGE"),
            Jump::Jlt => Some("JLT"),
            Jump::Jne => Some("JNE"),
            Jump::Jle => Some("JLE"),
            Jump::Jmp => Some("JMP"),
        }
    }
}

/// Decoded Hack instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instruction {
    /// `@value`: load a 15-bit literal into A.
    Address(u16),
    /// `dest=comp;jump`
    Compute { comp: Comp, dest: Dest, jump: Jump },
}

impl Instruction {
    /// Largest literal an address instruction can carry.
    pub const MAX_LITERAL: u16 = 0x7FFF;

    pub const fn is_compute(&self) -> bool {
        matches!(self, Instruction::Compute { .. })
    }
}

/// Decode a 16-bit word. Total: every word is some instruction.
pub fn decode(word: u16) -> Instruction {
    if word & 0x8000 == 0 {
        Instruction::Address(word)
    } else {
        Instruction::Compute {
            comp: Comp::from_bits(word >> 6),
            dest: Dest::from_bits(word >> 3),
            jump: Jump::from_bits(word),
        }
    }
}

/// Encode an instruction. Literals are truncated to 15 bits.
pub fn encode(instr: &Instruction) -> u16 {
    match *instr {
        Instruction::Address(value) => value & Instruction::MAX_LITERAL,
        Instruction::Compute { comp, dest, jump } => {
            0x8000 | (comp.bits() << 6) | (dest.bits() << 3) | jump.bits()
        }
    }
}

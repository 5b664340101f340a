//! Two-pass assembler for Hack programs.
//!
//! Syntax:
//! ```text
//! // Comment
//! (LOOP)          // label: address of the next instruction
//!     @100        // A = 100
//!     @counter    // A = address of a variable (allocated from 16)
//!     D=D+M;JGT   // dest=comp;jump, dest and jump optional
//!     0;JMP
//! ```
//!
//! Whitespace inside an instruction is ignored. Besides the standard
//! computations the extended ALU mnemonics `D*A`, `D*M`, `A>>`, `D>>`,
//! `M<<` and `D<<` are accepted, and `#bbbbbbbbb` writes the 9-bit
//! computation field directly.

use crate::cpu::decode::{encode, Comp, Dest, Instruction, Jump};
use crate::cpu::ROM_WORDS;
use std::collections::HashMap;
use thiserror::Error;

/// First RAM address handed out to variables.
pub const VARIABLE_BASE: u16 = 16;

/// Symbols every program starts with.
pub const PREDEFINED_SYMBOLS: [(&str, u16); 23] = [
    ("R0", 0),
    ("R1", 1),
    ("R2", 2),
    ("R3", 3),
    ("R4", 4),
    ("R5", 5),
    ("R6", 6),
    ("R7", 7),
    ("R8", 8),
    ("R9", 9),
    ("R10", 10),
    ("R11", 11),
    ("R12", 12),
    ("R13", 13),
    ("R14", 14),
    ("R15", 15),
    ("SP", 0),
    ("LCL", 1),
    ("ARG", 2),
    ("THIS", 3),
    ("THAT", 4),
    ("SCREEN", 16384),
    ("KBD", 24576),
];

/// Canonical computations: mnemonic, `a` bit, ALU bits.
pub(crate) const COMPUTATIONS: [(&str, bool, u8); 28] = [
    ("0", false, 0b101010),
    ("1", false, 0b111111),
    ("-1", false, 0b111010),
    ("D", false, 0b001100),
    ("A", false, 0b110000),
    ("!D", false, 0b001101),
    ("!A", false, 0b110001),
    ("-D", false, 0b001111),
    ("-A", false, 0b110011),
    ("D+1", false, 0b011111),
    ("A+1", false, 0b110111),
    ("D-1", false, 0b001110),
    ("A-1", false, 0b110010),
    ("D+A", false, 0b000010),
    ("D-A", false, 0b010011),
    ("A-D", false, 0b000111),
    ("D&A", false, 0b000000),
    ("D|A", false, 0b010101),
    ("M", true, 0b110000),
    ("!M", true, 0b110001),
    ("-M", true, 0b110011),
    ("M+1", true, 0b110111),
    ("M-1", true, 0b110010),
    ("D+M", true, 0b000010),
    ("D-M", true, 0b010011),
    ("M-D", true, 0b000111),
    ("D&M", true, 0b000000),
    ("D|M", true, 0b010101),
];

/// Extended ALU computations as raw 9-bit fields.
pub(crate) const EXTENDED_COMPUTATIONS: [(&str, u16); 6] = [
    ("D*A", 0b00_0_000000),
    ("D*M", 0b00_1_000000),
    ("A>>", 0b01_0_000000),
    ("D>>", 0b01_0_100000),
    ("M<<", 0b01_1_000000),
    ("D<<", 0b01_1_100000),
];

/// Commutative spellings accepted on input.
const ALIASES: [(&str, &str); 6] = [
    ("A+D", "D+A"),
    ("M+D", "D+M"),
    ("A&D", "D&A"),
    ("M&D", "D&M"),
    ("A|D", "D|A"),
    ("M|D", "D|M"),
];

/// Assemble source code to machine words.
pub fn assemble(source: &str) -> Result<Vec<u16>, AssemblerError> {
    Assembler::new().assemble(source)
}

/// Parse a computation mnemonic.
pub fn parse_comp(text: &str) -> Option<Comp> {
    let text = ALIASES
        .iter()
        .find(|(alias, _)| *alias == text)
        .map_or(text, |&(_, canonical)| canonical);
    if let Some(raw) = text.strip_prefix('#') {
        return match u16::from_str_radix(raw, 2) {
            Ok(bits) if raw.len() == 9 => Some(Comp::from_bits(bits)),
            _ => None,
        };
    }
    COMPUTATIONS
        .iter()
        .find(|(name, _, _)| *name == text)
        .map(|&(_, a, alu)| Comp::new(a, alu))
        .or_else(|| {
            EXTENDED_COMPUTATIONS
                .iter()
                .find(|(name, _)| *name == text)
                .map(|&(_, bits)| Comp::from_bits(bits))
        })
}

/// Parse a destination such as `AM` or `MD`. Letters may come in any order.
pub fn parse_dest(text: &str) -> Option<Dest> {
    let mut dest = Dest::NONE;
    for c in text.chars() {
        let slot = match c {
            'A' => &mut dest.a,
            'D' => &mut dest.d,
            'M' => &mut dest.m,
            _ => return None,
        };
        if *slot {
            return None;
        }
        *slot = true;
    }
    Some(dest)
}

pub fn parse_jump(text: &str) -> Option<Jump> {
    Jump::ALL.into_iter().find(|j| j.mnemonic() == Some(text))
}

/// One meaningful source line.
enum Statement<'a> {
    Label(&'a str),
    Address(&'a str),
    Compute(&'a str),
}

struct Assembler {
    symbols: HashMap<String, u16>,
    next_variable: u16,
}

impl Assembler {
    fn new() -> Self {
        Self {
            symbols: PREDEFINED_SYMBOLS
                .iter()
                .map(|&(name, value)| (name.to_string(), value))
                .collect(),
            next_variable: VARIABLE_BASE,
        }
    }

    fn assemble(&mut self, source: &str) -> Result<Vec<u16>, AssemblerError> {
        let lines: Vec<(usize, String)> = source
            .lines()
            .enumerate()
            .filter_map(|(i, line)| {
                let code = line.split("//").next().unwrap_or("");
                let compact: String = code.chars().filter(|c| !c.is_whitespace()).collect();
                (!compact.is_empty()).then_some((i + 1, compact))
            })
            .collect();

        let mut statements = Vec::with_capacity(lines.len());
        for (line, text) in &lines {
            statements.push((*line, Self::classify(text, *line)?));
        }

        // Pass 1: labels
        let mut address = 0usize;
        for &(line, ref statement) in &statements {
            match statement {
                Statement::Label(name) => {
                    if self.symbols.contains_key(*name) {
                        return Err(AssemblerError::DuplicateLabel {
                            line,
                            label: name.to_string(),
                        });
                    }
                    self.symbols.insert(name.to_string(), address as u16);
                }
                _ => address += 1,
            }
            if address > ROM_WORDS {
                return Err(AssemblerError::ProgramTooLarge(address));
            }
        }

        // Pass 2: encode, allocating variables on first use
        let mut output = Vec::with_capacity(address);
        for (line, statement) in statements {
            let instruction = match statement {
                Statement::Label(_) => continue,
                Statement::Address(operand) => Instruction::Address(self.operand(operand, line)?),
                Statement::Compute(text) => Self::compute(text, line)?,
            };
            output.push(encode(&instruction));
        }
        Ok(output)
    }

    fn classify(text: &str, line: usize) -> Result<Statement<'_>, AssemblerError> {
        if let Some(rest) = text.strip_prefix('(') {
            let name = rest.strip_suffix(')').ok_or_else(|| AssemblerError::SyntaxError {
                line,
                message: format!("unterminated label `{}`", text),
            })?;
            if !is_symbol(name) {
                return Err(AssemblerError::SyntaxError {
                    line,
                    message: format!("invalid label name `{}`", name),
                });
            }
            return Ok(Statement::Label(name));
        }
        if let Some(operand) = text.strip_prefix('@') {
            if operand.is_empty() {
                return Err(AssemblerError::SyntaxError {
                    line,
                    message: "`@` needs a value or symbol".into(),
                });
            }
            return Ok(Statement::Address(operand));
        }
        Ok(Statement::Compute(text))
    }

    fn operand(&mut self, operand: &str, line: usize) -> Result<u16, AssemblerError> {
        if operand.starts_with(|c: char| c.is_ascii_digit()) {
            let value: u64 = operand.parse().map_err(|_| AssemblerError::SyntaxError {
                line,
                message: format!("invalid number `{}`", operand),
            })?;
            if value > Instruction::MAX_LITERAL as u64 {
                return Err(AssemblerError::ValueOutOfRange { line, value });
            }
            return Ok(value as u16);
        }
        if !is_symbol(operand) {
            return Err(AssemblerError::SyntaxError {
                line,
                message: format!("invalid symbol `{}`", operand),
            });
        }
        if let Some(&value) = self.symbols.get(operand) {
            return Ok(value);
        }
        let value = self.next_variable;
        if value > Instruction::MAX_LITERAL {
            return Err(AssemblerError::ValueOutOfRange {
                line,
                value: value as u64,
            });
        }
        self.symbols.insert(operand.to_string(), value);
        self.next_variable += 1;
        Ok(value)
    }

    fn compute(text: &str, line: usize) -> Result<Instruction, AssemblerError> {
        let (body, jump) = match text.split_once(';') {
            Some((body, jump)) => (body, Some(jump)),
            None => (text, None),
        };
        let (dest, comp) = match body.split_once('=') {
            Some((dest, comp)) => (Some(dest), comp),
            None => (None, body),
        };
        let unknown = |mnemonic: &str| AssemblerError::UnknownMnemonic {
            line,
            mnemonic: mnemonic.to_string(),
        };
        let dest = match dest {
            Some(d) => parse_dest(d).filter(|d| !d.is_empty()).ok_or_else(|| unknown(d))?,
            None => Dest::NONE,
        };
        let comp = parse_comp(comp).ok_or_else(|| unknown(comp))?;
        let jump = match jump {
            Some(j) => parse_jump(j).ok_or_else(|| unknown(j))?,
            None => Jump::Never,
        };
        Ok(Instruction::Compute { comp, dest, jump })
    }
}

fn is_symbol(name: &str) -> bool {
    let mut chars = name.chars();
    let valid = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$' | ':');
    matches!(chars.next(), Some(c) if valid(c) && !c.is_ascii_digit()) && chars.all(valid)
}

/// Errors that can occur during assembly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblerError {
    #[error("syntax error on line {line}: {message}")]
    SyntaxError { line: usize, message: String },

    #[error("unknown mnemonic on line {line}: {mnemonic}")]
    UnknownMnemonic { line: usize, mnemonic: String },

    #[error("label defined twice on line {line}: {label}")]
    DuplicateLabel { line: usize, label: String },

    #[error("value out of range on line {line}: {value}")]
    ValueOutOfRange { line: usize, value: u64 },

    #[error("program needs {0} words, ROM holds 32768")]
    ProgramTooLarge(usize),
}

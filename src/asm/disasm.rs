//! Disassembler for Hack programs.
//!
//! Converts machine words back to assembly text that reassembles to the
//! same words.

use super::assembler::{COMPUTATIONS, EXTENDED_COMPUTATIONS};
use crate::cpu::decode::{decode, Comp, Instruction};

/// Disassemble a single word.
pub fn disassemble_instruction(word: u16) -> String {
    match decode(word) {
        Instruction::Address(value) => format!("@{}", value),
        Instruction::Compute { comp, dest, jump } => {
            let mut text = String::new();
            if !dest.is_empty() {
                text.push_str(&format!("{}=", dest));
            }
            text.push_str(&comp_mnemonic(comp));
            if let Some(jump) = jump.mnemonic() {
                text.push(';');
                text.push_str(jump);
            }
            text
        }
    }
}

/// Mnemonic of a computation field, or its raw `#bbbbbbbbb` form.
pub fn comp_mnemonic(comp: Comp) -> String {
    let known = if comp.is_standard() {
        COMPUTATIONS
            .iter()
            .find(|&&(_, a, alu)| Comp::new(a, alu) == comp)
            .map(|&(name, _, _)| name)
    } else {
        EXTENDED_COMPUTATIONS
            .iter()
            .find(|&&(_, bits)| bits == comp.bits())
            .map(|&(name, _)| name)
    };
    match known {
        Some(name) => name.to_string(),
        None => format!("#{:09b}", comp.bits()),
    }
}

/// Disassemble a program into a listing.
pub fn disassemble(words: &[u16]) -> String {
    let mut output = String::new();
    output.push_str("// Hack Disassembly\n");
    output.push_str("// ----------------\n\n");

    for (addr, &word) in words.iter().enumerate() {
        let line = disassemble_instruction(word);
        output.push_str(&format!("{:<16} // {:05}: {:016b}\n", line, addr, word));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::assemble;
    use proptest::prelude::*;

    #[test]
    fn test_disassemble_address() {
        assert_eq!(disassemble_instruction(5), "@5");
        assert_eq!(disassemble_instruction(0x7FFF), "@32767");
    }

    #[test]
    fn test_disassemble_compute() {
        assert_eq!(disassemble_instruction(0b1110_0000_1001_0000), "D=D+A");
        assert_eq!(disassemble_instruction(0b1110_1010_1000_0111), "0;JMP");
        assert_eq!(disassemble_instruction(0b1111_1101_1111_1000), "AMD=M+1");
        assert_eq!(disassemble_instruction(0b1000_0000_0001_0000), "D=D*A");
    }

    #[test]
    fn test_unlisted_comp_uses_raw_form() {
        // standard extension bits, ALU code 0b000001 has no mnemonic
        let word = 0b1110_0000_0101_0000;
        assert_eq!(disassemble_instruction(word), "D=#110000001");
    }

    #[test]
    fn test_listing() {
        let listing = disassemble(&[2, 0b1110_1100_0001_0000]);
        assert!(listing.contains("@2"));
        assert!(listing.contains("00001: 1110110000010000"));
    }

    proptest! {
        #[test]
        fn prop_disassembly_reassembles(word: u16) {
            let text = disassemble_instruction(word);
            prop_assert_eq!(assemble(&text).unwrap(), vec![word], "{}", text);
        }
    }
}

//! `.hack` file format.
//!
//! A simple text format:
//! - One instruction per line, 16 `0`/`1` characters, most significant first
//! - Text after `//` is a comment
//! - Blank lines are ignored

use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// A loaded `.hack` program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HackFile {
    pub words: Vec<u16>,
}

impl HackFile {
    pub fn new(words: Vec<u16>) -> Self {
        Self { words }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Parse `.hack` text.
    pub fn parse(text: &str) -> Result<Self, HackFileError> {
        let mut words = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let code = line.split("//").next().unwrap_or("").trim();
            if code.is_empty() {
                continue;
            }
            if code.len() != 16 || !code.bytes().all(|b| b == b'0' || b == b'1') {
                return Err(HackFileError::Parse {
                    line: index + 1,
                    message: format!("expected 16 binary digits, found `{}`", code),
                });
            }
            let word = u16::from_str_radix(code, 2).map_err(|e| HackFileError::Parse {
                line: index + 1,
                message: e.to_string(),
            })?;
            words.push(word);
        }
        Ok(Self { words })
    }

    /// Render as `.hack` text, one word per line.
    pub fn render(&self) -> String {
        self.words
            .iter()
            .map(|word| format!("{:016b}\n", word))
            .collect()
    }
}

/// Load a `.hack` file from disk.
pub fn load_hack<P: AsRef<Path>>(path: P) -> Result<HackFile, HackFileError> {
    let text = std::fs::read_to_string(path)?;
    HackFile::parse(&text)
}

/// Save machine words as a `.hack` file.
pub fn save_hack<P: AsRef<Path>>(path: P, words: &[u16]) -> Result<(), HackFileError> {
    let mut file = std::fs::File::create(path)?;
    for word in words {
        writeln!(file, "{:016b}", word)?;
    }
    Ok(())
}

/// Errors that can occur reading or writing `.hack` files.
#[derive(Debug, Error)]
pub enum HackFileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_comments() {
        let text = "// header\n0000000000000101\n\n1110000010010000 // D=D+A\n";
        let file = HackFile::parse(text).unwrap();
        assert_eq!(file.words, vec![5, 0b1110_0000_1001_0000]);
    }

    #[test]
    fn test_parse_errors_carry_line() {
        let err = HackFile::parse("0000000000000000\n10102\n").unwrap_err();
        assert!(matches!(err, HackFileError::Parse { line: 2, .. }));
        assert!(HackFile::parse("00000000000000001").is_err());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prog.hack");
        let words = vec![0, 1, 0x7FFF, 0xEC10, 0xFFFF];
        save_hack(&path, &words).unwrap();
        assert_eq!(load_hack(&path).unwrap().words, words);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            HackFile::new(words).render()
        );
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_hack(dir.path().join("absent.hack")),
            Err(HackFileError::Io(_))
        ));
    }
}

//! Machine configuration.
//!
//! Loaded from JSON, for example:
//!
//! ```json
//! { "data_address_bits": 14, "alu": "extended" }
//! ```
//!
//! Missing fields take their defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Which ALU the CPU is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AluVariant {
    /// Six-bit Hack ALU.
    #[default]
    Standard,
    /// Multiply and shift functions selected by instruction bits 14..13.
    Extended,
}

/// Shape of the simulated computer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MachineConfig {
    /// Width of the data memory address, 3..=15 bits.
    pub data_address_bits: u8,
    pub alu: AluVariant,
}

impl MachineConfig {
    pub const MIN_ADDRESS_BITS: u8 = 3;
    pub const MAX_ADDRESS_BITS: u8 = 15;

    /// Number of words in data memory.
    pub fn data_words(&self) -> usize {
        1 << self.data_address_bits
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(Self::MIN_ADDRESS_BITS..=Self::MAX_ADDRESS_BITS).contains(&self.data_address_bits) {
            return Err(ConfigError::AddressBits(self.data_address_bits));
        }
        Ok(())
    }

    /// Parse and validate a JSON document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            data_address_bits: 14,
            alu: AluVariant::Standard,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("data_address_bits must be 3..=15, got {0}")]
    AddressBits(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MachineConfig::default();
        assert_eq!(config.data_address_bits, 14);
        assert_eq!(config.data_words(), 16384);
        assert_eq!(config.alu, AluVariant::Standard);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = MachineConfig::from_json(r#"{ "alu": "extended" }"#).unwrap();
        assert_eq!(config.alu, AluVariant::Extended);
        assert_eq!(config.data_address_bits, 14);
    }

    #[test]
    fn test_rejects_bad_width() {
        let err = MachineConfig::from_json(r#"{ "data_address_bits": 16 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::AddressBits(16)));
        assert!(MachineConfig::from_json(r#"{ "data_address_bits": 2 }"#).is_err());
    }

    #[test]
    fn test_rejects_unknown_fields() {
        assert!(matches!(
            MachineConfig::from_json(r#"{ "ram": 3 }"#),
            Err(ConfigError::Parse(_))
        ));
    }
}

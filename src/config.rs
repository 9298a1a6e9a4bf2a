//! Generation configuration shared by encoders and decoders.
//!
//! Both sides of a link must agree on the full configuration out of band: the
//! wire format carries no header.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RlncError};
use crate::field::FiniteField;

pub const DEFAULT_MAX_SYMBOLS: usize = 16;
pub const DEFAULT_SYMBOL_SIZE: usize = 1_400;
/// Upper bound on the generation size.
pub const MAX_SYMBOLS_LIMIT: usize = 65_535;

/// Coding variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeType {
    /// Encoding starts once every slot of the generation is populated.
    FullVector,
    /// Encoding works on whatever prefix of the generation is populated.
    #[default]
    OnTheFly,
}

impl CodeType {
    pub fn permits_partial_generation(self) -> bool {
        matches!(self, CodeType::OnTheFly)
    }
}

impl fmt::Display for CodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CodeType::FullVector => "full_vector",
            CodeType::OnTheFly => "on_the_fly",
        })
    }
}

impl FromStr for CodeType {
    type Err = RlncError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "full_vector" => Ok(CodeType::FullVector),
            "on_the_fly" => Ok(CodeType::OnTheFly),
            other => Err(RlncError::InvalidConfig(format!("unknown code type {other:?}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub code_type: CodeType,
    pub field: FiniteField,
    /// Generation size.
    pub max_symbols: usize,
    /// Bytes per symbol.
    pub symbol_size: usize,
    /// Emit unit vectors for fresh symbols before random combinations.
    pub systematic: bool,
    /// Let `set_symbol` replace a populated slot instead of failing.
    pub allow_overwrite: bool,
    /// Forward diagnostic records to `tracing` from construction on.
    pub trace_enabled: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            code_type: CodeType::default(),
            field: FiniteField::default(),
            max_symbols: DEFAULT_MAX_SYMBOLS,
            symbol_size: DEFAULT_SYMBOL_SIZE,
            systematic: true,
            allow_overwrite: false,
            trace_enabled: false,
        }
    }
}

impl CodecConfig {
    pub fn new(code_type: CodeType, field: FiniteField, max_symbols: usize, symbol_size: usize) -> Self {
        Self {
            code_type,
            field,
            max_symbols,
            symbol_size,
            ..Self::default()
        }
    }

    pub fn with_systematic(mut self, systematic: bool) -> Self {
        self.systematic = systematic;
        self
    }

    pub fn with_overwrite(mut self, allow: bool) -> Self {
        self.allow_overwrite = allow;
        self
    }

    pub fn with_trace(mut self, enabled: bool) -> Self {
        self.trace_enabled = enabled;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_symbols == 0 {
            return Err(RlncError::InvalidConfig("max_symbols must be > 0".into()));
        }
        if self.max_symbols > MAX_SYMBOLS_LIMIT {
            return Err(RlncError::InvalidConfig(format!(
                "max_symbols {} exceeds limit {}",
                self.max_symbols, MAX_SYMBOLS_LIMIT
            )));
        }
        if self.symbol_size == 0 {
            return Err(RlncError::InvalidConfig("symbol_size must be > 0".into()));
        }
        Ok(())
    }

    pub fn block_size(&self) -> usize {
        self.max_symbols * self.symbol_size
    }

    pub fn coefficient_vector_size(&self) -> usize {
        self.field.packed_size(self.max_symbols)
    }

    pub fn payload_size(&self) -> usize {
        self.coefficient_vector_size() + self.symbol_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes_follow_field_packing() {
        let cfg = CodecConfig::new(CodeType::OnTheFly, FiniteField::Binary8, 42, 160);
        assert_eq!(cfg.block_size(), 42 * 160);
        assert_eq!(cfg.payload_size(), 42 + 160);

        let cfg = CodecConfig { field: FiniteField::Binary, ..cfg };
        assert_eq!(cfg.payload_size(), 6 + 160);
    }

    #[test]
    fn test_validate_rejects_empty_generation() {
        let cfg = CodecConfig::new(CodeType::FullVector, FiniteField::Binary8, 0, 8);
        assert!(matches!(cfg.validate(), Err(RlncError::InvalidConfig(_))));

        let cfg = CodecConfig::new(CodeType::FullVector, FiniteField::Binary8, 8, 0);
        assert!(cfg.validate().is_err());

        assert!(CodecConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: CodecConfig =
            serde_json::from_str(r#"{"code_type":"full_vector","field":"binary4","max_symbols":6}"#)
                .unwrap();
        assert_eq!(cfg.code_type, CodeType::FullVector);
        assert_eq!(cfg.field, FiniteField::Binary4);
        assert_eq!(cfg.max_symbols, 6);
        assert_eq!(cfg.symbol_size, DEFAULT_SYMBOL_SIZE);
        assert!(cfg.systematic);
    }

    #[test]
    fn test_code_type_names() {
        assert_eq!("on_the_fly".parse::<CodeType>().unwrap(), CodeType::OnTheFly);
        assert_eq!(CodeType::FullVector.to_string(), "full_vector");
        assert!("sparse".parse::<CodeType>().is_err());
    }
}

//! Wire form of a coded payload: the packed coding vector immediately
//! followed by the coded symbol. No length prefix, no header.

use crate::config::CodecConfig;
use crate::error::{Result, RlncError};
use crate::field::FiniteField;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadCodec {
    field: FiniteField,
    max_symbols: usize,
    symbol_size: usize,
}

impl PayloadCodec {
    pub fn new(field: FiniteField, max_symbols: usize, symbol_size: usize) -> Self {
        Self { field, max_symbols, symbol_size }
    }

    pub fn from_config(config: &CodecConfig) -> Self {
        Self::new(config.field, config.max_symbols, config.symbol_size)
    }

    pub fn vector_size(&self) -> usize {
        self.field.packed_size(self.max_symbols)
    }

    pub fn payload_size(&self) -> usize {
        self.vector_size() + self.symbol_size
    }

    /// Serializes an unpacked coding vector and its coded symbol into `out`.
    /// Returns the bytes written.
    pub fn write(&self, coefficients: &[u8], symbol: &[u8], out: &mut [u8]) -> Result<usize> {
        let needed = self.payload_size();
        if out.len() < needed {
            return Err(RlncError::BufferTooSmall { needed, actual: out.len() });
        }
        let (vector, data) = out[..needed].split_at_mut(self.vector_size());
        self.field.pack(&coefficients[..self.max_symbols], vector);
        data.copy_from_slice(&symbol[..self.symbol_size]);
        Ok(needed)
    }

    /// Unpacks the coding vector into `coefficients` and returns the coded
    /// symbol bytes. Bytes past `payload_size()` are ignored.
    pub fn read<'a>(&self, payload: &'a [u8], coefficients: &mut [u8]) -> Result<&'a [u8]> {
        let expected = self.payload_size();
        if payload.len() < expected {
            return Err(RlncError::InvalidPayloadSize { expected, actual: payload.len() });
        }
        let (vector, data) = payload[..expected].split_at(self.vector_size());
        self.field.unpack(vector, &mut coefficients[..self.max_symbols]);
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_is_vector_then_symbol() {
        let codec = PayloadCodec::new(FiniteField::Binary8, 3, 2);
        let mut out = [0u8; 6];
        assert_eq!(codec.write(&[1, 0, 7], &[0xaa, 0xbb], &mut out).unwrap(), 5);
        assert_eq!(out, [1, 0, 7, 0xaa, 0xbb, 0]);
    }

    #[test]
    fn test_binary_vector_is_bit_packed() {
        let codec = PayloadCodec::new(FiniteField::Binary, 10, 1);
        assert_eq!(codec.payload_size(), 3);
        let mut out = [0u8; 3];
        codec.write(&[1, 1, 0, 0, 0, 0, 0, 0, 0, 1], &[0x42], &mut out).unwrap();
        assert_eq!(out, [0b11, 0b10, 0x42]);

        let mut coefficients = [0u8; 10];
        let symbol = codec.read(&out, &mut coefficients).unwrap();
        assert_eq!(symbol, &[0x42]);
        assert_eq!(coefficients, [1, 1, 0, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_short_buffers_fail() {
        let codec = PayloadCodec::new(FiniteField::Binary8, 4, 4);
        let mut coefficients = [0u8; 4];
        assert_eq!(
            codec.read(&[0u8; 7], &mut coefficients),
            Err(RlncError::InvalidPayloadSize { expected: 8, actual: 7 })
        );
        assert_eq!(
            codec.write(&[0; 4], &[0; 4], &mut [0u8; 5]),
            Err(RlncError::BufferTooSmall { needed: 8, actual: 5 })
        );
    }
}

//! Finite field selection and the arithmetic every other component routes
//! through.
//!
//! Two representations are used throughout the crate:
//!
//! * **unpacked** coefficient vectors, one field element per `u8`
//!   (the decoding matrix and the coefficient generator work on these);
//! * **packed** data, where a byte holds `8 / bits` elements (symbol data and
//!   the coding vector on the wire).
//!
//! For GF(2^8) both representations coincide.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RlncError};
use crate::gf16::GF16;
use crate::gf256::{gf_inv, gf_mul, GF};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FiniteField {
    /// GF(2)
    Binary,
    /// GF(2^4), polynomial 0x13
    Binary4,
    /// GF(2^8), polynomial 0x11d
    #[default]
    Binary8,
}

impl FiniteField {
    /// Bits per element.
    pub const fn bits(self) -> usize {
        match self {
            FiniteField::Binary => 1,
            FiniteField::Binary4 => 4,
            FiniteField::Binary8 => 8,
        }
    }

    /// Number of elements in the field.
    pub const fn order(self) -> usize {
        1 << self.bits()
    }

    /// Largest element value; also the mask applied to raw draws.
    pub const fn max_value(self) -> u8 {
        (self.order() - 1) as u8
    }

    /// Bytes needed to hold `elements` packed field elements.
    pub const fn packed_size(self, elements: usize) -> usize {
        (elements * self.bits()).div_ceil(8)
    }

    #[inline]
    pub fn add(self, a: u8, b: u8) -> u8 {
        a ^ b
    }

    #[inline]
    pub fn subtract(self, a: u8, b: u8) -> u8 {
        a ^ b
    }

    #[inline]
    pub fn multiply(self, a: u8, b: u8) -> u8 {
        match self {
            FiniteField::Binary => a & b & 1,
            FiniteField::Binary4 => GF16.mul(a, b),
            FiniteField::Binary8 => gf_mul(a, b),
        }
    }

    /// Multiplicative inverse; `None` for the zero element.
    #[inline]
    pub fn invert(self, a: u8) -> Option<u8> {
        match self {
            FiniteField::Binary => (a & 1 == 1).then_some(1),
            FiniteField::Binary4 => GF16.inv(a),
            FiniteField::Binary8 => gf_inv(a),
        }
    }

    /// Like [`invert`](Self::invert) but reports the zero element as an error.
    pub fn checked_invert(self, a: u8) -> Result<u8> {
        self.invert(a).ok_or(RlncError::SingularCoefficient)
    }

    /// Packed region: `dst += c * src`.
    pub fn region_multiply_add(self, dst: &mut [u8], src: &[u8], c: u8) {
        match self {
            FiniteField::Binary => {
                if c & 1 == 1 {
                    for (d, &s) in dst.iter_mut().zip(src) {
                        *d ^= s;
                    }
                }
            }
            FiniteField::Binary4 => GF16.mul_add_region(dst, src, c),
            FiniteField::Binary8 => GF.mul_add_region(dst, src, c),
        }
    }

    /// Packed region: `dst *= c`.
    pub fn region_multiply(self, dst: &mut [u8], c: u8) {
        match self {
            FiniteField::Binary => {
                if c & 1 == 0 {
                    dst.fill(0);
                }
            }
            FiniteField::Binary4 => GF16.mul_region(dst, c),
            FiniteField::Binary8 => GF.mul_region(dst, c),
        }
    }

    /// Unpacked vector: `dst[i] += c * src[i]`.
    pub fn vector_multiply_add(self, dst: &mut [u8], src: &[u8], c: u8) {
        match self {
            FiniteField::Binary8 => GF.mul_add_region(dst, src, c),
            _ => {
                if c == 0 {
                    return;
                }
                for (d, &s) in dst.iter_mut().zip(src) {
                    *d ^= self.multiply(c, s);
                }
            }
        }
    }

    /// Unpacked vector: `dst[i] *= c`.
    pub fn vector_multiply(self, dst: &mut [u8], c: u8) {
        match self {
            FiniteField::Binary8 => GF.mul_region(dst, c),
            _ => {
                for d in dst.iter_mut() {
                    *d = self.multiply(c, *d);
                }
            }
        }
    }

    /// Packs unpacked elements into `out`, which must hold
    /// `packed_size(elements.len())` bytes. Padding bits are cleared.
    pub fn pack(self, elements: &[u8], out: &mut [u8]) {
        match self {
            FiniteField::Binary8 => out[..elements.len()].copy_from_slice(elements),
            _ => {
                let bits = self.bits();
                let per_byte = 8 / bits;
                let mask = self.max_value();
                out[..self.packed_size(elements.len())].fill(0);
                for (i, &e) in elements.iter().enumerate() {
                    out[i / per_byte] |= (e & mask) << ((i % per_byte) * bits);
                }
            }
        }
    }

    /// Inverse of [`pack`](Self::pack); fills every slot of `out`.
    pub fn unpack(self, packed: &[u8], out: &mut [u8]) {
        match self {
            FiniteField::Binary8 => out.copy_from_slice(&packed[..out.len()]),
            _ => {
                let bits = self.bits();
                let per_byte = 8 / bits;
                let mask = self.max_value();
                for (i, e) in out.iter_mut().enumerate() {
                    *e = (packed[i / per_byte] >> ((i % per_byte) * bits)) & mask;
                }
            }
        }
    }
}

impl fmt::Display for FiniteField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FiniteField::Binary => "binary",
            FiniteField::Binary4 => "binary4",
            FiniteField::Binary8 => "binary8",
        };
        f.write_str(name)
    }
}

impl FromStr for FiniteField {
    type Err = RlncError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "binary" => Ok(FiniteField::Binary),
            "binary4" => Ok(FiniteField::Binary4),
            "binary8" => Ok(FiniteField::Binary8),
            other => Err(RlncError::InvalidConfig(format!("unknown field {other:?}"))),
        }
    }
}

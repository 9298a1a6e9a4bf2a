//! Random linear network coding over small binary extension fields.
//!
//! An [`Encoder`] emits payloads `{coding vector, coded symbol}` from the
//! symbols of one generation, which may be added on the fly. A [`Decoder`]
//! reconstructs the generation from any sufficiently large subset of those
//! payloads, in any order, and exposes individual symbols as soon as they are
//! recoverable.
//!
//! ```
//! use rlnc::{CodecConfig, CodeType, Decoder, Encoder, FiniteField};
//!
//! let config = CodecConfig::new(CodeType::OnTheFly, FiniteField::Binary8, 4, 2);
//! let mut encoder = Encoder::new(config).unwrap();
//! let mut decoder = Decoder::new(config).unwrap();
//!
//! encoder.set_const_symbols(&[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
//! while !decoder.is_complete() {
//!     let payload = encoder.encode_bytes().unwrap();
//!     decoder.decode(&payload).unwrap();
//! }
//!
//! let mut out = [0u8; 8];
//! decoder.copy_symbols(&mut out).unwrap();
//! assert_eq!(out, [1, 2, 3, 4, 5, 6, 7, 8]);
//! ```

mod gf16;
mod gf256;

pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod field;
pub mod generator;
pub mod matrix;
pub mod payload;
pub mod storage;
pub mod trace;

#[cfg(feature = "python")]
mod python;

pub use config::{CodeType, CodecConfig};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{Result, RlncError};
pub use field::FiniteField;
pub use generator::{CoefficientSource, RandomSource, SequenceSource};
pub use payload::PayloadCodec;
pub use trace::{StdoutSink, TraceSink, TracingSink};

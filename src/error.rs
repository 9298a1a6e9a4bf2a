//! Crate-wide error type.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RlncError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RlncError {
    #[error("encoder not ready: rank {rank}, need {required}")]
    NotReady { rank: usize, required: usize },

    #[error("symbol index {index} out of range (symbols = {symbols})")]
    IndexOutOfRange { index: usize, symbols: usize },

    #[error("symbol {index} already set")]
    AlreadySet { index: usize },

    #[error("payload is {actual} bytes, expected at least {expected}")]
    InvalidPayloadSize { expected: usize, actual: usize },

    #[error("symbol {index} not yet decoded")]
    SymbolNotYetDecoded { index: usize },

    #[error("decoding not complete: rank {rank} of {symbols}")]
    NotComplete { rank: usize, symbols: usize },

    #[error("inverse of zero coefficient")]
    SingularCoefficient,

    #[error("symbol data is {actual} bytes, expected {expected}")]
    InvalidSymbolSize { expected: usize, actual: usize },

    #[error("buffer is {actual} bytes, need {needed}")]
    BufferTooSmall { needed: usize, actual: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid state: {0}")]
    InvalidState(&'static str),
}

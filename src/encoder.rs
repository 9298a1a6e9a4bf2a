//! Generation encoder.
//!
//! Symbols may be loaded all at once or added one by one while encoding is
//! already under way. With the systematic phase on, every symbol in a
//! contiguous prefix is first sent uncoded (unit coding vector) before the
//! encoder falls back to random combinations of everything populated.

use bytes::{Bytes, BytesMut};
use tracing::{debug, trace};

use crate::config::CodecConfig;
use crate::error::{Result, RlncError};
use crate::generator::{random_vector, unit_vector, CoefficientSource, RandomSource};
use crate::payload::PayloadCodec;
use crate::storage::SymbolStore;
use crate::trace::{format_coefficients, StdoutSink, TraceSink, Tracer};

pub struct Encoder {
    config: CodecConfig,
    codec: PayloadCodec,
    store: SymbolStore,
    source: Box<dyn CoefficientSource>,
    systematic: bool,
    /// Next slot to send uncoded.
    systematic_index: usize,
    coefficients: Vec<u8>,
    symbol: Vec<u8>,
    tracer: Tracer,
}

impl Encoder {
    pub fn new(config: CodecConfig) -> Result<Self> {
        Self::with_source(config, RandomSource::from_entropy())
    }

    /// Builds an encoder drawing coefficients from `source`.
    pub fn with_source(config: CodecConfig, source: impl CoefficientSource + 'static) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            codec: PayloadCodec::from_config(&config),
            store: SymbolStore::new(config.max_symbols, config.symbol_size),
            source: Box::new(source),
            systematic: config.systematic,
            systematic_index: 0,
            coefficients: vec![0u8; config.max_symbols],
            symbol: vec![0u8; config.symbol_size],
            tracer: Tracer::new(config.trace_enabled),
        })
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn symbols(&self) -> usize {
        self.config.max_symbols
    }

    pub fn symbol_size(&self) -> usize {
        self.config.symbol_size
    }

    pub fn block_size(&self) -> usize {
        self.config.block_size()
    }

    pub fn payload_size(&self) -> usize {
        self.codec.payload_size()
    }

    /// Number of populated symbol slots.
    pub fn rank(&self) -> usize {
        self.store.count()
    }

    pub fn is_symbol_set(&self, index: usize) -> bool {
        self.store.is_populated(index)
    }

    /// Copies `symbol_size()` bytes of `data` into slot `index`.
    pub fn set_symbol(&mut self, index: usize, data: &[u8]) -> Result<()> {
        self.store.check_index(index)?;
        if self.store.is_populated(index) && !self.config.allow_overwrite {
            return Err(RlncError::AlreadySet { index });
        }
        self.store.store(index, data)?;
        debug!(index, rank = self.rank(), "encoder symbol set");
        Ok(())
    }

    pub fn set_const_symbol(&mut self, index: usize, data: &[u8]) -> Result<()> {
        self.set_symbol(index, data)
    }

    /// Loads a whole generation. Shorter input is zero-padded to
    /// `block_size()`; every slot ends up populated.
    pub fn set_const_symbols(&mut self, data: &[u8]) -> Result<()> {
        let block_size = self.block_size();
        if data.len() > block_size {
            return Err(RlncError::InvalidSymbolSize { expected: block_size, actual: data.len() });
        }
        if !self.config.allow_overwrite {
            if let Some(index) = self.store.populated().iter().position(|&p| p) {
                return Err(RlncError::AlreadySet { index });
            }
        }

        let buffer = self.store.as_mut_slice();
        buffer[..data.len()].copy_from_slice(data);
        buffer[data.len()..].fill(0);
        for index in 0..self.symbols() {
            self.store.mark(index);
        }
        debug!(bytes = data.len(), "encoder generation loaded");
        Ok(())
    }

    pub fn set_systematic_on(&mut self) {
        self.systematic = true;
    }

    pub fn set_systematic_off(&mut self) {
        self.systematic = false;
    }

    pub fn is_systematic_on(&self) -> bool {
        self.systematic
    }

    /// True if the next payload will carry an uncoded symbol.
    pub fn in_systematic_phase(&self) -> bool {
        self.systematic && self.store.is_contiguous() && self.systematic_index < self.rank()
    }

    /// Writes one payload into `out` and returns the bytes used.
    pub fn encode(&mut self, out: &mut [u8]) -> Result<usize> {
        let rank = self.rank();
        let required = if self.config.code_type.permits_partial_generation() {
            1
        } else {
            self.symbols()
        };
        if rank < required {
            return Err(RlncError::NotReady { rank, required });
        }
        let needed = self.payload_size();
        if out.len() < needed {
            return Err(RlncError::BufferTooSmall { needed, actual: out.len() });
        }

        if self.in_systematic_phase() {
            let index = self.systematic_index;
            self.tracer
                .emit("symbol_index_before_write_uncoded_symbol", || index.to_string());
            unit_vector(&mut self.coefficients, index);
            self.symbol.copy_from_slice(self.store.symbol(index));
            self.systematic_index += 1;
            trace!(index, "encoder wrote uncoded symbol");
        } else {
            random_vector(
                self.source.as_mut(),
                self.config.field,
                self.store.populated(),
                &mut self.coefficients,
            );
            self.tracer.emit("symbol_coefficients_before_write_symbol", || {
                format_coefficients(&self.coefficients)
            });

            let field = self.config.field;
            self.symbol.fill(0);
            for (index, &c) in self.coefficients.iter().enumerate() {
                if c != 0 {
                    field.region_multiply_add(&mut self.symbol, self.store.symbol(index), c);
                }
            }
            trace!(rank, "encoder wrote coded symbol");
        }

        self.codec.write(&self.coefficients, &self.symbol, out)
    }

    pub fn write_payload(&mut self, out: &mut [u8]) -> Result<usize> {
        self.encode(out)
    }

    /// Allocating variant of [`encode`](Self::encode).
    pub fn encode_bytes(&mut self) -> Result<Bytes> {
        let mut buf = BytesMut::zeroed(self.payload_size());
        let used = self.encode(&mut buf)?;
        buf.truncate(used);
        Ok(buf.freeze())
    }

    /// Empties the generation; configuration and trace settings are kept.
    pub fn reset(&mut self) {
        self.store.clear();
        self.systematic_index = 0;
        self.systematic = self.config.systematic;
        debug!("encoder reset");
    }

    pub fn set_trace_callback(&mut self, sink: impl TraceSink + 'static) {
        self.tracer.set_sink(Box::new(sink));
    }

    pub fn set_trace_stdout(&mut self) {
        self.tracer.set_sink(Box::new(StdoutSink));
    }

    pub fn set_trace_off(&mut self) {
        self.tracer.clear_sink();
    }

    pub fn set_zone_prefix(&mut self, prefix: &str) {
        self.tracer.set_prefix(prefix);
    }
}

impl std::fmt::Debug for Encoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Encoder")
            .field("config", &self.config)
            .field("rank", &self.rank())
            .field("systematic", &self.systematic)
            .field("systematic_index", &self.systematic_index)
            .finish_non_exhaustive()
    }
}

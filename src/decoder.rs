//! Generation decoder with a partial decoding tracker.
//!
//! Every innovative payload is inserted into a [`DecodingMatrix`] that is kept
//! fully reduced, so individual symbols become available as soon as their row
//! collapses to a unit vector, long before the generation is complete.

use bytes::{Bytes, BytesMut};
use tracing::{debug, trace};

use crate::config::CodecConfig;
use crate::error::{Result, RlncError};
use crate::generator::{random_vector, CoefficientSource, RandomSource};
use crate::matrix::DecodingMatrix;
use crate::payload::PayloadCodec;
use crate::trace::{format_coefficients, StdoutSink, TraceSink, Tracer};

pub struct Decoder {
    config: CodecConfig,
    codec: PayloadCodec,
    matrix: DecodingMatrix,
    /// Partial decoding tracker; a set bit never clears until reset.
    uncoded: Vec<bool>,
    uncoded_count: usize,
    /// Slots that became uncoded during the most recent decode.
    newly_uncoded: Vec<usize>,
    coefficients: Vec<u8>,
    symbol: Vec<u8>,
    weights: Vec<u8>,
    source: Box<dyn CoefficientSource>,
    tracer: Tracer,
}

impl Decoder {
    pub fn new(config: CodecConfig) -> Result<Self> {
        Self::with_source(config, RandomSource::from_entropy())
    }

    /// `source` only feeds [`recode`](Self::recode); decoding is deterministic.
    pub fn with_source(config: CodecConfig, source: impl CoefficientSource + 'static) -> Result<Self> {
        config.validate()?;
        let n = config.max_symbols;
        Ok(Self {
            config,
            codec: PayloadCodec::from_config(&config),
            matrix: DecodingMatrix::new(config.field, n, config.symbol_size),
            uncoded: vec![false; n],
            uncoded_count: 0,
            newly_uncoded: Vec::with_capacity(n),
            coefficients: vec![0u8; n],
            symbol: vec![0u8; config.symbol_size],
            weights: vec![0u8; n],
            source: Box::new(source),
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

    pub fn rank(&self) -> usize {
        self.matrix.rank()
    }

    pub fn is_complete(&self) -> bool {
        self.rank() == self.symbols()
    }

    /// The matrix is kept fully reduced after every insertion.
    pub fn has_partial_decoding_tracker(&self) -> bool {
        true
    }

    /// True if the last decode call decoded at least one more symbol.
    pub fn is_partial_complete(&self) -> bool {
        !self.newly_uncoded.is_empty()
    }

    /// Slots decoded by the last decode call, in index order.
    pub fn newly_uncoded(&self) -> &[usize] {
        &self.newly_uncoded
    }

    pub fn is_symbol_uncoded(&self, index: usize) -> bool {
        self.uncoded.get(index).copied().unwrap_or(false)
    }

    /// True if some held row has its pivot at `index`.
    pub fn is_symbol_pivot(&self, index: usize) -> bool {
        index < self.symbols() && self.matrix.is_pivot(index)
    }

    pub fn symbols_uncoded(&self) -> usize {
        self.uncoded_count
    }

    pub fn symbols_partially_decoded(&self) -> usize {
        self.rank() - self.uncoded_count
    }

    pub fn symbols_missing(&self) -> usize {
        self.symbols() - self.rank()
    }

    /// Consumes one payload. Returns `true` if it raised the rank, `false`
    /// if it was linearly dependent on what is already held.
    pub fn decode(&mut self, payload: &[u8]) -> Result<bool> {
        let data = self.codec.read(payload, &mut self.coefficients)?;
        self.symbol.copy_from_slice(data);
        self.newly_uncoded.clear();

        self.tracer.emit("symbol_coefficients_before_read_symbol", || {
            format_coefficients(&self.coefficients)
        });
        if let Some(index) = unit_index(&self.coefficients) {
            self.tracer
                .emit("symbol_index_before_read_uncoded_symbol", || index.to_string());
        }

        self.matrix.eliminate(&mut self.coefficients, &mut self.symbol);
        let innovative = match self.matrix.insert(&mut self.coefficients, &mut self.symbol)? {
            Some(pivot) => {
                trace!(pivot, rank = self.rank(), "decoder absorbed innovative payload");
                self.update_tracker();
                true
            }
            None => {
                trace!(rank = self.rank(), "decoder discarded dependent payload");
                false
            }
        };

        let matrix = &self.matrix;
        self.tracer.emit("decoder_state", || matrix.describe());
        if innovative && self.is_complete() {
            debug!(symbols = self.symbols(), "decoding complete");
        }
        Ok(innovative)
    }

    pub fn read_payload(&mut self, payload: &[u8]) -> Result<bool> {
        self.decode(payload)
    }

    fn update_tracker(&mut self) {
        for slot in 0..self.symbols() {
            if !self.uncoded[slot] && self.matrix.is_identity_row(slot) {
                self.uncoded[slot] = true;
                self.uncoded_count += 1;
                self.newly_uncoded.push(slot);
                debug!(slot, "symbol decoded");
            }
        }
    }

    /// Copies decoded symbol `index` into `out`.
    pub fn copy_symbol(&self, index: usize, out: &mut [u8]) -> Result<usize> {
        if index >= self.symbols() {
            return Err(RlncError::IndexOutOfRange { index, symbols: self.symbols() });
        }
        if !self.uncoded[index] {
            return Err(RlncError::SymbolNotYetDecoded { index });
        }
        let size = self.symbol_size();
        if out.len() < size {
            return Err(RlncError::BufferTooSmall { needed: size, actual: out.len() });
        }
        out[..size].copy_from_slice(self.matrix.symbol(index));
        Ok(size)
    }

    /// Copies the whole decoded generation into `out` in slot order.
    pub fn copy_symbols(&self, out: &mut [u8]) -> Result<usize> {
        if !self.is_complete() {
            return Err(RlncError::NotComplete { rank: self.rank(), symbols: self.symbols() });
        }
        let size = self.block_size();
        if out.len() < size {
            return Err(RlncError::BufferTooSmall { needed: size, actual: out.len() });
        }
        out[..size].copy_from_slice(self.matrix.store().as_slice());
        Ok(size)
    }

    /// Decodes into `storage` (exactly `block_size()` bytes) instead of the
    /// internal buffer. Only allowed before the first innovative payload.
    pub fn set_mutable_symbols(&mut self, storage: Vec<u8>) -> Result<()> {
        if self.rank() > 0 {
            return Err(RlncError::InvalidState("decoding already started"));
        }
        self.matrix.store_mut().replace_buffer(storage)?;
        Ok(())
    }

    /// Gives back the symbol storage; decoded slots hold their symbols.
    pub fn into_symbols(self) -> Vec<u8> {
        self.matrix.into_store().into_buffer()
    }

    /// Writes a fresh random combination of the held rows into `out`.
    pub fn recode(&mut self, out: &mut [u8]) -> Result<usize> {
        let rank = self.rank();
        if rank == 0 {
            return Err(RlncError::NotReady { rank, required: 1 });
        }
        let needed = self.payload_size();
        if out.len() < needed {
            return Err(RlncError::BufferTooSmall { needed, actual: out.len() });
        }

        let field = self.config.field;
        random_vector(
            self.source.as_mut(),
            field,
            self.matrix.store().populated(),
            &mut self.weights,
        );
        self.coefficients.fill(0);
        self.symbol.fill(0);
        for (pivot, &w) in self.weights.iter().enumerate() {
            if w == 0 {
                continue;
            }
            field.vector_multiply_add(&mut self.coefficients, self.matrix.row(pivot), w);
            field.region_multiply_add(&mut self.symbol, self.matrix.symbol(pivot), w);
        }
        self.tracer.emit("symbol_coefficients_before_write_symbol", || {
            format_coefficients(&self.coefficients)
        });
        trace!(rank, "decoder recoded payload");

        self.codec.write(&self.coefficients, &self.symbol, out)
    }

    pub fn recode_bytes(&mut self) -> Result<Bytes> {
        let mut buf = BytesMut::zeroed(self.payload_size());
        let used = self.recode(&mut buf)?;
        buf.truncate(used);
        Ok(buf.freeze())
    }

    /// Forgets every received payload; configuration and tracing are kept.
    pub fn reset(&mut self) {
        self.matrix.clear();
        self.uncoded.fill(false);
        self.uncoded_count = 0;
        self.newly_uncoded.clear();
        debug!("decoder reset");
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

impl std::fmt::Debug for Decoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decoder")
            .field("config", &self.config)
            .field("rank", &self.rank())
            .field("uncoded", &self.uncoded_count)
            .finish_non_exhaustive()
    }
}

fn unit_index(coefficients: &[u8]) -> Option<usize> {
    let mut found = None;
    for (i, &c) in coefficients.iter().enumerate() {
        match c {
            0 => {}
            1 if found.is_none() => found = Some(i),
            _ => return None,
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodeType;
    use crate::encoder::Encoder;
    use crate::field::FiniteField;
    use crate::generator::SequenceSource;
    use crate::gf256::gf_mul;

    fn config(symbols: usize, size: usize) -> CodecConfig {
        CodecConfig::new(CodeType::OnTheFly, FiniteField::Binary8, symbols, size)
    }

    fn systematic(index: usize, symbols: usize, data: &[u8]) -> Vec<u8> {
        let mut payload = vec![0u8; symbols];
        payload[index] = 1;
        payload.extend_from_slice(data);
        payload
    }

    #[test]
    fn test_systematic_payloads_in_any_order() {
        let mut decoder = Decoder::new(config(4, 2)).unwrap();
        let data = [[1u8, 2], [3, 4], [5, 6], [7, 8]];
        for index in [2, 0, 3, 1] {
            assert!(decoder.decode(&systematic(index, 4, &data[index])).unwrap());
            assert!(decoder.is_symbol_uncoded(index));
            assert_eq!(decoder.newly_uncoded(), &[index]);
        }
        assert!(decoder.is_complete());
        let mut out = [0u8; 8];
        assert_eq!(decoder.copy_symbols(&mut out).unwrap(), 8);
        assert_eq!(out, [1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_combination_of_known_rows_is_dependent() {
        let mut decoder = Decoder::new(config(4, 2)).unwrap();
        decoder.decode(&systematic(0, 4, &[1, 2])).unwrap();
        decoder.decode(&systematic(1, 4, &[3, 4])).unwrap();

        let (c0, c1) = (0x1b, 0xc4);
        let mut payload = vec![c0, c1, 0, 0];
        payload.push(gf_mul(c0, 1) ^ gf_mul(c1, 3));
        payload.push(gf_mul(c0, 2) ^ gf_mul(c1, 4));

        assert!(!decoder.decode(&payload).unwrap());
        assert_eq!(decoder.rank(), 2);
        assert!(!decoder.is_partial_complete());
    }

    #[test]
    fn test_duplicate_payload_is_absorbed() {
        let mut decoder = Decoder::new(config(3, 1)).unwrap();
        let payload = [4, 9, 1, 0x77];
        assert!(decoder.decode(&payload).unwrap());
        assert_eq!(decoder.rank(), 1);
        assert!(!decoder.decode(&payload).unwrap());
        assert_eq!(decoder.rank(), 1);
        assert_eq!(decoder.symbols_uncoded(), 0);
        assert_eq!(decoder.symbols_partially_decoded(), 1);
        assert_eq!(decoder.symbols_missing(), 2);
        assert!(decoder.is_symbol_pivot(0));
        assert!(!decoder.is_symbol_pivot(1));
    }

    #[test]
    fn test_coded_row_decodes_once_neighbour_arrives() {
        // x0 + 2 x1, then x1 uncoded: both symbols come out together.
        let (x0, x1) = (0x40u8, 0x0fu8);
        let mut decoder = Decoder::new(config(3, 1)).unwrap();
        decoder.decode(&[1, 2, 0, x0 ^ gf_mul(2, x1)]).unwrap();
        assert!(!decoder.is_partial_complete());
        assert!(!decoder.is_symbol_uncoded(0));

        decoder.decode(&systematic(1, 3, &[x1])).unwrap();
        assert!(decoder.is_partial_complete());
        assert_eq!(decoder.newly_uncoded(), &[0, 1]);

        let mut out = [0u8; 1];
        decoder.copy_symbol(0, &mut out).unwrap();
        assert_eq!(out, [x0]);
        assert_eq!(
            decoder.copy_symbol(2, &mut out),
            Err(RlncError::SymbolNotYetDecoded { index: 2 })
        );
        assert_eq!(
            decoder.copy_symbol(3, &mut out),
            Err(RlncError::IndexOutOfRange { index: 3, symbols: 3 })
        );
    }

    #[test]
    fn test_errors_leave_state_unchanged() {
        let mut decoder = Decoder::new(config(2, 2)).unwrap();
        decoder.decode(&systematic(0, 2, &[5, 6])).unwrap();
        assert_eq!(
            decoder.decode(&[0, 1, 2]),
            Err(RlncError::InvalidPayloadSize { expected: 4, actual: 3 })
        );
        assert_eq!(decoder.rank(), 1);
        assert!(decoder.is_partial_complete());

        let mut out = [0u8; 4];
        assert_eq!(decoder.copy_symbols(&mut out), Err(RlncError::NotComplete { rank: 1, symbols: 2 }));
    }

    #[test]
    fn test_mutable_symbols_receive_decoded_data() {
        let mut decoder = Decoder::new(config(2, 1)).unwrap();
        assert!(decoder.set_mutable_symbols(vec![0; 3]).is_err());
        decoder.set_mutable_symbols(vec![0xee; 2]).unwrap();
        decoder.decode(&systematic(1, 2, &[7])).unwrap();
        assert_eq!(
            decoder.set_mutable_symbols(vec![0; 2]),
            Err(RlncError::InvalidState("decoding already started"))
        );
        decoder.decode(&systematic(0, 2, &[6])).unwrap();
        assert_eq!(decoder.into_symbols(), vec![6, 7]);
    }

    #[test]
    fn test_recode_feeds_downstream_decoder() {
        let cfg = config(4, 3);
        let mut encoder = Encoder::with_source(cfg, RandomSource::with_seed(11)).unwrap();
        let data: Vec<u8> = (0..12).collect();
        encoder.set_const_symbols(&data).unwrap();
        encoder.set_systematic_off();

        let mut relay = Decoder::with_source(cfg, RandomSource::with_seed(12)).unwrap();
        let mut sink = Decoder::new(cfg).unwrap();
        assert_eq!(
            relay.recode_bytes().unwrap_err(),
            RlncError::NotReady { rank: 0, required: 1 }
        );

        while !relay.is_complete() {
            relay.decode(&encoder.encode_bytes().unwrap()).unwrap();
        }
        let mut rounds = 0;
        while !sink.is_complete() {
            sink.decode(&relay.recode_bytes().unwrap()).unwrap();
            rounds += 1;
            assert!(rounds < 100);
        }
        let mut out = vec![0u8; 12];
        sink.copy_symbols(&mut out).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_recode_stays_in_received_subspace() {
        let cfg = config(3, 1);
        let mut relay = Decoder::with_source(cfg, SequenceSource::new(vec![2])).unwrap();
        relay.decode(&systematic(2, 3, &[0x55])).unwrap();
        assert_eq!(&relay.recode_bytes().unwrap()[..], &[0, 0, 2, gf_mul(2, 0x55)]);
    }

    #[test]
    fn test_reset_clears_tracker() {
        let mut decoder = Decoder::new(config(2, 1)).unwrap();
        decoder.decode(&systematic(0, 2, &[1])).unwrap();
        decoder.reset();
        assert_eq!(decoder.rank(), 0);
        assert!(!decoder.is_symbol_uncoded(0));
        assert!(!decoder.is_partial_complete());
    }

    #[test]
    fn test_trace_records_state() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let records = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&records);
        let mut decoder = Decoder::new(config(2, 1)).unwrap();
        decoder.set_trace_callback(move |zone: &str, data: &str| {
            seen.borrow_mut().push((zone.to_string(), data.to_string()));
        });
        decoder.decode(&systematic(1, 2, &[3])).unwrap();

        let records = records.borrow();
        let zones: Vec<&str> = records.iter().map(|(z, _)| z.as_str()).collect();
        assert_eq!(
            zones,
            vec![
                "symbol_coefficients_before_read_symbol",
                "symbol_index_before_read_uncoded_symbol",
                "decoder_state",
            ]
        );
        assert_eq!(records[0].1, "0 1");
        assert_eq!(records[1].1, "1");
        assert_eq!(records[2].1, "  0 ?: 0 0\n  1 U: 0 1\n");
    }

    #[test]
    fn test_unit_index() {
        assert_eq!(unit_index(&[0, 1, 0]), Some(1));
        assert_eq!(unit_index(&[1, 1, 0]), None);
        assert_eq!(unit_index(&[0, 2, 0]), None);
        assert_eq!(unit_index(&[0, 0, 0]), None);
    }
}

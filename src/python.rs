use pyo3::exceptions::{PyIndexError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyBytes;

use crate::config::{CodeType, CodecConfig};
use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::RlncError;
use crate::field::FiniteField;
use crate::trace::TraceSink;

fn to_py_err(err: RlncError) -> PyErr {
    match err {
        RlncError::IndexOutOfRange { .. } => PyIndexError::new_err(err.to_string()),
        RlncError::InvalidPayloadSize { .. }
        | RlncError::InvalidSymbolSize { .. }
        | RlncError::BufferTooSmall { .. }
        | RlncError::InvalidConfig(_)
        | RlncError::AlreadySet { .. } => PyValueError::new_err(err.to_string()),
        _ => PyRuntimeError::new_err(err.to_string()),
    }
}

fn build_config(
    code_type: &str,
    field: &str,
    max_symbols: usize,
    symbol_size: usize,
    trace_enabled: bool,
) -> PyResult<CodecConfig> {
    let code_type: CodeType = code_type.parse().map_err(to_py_err)?;
    let field: FiniteField = field.parse().map_err(to_py_err)?;
    Ok(CodecConfig::new(code_type, field, max_symbols, symbol_size).with_trace(trace_enabled))
}

/// Calls a Python callable with `(zone, data)`.
struct PyTraceSink(PyObject);

impl TraceSink for PyTraceSink {
    fn trace(&mut self, zone: &str, data: &str) {
        Python::with_gil(|py| {
            if let Err(err) = self.0.call1(py, (zone, data)) {
                tracing::warn!(zone, error = %err, "python trace callback failed");
            }
        });
    }
}

#[pyclass(name = "Encoder", unsendable)]
struct PyEncoder {
    inner: Encoder,
}

#[pymethods]
impl PyEncoder {
    #[new]
    #[pyo3(signature = (code_type, field, max_symbols, symbol_size, trace_enabled = false))]
    fn new(
        code_type: &str,
        field: &str,
        max_symbols: usize,
        symbol_size: usize,
        trace_enabled: bool,
    ) -> PyResult<Self> {
        let config = build_config(code_type, field, max_symbols, symbol_size, trace_enabled)?;
        Ok(Self { inner: Encoder::new(config).map_err(to_py_err)? })
    }

    fn set_symbol(&mut self, index: usize, data: &[u8]) -> PyResult<()> {
        self.inner.set_symbol(index, data).map_err(to_py_err)
    }

    fn set_const_symbols(&mut self, data: &[u8]) -> PyResult<()> {
        self.inner.set_const_symbols(data).map_err(to_py_err)
    }

    fn encode<'py>(&mut self, py: Python<'py>) -> PyResult<Bound<'py, PyBytes>> {
        let payload = self.inner.encode_bytes().map_err(to_py_err)?;
        Ok(PyBytes::new(py, &payload))
    }

    fn rank(&self) -> usize {
        self.inner.rank()
    }

    fn symbols(&self) -> usize {
        self.inner.symbols()
    }

    fn symbol_size(&self) -> usize {
        self.inner.symbol_size()
    }

    fn block_size(&self) -> usize {
        self.inner.block_size()
    }

    fn payload_size(&self) -> usize {
        self.inner.payload_size()
    }

    fn set_systematic_on(&mut self) {
        self.inner.set_systematic_on();
    }

    fn set_systematic_off(&mut self) {
        self.inner.set_systematic_off();
    }

    fn is_systematic_on(&self) -> bool {
        self.inner.is_systematic_on()
    }

    fn set_trace_callback(&mut self, callback: PyObject) {
        self.inner.set_trace_callback(PyTraceSink(callback));
    }

    fn set_trace_stdout(&mut self) {
        self.inner.set_trace_stdout();
    }

    fn set_trace_off(&mut self) {
        self.inner.set_trace_off();
    }

    fn set_zone_prefix(&mut self, prefix: &str) {
        self.inner.set_zone_prefix(prefix);
    }
}

#[pyclass(name = "Decoder", unsendable)]
struct PyDecoder {
    inner: Decoder,
}

#[pymethods]
impl PyDecoder {
    #[new]
    #[pyo3(signature = (code_type, field, max_symbols, symbol_size, trace_enabled = false))]
    fn new(
        code_type: &str,
        field: &str,
        max_symbols: usize,
        symbol_size: usize,
        trace_enabled: bool,
    ) -> PyResult<Self> {
        let config = build_config(code_type, field, max_symbols, symbol_size, trace_enabled)?;
        Ok(Self { inner: Decoder::new(config).map_err(to_py_err)? })
    }

    fn decode(&mut self, payload: &[u8]) -> PyResult<bool> {
        self.inner.decode(payload).map_err(to_py_err)
    }

    fn recode<'py>(&mut self, py: Python<'py>) -> PyResult<Bound<'py, PyBytes>> {
        let payload = self.inner.recode_bytes().map_err(to_py_err)?;
        Ok(PyBytes::new(py, &payload))
    }

    fn rank(&self) -> usize {
        self.inner.rank()
    }

    fn symbols(&self) -> usize {
        self.inner.symbols()
    }

    fn symbol_size(&self) -> usize {
        self.inner.symbol_size()
    }

    fn block_size(&self) -> usize {
        self.inner.block_size()
    }

    fn payload_size(&self) -> usize {
        self.inner.payload_size()
    }

    fn is_complete(&self) -> bool {
        self.inner.is_complete()
    }

    fn has_partial_decoding_tracker(&self) -> bool {
        self.inner.has_partial_decoding_tracker()
    }

    fn is_partial_complete(&self) -> bool {
        self.inner.is_partial_complete()
    }

    fn is_symbol_uncoded(&self, index: usize) -> bool {
        self.inner.is_symbol_uncoded(index)
    }

    fn copy_symbol<'py>(&self, py: Python<'py>, index: usize) -> PyResult<Bound<'py, PyBytes>> {
        let mut out = vec![0u8; self.inner.symbol_size()];
        self.inner.copy_symbol(index, &mut out).map_err(to_py_err)?;
        Ok(PyBytes::new(py, &out))
    }

    fn copy_symbols<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyBytes>> {
        let mut out = vec![0u8; self.inner.block_size()];
        self.inner.copy_symbols(&mut out).map_err(to_py_err)?;
        Ok(PyBytes::new(py, &out))
    }

    fn set_trace_callback(&mut self, callback: PyObject) {
        self.inner.set_trace_callback(PyTraceSink(callback));
    }

    fn set_trace_stdout(&mut self) {
        self.inner.set_trace_stdout();
    }

    fn set_trace_off(&mut self) {
        self.inner.set_trace_off();
    }

    fn set_zone_prefix(&mut self, prefix: &str) {
        self.inner.set_zone_prefix(prefix);
    }
}

#[pymodule]
#[pyo3(name = "_rlnc")]
fn rlnc_module(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyEncoder>()?;
    m.add_class::<PyDecoder>()?;
    Ok(())
}

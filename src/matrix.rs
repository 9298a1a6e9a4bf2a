//! Incrementally maintained reduced row-echelon decoding matrix.
//!
//! Row `c` is the row whose pivot is column `c`; its symbol data lives in slot
//! `c` of the backing [`SymbolStore`]. After every insertion the matrix is in
//! full reduced form: each pivot column is zero in every other row, and every
//! pivot coefficient is 1.

use crate::error::Result;
use crate::field::FiniteField;
use crate::storage::SymbolStore;

#[derive(Debug, Clone)]
pub struct DecodingMatrix {
    field: FiniteField,
    symbols: usize,
    coefficients: Vec<u8>,
    /// Pivot rows are the populated slots of the store.
    store: SymbolStore,
}

impl DecodingMatrix {
    pub fn new(field: FiniteField, symbols: usize, symbol_size: usize) -> Self {
        Self {
            field,
            symbols,
            coefficients: vec![0u8; symbols * symbols],
            store: SymbolStore::new(symbols, symbol_size),
        }
    }

    pub fn field(&self) -> FiniteField {
        self.field
    }

    pub fn symbols(&self) -> usize {
        self.symbols
    }

    pub fn rank(&self) -> usize {
        self.store.count()
    }

    pub fn is_pivot(&self, column: usize) -> bool {
        self.store.is_populated(column)
    }

    pub fn row(&self, pivot: usize) -> &[u8] {
        &self.coefficients[pivot * self.symbols..(pivot + 1) * self.symbols]
    }

    pub fn symbol(&self, pivot: usize) -> &[u8] {
        self.store.symbol(pivot)
    }

    pub fn store(&self) -> &SymbolStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SymbolStore {
        &mut self.store
    }

    pub fn into_store(self) -> SymbolStore {
        self.store
    }

    /// True when the row for `pivot` is the unit vector at its own column.
    pub fn is_identity_row(&self, pivot: usize) -> bool {
        self.is_pivot(pivot)
            && self
                .row(pivot)
                .iter()
                .enumerate()
                .all(|(c, &v)| if c == pivot { v == 1 } else { v == 0 })
    }

    /// Forward elimination: zeroes every pivot column of the incoming row.
    ///
    /// Because stored rows are fully reduced, one pass over the pivots in any
    /// order suffices.
    pub fn eliminate(&self, vector: &mut [u8], symbol: &mut [u8]) {
        for pivot in 0..self.symbols {
            let factor = vector[pivot];
            if factor == 0 || !self.is_pivot(pivot) {
                continue;
            }
            // pivot coefficient is 1, so the scale is just `factor`
            self.field.vector_multiply_add(vector, self.row(pivot), factor);
            self.field.region_multiply_add(symbol, self.store.symbol(pivot), factor);
        }
    }

    /// Normalizes a reduced, non-zero row and inserts it at its leading column,
    /// then back-substitutes that column out of every other row.
    ///
    /// `vector` and `symbol` are left holding the inserted row. Returns the
    /// pivot column, or `None` if the row was all zero.
    pub fn insert(&mut self, vector: &mut [u8], symbol: &mut [u8]) -> Result<Option<usize>> {
        let Some(pivot) = vector.iter().position(|&v| v != 0) else {
            return Ok(None);
        };
        debug_assert!(!self.is_pivot(pivot), "row was not reduced against column {pivot}");

        let scale = self.field.checked_invert(vector[pivot])?;
        self.field.vector_multiply(vector, scale);
        self.field.region_multiply(symbol, scale);

        let n = self.symbols;
        for other in 0..n {
            if other == pivot || !self.is_pivot(other) {
                continue;
            }
            let factor = self.coefficients[other * n + pivot];
            if factor == 0 {
                continue;
            }
            self.field
                .vector_multiply_add(&mut self.coefficients[other * n..(other + 1) * n], vector, factor);
            self.field.region_multiply_add(self.store.symbol_mut(other), symbol, factor);
        }

        self.coefficients[pivot * n..(pivot + 1) * n].copy_from_slice(vector);
        self.store.symbol_mut(pivot).copy_from_slice(symbol);
        self.store.mark(pivot);
        Ok(Some(pivot))
    }

    /// One line per slot: `U` decoded, `C` coded pivot, `?` missing, then the
    /// row's coefficients.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for slot in 0..self.symbols {
            let state = if self.is_identity_row(slot) {
                'U'
            } else if self.is_pivot(slot) {
                'C'
            } else {
                '?'
            };
            out.push_str(&format!("{slot:3} {state}:"));
            for &c in self.row(slot) {
                out.push_str(&format!(" {c}"));
            }
            out.push('\n');
        }
        out
    }

    pub fn clear(&mut self) {
        self.coefficients.fill(0);
        self.store.clear();
    }
}

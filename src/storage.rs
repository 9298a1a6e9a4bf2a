//! Fixed-capacity symbol storage for one generation.

use crate::error::{Result, RlncError};

/// `symbols` slots of `symbol_size` bytes in one contiguous buffer, plus a
/// populated flag per slot.
#[derive(Debug, Clone)]
pub struct SymbolStore {
    data: Vec<u8>,
    populated: Vec<bool>,
    count: usize,
    symbol_size: usize,
}

impl SymbolStore {
    pub fn new(symbols: usize, symbol_size: usize) -> Self {
        Self {
            data: vec![0u8; symbols * symbol_size],
            populated: vec![false; symbols],
            count: 0,
            symbol_size,
        }
    }

    pub fn symbols(&self) -> usize {
        self.populated.len()
    }

    pub fn symbol_size(&self) -> usize {
        self.symbol_size
    }

    pub fn block_size(&self) -> usize {
        self.data.len()
    }

    /// Number of populated slots.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.symbols() {
            return Err(RlncError::IndexOutOfRange { index, symbols: self.symbols() });
        }
        Ok(())
    }

    pub fn is_populated(&self, index: usize) -> bool {
        self.populated.get(index).copied().unwrap_or(false)
    }

    pub fn populated(&self) -> &[bool] {
        &self.populated
    }

    /// True when exactly slots `0..count()` are populated.
    pub fn is_contiguous(&self) -> bool {
        self.populated[..self.count].iter().all(|&p| p)
    }

    /// Copies `symbol_size` bytes from `data` into slot `index`.
    pub fn store(&mut self, index: usize, data: &[u8]) -> Result<()> {
        self.check_index(index)?;
        if data.len() < self.symbol_size {
            return Err(RlncError::InvalidSymbolSize { expected: self.symbol_size, actual: data.len() });
        }
        let size = self.symbol_size;
        self.data[index * size..(index + 1) * size].copy_from_slice(&data[..size]);
        self.mark(index);
        Ok(())
    }

    pub fn mark(&mut self, index: usize) {
        if !self.populated[index] {
            self.populated[index] = true;
            self.count += 1;
        }
    }

    pub fn symbol(&self, index: usize) -> &[u8] {
        let size = self.symbol_size;
        &self.data[index * size..(index + 1) * size]
    }

    pub fn symbol_mut(&mut self, index: usize) -> &mut [u8] {
        let size = self.symbol_size;
        &mut self.data[index * size..(index + 1) * size]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Swaps in a caller-provided buffer of exactly `block_size()` bytes and
    /// returns the previous one. Populated flags are left as they are.
    pub fn replace_buffer(&mut self, buffer: Vec<u8>) -> Result<Vec<u8>> {
        if buffer.len() != self.data.len() {
            return Err(RlncError::InvalidSymbolSize { expected: self.data.len(), actual: buffer.len() });
        }
        Ok(std::mem::replace(&mut self.data, buffer))
    }

    pub fn into_buffer(self) -> Vec<u8> {
        self.data
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
        self.populated.fill(false);
        self.count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_tracks_population() {
        let mut store = SymbolStore::new(4, 2);
        store.store(2, &[7, 8]).unwrap();
        assert_eq!(store.count(), 1);
        assert!(store.is_populated(2));
        assert!(!store.is_populated(0));
        assert!(!store.is_contiguous());
        assert_eq!(store.symbol(2), &[7, 8]);
        assert_eq!(store.as_slice(), &[0, 0, 0, 0, 7, 8, 0, 0]);

        store.store(0, &[1, 2, 99]).unwrap();
        store.store(1, &[3, 4]).unwrap();
        assert!(store.is_contiguous());
    }

    #[test]
    fn test_store_rejects_bad_input() {
        let mut store = SymbolStore::new(2, 3);
        assert_eq!(
            store.store(2, &[0; 3]),
            Err(RlncError::IndexOutOfRange { index: 2, symbols: 2 })
        );
        assert_eq!(
            store.store(0, &[0; 2]),
            Err(RlncError::InvalidSymbolSize { expected: 3, actual: 2 })
        );
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_replace_buffer_checks_length() {
        let mut store = SymbolStore::new(2, 2);
        assert!(store.replace_buffer(vec![0; 3]).is_err());
        let old = store.replace_buffer(vec![9; 4]).unwrap();
        assert_eq!(old, vec![0; 4]);
        assert_eq!(store.symbol(1), &[9, 9]);
    }
}

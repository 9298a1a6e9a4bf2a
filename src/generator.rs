//! Coding vector generation.
//!
//! Randomness comes from an injectable [`CoefficientSource`] so tests can
//! script the exact coefficients an encoder or recoder emits.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::field::FiniteField;

/// Supplies raw field elements. Values above `field.max_value()` are masked.
pub trait CoefficientSource {
    fn next_element(&mut self, field: FiniteField) -> u8;
}

/// Uniform draws from a `rand` generator.
#[derive(Debug, Clone)]
pub struct RandomSource<R = StdRng> {
    rng: R,
}

impl RandomSource<StdRng> {
    pub fn from_entropy() -> Self {
        Self { rng: StdRng::from_entropy() }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl<R: Rng> RandomSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> CoefficientSource for RandomSource<R> {
    fn next_element(&mut self, field: FiniteField) -> u8 {
        self.rng.gen::<u8>() & field.max_value()
    }
}

/// Replays a fixed list of elements, wrapping around at the end.
#[derive(Debug, Clone)]
pub struct SequenceSource {
    values: Vec<u8>,
    next: usize,
}

impl SequenceSource {
    pub fn new(values: impl Into<Vec<u8>>) -> Self {
        Self { values: values.into(), next: 0 }
    }
}

impl CoefficientSource for SequenceSource {
    fn next_element(&mut self, field: FiniteField) -> u8 {
        if self.values.is_empty() {
            return 0;
        }
        let value = self.values[self.next];
        self.next = (self.next + 1) % self.values.len();
        value & field.max_value()
    }
}

/// Writes the unit vector `e_index` into `out`.
pub fn unit_vector(out: &mut [u8], index: usize) {
    out.fill(0);
    out[index] = 1;
}

/// Fills `out` with a random vector supported on the slots where `support`
/// is true.
///
/// Over fields larger than GF(2) every supported entry is non-zero (a zero
/// draw becomes 1). Over GF(2) entries are uniform bits, and an all-zero draw
/// sets the last supported entry. Returns `false` when the support is empty.
pub fn random_vector(
    source: &mut dyn CoefficientSource,
    field: FiniteField,
    support: &[bool],
    out: &mut [u8],
) -> bool {
    out.fill(0);
    let mut last = None;
    let mut any_set = false;
    for (i, (slot, &allowed)) in out.iter_mut().zip(support).enumerate() {
        if !allowed {
            continue;
        }
        let mut value = source.next_element(field);
        if value == 0 && field != FiniteField::Binary {
            value = 1;
        }
        *slot = value;
        any_set |= value != 0;
        last = Some(i);
    }
    match last {
        None => false,
        Some(i) => {
            if !any_set {
                out[i] = 1;
            }
            true
        }
    }
}

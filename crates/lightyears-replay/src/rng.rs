//! The deterministic source of randomness.
//!
//! Every random decision the simulation makes goes through a
//! [`RandomSource`]. [`DeterministicSource`] is the bare generator: a
//! ChaCha8 stream seeded once per session. The session controller wraps it
//! with recording and replaying variants of the same operations.
//!
//! Range reduction and float conversion are implemented here rather than
//! delegated to `rand`'s distributions so that the mapping from generator
//! output to values is fixed by this crate alone: a trace must replay
//! identically across dependency upgrades.

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::TraceError;

/// Operations the simulation draws randomness through.
pub trait RandomSource {
    /// A float uniformly distributed in `[0, 1)`.
    fn uniform_float(&mut self) -> Result<f64, TraceError>;

    /// An integer uniformly distributed in `[low, high]`, inclusive.
    ///
    /// Both bounds must fit in an `i32` (the width the trace stores them
    /// at) and `low <= high`; otherwise [`TraceError::OutOfRange`]. In
    /// particular `high` may not be `2^31`: the largest upper bound is
    /// `i32::MAX`.
    fn uniform_int(&mut self, low: i64, high: i64) -> Result<i64, TraceError>;

    /// `sqrt(dy² + dx²)`.
    fn distance(&mut self, dy: f64, dx: f64) -> Result<f64, TraceError>;

    /// Permute `items` in place.
    ///
    /// Issues exactly `len - 1` calls to [`uniform_int`](Self::uniform_int),
    /// the `i`-th with bounds `(0, i)` for `i` in `1..len`.
    fn shuffle<T>(&mut self, items: &mut [T]) -> Result<(), TraceError>
    where
        Self: Sized,
    {
        fisher_yates(self, items)
    }
}

/// The shuffle every [`RandomSource`] uses.
///
/// The call sequence is part of the replay contract: recorded and replayed
/// runs must draw the same bounds in the same order.
pub fn fisher_yates<S: RandomSource, T>(source: &mut S, items: &mut [T]) -> Result<(), TraceError> {
    for i in 1..items.len() {
        let j = source.uniform_int(0, i as i64)?;
        items.swap(i, j as usize);
    }
    Ok(())
}

/// Validate integer draw bounds.
pub fn check_bounds(low: i64, high: i64) -> Result<(), TraceError> {
    let representable = |v: i64| i32::try_from(v).is_ok();
    if !representable(low) || !representable(high) || low > high {
        return Err(TraceError::OutOfRange { low, high });
    }
    Ok(())
}

/// Seeded ChaCha8 generator with the bare (non-recording) operations.
#[derive(Clone, Debug)]
pub struct DeterministicSource {
    rng: ChaCha8Rng,
}

impl DeterministicSource {
    /// Generator for a recorded or freshly drawn session seed.
    pub fn from_seed(seed: u32) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(u64::from(seed)),
        }
    }

    /// Generator seeded from process entropy.
    ///
    /// Used outside recording and replay, where nothing needs to be
    /// reproduced.
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(rand::random::<u64>()),
        }
    }

    /// A fresh session seed in `[1, 2^31]`.
    pub fn fresh_seed() -> u32 {
        (rand::random::<u32>() >> 1) + 1
    }

    fn next_below(&mut self, span: u64) -> u64 {
        // Rejection zone keeps the reduction unbiased.
        let zone = u64::MAX - u64::MAX % span;
        loop {
            let v = self.rng.next_u64();
            if v < zone {
                return v % span;
            }
        }
    }
}

impl RandomSource for DeterministicSource {
    fn uniform_float(&mut self) -> Result<f64, TraceError> {
        // 53 random mantissa bits, scaled into [0, 1).
        Ok((self.rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64))
    }

    fn uniform_int(&mut self, low: i64, high: i64) -> Result<i64, TraceError> {
        check_bounds(low, high)?;
        let span = (high - low) as u64 + 1;
        Ok(low + self.next_below(span) as i64)
    }

    fn distance(&mut self, dy: f64, dx: f64) -> Result<f64, TraceError> {
        Ok(dy.hypot(dx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Counts calls and their bounds, drawing from a real generator.
    struct Spy {
        inner: DeterministicSource,
        calls: Vec<(i64, i64)>,
    }

    impl RandomSource for Spy {
        fn uniform_float(&mut self) -> Result<f64, TraceError> {
            self.inner.uniform_float()
        }

        fn uniform_int(&mut self, low: i64, high: i64) -> Result<i64, TraceError> {
            self.calls.push((low, high));
            self.inner.uniform_int(low, high)
        }

        fn distance(&mut self, dy: f64, dx: f64) -> Result<f64, TraceError> {
            self.inner.distance(dy, dx)
        }
    }

    fn run_fixed_sequence(seed: u32) -> (Vec<f64>, Vec<i64>, Vec<u32>) {
        let mut src = DeterministicSource::from_seed(seed);
        let floats = (0..16).map(|_| src.uniform_float().unwrap()).collect();
        let ints = (0..16).map(|i| src.uniform_int(-i, i * 7).unwrap()).collect();
        let mut items: Vec<u32> = (0..20).collect();
        src.shuffle(&mut items).unwrap();
        (floats, ints, items)
    }

    #[test]
    fn same_seed_same_outputs() {
        assert_eq!(run_fixed_sequence(1234), run_fixed_sequence(1234));
    }

    #[test]
    fn different_seeds_diverge() {
        assert_ne!(run_fixed_sequence(1), run_fixed_sequence(2));
    }

    #[test]
    fn shuffle_issues_len_minus_one_calls() {
        let mut spy = Spy {
            inner: DeterministicSource::from_seed(9),
            calls: Vec::new(),
        };
        let mut items = [10, 20, 30, 40, 50];
        spy.shuffle(&mut items).unwrap();
        assert_eq!(spy.calls, vec![(0, 1), (0, 2), (0, 3), (0, 4)]);

        let mut sorted = items;
        sorted.sort();
        assert_eq!(sorted, [10, 20, 30, 40, 50]);
    }

    #[test]
    fn shuffle_of_short_sequences_draws_nothing() {
        let mut spy = Spy {
            inner: DeterministicSource::from_seed(9),
            calls: Vec::new(),
        };
        spy.shuffle::<u8>(&mut []).unwrap();
        spy.shuffle(&mut [1]).unwrap();
        assert!(spy.calls.is_empty());
    }

    #[test]
    fn out_of_range_bounds_are_errors() {
        let mut src = DeterministicSource::from_seed(1);
        let too_big = (1i64 << 31) + 1;
        assert!(matches!(
            src.uniform_int(0, too_big),
            Err(TraceError::OutOfRange { .. })
        ));
        assert!(matches!(
            src.uniform_int(-too_big, 0),
            Err(TraceError::OutOfRange { .. })
        ));
        assert!(matches!(
            src.uniform_int(0, 1i64 << 31),
            Err(TraceError::OutOfRange { .. })
        ));
        assert!(matches!(
            src.uniform_int(5, 4),
            Err(TraceError::OutOfRange { .. })
        ));
    }

    #[test]
    fn extreme_i32_bounds_are_accepted() {
        let mut src = DeterministicSource::from_seed(1);
        let v = src
            .uniform_int(i64::from(i32::MIN), i64::from(i32::MAX))
            .unwrap();
        assert!(v >= i64::from(i32::MIN) && v <= i64::from(i32::MAX));
    }

    #[test]
    fn distance_is_hypot() {
        let mut src = DeterministicSource::from_seed(1);
        assert_eq!(src.distance(3.0, 4.0).unwrap(), 5.0);
    }

    #[test]
    fn fresh_seed_in_range() {
        for _ in 0..100 {
            let s = DeterministicSource::fresh_seed();
            assert!((1..=1u32 << 31).contains(&s));
        }
    }

    proptest! {
        #[test]
        fn uniform_int_within_bounds(
            seed in any::<u32>(),
            low in -1000i64..1000,
            width in 0i64..5000,
        ) {
            let mut src = DeterministicSource::from_seed(seed);
            let high = low + width;
            for _ in 0..8 {
                let v = src.uniform_int(low, high).unwrap();
                prop_assert!(low <= v && v <= high);
            }
        }

        #[test]
        fn uniform_float_in_unit_interval(seed in any::<u32>()) {
            let mut src = DeterministicSource::from_seed(seed);
            for _ in 0..32 {
                let v = src.uniform_float().unwrap();
                prop_assert!((0.0..1.0).contains(&v));
            }
        }
    }
}

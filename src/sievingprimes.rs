//! Self-generates the sieving primes `<= sqrt(stop)` that drive an outer
//! [`Erat`] session, by running a nested `Erat` over `[7, sqrt(stop)]`. That
//! nested session needs its own sieving primes (`<= sqrt(sqrt(stop))`), which
//! are cheap enough to produce with a plain unwheeled trial sieve instead of
//! recursing.

use std::sync::Arc;

use crate::config::{CpuInfo, SieveOptions};
use crate::erat::Erat;
use crate::error::SieveResult;
use crate::pmath::isqrt;
use crate::presieve::PreSieve;
use crate::wheel::BIT_VALUES;

/// A plain (non-segmented, non-wheeled) sieve of Eratosthenes, used only to
/// bootstrap the handful of primes needed to drive the nested `Erat` below.
fn tiny_sieve_primes(limit: u64) -> Vec<u64> {
    if limit < 2 {
        return Vec::new();
    }
    let limit = limit as usize;
    let mut is_composite = vec![false; limit + 1];
    let mut primes = Vec::new();
    for n in 2..=limit {
        if !is_composite[n] {
            primes.push(n as u64);
            if let Some(step) = n.checked_mul(n) {
                let mut m = step;
                while m <= limit {
                    is_composite[m] = true;
                    m += n;
                }
            }
        }
    }
    primes
}

/// Produces the primes `<= sqrt(stop)` in strictly increasing order, starting
/// at 7 (2, 3, 5 are the caller's responsibility, as with [`Erat`]).
pub struct SievingPrimes {
    nested: Erat,
    tiny: Vec<u64>,
    tiny_idx: usize,
    buffer: Vec<u64>,
    buffer_idx: usize,
}

impl SievingPrimes {
    pub fn new(
        sqrt_stop: u64,
        options: &SieveOptions,
        cpu: &dyn CpuInfo,
        presieve: Arc<PreSieve>,
    ) -> SieveResult<Self> {
        let nested = Erat::new(7, sqrt_stop, options, cpu, presieve)?;
        let tiny = tiny_sieve_primes(isqrt(sqrt_stop));
        Ok(SievingPrimes {
            nested,
            tiny,
            tiny_idx: 0,
            buffer: Vec::new(),
            buffer_idx: 0,
        })
    }

    /// Returns the next sieving prime, or `None` once `sqrt(stop)` has been
    /// exhausted.
    pub fn next(&mut self) -> Option<u64> {
        while self.buffer_idx >= self.buffer.len() {
            if !self.fill() {
                return None;
            }
        }
        let prime = self.buffer[self.buffer_idx];
        self.buffer_idx += 1;
        Some(prime)
    }

    /// Sieves one more segment of the nested `Erat`, priming it first with
    /// any tiny primes needed to cover that segment, and refills `buffer`
    /// with the primes extracted from it. Returns `false` if there was no
    /// next segment to sieve.
    fn fill(&mut self) -> bool {
        if !self.nested.has_next_segment() {
            return false;
        }

        let sqrt_high = isqrt(self.nested.segment_low() + self.nested.sieve_size() as u64 * 30);
        while self.tiny_idx < self.tiny.len() && self.tiny[self.tiny_idx] <= sqrt_high {
            let p = self.tiny[self.tiny_idx];
            if p >= 7 {
                self.nested.add_sieving_prime(p);
            }
            self.tiny_idx += 1;
        }

        let (sieve, low) = self.nested.sieve_segment();
        self.buffer.clear();
        self.buffer_idx = 0;
        for (byte_index, &byte) in sieve.iter().enumerate() {
            let mut bits = byte;
            while bits != 0 {
                let i = bits.trailing_zeros() as usize;
                let n = low + byte_index as u64 * 30 + BIT_VALUES[i];
                self.buffer.push(n);
                bits &= bits - 1;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PortableCpuInfo;

    #[test]
    fn tiny_sieve_matches_known_small_primes() {
        assert_eq!(
            tiny_sieve_primes(30),
            vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]
        );
    }

    #[test]
    fn produces_primes_in_strictly_increasing_order_from_seven() {
        let presieve = Arc::new(PreSieve::new());
        let mut sp =
            SievingPrimes::new(10_000, &SieveOptions::new(), &PortableCpuInfo, presieve).unwrap();

        let mut prev = 6u64;
        let mut count = 0;
        while let Some(p) = sp.next() {
            assert!(p > prev);
            assert_eq!(p, 7.max(p));
            prev = p;
            count += 1;
            if count > 2000 {
                break;
            }
        }
        assert!(count > 0);
        assert_eq!(prev <= 10_000, true);
    }
}

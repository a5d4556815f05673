//! A stateful forward/backward prime iterator with auto-growing windows.
//!
//! Since the underlying [`Erat`] engine only sieves forward, backward
//! iteration works by sieving a trailing window `[start - dist, start]` and
//! serving it in reverse; both directions widen their window geometrically
//! (and re-sieve) once exhausted, so repeated `next`/`previous` calls stay
//! amortized O(1) without the caller ever choosing a window size.

use std::sync::Arc;

use crate::config::{CpuInfo, PortableCpuInfo, SieveOptions};
use crate::erat::Erat;
use crate::error::SieveError;
use crate::extractor;
use crate::presieve::PreSieve;
use crate::sievingprimes::SievingPrimes;

const SMALL_PRIMES: [u64; 3] = [2, 3, 5];

/// A crude but serviceable stand-in for primesieve's empirical maximum
/// prime gap table: `(ln n)^2` comfortably bounds the largest gap below any
/// `n` in this engine's supported range, at the cost of being a wide
/// overestimate for small `n` (harmless here, it only pads a buffer).
fn max_prime_gap(n: u64) -> u64 {
    let x = (n.max(10) as f64).ln();
    (x * x).ceil() as u64 + 16
}

fn next_forward_dist(start: u64, dist: u64) -> u64 {
    let min_dist = (start as f64).sqrt() as u64;
    let max_dist = 1u64 << 60;
    (dist * 4).clamp(min_dist.max(128), max_dist)
}

fn next_backward_dist(stop: u64) -> u64 {
    let logx = (stop.max(10) as f64).ln().max(1.0) as u64;
    let min_dist = 4096 * logx;
    let max_dist = (1u64 << 30) * logx;
    let default_dist = ((stop as f64).sqrt() * 2.0) as u64;
    default_dist.clamp(min_dist, max_dist)
}

/// Sieves `[lo, hi]` (both inclusive) and returns every prime in it,
/// including 2, 3, 5 when in range.
fn primes_in_range(
    lo: u64,
    hi: u64,
    options: &SieveOptions,
    cpu: &dyn CpuInfo,
    presieve: &Arc<PreSieve>,
) -> Result<Vec<u64>, SieveError> {
    let mut out = Vec::new();
    if lo > hi {
        return Ok(out);
    }
    for &p in SMALL_PRIMES.iter() {
        if p >= lo && p <= hi {
            out.push(p);
        }
    }
    if hi < 7 {
        return Ok(out);
    }

    let start = lo.max(7);
    let sqrt_stop = crate::pmath::isqrt(hi);
    let mut erat = Erat::new(start, hi, options, cpu, Arc::clone(presieve))?;

    // below 7*7=49 no composite coprime to 30 exists, so no sieving prime is
    // ever needed; skip self-generation entirely to avoid handing Erat a
    // degenerate [7, sqrt_stop] range with sqrt_stop < 7.
    let mut sieving_primes = (sqrt_stop >= 7)
        .then(|| SievingPrimes::new(sqrt_stop, options, cpu, Arc::clone(presieve)))
        .transpose()?;

    let mut next_sp = sieving_primes.as_mut().and_then(|sp| sp.next());
    while erat.has_next_segment() {
        let sqrt_high = crate::pmath::isqrt(erat.segment_low() + erat.sieve_size() as u64 * 30);
        while let Some(p) = next_sp {
            if p > sqrt_high {
                break;
            }
            erat.add_sieving_prime(p);
            next_sp = sieving_primes.as_mut().and_then(|sp| sp.next());
        }
        let (sieve, low) = erat.sieve_segment();
        extractor::for_each_prime(sieve, low, |p| out.push(p));
    }

    Ok(out)
}

/// Forward/backward stateful prime cursor.
pub struct PrimeIterator {
    options: SieveOptions,
    presieve: Arc<PreSieve>,
    buffer: Vec<u64>,
    idx: usize,
    start: u64,
    stop_hint: u64,
    dist: u64,
    errored: bool,
}

impl PrimeIterator {
    pub fn new(start: u64, stop_hint: u64) -> Self {
        PrimeIterator {
            options: SieveOptions::new(),
            presieve: Arc::new(PreSieve::new()),
            buffer: Vec::new(),
            idx: 0,
            start,
            stop_hint,
            dist: 0,
            errored: false,
        }
    }

    /// Resets the cursor to a new starting point, discarding any buffered
    /// primes; the underlying presieve tables are kept and reused.
    pub fn jump_to(&mut self, start: u64, stop_hint: u64) {
        self.buffer.clear();
        self.idx = 0;
        self.start = start;
        self.stop_hint = stop_hint;
        self.dist = 0;
        self.errored = false;
    }

    /// Returns the next prime `>= start` (the first call), or the prime
    /// following the last one returned. Latches into an error state (all
    /// further calls return `None`) on internal failure.
    pub fn next(&mut self) -> Option<u64> {
        if self.errored {
            return None;
        }
        if self.idx >= self.buffer.len() {
            if !self.generate_next() {
                return None;
            }
        }
        let prime = self.buffer[self.idx];
        self.idx += 1;
        self.start = prime.saturating_add(1);
        Some(prime)
    }

    /// Returns the prime preceding `start` (the first call), or the prime
    /// before the last one returned. Returns `Some(0)` as the sentinel for
    /// "no smaller prime", matching the boundary documented for this engine.
    pub fn previous(&mut self) -> Option<u64> {
        if self.errored {
            return None;
        }
        if self.start == 0 {
            return Some(0);
        }
        if self.idx == 0 {
            if !self.generate_previous() {
                return None;
            }
        }
        if self.idx == 0 {
            // exhausted every window and still found nothing smaller: 0.
            return Some(0);
        }
        self.idx -= 1;
        let prime = self.buffer[self.idx];
        self.start = prime;
        Some(prime)
    }

    fn generate_next(&mut self) -> bool {
        self.dist = next_forward_dist(self.start.max(2), self.dist);
        let cpu = PortableCpuInfo;
        loop {
            let hi = if self.stop_hint != u64::MAX && self.stop_hint >= self.start {
                self.start.saturating_add(max_prime_gap(self.stop_hint)).max(self.stop_hint)
            } else {
                self.start.saturating_add(self.dist)
            };

            match primes_in_range(self.start, hi, &self.options, &cpu, &self.presieve) {
                Ok(primes) => {
                    if primes.is_empty() {
                        if hi >= crate::config::MAX_STOP {
                            return false;
                        }
                        self.dist = next_forward_dist(self.start, self.dist);
                        self.start = hi.saturating_add(1);
                        continue;
                    }
                    self.buffer = primes;
                    self.idx = 0;
                    return true;
                }
                Err(e) => {
                    self.errored = true;
                    log::error!("prime iterator forward generation failed: {e}");
                    return false;
                }
            }
        }
    }

    fn generate_previous(&mut self) -> bool {
        let cpu = PortableCpuInfo;
        let mut dist = next_backward_dist(self.start.max(10));
        loop {
            let mut lo = self.start.saturating_sub(dist);
            if self.stop_hint <= self.start && self.stop_hint != u64::MAX {
                lo = self.stop_hint.saturating_sub(max_prime_gap(self.stop_hint));
            }
            let hi = self.start.saturating_sub(1);

            match primes_in_range(lo, hi, &self.options, &cpu, &self.presieve) {
                Ok(primes) => {
                    self.dist = dist;
                    self.buffer = primes;
                    self.idx = self.buffer.len();
                    if self.idx > 0 {
                        return true;
                    }
                    if lo == 0 {
                        return true; // exhausted: previous() will emit the 0 sentinel.
                    }
                    dist *= 2;
                }
                Err(e) => {
                    self.errored = true;
                    log::error!("prime iterator backward generation failed: {e}");
                    return false;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_iteration_from_zero_matches_known_primes() {
        let mut it = PrimeIterator::new(0, u64::MAX);
        let collected: Vec<u64> = (0..10).filter_map(|_| it.next()).collect();
        assert_eq!(collected, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
    }

    #[test]
    fn backward_iteration_from_thirty_matches_known_primes() {
        let mut it = PrimeIterator::new(30, u64::MAX);
        let collected: Vec<u64> = (0..11).filter_map(|_| it.previous()).collect();
        assert_eq!(
            collected,
            vec![29, 23, 19, 17, 13, 11, 7, 5, 3, 2, 0]
        );
    }

    #[test]
    fn round_trip_next_then_previous_reverses() {
        let mut it = PrimeIterator::new(0, u64::MAX);
        let forward: Vec<u64> = (0..20).filter_map(|_| it.next()).collect();
        let mut back = PrimeIterator::new(*forward.last().unwrap() + 1, u64::MAX);
        let backward: Vec<u64> = (0..20).filter_map(|_| back.previous()).collect();
        let mut expected = forward.clone();
        expected.reverse();
        assert_eq!(backward, expected);
    }
}

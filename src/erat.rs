//! Orchestrates one segmented sieving session: builds the sieve array and the
//! three crossers from `stop`'s tuning constants, then steps segment by
//! segment, pre-sieving, crossing off, and trimming the session's boundaries.

use std::sync::Arc;

use crate::bucket::MemoryPool;
use crate::config::{CpuInfo, SieveOptions, MAX_PRESIEVE_PRIME};
use crate::erat_big::EratBig;
use crate::erat_medium::EratMedium;
use crate::erat_small::EratSmall;
use crate::error::SieveResult;
use crate::pmath::{byte_remainder, isqrt, round_up_to_multiple};
use crate::presieve::PreSieve;
use crate::tuning::{self, Tuning};
use crate::wheel::{first_multiple, first_multiple_210};

/// Bits of the first byte of a segment to clear for integers `< start`,
/// indexed by `byte_remainder(start)`.
const UNSET_SMALLER: [u8; 37] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe, 0xfe, 0xfe, 0xfe, 0xfc, 0xfc, 0xf8, 0xf8,
    0xf8, 0xf8, 0xf0, 0xf0, 0xe0, 0xe0, 0xe0, 0xe0, 0xc0, 0xc0, 0xc0, 0xc0, 0xc0, 0xc0, 0x80, 0x80,
    0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Bits of the last byte of the session to clear for integers `> stop`,
/// indexed by `byte_remainder(stop)`.
const UNSET_LARGER: [u8; 37] = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x01, 0x01, 0x01, 0x03, 0x03, 0x07, 0x07, 0x07,
    0x07, 0x0f, 0x0f, 0x1f, 0x1f, 0x1f, 0x1f, 0x3f, 0x3f, 0x3f, 0x3f, 0x3f, 0x3f, 0x7f, 0x7f, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff,
];

/// Orchestrates one segmented scan of `[start, stop]`.
pub struct Erat {
    start: u64,
    stop: u64,
    segment_low: u64,
    segment_high: u64,
    max_erat_small: u64,
    max_erat_medium: u64,
    presieve: Arc<PreSieve>,
    erat_small: Option<EratSmall>,
    erat_medium: Option<EratMedium>,
    erat_big: Option<EratBig>,
    pool: MemoryPool,
    sieve: Vec<u8>,
}

impl Erat {
    /// Builds a fresh sieving session covering `[start, stop]`, sharing an
    /// already-built `presieve` (cheap to clone via `Arc`).
    pub fn new(
        start: u64,
        stop: u64,
        options: &SieveOptions,
        cpu: &dyn CpuInfo,
        presieve: Arc<PreSieve>,
    ) -> SieveResult<Self> {
        debug_assert!(start <= stop);
        let sqrt_stop = isqrt(stop);
        let Tuning {
            mut sieve_size_bytes,
            max_erat_small,
            max_erat_medium,
            needs_erat_medium,
            needs_erat_big,
        } = tuning::tune(stop, options, cpu);

        let rem = byte_remainder(start.max(7));
        let dist = sieve_size_bytes as u64 * 30 + 6;
        let mut segment_low = start.max(7) - rem;
        let mut segment_high = segment_low.saturating_add(dist).min(stop);

        // If this sieves just a single segment and EratBig is unused, shrink
        // the sieve array to fit exactly, avoiding over-allocation.
        if segment_high >= stop && !needs_erat_big {
            let stop_rem = byte_remainder(stop.max(7));
            let dist = (stop.max(7) - stop_rem).saturating_sub(segment_low);
            sieve_size_bytes = round_up_to_multiple((dist / 30 + 1) as usize, 8);
            segment_high = stop;
        }

        let erat_small = (sqrt_stop > MAX_PRESIEVE_PRIME).then(|| EratSmall::new(max_erat_small));
        let erat_medium = needs_erat_medium.then(|| EratMedium::new(max_erat_medium));
        let erat_big = needs_erat_big
            .then(|| EratBig::new(sieve_size_bytes, sqrt_stop))
            .transpose()?;

        log::debug!(
            "session [{start}, {stop}]: sieve_size={sieve_size_bytes}B, erat_medium max_prime={:?}, erat_big max_prime={:?}",
            erat_medium.as_ref().map(EratMedium::max_prime),
            erat_big.as_ref().map(EratBig::max_prime),
        );

        Ok(Erat {
            start: start.max(7),
            stop,
            segment_low,
            segment_high,
            max_erat_small,
            max_erat_medium,
            presieve,
            erat_small,
            erat_medium,
            erat_big,
            pool: MemoryPool::new(),
            sieve: vec![0u8; sieve_size_bytes],
        })
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn stop(&self) -> u64 {
        self.stop
    }

    pub fn segment_low(&self) -> u64 {
        self.segment_low
    }

    pub fn sieve_size(&self) -> usize {
        self.sieve.len()
    }

    pub fn has_next_segment(&self) -> bool {
        self.segment_low < self.stop
    }

    /// Registers a sieving prime `p <= sqrt(stop)`, routing it to
    /// EratSmall/Medium/Big by size, as specified by `Erat::addSievingPrime`.
    /// Primes at or below [`MAX_PRESIEVE_PRIME`] are never registered: their
    /// multiples are already cleared by the pre-sieve buffers, and the
    /// pre-sieve never clears the prime's own bit (see `presieve::build_buffer`),
    /// so crossing them off again here would be redundant.
    pub fn add_sieving_prime(&mut self, prime: u64) {
        if prime <= MAX_PRESIEVE_PRIME {
            return;
        }
        if prime > self.max_erat_medium {
            let (mi, wi) = first_multiple_210(prime, self.segment_low);
            self.erat_big
                .as_mut()
                .expect("EratBig must be initialized for primes this large")
                .add_sieving_prime(prime, mi, wi, &mut self.pool);
        } else if prime > self.max_erat_small {
            let (mi, wi) = first_multiple(prime, self.segment_low);
            self.erat_medium
                .as_mut()
                .expect("EratMedium must be initialized for primes this large")
                .add_sieving_prime(prime, mi, wi, &mut self.pool);
        } else {
            let (mi, wi) = first_multiple(prime, self.segment_low);
            self.erat_small
                .as_mut()
                .expect("EratSmall must be initialized for primes this large")
                .add_sieving_prime(prime, mi, wi);
        }
    }

    fn cross_off(&mut self) {
        if let Some(small) = self.erat_small.as_mut() {
            if !small.is_empty() {
                small.cross_off(&mut self.sieve);
            }
        }
        if let Some(medium) = self.erat_medium.as_mut() {
            if !medium.is_empty() {
                medium.cross_off(&mut self.sieve, &mut self.pool);
            }
        }
        if let Some(big) = self.erat_big.as_mut() {
            if !big.is_empty() {
                big.cross_off(&mut self.sieve, &mut self.pool);
            }
        }
    }

    fn pre_sieve(&mut self) {
        self.presieve.apply(&mut self.sieve, self.segment_low);
        if self.segment_low <= self.start {
            let rem = byte_remainder(self.start);
            self.sieve[0] &= UNSET_SMALLER[rem as usize];
        }
    }

    /// Sieves the current segment in place and advances to the next one.
    /// Returns the finished segment's sieve bytes and the integer its first
    /// byte starts at, for the caller to extract primes from.
    pub fn sieve_segment(&mut self) -> (&[u8], u64) {
        let low = self.segment_low;

        if self.segment_high < self.stop {
            self.pre_sieve();
            self.cross_off();

            let dist = self.sieve.len() as u64 * 30;
            self.segment_low = self.segment_low.saturating_add(dist);
            self.segment_high = self.segment_high.saturating_add(dist).min(self.stop);
        } else {
            let rem = byte_remainder(self.stop.max(7));
            let dist = (self.stop.max(7) - rem).saturating_sub(self.segment_low);
            self.sieve.resize((dist / 30 + 1) as usize, 0);

            self.pre_sieve();
            self.cross_off();

            if let Some(last) = self.sieve.last_mut() {
                *last &= UNSET_LARGER[rem as usize];
            }
            let rounded = round_up_to_multiple(self.sieve.len(), 8);
            self.sieve.resize(rounded, 0);

            self.segment_low = self.stop;
        }

        (&self.sieve, low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PortableCpuInfo;

    fn count_bits(sieve: &[u8]) -> u32 {
        sieve.iter().map(|b| b.count_ones()).sum()
    }

    #[test]
    fn single_segment_matches_known_prime_count_below_100() {
        let presieve = Arc::new(PreSieve::new());
        let mut erat =
            Erat::new(2, 100, &SieveOptions::new(), &PortableCpuInfo, presieve).unwrap();

        // Self-generation is tested in sievingprimes.rs; here we bootstrap by
        // hand since sqrt(100) = 10 needs only the prime 7.
        erat.add_sieving_prime(7);

        let mut total = 0u32;
        while erat.has_next_segment() {
            let (sieve, _low) = erat.sieve_segment();
            total += count_bits(sieve);
        }
        // primes in [7, 100] coprime to 30: 25 primes below 100 minus {2,3,5}
        // = 22, all >= 7.
        assert_eq!(total, 22);
    }
}

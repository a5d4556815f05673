//! A segmented, wheel-factorized sieve of Eratosthenes for counting,
//! listing, and iterating over primes (and prime k-tuplets) across 64-bit
//! intervals.
//!
//! The engine is organized the way the classic `primesieve` project is:
//! a byte-per-30-integers bit sieve (see [`wheel`]), three tiers of sieving
//! prime "crossers" sized to fit different cache levels ([`erat_small`],
//! [`erat_medium`], [`erat_big`]), a pre-sieve that clears small-prime
//! multiples before a segment is even touched ([`presieve`]), and an
//! orchestrator ([`erat`]) that steps a session segment by segment. Self-
//! generation of the sieving primes needed to drive that orchestration lives
//! in [`sievingprimes`]; turning a finished segment into primes or counts
//! lives in [`extractor`].
//!
//! [`engine`] exposes the resulting single-threaded API, [`partitioner`]
//! parallelizes it across a rayon pool for wide ranges, and [`iterator`]
//! wraps it in a stateful forward/backward cursor for point queries like
//! "nth prime after N".

pub mod bucket;
pub mod config;
pub mod engine;
pub mod erat;
pub mod erat_big;
pub mod erat_medium;
pub mod erat_small;
pub mod error;
pub mod extractor;
pub mod iterator;
pub mod partitioner;
pub mod pmath;
pub mod presieve;
pub mod sievingprimes;
pub mod tuning;
pub mod wheel;

pub use config::{CpuInfo, PortableCpuInfo, SieveOptions, MAX_STOP};
pub use engine::{CountFlags, Counts};
pub use error::{SieveError, SieveResult};
pub use iterator::PrimeIterator;

/// Counts primes and/or k-tuplets in `[start, stop]` using default tuning
/// and a portable `CpuInfo`. See [`engine::sieve`] for the fully-parametrized
/// version, and [`sieve_parallel`] to spread the work across several threads.
pub fn sieve(start: u64, stop: u64, flags: CountFlags) -> SieveResult<Counts> {
    engine::sieve(start, stop, flags, &SieveOptions::new(), &PortableCpuInfo)
}

/// Appends every prime in `[start, stop]` to `out`, in increasing order,
/// using default tuning.
pub fn fill_primes(start: u64, stop: u64, out: &mut Vec<u64>) -> SieveResult<()> {
    engine::fill_primes(start, stop, out, &SieveOptions::new(), &PortableCpuInfo)
}

/// Calls `f` with every prime in `[start, stop]`, in increasing order,
/// without materializing the full list, using default tuning.
pub fn callback_primes(start: u64, stop: u64, f: impl FnMut(u64)) -> SieveResult<()> {
    engine::callback_primes(start, stop, &SieveOptions::new(), &PortableCpuInfo, f)
}

/// Counts primes and/or k-tuplets in `[start, stop]`, splitting the range
/// across rayon workers when it is wide enough to be worth it. Uses default
/// tuning except for `options.num_threads()`, which governs the split.
pub fn sieve_parallel(start: u64, stop: u64, flags: CountFlags) -> SieveResult<Counts> {
    partitioner::sieve_parallel(start, stop, flags, &SieveOptions::new(), &PortableCpuInfo)
}

/// Builds a stateful forward/backward cursor starting at `start`. Pass
/// `u64::MAX` as `stop_hint` when the caller has no expected upper bound;
/// supplying a tighter hint lets the iterator size its internal windows more
/// efficiently.
pub fn iterator(start: u64, stop_hint: u64) -> PrimeIterator {
    PrimeIterator::new(start, stop_hint)
}

/// The engine API bundled with a fixed `SieveOptions`/`CpuInfo` pair, for
/// callers who want to pick tuning once and reuse it across calls instead of
/// threading `options`/`cpu` through every free function.
pub struct PrimeSieveEngine<C: CpuInfo = PortableCpuInfo> {
    options: SieveOptions,
    cpu: C,
}

impl PrimeSieveEngine<PortableCpuInfo> {
    pub fn new(options: SieveOptions) -> Self {
        PrimeSieveEngine {
            options,
            cpu: PortableCpuInfo,
        }
    }
}

impl<C: CpuInfo> PrimeSieveEngine<C> {
    pub fn with_cpu(options: SieveOptions, cpu: C) -> Self {
        PrimeSieveEngine { options, cpu }
    }

    pub fn sieve(&self, start: u64, stop: u64, flags: CountFlags) -> SieveResult<Counts> {
        engine::sieve(start, stop, flags, &self.options, &self.cpu)
    }

    pub fn fill_primes(&self, start: u64, stop: u64, out: &mut Vec<u64>) -> SieveResult<()> {
        engine::fill_primes(start, stop, out, &self.options, &self.cpu)
    }

    pub fn callback_primes(&self, start: u64, stop: u64, f: impl FnMut(u64)) -> SieveResult<()> {
        engine::callback_primes(start, stop, &self.options, &self.cpu, f)
    }

    pub fn iterator(&self, start: u64, stop_hint: u64) -> PrimeIterator {
        PrimeIterator::new(start, stop_hint)
    }
}

impl<C: CpuInfo + Sync> PrimeSieveEngine<C> {
    pub fn sieve_parallel(&self, start: u64, stop: u64, flags: CountFlags) -> SieveResult<Counts> {
        partitioner::sieve_parallel(start, stop, flags, &self.options, &self.cpu)
    }
}

fn count_of(start: u64, stop: u64, flags: CountFlags, index: usize) -> SieveResult<u64> {
    sieve(start, stop, flags).map(|counts| counts[index])
}

/// Counts primes in `[start, stop]`.
pub fn count_primes(start: u64, stop: u64) -> SieveResult<u64> {
    count_of(start, stop, CountFlags::primes_only(), 0)
}

/// Counts twin prime pairs in `[start, stop]`.
pub fn count_twins(start: u64, stop: u64) -> SieveResult<u64> {
    count_of(
        start,
        stop,
        CountFlags {
            twins: true,
            ..Default::default()
        },
        1,
    )
}

/// Counts prime triplets in `[start, stop]`.
pub fn count_triplets(start: u64, stop: u64) -> SieveResult<u64> {
    count_of(
        start,
        stop,
        CountFlags {
            triplets: true,
            ..Default::default()
        },
        2,
    )
}

/// Counts prime quadruplets in `[start, stop]`.
pub fn count_quadruplets(start: u64, stop: u64) -> SieveResult<u64> {
    count_of(
        start,
        stop,
        CountFlags {
            quadruplets: true,
            ..Default::default()
        },
        3,
    )
}

/// Counts prime quintuplets in `[start, stop]`.
pub fn count_quintuplets(start: u64, stop: u64) -> SieveResult<u64> {
    count_of(
        start,
        stop,
        CountFlags {
            quintuplets: true,
            ..Default::default()
        },
        4,
    )
}

/// Counts prime sextuplets in `[start, stop]`.
pub fn count_sextuplets(start: u64, stop: u64) -> SieveResult<u64> {
    count_of(
        start,
        stop,
        CountFlags {
            sextuplets: true,
            ..Default::default()
        },
        5,
    )
}

/// Prints every prime in `[start, stop]` to stdout, one per line, in
/// increasing order. Mirrors the CLI's `-p` flag.
pub fn print_primes(start: u64, stop: u64) -> SieveResult<()> {
    callback_primes(start, stop, |p| println!("{p}"))
}

/// Returns the `n`th prime `>= start` (1-indexed: `nth_prime(1, 0) == 2`),
/// by stepping a [`PrimeIterator`] forward `n` times.
pub fn nth_prime(n: u64, start: u64) -> SieveResult<u64> {
    if n == 0 {
        return Err(SieveError::out_of_range(0, "nth_prime is 1-indexed, n must be >= 1"));
    }
    let mut it = iterator(start, u64::MAX);
    let mut last = 0;
    for _ in 0..n {
        last = it.next().ok_or_else(|| {
            SieveError::out_of_range(start, "ran out of representable primes before reaching n")
        })?;
    }
    Ok(last)
}

/// Like [`nth_prime`], but locates the answer by parallel counting over
/// geometrically widening windows (cheap to parallelize) before doing a
/// final precise scan of the last, narrow window. Faster than [`nth_prime`]
/// for large `n` when multiple threads are available; gives the identical
/// answer.
pub fn parallel_nth_prime(n: u64, start: u64) -> SieveResult<u64> {
    if n == 0 {
        return Err(SieveError::out_of_range(0, "nth_prime is 1-indexed, n must be >= 1"));
    }

    let flags = CountFlags::primes_only();
    let mut lo = start;
    let mut dist = 1_000_000u64.max(n);
    let mut counted = 0u64;

    loop {
        let hi = lo.saturating_add(dist).min(MAX_STOP);
        let counts = sieve_parallel(lo, hi, flags)?;
        if counted + counts[0] >= n {
            let remaining = n - counted;
            let mut out = Vec::new();
            fill_primes(lo, hi, &mut out)?;
            return out
                .get((remaining - 1) as usize)
                .copied()
                .ok_or_else(|| SieveError::out_of_range(hi, "window undercounted its own primes"));
        }
        if hi >= MAX_STOP {
            return Err(SieveError::out_of_range(
                MAX_STOP,
                "ran out of representable primes before reaching n",
            ));
        }
        counted += counts[0];
        lo = hi.saturating_add(1);
        dist = dist.saturating_mul(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sieve_counts_primes_below_1000() {
        let counts = sieve(0, 1000, CountFlags::primes_only()).unwrap();
        assert_eq!(counts[0], 168);
    }

    #[test]
    fn fill_primes_round_trips_through_the_top_level_api() {
        let mut out = Vec::new();
        fill_primes(0, 50, &mut out).unwrap();
        assert_eq!(
            out,
            vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47]
        );
    }

    #[test]
    fn sieve_parallel_matches_serial_sieve() {
        let flags = CountFlags::primes_only();
        let serial = sieve(0, 500_000, flags).unwrap();
        let parallel = sieve_parallel(0, 500_000, flags).unwrap();
        assert_eq!(serial[0], parallel[0]);
    }

    #[test]
    fn iterator_forward_from_zero_starts_at_two() {
        let mut it = iterator(0, u64::MAX);
        assert_eq!(it.next(), Some(2));
        assert_eq!(it.next(), Some(3));
    }

    #[test]
    fn sieve_rejects_stop_past_max_stop() {
        assert!(sieve(0, MAX_STOP + 1, CountFlags::primes_only()).is_err());
    }

    #[test]
    fn count_primes_matches_known_value_below_1000() {
        assert_eq!(count_primes(0, 1000).unwrap(), 168);
    }

    #[test]
    fn nth_prime_matches_known_small_values() {
        assert_eq!(nth_prime(1, 0).unwrap(), 2);
        assert_eq!(nth_prime(2, 0).unwrap(), 3);
        assert_eq!(nth_prime(10, 0).unwrap(), 29);
    }

    #[test]
    fn nth_prime_rejects_zero() {
        assert!(nth_prime(0, 0).is_err());
    }

    #[test]
    fn parallel_nth_prime_matches_serial_nth_prime() {
        assert_eq!(parallel_nth_prime(1000, 0).unwrap(), nth_prime(1000, 0).unwrap());
    }

    #[test]
    fn engine_struct_matches_free_function_counts() {
        let engine = PrimeSieveEngine::new(SieveOptions::new());
        let counts = engine.sieve(0, 1000, CountFlags::primes_only()).unwrap();
        assert_eq!(counts[0], count_primes(0, 1000).unwrap());
    }
}

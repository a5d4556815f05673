//! The public, single-threaded sieving API: counting, buffering and
//! callback-driven prime generation over `[start, stop]`.
//!
//! Each entry point bootstraps its own [`Erat`] session and self-generated
//! [`SievingPrimes`], since a session is cheap relative to the sieving work
//! itself and this keeps the API stateless between calls (unlike
//! [`crate::iterator::PrimeIterator`], which keeps a session alive across
//! calls to amortize that cost for small, repeated windows).

use std::sync::Arc;

use crate::config::{CpuInfo, SieveOptions};
use crate::erat::Erat;
use crate::error::{SieveError, SieveResult};
use crate::extractor;
use crate::presieve::PreSieve;
use crate::sievingprimes::SievingPrimes;

const SMALL_PRIMES: [u64; 3] = [2, 3, 5];

/// Counts of primes and k-tuplets returned by [`sieve`]; `counts[0]` is the
/// prime count, `counts[k - 1]` for `k` in `2..=6` is the count of k-tuplets.
pub type Counts = [u64; 6];

/// Which counts a [`sieve`] call should accumulate. Mirrors the engine's bit
/// flags: `COUNT_PRIMES` plus one flag per k-tuplet kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountFlags {
    pub primes: bool,
    pub twins: bool,
    pub triplets: bool,
    pub quadruplets: bool,
    pub quintuplets: bool,
    pub sextuplets: bool,
}

impl CountFlags {
    pub fn primes_only() -> Self {
        CountFlags {
            primes: true,
            ..Default::default()
        }
    }

    pub fn all() -> Self {
        CountFlags {
            primes: true,
            twins: true,
            triplets: true,
            quadruplets: true,
            quintuplets: true,
            sextuplets: true,
        }
    }
}

fn validate_range(start: u64, stop: u64) -> SieveResult<()> {
    if stop > crate::config::MAX_STOP {
        return Err(SieveError::out_of_range(
            stop,
            format!("exceeds the maximum supported stop value {}", crate::config::MAX_STOP),
        ));
    }
    if start > stop {
        return Err(SieveError::out_of_range(
            start,
            format!("start must not exceed stop ({stop})"),
        ));
    }
    Ok(())
}

/// Drives one full segmented session over `[start, stop]`, calling
/// `on_segment(sieve, low)` once per finished segment. Handles self-generating
/// the sieving primes `<= sqrt(stop)` internally.
fn drive(
    start: u64,
    stop: u64,
    options: &SieveOptions,
    cpu: &dyn CpuInfo,
    presieve: Arc<PreSieve>,
    mut on_segment: impl FnMut(&[u8], u64),
) -> SieveResult<()> {
    if start > stop || stop < 7 {
        return Ok(());
    }
    let start = start.max(7);
    let sqrt_stop = crate::pmath::isqrt(stop);
    let mut erat = Erat::new(start, stop, options, cpu, Arc::clone(&presieve))?;

    let mut sieving_primes = (sqrt_stop >= 7)
        .then(|| SievingPrimes::new(sqrt_stop, options, cpu, presieve))
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
        on_segment(sieve, low);
    }
    Ok(())
}

/// Counts primes and/or k-tuplets in `[start, stop]`, per `flags`. Entries of
/// the returned array for kinds not requested in `flags` are left at zero.
pub fn sieve(
    start: u64,
    stop: u64,
    flags: CountFlags,
    options: &SieveOptions,
    cpu: &dyn CpuInfo,
) -> SieveResult<Counts> {
    validate_range(start, stop)?;
    let mut counts: Counts = [0; 6];

    if flags.primes {
        counts[0] += SMALL_PRIMES.iter().filter(|&&p| p >= start && p <= stop).count() as u64;
    }

    let presieve = Arc::new(PreSieve::new());
    drive(start, stop, options, cpu, presieve, |seg, low| {
        if flags.primes {
            counts[0] += extractor::count_primes(seg);
        }
        for (k, want) in [
            (2u32, flags.twins),
            (3, flags.triplets),
            (4, flags.quadruplets),
            (5, flags.quintuplets),
            (6, flags.sextuplets),
        ] {
            if want {
                counts[(k - 1) as usize] += extractor::count_ktuplets(seg, k);
            }
        }
        let _ = low;
    })?;

    Ok(counts)
}

/// Appends every prime in `[start, stop]` to `out`, in increasing order.
pub fn fill_primes(
    start: u64,
    stop: u64,
    out: &mut Vec<u64>,
    options: &SieveOptions,
    cpu: &dyn CpuInfo,
) -> SieveResult<()> {
    validate_range(start, stop)?;
    out.extend(SMALL_PRIMES.iter().filter(|&&p| p >= start && p <= stop));

    let presieve = Arc::new(PreSieve::new());
    drive(start, stop, options, cpu, presieve, |seg, low| {
        extractor::for_each_prime(seg, low, |p| out.push(p));
    })
}

/// Calls `f` with every prime in `[start, stop]`, in increasing order,
/// without materializing the full list.
pub fn callback_primes(
    start: u64,
    stop: u64,
    options: &SieveOptions,
    cpu: &dyn CpuInfo,
    mut f: impl FnMut(u64),
) -> SieveResult<()> {
    validate_range(start, stop)?;
    for &p in SMALL_PRIMES.iter() {
        if p >= start && p <= stop {
            f(p);
        }
    }

    let presieve = Arc::new(PreSieve::new());
    drive(start, stop, options, cpu, presieve, |seg, low| {
        extractor::for_each_prime(seg, low, &mut f);
    })
}

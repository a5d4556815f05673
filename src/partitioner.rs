//! Splits a wide `[start, stop]` range into chunks and sieves them
//! concurrently with `rayon`, summing each chunk's counts.
//!
//! Chunk boundaries are rounded up to the next `30*k + 1` so that no
//! byte-local k-tuplet is ever split across two chunks (a tuplet never spans
//! more than 30 consecutive integers, so aligning on a block boundary is
//! sufficient). Chunks narrower than [`MIN_THREAD_DISTANCE`] aren't worth the
//! thread overhead, so the range is never split finer than that.

use rayon::prelude::*;

use crate::config::{CpuInfo, SieveOptions, MIN_THREAD_DISTANCE};
use crate::engine::{self, CountFlags, Counts};
use crate::error::SieveResult;

/// Rounds `n` up to the next integer of the form `30*k + 1`, the start of a
/// fresh wheel block; chunk boundaries snap to this so k-tuplets never
/// straddle a chunk seam.
fn align_chunk_boundary(n: u64) -> u64 {
    let rem = n % 30;
    if rem <= 1 {
        n - rem + 1
    } else {
        n + (31 - rem)
    }
}

fn chunk_bounds(start: u64, stop: u64, num_threads: usize) -> Vec<(u64, u64)> {
    let span = stop.saturating_sub(start);
    let max_chunks = ((span / MIN_THREAD_DISTANCE).max(1) as usize).min(num_threads.max(1));

    if max_chunks <= 1 || span == 0 {
        return vec![(start, stop)];
    }

    let chunk_len = span / max_chunks as u64;
    let mut bounds = Vec::with_capacity(max_chunks);
    let mut lo = start;
    for i in 0..max_chunks {
        if i + 1 == max_chunks {
            bounds.push((lo, stop));
            break;
        }
        let raw_hi = lo.saturating_add(chunk_len);
        let hi = align_chunk_boundary(raw_hi).min(stop).max(lo);
        bounds.push((lo, hi));
        lo = hi.saturating_add(1).min(stop);
    }
    bounds
}

/// Counts primes and/or k-tuplets in `[start, stop]`, splitting the work
/// across `options.num_threads()` rayon workers when the range is wide
/// enough to be worth it.
pub fn sieve_parallel(
    start: u64,
    stop: u64,
    flags: CountFlags,
    options: &SieveOptions,
    cpu: &(dyn CpuInfo + Sync),
) -> SieveResult<Counts> {
    let bounds = chunk_bounds(start, stop, options.num_threads());
    if bounds.len() <= 1 {
        return engine::sieve(start, stop, flags, options, cpu);
    }

    let partials: Vec<SieveResult<Counts>> = bounds
        .into_par_iter()
        .map(|(lo, hi)| engine::sieve(lo, hi, flags, options, cpu))
        .collect();

    let mut total: Counts = [0; 6];
    for partial in partials {
        let counts = partial?;
        for i in 0..6 {
            total[i] += counts[i];
        }
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PortableCpuInfo;

    #[test]
    fn align_chunk_boundary_lands_on_wheel_block_starts() {
        for n in 0..100 {
            let aligned = align_chunk_boundary(n);
            assert_eq!(aligned % 30, 1);
            assert!(aligned >= n);
        }
    }

    #[test]
    fn single_chunk_when_range_is_narrow() {
        let bounds = chunk_bounds(0, 1_000, 8);
        assert_eq!(bounds, vec![(0, 1_000)]);
    }

    #[test]
    fn splits_into_multiple_chunks_for_a_wide_range() {
        let bounds = chunk_bounds(0, 100_000_000, 4);
        assert_eq!(bounds.len(), 4);
        assert_eq!(bounds[0].0, 0);
        assert_eq!(bounds.last().unwrap().1, 100_000_000);
        for w in bounds.windows(2) {
            assert_eq!(w[1].0, w[0].1 + 1);
        }
    }

    #[test]
    fn parallel_count_matches_serial_count() {
        let options = SieveOptions::new().with_num_threads(4).unwrap();
        let flags = CountFlags::primes_only();
        let serial = engine::sieve(0, 1_000_000, flags, &options, &PortableCpuInfo).unwrap();
        let parallel = sieve_parallel(0, 1_000_000, flags, &options, &PortableCpuInfo).unwrap();
        assert_eq!(serial[0], parallel[0]);
    }
}

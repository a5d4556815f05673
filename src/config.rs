//! Engine-wide tuning knobs and constants.
//!
//! The original engine keeps its sieve size and thread count as process-wide
//! defaults; this port carries them instead as fields on [`SieveOptions`],
//! validated eagerly so a misconfigured engine fails at construction time
//! rather than deep inside a segment loop.

use crate::error::{SieveError, SieveResult};

/// Minimum sieve size, in KiB, the engine will accept.
pub const MIN_SIEVE_SIZE_KIB: u32 = 16;
/// Maximum sieve size, in KiB, the engine will accept.
pub const MAX_SIEVE_SIZE_KIB: u32 = 8192;

/// `2^64 - 2^32 * 10`, the largest `stop` value the engine supports.
pub const MAX_STOP: u64 = u64::MAX - (1u64 << 32) * 10 + 1;

/// Fallback L1 data cache size used when [`CpuInfo`] cannot detect one.
pub const L1D_CACHE_BYTES_FALLBACK: usize = 32 * 1024;
/// Fallback L2 cache size used for the same reason.
pub const L2_CACHE_BYTES_FALLBACK: usize = 256 * 1024;

/// Upper bound, in bytes, on a single `MemoryPool` bulk refill.
pub const MAX_ALLOC_BYTES: usize = 16 << 20;
/// Minimum number of buckets a pool stocks on its first refill.
pub const INITIAL_BUCKET_STOCK: usize = 128;
/// Number of `SievingPrime` records per bucket (must be a power of two).
pub const BUCKET_SIZE: usize = 1024;

pub const FACTOR_SIEVESIZE: f64 = 2.0;
pub const FACTOR_ERATSMALL: f64 = 0.2;
pub const FACTOR_ERATMEDIUM: f64 = 3.0;

/// Largest prime cleared by the pre-sieve buffers; primes at or below this
/// never reach EratSmall/Medium/Big.
pub const MAX_PRESIEVE_PRIME: u64 = 163;

/// Minimum width, in integers, of a single parallel worker's slice.
pub const MIN_THREAD_DISTANCE: u64 = 10_000_000;

/// A source of CPU cache sizes, used only to pick good tuning defaults.
///
/// Out of core scope per the purpose statement: detection is pluggable and
/// a portable fallback is always available, so the engine never depends on
/// successfully querying real hardware.
pub trait CpuInfo {
    /// L1 data cache size in bytes, if known.
    fn l1_data_cache_bytes(&self) -> Option<usize>;
    /// L2 cache size in bytes, if known.
    fn l2_cache_bytes(&self) -> Option<usize>;
}

/// A `CpuInfo` that never detects anything, forcing the portable fallback
/// sizes. Used by default; a caller embedding this crate in an environment
/// with real topology detection can supply their own `CpuInfo` impl.
#[derive(Debug, Default, Clone, Copy)]
pub struct PortableCpuInfo;

impl CpuInfo for PortableCpuInfo {
    fn l1_data_cache_bytes(&self) -> Option<usize> {
        None
    }

    fn l2_cache_bytes(&self) -> Option<usize> {
        None
    }
}

/// Tuning knobs accepted by the engine API. `Default` leaves both knobs
/// unset, meaning "auto-tune from `stop` and detected cache sizes".
#[derive(Debug, Clone, Copy, Default)]
pub struct SieveOptions {
    sieve_size_kib: Option<u32>,
    num_threads: Option<usize>,
}

impl SieveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sieve size in KiB. Must lie in `[16, 8192]`.
    pub fn with_sieve_size_kib(mut self, kib: u32) -> SieveResult<Self> {
        if !(MIN_SIEVE_SIZE_KIB..=MAX_SIEVE_SIZE_KIB).contains(&kib) {
            return Err(SieveError::invalid_config(format!(
                "sieve_size_kib must be between {MIN_SIEVE_SIZE_KIB} and {MAX_SIEVE_SIZE_KIB}, got {kib}"
            )));
        }
        self.sieve_size_kib = Some(kib);
        Ok(self)
    }

    /// Sets the number of worker threads. Must be at least 1.
    pub fn with_num_threads(mut self, num_threads: usize) -> SieveResult<Self> {
        if num_threads == 0 {
            return Err(SieveError::invalid_config(
                "num_threads must be at least 1",
            ));
        }
        self.num_threads = Some(num_threads);
        Ok(self)
    }

    pub fn sieve_size_kib(&self) -> Option<u32> {
        self.sieve_size_kib
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_sieve_size() {
        assert!(SieveOptions::new().with_sieve_size_kib(8).is_err());
        assert!(SieveOptions::new().with_sieve_size_kib(100_000).is_err());
        assert!(SieveOptions::new().with_sieve_size_kib(64).is_ok());
    }

    #[test]
    fn rejects_zero_threads() {
        assert!(SieveOptions::new().with_num_threads(0).is_err());
        assert!(SieveOptions::new().with_num_threads(4).is_ok());
    }

    #[test]
    fn default_thread_count_is_at_least_one() {
        assert!(SieveOptions::new().num_threads() >= 1);
    }
}

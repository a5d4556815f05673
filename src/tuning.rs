//! Derives the sieve size and crosser thresholds from `stop` and the
//! configured/detected cache sizes, mirroring `Erat::initAlgorithms` of the
//! original engine.

use crate::config::{
    CpuInfo, SieveOptions, FACTOR_ERATMEDIUM, FACTOR_ERATSMALL, FACTOR_SIEVESIZE,
    L1D_CACHE_BYTES_FALLBACK, MAX_SIEVE_SIZE_KIB, MIN_SIEVE_SIZE_KIB,
};
use crate::pmath::{isqrt, prev_pow2, round_up_to_multiple};

/// The tuning constants needed to construct `Erat`'s crossers for one
/// sieving session.
#[derive(Debug, Clone, Copy)]
pub struct Tuning {
    pub sieve_size_bytes: usize,
    pub max_erat_small: u64,
    pub max_erat_medium: u64,
    pub needs_erat_medium: bool,
    pub needs_erat_big: bool,
}

pub fn tune(stop: u64, options: &SieveOptions, cpu: &dyn CpuInfo) -> Tuning {
    let sqrt_stop = isqrt(stop);
    let l1_cache_bytes = cpu.l1_data_cache_bytes().unwrap_or(L1D_CACHE_BYTES_FALLBACK);

    let min_sieve_size = MIN_SIEVE_SIZE_KIB as usize * 1024;
    let max_sieve_size = options
        .sieve_size_kib()
        .map(|kib| kib as usize * 1024)
        .unwrap_or(MAX_SIEVE_SIZE_KIB as usize * 1024);

    let mut sieve_size = ((sqrt_stop as f64) * FACTOR_SIEVESIZE) as usize;
    sieve_size = sieve_size.max(min_sieve_size);
    sieve_size = round_up_to_multiple(sieve_size, 8);
    sieve_size = sieve_size.min(max_sieve_size);
    sieve_size = sieve_size.clamp(min_sieve_size, MAX_SIEVE_SIZE_KIB as usize * 1024);

    let max_erat_small = ((sieve_size.min(l1_cache_bytes) as f64) * FACTOR_ERATSMALL) as u64;
    let mut max_erat_medium = ((sieve_size as f64) * FACTOR_ERATMEDIUM) as u64;
    max_erat_medium = max_erat_medium.min(sqrt_stop);
    let max_erat_small = max_erat_small.min(max_erat_medium);

    let needs_erat_medium = sqrt_stop > max_erat_small;
    let needs_erat_big = sqrt_stop > max_erat_medium;

    if needs_erat_big {
        sieve_size = prev_pow2(sieve_size).max(min_sieve_size);
    }

    Tuning {
        sieve_size_bytes: sieve_size,
        max_erat_small,
        max_erat_medium,
        needs_erat_medium,
        needs_erat_big,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PortableCpuInfo;

    #[test]
    fn small_stop_needs_only_erat_small() {
        let tuning = tune(1_000, &SieveOptions::new(), &PortableCpuInfo);
        assert!(!tuning.needs_erat_medium);
        assert!(!tuning.needs_erat_big);
        assert!(tuning.sieve_size_bytes >= MIN_SIEVE_SIZE_KIB as usize * 1024);
    }

    #[test]
    fn huge_stop_needs_erat_big_and_power_of_two_sieve() {
        let tuning = tune(u64::MAX / 2, &SieveOptions::new(), &PortableCpuInfo);
        assert!(tuning.needs_erat_big);
        assert!(tuning.sieve_size_bytes.is_power_of_two());
    }

    #[test]
    fn sieve_size_respects_configured_cap() {
        let options = SieveOptions::new().with_sieve_size_kib(16).unwrap();
        let tuning = tune(10_000_000_000, &options, &PortableCpuInfo);
        assert_eq!(tuning.sieve_size_bytes, 16 * 1024);
    }
}

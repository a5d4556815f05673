//! Crosses off multiples of sieving primes large enough that each has at
//! most one multiple per segment.
//!
//! Primes are kept in `segments_ahead + 1` bucket lists indexed by how many
//! segments from now their next multiple falls due; `lists[0]` holds the
//! primes due in the current segment. After `lists[0]` is drained every
//! prime has been re-inserted into the list matching its new due segment, so
//! rotating the lists left by one makes that list become the new `lists[0]`
//! for the next call. Sieve size must be a power of two so the segment/
//! offset split in `add_sieving_prime` is a shift and a mask.

use crate::bucket::{BucketList, MemoryPool};
use crate::error::{SieveError, SieveResult};
use crate::wheel::{wheel210, SievingPrime};

pub struct EratBig {
    lists: Vec<BucketList>,
    log2_sieve_size: u32,
    modulo_sieve_size: u32,
    max_prime: u64,
}

impl EratBig {
    /// `sieve_size` must be a power of two; `max_prime` bounds the sieving
    /// primes this crosser will ever receive. Returns `InvalidConfig` (per
    /// spec §7) rather than panicking when `sieve_size` isn't a power of two,
    /// since that precondition is a validated-at-init configuration error,
    /// not an internal invariant violation.
    pub fn new(sieve_size: usize, max_prime: u64) -> SieveResult<Self> {
        if !sieve_size.is_power_of_two() {
            return Err(SieveError::invalid_config(format!(
                "EratBig requires a power-of-two sieve size, got {sieve_size}"
            )));
        }
        let log2_sieve_size = sieve_size.trailing_zeros();
        let max_sieving_prime = max_prime / 30;
        // the largest possible "correct" stride measured in bytes, mirroring
        // Wheel::getMaxFactor() for the modulo-210 wheel.
        let max_next_multiple = max_sieving_prime * 10 + 10;
        let max_multiple_index = (sieve_size as u64 - 1) + max_next_multiple;
        let max_segment_count = max_multiple_index >> log2_sieve_size;
        let list_count = max_segment_count as usize + 1;

        Ok(EratBig {
            lists: (0..list_count).map(|_| BucketList::new()).collect(),
            log2_sieve_size,
            modulo_sieve_size: sieve_size as u32 - 1,
            max_prime,
        })
    }

    pub fn max_prime(&self) -> u64 {
        self.max_prime
    }

    pub fn is_empty(&self) -> bool {
        self.lists.iter().all(BucketList::is_empty)
    }

    pub fn add_sieving_prime(
        &mut self,
        prime: u64,
        multiple_index: u32,
        wheel_index: u32,
        pool: &mut MemoryPool,
    ) {
        let segment = (multiple_index >> self.log2_sieve_size) as usize;
        let multiple_index = multiple_index & self.modulo_sieve_size;
        let sp = SievingPrime::new(prime, multiple_index, wheel_index);
        self.lists[segment].push(sp, pool);
    }

    /// Drains the current segment's list, crossing off one multiple per
    /// prime and re-inserting each prime into the list for its next due
    /// segment, then rotates so the next segment's list becomes current.
    pub fn cross_off(&mut self, sieve: &mut [u8], pool: &mut MemoryPool) {
        let log2_sieve_size = self.log2_sieve_size;
        let modulo_sieve_size = self.modulo_sieve_size;
        let list_count = self.lists.len();
        let table = wheel210();

        let mut buckets = self.lists[0].take();
        for bucket in buckets.iter_mut() {
            for sp in bucket.as_mut_slice() {
                sp.cross_off(sieve, sieve.len() as u32, table);
                let segment = (sp.multiple_index() >> log2_sieve_size) as usize % list_count;
                let new_multiple_index = sp.multiple_index() & modulo_sieve_size;
                sp.set_multiple_index(new_multiple_index);
                self.lists[segment].push(*sp, pool);
            }
        }
        BucketList::release_all(pool, buckets);

        self.lists.rotate_left(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wheel::first_multiple_210;

    #[test]
    fn crosses_off_a_lone_multiple_in_its_due_segment() {
        let mut pool = MemoryPool::new();
        let sieve_size = 64usize;
        let mut big = EratBig::new(sieve_size, 10_000).unwrap();
        let (mi, wi) = first_multiple_210(101, 0);
        big.add_sieving_prime(101, mi, wi, &mut pool);

        let mut sieve = vec![0xffu8; sieve_size];
        for _ in 0..4 {
            big.cross_off(&mut sieve, &mut pool);
        }
        assert!(sieve.iter().any(|&b| b != 0xff));
    }

    #[test]
    fn rejects_non_power_of_two_sieve_size() {
        let result = EratBig::new(100, 10_000);
        assert!(result.is_err());
    }
}

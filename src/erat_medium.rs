//! Crosses off multiples of primes with few hits per segment, re-bucketing
//! each prime by wheel index between segments so that per-segment work stays
//! grouped in a branch-predictor-friendly order.

use crate::bucket::{BucketList, MemoryPool};
use crate::wheel::SievingPrime;

const WHEEL_STATES: usize = 64;

pub struct EratMedium {
    lists: Vec<BucketList>,
    max_prime: u64,
}

impl EratMedium {
    pub fn new(max_prime: u64) -> Self {
        EratMedium {
            lists: (0..WHEEL_STATES).map(|_| BucketList::new()).collect(),
            max_prime,
        }
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
        let sp = SievingPrime::new(prime, multiple_index, wheel_index);
        self.lists[wheel_index as usize].push(sp, pool);
    }

    /// Snapshots every list, crosses off each prime's multiples in the
    /// current segment, then re-inserts it into the list matching its new
    /// wheel index (wrapping `multipleIndex` into the next segment).
    pub fn cross_off(&mut self, sieve: &mut [u8], pool: &mut MemoryPool) {
        let sieve_size = sieve.len() as u32;
        let mut new_lists: Vec<BucketList> = (0..WHEEL_STATES).map(|_| BucketList::new()).collect();

        for list in self.lists.iter_mut() {
            let mut buckets = list.take();
            for bucket in buckets.iter_mut() {
                for sp in bucket.as_mut_slice() {
                    while sp.cross_off(sieve, sieve_size, crate::wheel::wheel30()) {}
                    let wrapped = sp.multiple_index() - sieve_size;
                    sp.set_multiple_index(wrapped);
                    new_lists[sp.wheel_index() as usize].push(*sp, pool);
                }
            }
            BucketList::release_all(pool, buckets);
        }

        self.lists = new_lists;
    }
}

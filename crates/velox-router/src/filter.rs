//! Bit-array membership filter.
//!
//! A Bloom-style filter used by the static route table to reject unknown
//! `(method, path)` pairs without touching the hash map. It has no false
//! negatives; a positive answer must always be confirmed by the caller.

use crate::error::{RouterError, RouterResult};
use crate::hash::fnv1a;

const WORD_BITS: usize = u64::BITS as usize;

/// Default filter size in bits.
pub const DEFAULT_FILTER_BITS: usize = 8192;

/// Default number of probes per key.
pub const DEFAULT_FILTER_HASHES: usize = 3;

/// Fixed-size membership filter with `k` derived probes per key.
///
/// # Example
///
/// ```rust
/// use velox_router::MembershipFilter;
///
/// let mut filter = MembershipFilter::new(1024, 3).unwrap();
/// filter.add(b"GET/users");
///
/// assert!(filter.test(b"GET/users"));
/// ```
#[derive(Debug, Clone)]
pub struct MembershipFilter {
    bits: Vec<u64>,
    size: u64,
    seeds: Vec<u64>,
}

impl MembershipFilter {
    /// Creates a filter of `size` bits probed by `num_hashes` functions.
    ///
    /// Both values must be non-zero.
    pub fn new(size: usize, num_hashes: usize) -> RouterResult<Self> {
        if size == 0 {
            return Err(RouterError::InvalidFilterSize);
        }
        if num_hashes == 0 {
            return Err(RouterError::InvalidHashCount);
        }
        Ok(Self::build(size, num_hashes))
    }

    fn build(size: usize, num_hashes: usize) -> Self {
        let words = size.div_ceil(WORD_BITS);
        let seeds = (0..num_hashes as u64)
            .map(|i| splitmix64(0x9e37_79b9_7f4a_7c15_u64.wrapping_mul(i + 1)))
            .collect();

        Self {
            bits: vec![0; words],
            size: size as u64,
            seeds,
        }
    }

    /// Number of addressable bits.
    pub fn size(&self) -> usize {
        self.size as usize
    }

    /// Number of probes per key.
    pub fn num_hashes(&self) -> usize {
        self.seeds.len()
    }

    /// Adds a key to the filter.
    pub fn add(&mut self, key: &[u8]) {
        self.add_hash(fnv1a(key));
    }

    /// Adds a key whose base hash the caller already computed.
    pub fn add_hash(&mut self, base_hash: u64) {
        for i in 0..self.seeds.len() {
            let bit = self.position(base_hash, self.seeds[i]);
            self.bits[bit / WORD_BITS] |= 1 << (bit % WORD_BITS);
        }
    }

    /// Returns `false` if the key was definitely never added.
    pub fn test(&self, key: &[u8]) -> bool {
        self.test_with_precomputed_hash(fnv1a(key))
    }

    /// Same as [`test`](Self::test) for a caller-supplied base hash.
    #[inline]
    pub fn test_with_precomputed_hash(&self, base_hash: u64) -> bool {
        self.seeds.iter().all(|&seed| {
            let bit = self.position(base_hash, seed);
            self.bits[bit / WORD_BITS] & (1 << (bit % WORD_BITS)) != 0
        })
    }

    /// Clears every bit, keeping size and seeds.
    pub fn clear(&mut self) {
        self.bits.iter_mut().for_each(|w| *w = 0);
    }

    #[inline]
    fn position(&self, base_hash: u64, seed: u64) -> usize {
        (splitmix64(base_hash ^ seed) % self.size) as usize
    }
}

impl Default for MembershipFilter {
    fn default() -> Self {
        Self::build(DEFAULT_FILTER_BITS, DEFAULT_FILTER_HASHES)
    }
}

/// Finalizer from SplitMix64; spreads one base hash into independent probes.
#[inline]
fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

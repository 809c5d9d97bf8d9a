//! Bloom filter policy
//!
//! ## Payload Format
//! ```text
//! ┌───────────────────────────────┬─────────┐
//! │ bit array (whole bytes, ≥ 64) │  k (1)  │
//! └───────────────────────────────┴─────────┘
//! ```
//!
//! Probes use double hashing from a single 32-bit hash:
//! `h(i) = h + i * rotate_right(h, 17)`.

use super::FilterPolicy;

/// Seed for the key hash
const BLOOM_SEED: u32 = 0xbc9f_1d34;

/// Bloom filter with a fixed number of bits per key
#[derive(Debug, Clone, Copy)]
pub struct BloomFilterPolicy {
    bits_per_key: usize,
    /// Number of probes (k)
    k: usize,
}

impl BloomFilterPolicy {
    /// Create a policy spending `bits_per_key` bits per key.
    /// 10 bits per key yields roughly a 1% false positive rate.
    pub fn new(bits_per_key: usize) -> Self {
        // k = bits_per_key * ln(2), rounded down to reduce probing cost
        let k = (bits_per_key as f64 * 0.69) as usize;
        let k = k.clamp(1, 30);
        Self { bits_per_key, k }
    }

    pub fn bits_per_key(&self) -> usize {
        self.bits_per_key
    }

    /// Number of probes per key
    pub fn num_probes(&self) -> usize {
        self.k
    }
}

impl FilterPolicy for BloomFilterPolicy {
    fn name(&self) -> &str {
        "atlasfmt.BuiltinBloomFilter"
    }

    fn create_filter(&self, keys: &[&[u8]], dst: &mut Vec<u8>) {
        // For small n, a very high false positive rate is avoided by
        // enforcing a minimum filter length
        let bits = (keys.len() * self.bits_per_key).max(64);
        let bytes = (bits + 7) / 8;
        let bits = bytes * 8;

        let init_size = dst.len();
        dst.resize(init_size + bytes, 0);
        dst.push(self.k as u8);

        let array = &mut dst[init_size..init_size + bytes];
        for key in keys {
            let mut h = bloom_hash(key);
            let delta = h.rotate_right(17);
            for _ in 0..self.k {
                let bitpos = h as usize % bits;
                array[bitpos / 8] |= 1 << (bitpos % 8);
                h = h.wrapping_add(delta);
            }
        }
    }

    fn key_may_match(&self, key: &[u8], filter: &[u8]) -> bool {
        let len = filter.len();
        if len < 2 {
            return false;
        }

        let bits = (len - 1) * 8;

        // Use the encoded k so filters built with other parameters stay readable
        let k = filter[len - 1];
        if k > 30 {
            // Reserved for potentially new encodings of short filters
            return true;
        }

        let mut h = bloom_hash(key);
        let delta = h.rotate_right(17);
        for _ in 0..k {
            let bitpos = h as usize % bits;
            if filter[bitpos / 8] & (1 << (bitpos % 8)) == 0 {
                return false;
            }
            h = h.wrapping_add(delta);
        }
        true
    }
}

fn bloom_hash(key: &[u8]) -> u32 {
    hash(key, BLOOM_SEED)
}

/// Murmur-like 32-bit hash
fn hash(data: &[u8], seed: u32) -> u32 {
    const M: u32 = 0xc6a4_a793;
    const R: u32 = 24;

    let mut h = seed ^ (data.len() as u32).wrapping_mul(M);

    let mut chunks = data.chunks_exact(4);
    for chunk in &mut chunks {
        let w = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        h = h.wrapping_add(w);
        h = h.wrapping_mul(M);
        h ^= h >> 16;
    }

    let rest = chunks.remainder();
    if !rest.is_empty() {
        if rest.len() == 3 {
            h = h.wrapping_add(u32::from(rest[2]) << 16);
        }
        if rest.len() >= 2 {
            h = h.wrapping_add(u32::from(rest[1]) << 8);
        }
        h = h.wrapping_add(u32::from(rest[0]));
        h = h.wrapping_mul(M);
        h ^= h >> R;
    }
    h
}

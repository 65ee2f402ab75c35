//src/config.rs

use crate::error::{Error, Result};
use crate::types::Kmer;

/// Longest k-mer that fits both the 128-bit k-mer store and the 64-bit ambiguity mask.
pub const MAX_K: u8 = 64;

/// k used when nothing else is asked for (Kraken's default).
pub const DEFAULT_K: u8 = 31;

/// The k-mer length of a run plus the masks derived from it.
///
/// Build one at startup and hand it by reference to every scanner and every
/// squashing call. It never changes after construction, so sharing it across
/// threads needs no synchronisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KmerConfig {
    k: u8,
    kmer_mask: Kmer,
    ambig_mask: u64,
}

impl KmerConfig {
    /// Validates `k` and precomputes the window masks.
    pub fn new(k: u8) -> Result<Self> {
        if k == 0 || k > MAX_K {
            return Err(Error::InvalidK(k));
        }
        Ok(Self {
            k,
            kmer_mask: Kmer::MAX >> (128 - 2 * k as u32),
            ambig_mask: u64::MAX >> (64 - k as u32),
        })
    }

    #[inline]
    pub fn k(&self) -> u8 {
        self.k
    }

    /// Low `2k` bits set.
    #[inline]
    pub fn kmer_mask(&self) -> Kmer {
        self.kmer_mask
    }

    /// Low `k` bits set.
    #[inline]
    pub fn ambig_mask(&self) -> u64 {
        self.ambig_mask
    }

    /// Reverse complement of a packed k-mer of this config's length.
    ///
    /// Jellyfish-style bit reversal: each 64-bit half has its 2-bit groups
    /// reversed by masked swaps, the halves trade places, and the complemented
    /// result is shifted down so only the low `2k` bits remain.
    #[inline]
    pub fn reverse_complement(&self, kmer: Kmer) -> Kmer {
        let lo = reverse_2bit_groups(kmer as u64);
        let hi = reverse_2bit_groups((kmer >> 64) as u64);
        let reversed = ((lo as Kmer) << 64) | hi as Kmer;
        (!reversed) >> (128 - 2 * self.k as u32)
    }

    /// The lexicographically smaller of `kmer` and its reverse complement.
    #[inline]
    pub fn canonical(&self, kmer: Kmer) -> Kmer {
        kmer.min(self.reverse_complement(kmer))
    }
}

impl Default for KmerConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            kmer_mask: Kmer::MAX >> (128 - 2 * DEFAULT_K as u32),
            ambig_mask: u64::MAX >> (64 - DEFAULT_K as u32),
        }
    }
}

#[inline]
fn reverse_2bit_groups(mut x: u64) -> u64 {
    x = ((x >> 2) & 0x3333333333333333) | ((x & 0x3333333333333333) << 2);
    x = ((x >> 4) & 0x0F0F0F0F0F0F0F0F) | ((x & 0x0F0F0F0F0F0F0F0F) << 4);
    x = ((x >> 8) & 0x00FF00FF00FF00FF) | ((x & 0x00FF00FF00FF00FF) << 8);
    x = ((x >> 16) & 0x0000FFFF0000FFFF) | ((x & 0x0000FFFF0000FFFF) << 16);
    x.rotate_left(32)
}

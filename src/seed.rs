//src/seed.rs

use crate::config::KmerConfig;
use crate::error::{Error, Result};
use crate::types::Kmer;

/// Most care positions a squashed value may hold. One bit of the 64-bit read
/// form is reserved for the strand flag.
pub const MAX_SEED_WEIGHT: usize = 31;

/// A spaced seed: which positions of a k-mer window take part in the database key.
///
/// Written as a string of `'1'` (care) and `'0'` (ignore), one character per
/// window position, oldest base first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpacedSeed {
    pattern: String,
    /// Bit shift of every care position inside the packed k-mer, oldest first.
    shifts: Vec<u32>,
}

impl SpacedSeed {
    pub fn new(pattern: &str, config: &KmerConfig) -> Result<Self> {
        let k = config.k() as usize;
        if pattern.len() != k {
            return Err(Error::InvalidSeed(format!(
                "pattern has {} positions, k is {}",
                pattern.len(),
                k
            )));
        }

        let mut shifts = Vec::with_capacity(k);
        for (i, c) in pattern.bytes().enumerate() {
            match c {
                b'1' => shifts.push(2 * (k - 1 - i) as u32),
                b'0' => {}
                other => {
                    return Err(Error::InvalidSeed(format!(
                        "unexpected character {:?} at position {}",
                        other as char, i
                    )))
                }
            }
        }

        if shifts.is_empty() || shifts.len() > MAX_SEED_WEIGHT {
            return Err(Error::InvalidSeed(format!(
                "seed weight {} outside 1..={}",
                shifts.len(),
                MAX_SEED_WEIGHT
            )));
        }

        Ok(Self {
            pattern: pattern.to_string(),
            shifts,
        })
    }

    /// Seed that keeps every position; only valid for `k <= 31`.
    pub fn contiguous(config: &KmerConfig) -> Result<Self> {
        Self::new(&"1".repeat(config.k() as usize), config)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Number of care positions.
    pub fn weight(&self) -> usize {
        self.shifts.len()
    }

    /// Packs the care bases of `kmer`, oldest first, into the low bits.
    #[inline]
    pub fn squash(&self, kmer: Kmer) -> u64 {
        self.shifts
            .iter()
            .fold(0u64, |acc, &shift| (acc << 2) | ((kmer >> shift) & 0b11) as u64)
    }

    /// Strand-independent database key.
    #[inline]
    pub fn squash_for_index(&self, config: &KmerConfig, kmer: Kmer) -> u64 {
        let fwd = self.squash(kmer);
        let rev = self.squash(config.reverse_complement(kmer));
        fwd.min(rev)
    }

    /// The index key shifted up one bit, with the low bit set when the reverse
    /// strand supplied it. Reads keep the orientation, the database does not.
    #[inline]
    pub fn squash_for_read(&self, config: &KmerConfig, kmer: Kmer) -> u64 {
        let fwd = self.squash(kmer);
        let rev = self.squash(config.reverse_complement(kmer));
        if rev < fwd {
            (rev << 1) | 1
        } else {
            fwd << 1
        }
    }
}

/// Drops the strand flag of a read-form value.
#[inline]
pub fn read_to_index_key(read_form: u64) -> u64 {
    read_form >> 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(k: u8) -> KmerConfig {
        KmerConfig::new(k).unwrap()
    }

    #[test]
    fn rejects_bad_patterns() {
        let c = cfg(4);
        assert!(matches!(SpacedSeed::new("111", &c), Err(Error::InvalidSeed(_))));
        assert!(matches!(SpacedSeed::new("1x11", &c), Err(Error::InvalidSeed(_))));
        assert!(matches!(SpacedSeed::new("0000", &c), Err(Error::InvalidSeed(_))));
        assert!(matches!(SpacedSeed::contiguous(&cfg(32)), Err(Error::InvalidSeed(_))));
        assert_eq!(SpacedSeed::contiguous(&cfg(31)).unwrap().weight(), 31);
    }

    #[test]
    fn squash_keeps_care_positions_in_order() {
        let c = cfg(4);
        // ACGT
        let kmer: Kmer = 0b00_01_10_11;
        assert_eq!(SpacedSeed::new("1111", &c).unwrap().squash(kmer), 0b00_01_10_11);
        // keep C and T
        assert_eq!(SpacedSeed::new("0101", &c).unwrap().squash(kmer), 0b01_11);
        // keep A and G
        assert_eq!(SpacedSeed::new("1010", &c).unwrap().squash(kmer), 0b00_10);
    }

    #[test]
    fn index_key_is_strand_independent() {
        let c = cfg(4);
        let seed = SpacedSeed::new("1101", &c).unwrap();
        // AACG and its reverse complement CGTT
        let fwd: Kmer = 0b00_00_01_10;
        let rev = c.reverse_complement(fwd);
        assert_eq!(seed.squash_for_index(&c, fwd), seed.squash_for_index(&c, rev));
    }

    #[test]
    fn read_form_carries_strand() {
        let c = cfg(4);
        let seed = SpacedSeed::contiguous(&c).unwrap();
        let fwd: Kmer = 0b00_00_01_10; // AACG, smaller than CGTT
        let rev = c.reverse_complement(fwd);

        let r_fwd = seed.squash_for_read(&c, fwd);
        let r_rev = seed.squash_for_read(&c, rev);
        assert_eq!(r_fwd & 1, 0);
        assert_eq!(r_rev & 1, 1);
        assert_eq!(read_to_index_key(r_fwd), seed.squash_for_index(&c, fwd));
        assert_eq!(read_to_index_key(r_rev), seed.squash_for_index(&c, rev));
    }
}

//src/types.rs

use std::num::NonZeroU32;
use ahash::AHashMap;

/// A real taxonomy node. "Unclassified" is `Option<TaxId>::None`, never a zero id.
pub type TaxId = NonZeroU32;

/// A packed k-mer: 2 bits per base, newest base in the lowest bits.
pub type Kmer = u128;

/// Votes per taxon collected over one sequence.
pub type HitCounts = AHashMap<TaxId, u32>;

/// Converts a raw id from a file or database into a tagged one.
/// `0` means "no assignment".
#[inline]
pub fn taxon(raw: u32) -> Option<TaxId> {
    NonZeroU32::new(raw)
}

/// Raw form of an optional taxon, `0` for unclassified.
#[inline]
pub fn raw_taxon(id: Option<TaxId>) -> u32 {
    id.map_or(0, NonZeroU32::get)
}

/// Outcome of classifying one sequence.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// The resolved taxon, `None` if no k-mer hit anything.
    pub call: Option<TaxId>,
    /// Votes that went into the call.
    pub hit_counts: HitCounts,
    /// Windows produced by the scanner.
    pub kmers: usize,
    /// Windows skipped because they held a non-ACGT base.
    pub ambiguous_kmers: usize,
    /// Windows that found a taxon in the database.
    pub hits: usize,
}

impl Classification {
    pub fn is_classified(&self) -> bool {
        self.call.is_some()
    }
}

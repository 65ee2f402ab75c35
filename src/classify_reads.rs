//src/classify_reads.rs

use ahash::AHashMap;
use rayon::prelude::*;

use crate::classify_sequence::{classify_sequence, KmerLookup};
use crate::config::KmerConfig;
use crate::error::Result;
use crate::seed::SpacedSeed;
use crate::taxdb::AncestryTable;
use crate::types::{Classification, TaxId};

/// Classifications of a batch plus how many reads landed on each taxon.
#[derive(Debug, Default)]
pub struct BatchResult {
    /// One entry per input sequence, in input order.
    pub classifications: Vec<Classification>,
    /// Reads assigned directly to each taxon.
    pub read_counts: AHashMap<TaxId, u32>,
}

impl BatchResult {
    pub fn classified(&self) -> usize {
        self.classifications.iter().filter(|c| c.is_classified()).count()
    }

    pub fn unclassified(&self) -> usize {
        self.classifications.len() - self.classified()
    }
}

/// Parallel classification of many sequences at once.
///
/// Every task builds its own scanner; the config, seed, database and taxonomy
/// are only read. The first error aborts the batch.
pub fn classify_reads_parallel<S, L>(
    seqs: &[S],
    config: &KmerConfig,
    seed: &SpacedSeed,
    db: &L,
    table: &AncestryTable,
) -> Result<BatchResult>
where
    S: AsRef<[u8]> + Sync,
    L: KmerLookup + Sync + ?Sized,
{
    let classifications = seqs
        .par_iter()
        .map(|seq| classify_sequence(seq.as_ref(), config, seed, db, table))
        .collect::<Result<Vec<_>>>()?;

    let read_counts = classifications
        .par_iter()
        .fold(AHashMap::new, |mut acc: AHashMap<TaxId, u32>, c| {
            if let Some(call) = c.call {
                *acc.entry(call).or_insert(0) += 1;
            }
            acc
        })
        .reduce(AHashMap::new, merge_read_counts);

    log::trace!(
        "Batch of {} sequences: {} taxa called",
        seqs.len(),
        read_counts.len()
    );

    Ok(BatchResult {
        classifications,
        read_counts,
    })
}

/// Merges per-thread read counts.
fn merge_read_counts(
    mut a: AHashMap<TaxId, u32>,
    b: AHashMap<TaxId, u32>,
) -> AHashMap<TaxId, u32> {
    a.reserve(b.len());
    for (taxid, count) in b {
        *a.entry(taxid).or_insert(0) += count;
    }
    a
}

//src/classify_sequence.rs

use ahash::AHashMap;

use crate::config::KmerConfig;
use crate::error::{Error, Result};
use crate::kmer_scanner::KmerScanner;
use crate::seed::SpacedSeed;
use crate::taxdb::AncestryTable;
use crate::types::{Classification, HitCounts, TaxId};

/// The k-mer database as seen from here: a squashed index key in, a taxon out.
pub trait KmerLookup {
    fn lookup(&self, key: u64) -> Option<TaxId>;
}

impl KmerLookup for AHashMap<u64, TaxId> {
    #[inline]
    fn lookup(&self, key: u64) -> Option<TaxId> {
        self.get(&key).copied()
    }
}

/// Lowest common ancestor of `a` and `b`.
/// `None` is the identity: `lca(None, x) == lca(x, None) == x`.
pub fn lca(table: &AncestryTable, a: Option<TaxId>, b: Option<TaxId>) -> Result<Option<TaxId>> {
    let (mut a, mut b) = match (a, b) {
        (None, x) | (x, None) => {
            if let Some(id) = x {
                table.depth(id)?;
            }
            return Ok(x);
        }
        (Some(a), Some(b)) => (a, b),
    };

    let mut depth_a = table.depth(a)?;
    let mut depth_b = table.depth(b)?;

    while depth_a > depth_b {
        a = table.parent(a)?;
        depth_a -= 1;
    }
    while depth_b > depth_a {
        b = table.parent(b)?;
        depth_b -= 1;
    }

    while a != b {
        let (pa, pb) = (table.parent(a)?, table.parent(b)?);
        if pa == a && pb == b {
            // two different roots
            return Err(Error::DisjointTaxa(a.get(), b.get()));
        }
        a = pa;
        b = pb;
    }
    Ok(Some(a))
}

/// LCA folded over any number of taxa; `None` entries are skipped by the identity rule.
pub fn consensus<I>(table: &AncestryTable, taxa: I) -> Result<Option<TaxId>>
where
    I: IntoIterator<Item = Option<TaxId>>,
{
    taxa.into_iter()
        .try_fold(None, |acc, t| lca(table, acc, t))
}

/// Picks one taxon from a set of k-mer votes.
///
/// Each voted taxon scores the votes of itself plus every voted descendant.
/// The highest score wins; ties go to the deeper taxon, then to the smaller id.
/// An empty set resolves to `None`.
pub fn resolve_tree(hit_counts: &HitCounts, table: &AncestryTable) -> Result<Option<TaxId>> {
    // check every key before scoring so no vote is silently dropped
    for &taxon in hit_counts.keys() {
        table.depth(taxon)?;
    }

    // one walk up each hit's root path
    let mut scores: AHashMap<TaxId, u64> = AHashMap::with_capacity(hit_counts.len());
    for (&taxon, &count) in hit_counts {
        for ancestor in table.ancestors(taxon)? {
            if hit_counts.contains_key(&ancestor) {
                *scores.entry(ancestor).or_insert(0) += count as u64;
            }
        }
    }

    let mut best: Option<(u64, u32, TaxId)> = None;
    for (&taxon, &score) in &scores {
        let depth = table.depth(taxon)?;
        let better = match best {
            None => true,
            Some((best_score, best_depth, best_taxon)) => {
                score > best_score
                    || (score == best_score && depth > best_depth)
                    || (score == best_score && depth == best_depth && taxon < best_taxon)
            }
        };
        if better {
            best = Some((score, depth, taxon));
        }
    }

    Ok(best.map(|(_, _, taxon)| taxon))
}

/// Classifies one sequence.
/// - Windows holding a non-ACGT base are counted but not looked up.
/// - Every database hit is one vote; the votes go to [`resolve_tree`].
pub fn classify_sequence<L>(
    seq: &[u8],
    config: &KmerConfig,
    seed: &SpacedSeed,
    db: &L,
    table: &AncestryTable,
) -> Result<Classification>
where
    L: KmerLookup + ?Sized,
{
    let mut result = Classification::default();
    let mut scanner = KmerScanner::new(config, seq);

    while let Some(kmer) = scanner.next_kmer() {
        result.kmers += 1;
        if scanner.is_ambiguous() {
            result.ambiguous_kmers += 1;
            continue;
        }

        let key = scanner.squash_kmer_for_index(seed, kmer);
        if let Some(taxon) = db.lookup(key) {
            result.hits += 1;
            *result.hit_counts.entry(taxon).or_insert(0) += 1;
        }
    }

    result.call = resolve_tree(&result.hit_counts, table)?;
    log::debug!(
        "Classified {} bp: {} k-mers, {} ambiguous, {} hits -> {:?}",
        seq.len(),
        result.kmers,
        result.ambiguous_kmers,
        result.hits,
        result.call
    );
    Ok(result)
}

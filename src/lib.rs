// src/lib.rs
//! K-mer scanning and taxonomic tree resolution for kraken-style classifiers.
//!
//! A sequence goes through [`KmerScanner`], each clean window is squashed into
//! a database key with a [`SpacedSeed`], the external database answers through
//! [`KmerLookup`], and the collected votes are resolved against an
//! [`AncestryTable`] by [`resolve_tree`].
pub mod error;
pub mod types;
pub mod config;
pub mod seed;
pub mod kmer_scanner;
pub mod taxdb;
pub mod classify_sequence;
pub mod classify_reads;

pub use crate::classify_reads::{classify_reads_parallel, BatchResult};
pub use crate::classify_sequence::{classify_sequence, consensus, lca, resolve_tree, KmerLookup};
pub use crate::config::{KmerConfig, DEFAULT_K, MAX_K};
pub use crate::error::{Error, Result};
pub use crate::kmer_scanner::{KmerScanner, ScanState, ScannedKmer};
pub use crate::seed::{read_to_index_key, SpacedSeed};
pub use crate::taxdb::{AncestryTable, TaxonomyFormat};
pub use crate::types::{raw_taxon, taxon, Classification, HitCounts, Kmer, TaxId};

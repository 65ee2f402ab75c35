//src/kmer_scanner.rs

use crate::config::KmerConfig;
use crate::seed::SpacedSeed;
use crate::types::Kmer;

/// Where a scanner is in its range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Fewer than `k` bases loaded so far.
    Priming,
    /// Every advance yields a window.
    Active,
    /// Range consumed. Terminal.
    Exhausted,
}

/// One window handed out by the scanner's iterator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannedKmer {
    pub kmer: Kmer,
    pub ambiguous: bool,
}

/// 2-bit code of a base. Anything outside ACGT packs as `0` and is reported
/// through the ambiguity mask instead.
#[inline]
fn encode_base_2bit(b: u8) -> Option<Kmer> {
    match b {
        b'A' | b'a' => Some(0),
        b'C' | b'c' => Some(1),
        b'G' | b'g' => Some(2),
        b'T' | b't' => Some(3),
        _ => None,
    }
}

/// Sliding-window k-mer generator over one sequence.
///
/// Each advance shifts one base into the packed window rather than re-encoding
/// all `k` bases. A scanner borrows its sequence and config and belongs to a
/// single consumer; parallel callers build one scanner per sequence.
#[derive(Debug, Clone)]
pub struct KmerScanner<'a> {
    config: &'a KmerConfig,
    seq: &'a [u8],
    curr_pos: usize,
    finish: usize,
    kmer: Kmer,
    ambig: u64,
    loaded_nt: usize,
    state: ScanState,
}

impl<'a> KmerScanner<'a> {
    /// Scans the whole sequence.
    pub fn new(config: &'a KmerConfig, seq: &'a [u8]) -> Self {
        Self::with_range(config, seq, 0, seq.len())
    }

    /// Scans `seq[start..finish]`. `finish` is clamped to the sequence length
    /// and a reversed range scans nothing.
    pub fn with_range(config: &'a KmerConfig, seq: &'a [u8], start: usize, finish: usize) -> Self {
        let finish = finish.min(seq.len());
        Self {
            config,
            seq,
            curr_pos: start.min(finish),
            finish,
            kmer: 0,
            ambig: 0,
            loaded_nt: 0,
            state: ScanState::Priming,
        }
    }

    #[inline]
    pub fn config(&self) -> &KmerConfig {
        self.config
    }

    #[inline]
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Slides the window forward and returns it, or `None` once the range
    /// cannot supply another full window. `None` is permanent.
    pub fn next_kmer(&mut self) -> Option<Kmer> {
        if self.state == ScanState::Exhausted {
            return None;
        }

        let k = self.config.k() as usize;
        loop {
            if self.curr_pos >= self.finish {
                self.state = ScanState::Exhausted;
                return None;
            }

            let base = self.seq[self.curr_pos];
            self.curr_pos += 1;

            self.kmer <<= 2;
            self.ambig <<= 1;
            match encode_base_2bit(base) {
                Some(code) => self.kmer |= code,
                None => self.ambig |= 1,
            }
            self.kmer &= self.config.kmer_mask();
            self.ambig &= self.config.ambig_mask();

            if self.loaded_nt < k {
                self.loaded_nt += 1;
            }
            if self.loaded_nt == k {
                self.state = ScanState::Active;
                return Some(self.kmer);
            }
        }
    }

    /// Whether the window last returned by `next_kmer` holds a non-ACGT base.
    #[inline]
    pub fn is_ambiguous(&self) -> bool {
        self.ambig != 0
    }

    #[inline]
    pub fn reverse_complement(&self, kmer: Kmer) -> Kmer {
        self.config.reverse_complement(kmer)
    }

    /// Read-buffer form of `kmer` under `seed`.
    #[inline]
    pub fn squash_kmer_for_read(&self, seed: &SpacedSeed, kmer: Kmer) -> u64 {
        seed.squash_for_read(self.config, kmer)
    }

    /// Database key of `kmer` under `seed`.
    #[inline]
    pub fn squash_kmer_for_index(&self, seed: &SpacedSeed, kmer: Kmer) -> u64 {
        seed.squash_for_index(self.config, kmer)
    }
}

impl Iterator for KmerScanner<'_> {
    type Item = ScannedKmer;

    fn next(&mut self) -> Option<Self::Item> {
        let kmer = self.next_kmer()?;
        Some(ScannedKmer {
            kmer,
            ambiguous: self.is_ambiguous(),
        })
    }
}

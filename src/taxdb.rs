//src/taxdb.rs

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ahash::AHashMap;

use crate::error::{Error, Result};
use crate::types::{taxon, TaxId};

/// Line layout of a taxonomy source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxonomyFormat {
    /// NCBI `nodes.dmp`: `taxid\t|\tparent\t|\trank\t|...`
    NodesDmp,
    /// KrakenUniq `taxDB`: `taxid\tparent\tname\trank`
    TaxDb,
}

impl TaxonomyFormat {
    fn delimiter(self) -> &'static str {
        match self {
            TaxonomyFormat::NodesDmp => "\t|\t",
            TaxonomyFormat::TaxDb => "\t",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Node {
    parent: TaxId,
    depth: u32,
}

/// Immutable `taxon -> parent` map with the depth of every node.
///
/// A root points at itself. Parents that never show up as a child in the
/// source become roots, and a parent of `0` makes its child a root. Once
/// built the table is only read, so it can be shared by reference across
/// worker threads.
#[derive(Debug, Clone, Default)]
pub struct AncestryTable {
    nodes: AHashMap<TaxId, Node>,
}

impl AncestryTable {
    /// Loads a taxonomy file. Any malformed line fails the whole load.
    pub fn from_path<P: AsRef<Path>>(path: P, format: TaxonomyFormat) -> Result<Self> {
        let file = File::open(&path)?;
        let table = Self::from_reader(BufReader::new(file), format)?;
        log::info!(
            "Loaded taxonomy {} with {} nodes",
            path.as_ref().display(),
            table.len()
        );
        Ok(table)
    }

    pub fn from_reader<R: BufRead>(reader: R, format: TaxonomyFormat) -> Result<Self> {
        let delimiter = format.delimiter();
        let mut pairs = Vec::new();

        for (idx, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            let line_no = idx + 1;
            if line.trim().is_empty() {
                continue;
            }

            let mut fields = line.split(delimiter);
            let child = parse_field(fields.next(), line_no, "taxon id")?;
            let parent = parse_field(fields.next(), line_no, "parent id")?;
            let child = taxon(child).ok_or_else(|| Error::Parse {
                line: line_no,
                message: "taxon id 0 is reserved for unclassified".to_string(),
            })?;
            pairs.push((child, taxon(parent)));
        }

        Self::build(pairs)
    }

    /// Builds from raw `(child, parent)` pairs. A child of `0` is rejected.
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let mut tagged = Vec::new();
        for (i, (child, parent)) in pairs.into_iter().enumerate() {
            let child = taxon(child).ok_or_else(|| Error::Parse {
                line: i + 1,
                message: "taxon id 0 is reserved for unclassified".to_string(),
            })?;
            tagged.push((child, taxon(parent)));
        }
        Self::build(tagged)
    }

    fn build(pairs: Vec<(TaxId, Option<TaxId>)>) -> Result<Self> {
        let mut parents: AHashMap<TaxId, TaxId> = AHashMap::with_capacity(pairs.len());
        for (child, parent) in pairs {
            let parent = parent.unwrap_or(child);
            if let Some(old) = parents.insert(child, parent) {
                if old != parent {
                    log::debug!(
                        "Duplicate taxon {}: parent {} replaced by {}",
                        child, old, parent
                    );
                }
            }
        }

        // parents that never appear as a child are roots
        let dangling: Vec<TaxId> = parents
            .values()
            .filter(|p| !parents.contains_key(*p))
            .copied()
            .collect();
        for root in dangling {
            parents.insert(root, root);
        }

        let depths = compute_depths(&parents)?;
        let nodes = parents
            .into_iter()
            .map(|(id, parent)| (id, Node { parent, depth: depths[&id] }))
            .collect();
        Ok(Self { nodes })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: TaxId) -> bool {
        self.nodes.contains_key(&id)
    }

    fn node(&self, id: TaxId) -> Result<&Node> {
        self.nodes.get(&id).ok_or(Error::UnknownTaxon(id.get()))
    }

    /// Direct parent; a root returns itself.
    pub fn parent(&self, id: TaxId) -> Result<TaxId> {
        self.node(id).map(|n| n.parent)
    }

    /// Steps from `id` up to its root; roots have depth 0.
    pub fn depth(&self, id: TaxId) -> Result<u32> {
        self.node(id).map(|n| n.depth)
    }

    pub fn is_root(&self, id: TaxId) -> Result<bool> {
        self.node(id).map(|n| n.parent == id)
    }

    /// `id` itself, then each ancestor up to and including the root.
    pub fn ancestors(&self, id: TaxId) -> Result<Ancestors<'_>> {
        self.node(id)?;
        Ok(Ancestors {
            table: self,
            next: Some(id),
        })
    }

    /// True when `ancestor` lies on the root path of `descendant` (inclusive).
    pub fn is_ancestor(&self, ancestor: TaxId, descendant: TaxId) -> Result<bool> {
        let anc_depth = self.depth(ancestor)?;
        let mut node = descendant;
        let mut depth = self.depth(descendant)?;
        while depth > anc_depth {
            node = self.nodes[&node].parent;
            depth -= 1;
        }
        Ok(node == ancestor)
    }
}

/// Walks a root path. Built by [`AncestryTable::ancestors`].
pub struct Ancestors<'a> {
    table: &'a AncestryTable,
    next: Option<TaxId>,
}

impl Iterator for Ancestors<'_> {
    type Item = TaxId;

    fn next(&mut self) -> Option<TaxId> {
        let current = self.next?;
        let parent = self.table.nodes.get(&current)?.parent;
        self.next = (parent != current).then_some(parent);
        Some(current)
    }
}

fn parse_field(field: Option<&str>, line: usize, what: &str) -> Result<u32> {
    let raw = field.map(str::trim).filter(|s| !s.is_empty()).ok_or_else(|| Error::Parse {
        line,
        message: format!("missing {}", what),
    })?;
    raw.parse().map_err(|_| Error::Parse {
        line,
        message: format!("{} {:?} is not a number", what, raw),
    })
}

/// Depth of every node, or the first cycle found.
/// Every parent must already be a key of `parents`.
fn compute_depths(parents: &AHashMap<TaxId, TaxId>) -> Result<AHashMap<TaxId, u32>> {
    let mut depths: AHashMap<TaxId, u32> = AHashMap::with_capacity(parents.len());
    let mut path = Vec::new();

    for &start in parents.keys() {
        if depths.contains_key(&start) {
            continue;
        }

        path.clear();
        let mut node = start;
        let base = loop {
            if let Some(&d) = depths.get(&node) {
                break d;
            }
            let parent = parents[&node];
            if parent == node {
                depths.insert(node, 0);
                break 0;
            }
            path.push(node);
            if path.len() > parents.len() {
                return Err(Error::Cycle(start.get()));
            }
            node = parent;
        };

        // path holds descendants of `node`, nearest last
        for (i, &n) in path.iter().rev().enumerate() {
            depths.insert(n, base + 1 + i as u32);
        }
    }

    Ok(depths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn t(raw: u32) -> TaxId {
        taxon(raw).unwrap()
    }

    #[test]
    fn parses_nodes_dmp() {
        let src = "1\t|\t1\t|\tno rank\t|\n\
                   2\t|\t1\t|\tsuperkingdom\t|\n\
                   \n\
                   562\t|\t2\t|\tspecies\t|\n";
        let table = AncestryTable::from_reader(Cursor::new(src), TaxonomyFormat::NodesDmp).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.parent(t(562)).unwrap(), t(2));
        assert_eq!(table.depth(t(562)).unwrap(), 2);
        assert!(table.is_root(t(1)).unwrap());
    }

    #[test]
    fn parses_taxdb() {
        let src = "1\t1\troot\tno rank\n2\t1\tBacteria\tsuperkingdom\n";
        let table = AncestryTable::from_reader(Cursor::new(src), TaxonomyFormat::TaxDb).unwrap();
        assert_eq!(table.parent(t(2)).unwrap(), t(1));
    }

    #[test]
    fn malformed_lines_fail_the_load() {
        let missing = "1\t1\n2\n";
        match AncestryTable::from_reader(Cursor::new(missing), TaxonomyFormat::TaxDb) {
            Err(Error::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }

        let non_numeric = "1\t1\nx\t1\n";
        assert!(matches!(
            AncestryTable::from_reader(Cursor::new(non_numeric), TaxonomyFormat::TaxDb),
            Err(Error::Parse { line: 2, .. })
        ));

        let zero = "0\t1\n";
        assert!(matches!(
            AncestryTable::from_reader(Cursor::new(zero), TaxonomyFormat::TaxDb),
            Err(Error::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn duplicates_last_wins() {
        let table = AncestryTable::from_pairs([(1, 1), (2, 1), (3, 1), (3, 2)]).unwrap();
        assert_eq!(table.parent(t(3)).unwrap(), t(2));
        assert_eq!(table.depth(t(3)).unwrap(), 2);
    }

    #[test]
    fn dangling_parent_and_zero_parent_become_roots() {
        let table = AncestryTable::from_pairs([(2, 1), (3, 1), (7, 0)]).unwrap();
        assert!(table.contains(t(1)));
        assert!(table.is_root(t(1)).unwrap());
        assert!(table.is_root(t(7)).unwrap());
        assert_eq!(table.depth(t(3)).unwrap(), 1);
    }

    #[test]
    fn cycles_are_rejected() {
        assert!(matches!(
            AncestryTable::from_pairs([(1, 1), (2, 3), (3, 4), (4, 2)]),
            Err(Error::Cycle(_))
        ));
    }

    #[test]
    fn ancestry_queries() {
        let table = AncestryTable::from_pairs([(2, 1), (3, 1), (4, 2), (5, 2)]).unwrap();
        let path: Vec<u32> = table.ancestors(t(4)).unwrap().map(|x| x.get()).collect();
        assert_eq!(path, vec![4, 2, 1]);
        assert!(table.is_ancestor(t(2), t(5)).unwrap());
        assert!(table.is_ancestor(t(5), t(5)).unwrap());
        assert!(!table.is_ancestor(t(3), t(5)).unwrap());
        assert!(!table.is_ancestor(t(4), t(2)).unwrap());
        assert!(matches!(table.parent(t(99)), Err(Error::UnknownTaxon(99))));
        assert!(table.ancestors(t(99)).is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            AncestryTable::from_path("/nonexistent/nodes.dmp", TaxonomyFormat::NodesDmp),
            Err(Error::Io(_))
        ));
    }
}

use crate::model::{FeatureEntry, Interval, Symbol};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeId(u32);

struct Node {
    midpoint: u64,
    covering_by_start: Vec<EntryId>,
    covering_by_end: Vec<EntryId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

pub struct IntervalTree {
    entries: Vec<FeatureEntry>,
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl IntervalTree {
    /// `resolve` maps a feature-type symbol to its string, used to break
    /// ties when two entries share a start (or end) position.
    pub fn build<'r>(entries: Vec<FeatureEntry>, resolve: impl Fn(Symbol) -> &'r str) -> Self {
        let labels: Vec<String> = entries
            .iter()
            .map(|e| resolve(e.feature_type).to_string())
            .collect();
        let mut builder = Builder {
            entries: &entries,
            labels: &labels,
            nodes: Vec::new(),
        };
        let all: Vec<EntryId> = (0..entries.len() as u32).map(EntryId).collect();
        let root = builder.build_rec(all);
        IntervalTree {
            entries,
            nodes: builder.nodes,
            root,
        }
    }

    pub fn entry(&self, id: EntryId) -> &FeatureEntry {
        &self.entries[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn search(&self, query: Interval) -> Vec<EntryId> {
        let mut out = Vec::new();
        if let Some(root) = self.root {
            self.search_node(root, query, &mut out);
        }
        out
    }

    fn search_node(&self, node_id: NodeId, query: Interval, out: &mut Vec<EntryId>) {
        let node = &self.nodes[node_id.0 as usize];

        if query.end < node.midpoint {
            for &id in &node.covering_by_start {
                if self.entries[id.0 as usize].interval.start > query.end {
                    break;
                }
                if self.entries[id.0 as usize].interval.overlaps(query) {
                    out.push(id);
                }
            }
            if let Some(left) = node.left {
                self.search_node(left, query, out);
            }
        } else if query.start > node.midpoint {
            for &id in node.covering_by_end.iter().rev() {
                if self.entries[id.0 as usize].interval.end < query.start {
                    break;
                }
                if self.entries[id.0 as usize].interval.overlaps(query) {
                    out.push(id);
                }
            }
            if let Some(right) = node.right {
                self.search_node(right, query, out);
            }
        } else {
            // query straddles the midpoint: every covering entry overlaps it
            out.extend(node.covering_by_start.iter().copied());
            if let Some(left) = node.left {
                self.search_node(left, query, out);
            }
            if let Some(right) = node.right {
                self.search_node(right, query, out);
            }
        }
    }
}

struct Builder<'a> {
    entries: &'a [FeatureEntry],
    labels: &'a [String],
    nodes: Vec<Node>,
}

impl<'a> Builder<'a> {
    fn build_rec(&mut self, ids: Vec<EntryId>) -> Option<NodeId> {
        if ids.is_empty() {
            return None;
        }
        let midpoint = self.entries[ids[ids.len() / 2].0 as usize].interval.midpoint();

        let mut covering = Vec::new();
        let mut left_ids = Vec::new();
        let mut right_ids = Vec::new();
        for id in ids {
            let iv = self.entries[id.0 as usize].interval;
            if iv.end < midpoint {
                left_ids.push(id);
            } else if iv.start > midpoint {
                right_ids.push(id);
            } else {
                covering.push(id);
            }
        }

        let mut covering_by_start = covering.clone();
        covering_by_start.sort_by(|a, b| self.start_key(*a).cmp(&self.start_key(*b)));
        let mut covering_by_end = covering;
        covering_by_end.sort_by(|a, b| self.end_key(*a).cmp(&self.end_key(*b)));

        let left = self.build_rec(left_ids);
        let right = self.build_rec(right_ids);

        self.nodes.push(Node {
            midpoint,
            covering_by_start,
            covering_by_end,
            left,
            right,
        });
        Some(NodeId(self.nodes.len() as u32 - 1))
    }

    fn start_key(&self, id: EntryId) -> (u64, &str) {
        let e = &self.entries[id.0 as usize];
        (e.interval.start, self.labels[id.0 as usize].as_str())
    }

    fn end_key(&self, id: EntryId) -> (u64, &str) {
        let e = &self.entries[id.0 as usize];
        (e.interval.end, self.labels[id.0 as usize].as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FeatureEntry, Strand};
    use string_interner::{DefaultSymbol, Symbol as _};

    fn sym(n: usize) -> DefaultSymbol {
        DefaultSymbol::try_from_usize(n).unwrap()
    }

    fn entry(start: u64, end: u64) -> FeatureEntry {
        FeatureEntry {
            interval: Interval::new(start, end),
            strand: Strand::Unknown,
            feature_type: sym(0),
            gene_id: None,
            gene_type: None,
        }
    }

    fn build(entries: Vec<FeatureEntry>) -> IntervalTree {
        IntervalTree::build(entries, |_| "exon")
    }

    #[test]
    fn finds_overlapping_entries_only() {
        let entries = vec![entry(10, 20), entry(30, 40), entry(15, 35)];
        let tree = build(entries);

        let hits = tree.search(Interval::new(18, 22));
        let mut starts: Vec<u64> = hits.iter().map(|id| tree.entry(*id).interval.start).collect();
        starts.sort();
        assert_eq!(starts, vec![10, 15]);
    }

    #[test]
    fn true_overlap_not_containment() {
        // query is fully contained within the entry: a containment-only
        // predicate would also find this, true overlap must too.
        let tree = build(vec![entry(0, 100)]);
        let hits = tree.search(Interval::new(40, 60));
        assert_eq!(hits.len(), 1);

        // entry fully contained within the query: containment-only would
        // have missed this one entirely.
        let tree = build(vec![entry(40, 60)]);
        let hits = tree.search(Interval::new(0, 100));
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn empty_tree_returns_nothing() {
        let tree = build(Vec::new());
        assert!(tree.search(Interval::new(1, 10)).is_empty());
    }

    #[test]
    fn adjacent_but_not_overlapping_is_excluded() {
        let tree = build(vec![entry(10, 20)]);
        assert!(tree.search(Interval::new(21, 30)).is_empty());
        assert_eq!(tree.search(Interval::new(20, 30)).len(), 1);
    }

    #[test]
    fn many_entries_build_without_panicking() {
        let entries: Vec<FeatureEntry> = (0..500).map(|i| entry(i * 10, i * 10 + 50)).collect();
        let tree = build(entries);
        let hits = tree.search(Interval::new(2505, 2505));
        assert!(!hits.is_empty());
    }
}

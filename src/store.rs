use std::collections::HashMap;

use string_interner::{backend::StringBackend, StringInterner};

use crate::model::{FeatureEntry, Interval, Symbol};
use crate::tree::{EntryId, IntervalTree};

pub struct AnnotationStoreBuilder {
    interner: StringInterner<StringBackend>,
    by_ref: HashMap<String, Vec<FeatureEntry>>,
}

// placeholder label for a pair end whose verdict named no feature type at
// all, so every single-gene pair still yields a two-element pattern key
pub const INTERGENIC: &str = "intergenic";

impl AnnotationStoreBuilder {
    pub fn new() -> Self {
        let mut interner = StringInterner::new();
        interner.get_or_intern(INTERGENIC);
        AnnotationStoreBuilder {
            interner,
            by_ref: HashMap::new(),
        }
    }

    pub fn intern(&mut self, s: &str) -> Symbol {
        self.interner.get_or_intern(s)
    }

    pub fn push(&mut self, ref_name: &str, entry: FeatureEntry) {
        self.by_ref.entry(ref_name.to_string()).or_default().push(entry);
    }

    pub fn build(self) -> CompiledAnnotation {
        let AnnotationStoreBuilder { interner, by_ref } = self;
        let refs = by_ref
            .into_iter()
            .map(|(name, entries)| {
                let tree = IntervalTree::build(entries, |sym| {
                    interner.resolve(sym).unwrap_or("")
                });
                (name, tree)
            })
            .collect();
        CompiledAnnotation { interner, refs }
    }
}

impl Default for AnnotationStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct CompiledAnnotation {
    interner: StringInterner<StringBackend>,
    refs: HashMap<String, IntervalTree>,
}

impl CompiledAnnotation {
    pub fn resolve(&self, symbol: Symbol) -> &str {
        self.interner.resolve(symbol).unwrap_or("<unknown>")
    }

    pub fn get_symbol(&self, s: &str) -> Option<Symbol> {
        self.interner.get(s)
    }

    pub fn intergenic_symbol(&self) -> Symbol {
        self.get_symbol(INTERGENIC)
            .expect("intergenic placeholder is interned by AnnotationStoreBuilder::new")
    }

    // unknown references are never an error, just no hits
    pub fn search(&self, ref_name: &str, query: Interval) -> Vec<(EntryId, &FeatureEntry)> {
        match self.refs.get(ref_name) {
            Some(tree) => tree
                .search(query)
                .into_iter()
                .map(|id| (id, tree.entry(id)))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn reference_count(&self) -> usize {
        self.refs.len()
    }

    pub fn entry_count(&self) -> usize {
        self.refs.values().map(|t| t.len()).sum()
    }
}

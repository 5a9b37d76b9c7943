use std::collections::HashMap;

use crate::classify::AlignmentVerdict;
use crate::model::Symbol;
use crate::store::CompiledAnnotation;

#[derive(Debug, Default, Clone, Copy)]
pub struct PairSummary {
    pub single_gene_pairs: u64,
    pub multi_gene_pairs: u64,
    pub no_gene_pairs: u64,
    pub single_end_reads: u64,
}

impl PairSummary {
    fn merge(&mut self, other: &PairSummary) {
        self.single_gene_pairs += other.single_gene_pairs;
        self.multi_gene_pairs += other.multi_gene_pairs;
        self.no_gene_pairs += other.no_gene_pairs;
        self.single_end_reads += other.single_end_reads;
    }
}

#[derive(Debug, Default)]
pub struct CountTables {
    pub gene_counts: HashMap<Symbol, u64>,
    // keyed by (feature_type, is_multi_gene)
    pub type_counts: HashMap<(Symbol, bool), u64>,
    pub gene_type_counts: HashMap<Symbol, u64>,
    // keyed by (end1_label, end2_label)
    pub pair_pattern_counts: HashMap<(Symbol, Symbol), u64>,
    pub pair_summary: PairSummary,
}

impl CountTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_alignment_verdict(&mut self, verdict: &AlignmentVerdict, annotation: &CompiledAnnotation) {
        let Some(label) = verdict.type_label() else {
            return;
        };
        let multi_gene = !verdict.is_hit();
        let sym = annotation
            .get_symbol(label)
            .expect("type label must already be interned by the GTF reader");
        *self.type_counts.entry((sym, multi_gene)).or_insert(0) += 1;

        if let Some(gene_id) = verdict.gene_id {
            *self.gene_counts.entry(gene_id).or_insert(0) += 1;
            if verdict.exon_found {
                if let Some(gene_type) = verdict.gene_type {
                    *self.gene_type_counts.entry(gene_type).or_insert(0) += 1;
                }
            }
        }
    }

    pub fn record_pair_pattern(&mut self, end1_label: Symbol, end2_label: Symbol) {
        *self.pair_pattern_counts.entry((end1_label, end2_label)).or_insert(0) += 1;
    }

    pub fn merge(mut self, other: CountTables) -> CountTables {
        for (k, v) in other.gene_counts {
            *self.gene_counts.entry(k).or_insert(0) += v;
        }
        for (k, v) in other.type_counts {
            *self.type_counts.entry(k).or_insert(0) += v;
        }
        for (k, v) in other.gene_type_counts {
            *self.gene_type_counts.entry(k).or_insert(0) += v;
        }
        for (k, v) in other.pair_pattern_counts {
            *self.pair_pattern_counts.entry(k).or_insert(0) += v;
        }
        self.pair_summary.merge(&other.pair_summary);
        self
    }
}

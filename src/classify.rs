use crate::model::{Block, Map, Symbol};
use crate::store::CompiledAnnotation;

const EXON: &str = "exon";
const GENE: &str = "gene";

struct BlockVerdict {
    gene_id: Option<Symbol>,
    gene_type: Option<Symbol>,
    best_local_overlap: f64,
    exon_found: bool,
    gene_pass_found: bool,
    multi_gene: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct AlignmentVerdict {
    pub gene_id: Option<Symbol>,
    pub gene_type: Option<Symbol>,
    pub score: f64,
    // set even when the final verdict is null because of a gene conflict
    pub exon_found: bool,
    // only possible when exon_found is false
    pub gene_pass_found: bool,
}

impl AlignmentVerdict {
    pub fn is_hit(&self) -> bool {
        self.gene_id.is_some()
    }

    pub fn type_label(&self) -> Option<&'static str> {
        if self.exon_found {
            Some("exon")
        } else if self.gene_pass_found {
            Some("gene")
        } else {
            None
        }
    }
}

// read_length is be - bs, not the 1-based-inclusive length; computed in
// signed arithmetic so a feature partially outside the read can't underflow
fn local_overlap(bs: u64, be: u64, fs: u64, fe: u64) -> f64 {
    let read_length = (be - bs) as f64;
    let feature_length = (fe - fs) as i64;
    let s: i64 = if fs < bs { (bs - fs) as i64 } else { 0 };
    let e: i64 = if fe > be { (fe - be) as i64 } else { 0 };
    let over = (feature_length - s - e) as f64;
    over / read_length
}

fn classify_block(annotation: &CompiledAnnotation, block: &Block) -> BlockVerdict {
    let mut verdict = BlockVerdict {
        gene_id: None,
        gene_type: None,
        best_local_overlap: 0.0,
        exon_found: false,
        gene_pass_found: false,
        multi_gene: false,
    };

    let hits = annotation.search(&block.ref_name, block.interval());

    let exon_sym = annotation.get_symbol(EXON);
    run_pass(annotation, &hits, exon_sym, &mut verdict, block, true);

    if !verdict.exon_found {
        let gene_sym = annotation.get_symbol(GENE);
        run_pass(annotation, &hits, gene_sym, &mut verdict, block, false);
    }

    verdict
}

#[allow(clippy::too_many_arguments)]
fn run_pass(
    _annotation: &CompiledAnnotation,
    hits: &[(crate::tree::EntryId, &crate::model::FeatureEntry)],
    want_type: Option<Symbol>,
    verdict: &mut BlockVerdict,
    block: &Block,
    is_exon_pass: bool,
) {
    let Some(want_type) = want_type else { return };
    for (_, entry) in hits {
        if entry.feature_type != want_type {
            continue;
        }
        let Some(gene_id) = entry.gene_id else { continue };
        if is_exon_pass {
            verdict.exon_found = true;
        } else {
            verdict.gene_pass_found = true;
        }
        if verdict.gene_id.is_none() || verdict.gene_id == Some(gene_id) {
            let overlap = local_overlap(block.begin, block.end, entry.interval.start, entry.interval.end);
            verdict.best_local_overlap = verdict.best_local_overlap.max(overlap);
            verdict.gene_id = Some(gene_id);
            verdict.gene_type = entry.gene_type;
        } else {
            verdict.multi_gene = true;
        }
    }
}

pub fn classify_alignment(annotation: &CompiledAnnotation, maps: &[Map]) -> AlignmentVerdict {
    let mut chosen_gene_id: Option<Symbol> = None;
    let mut chosen_gene_type: Option<Symbol> = None;
    let mut sum_overlap = 0.0f64;
    let mut block_count: u64 = 0;
    let mut exon_found = false;
    let mut gene_pass_found = false;
    let mut multi_gene = false;

    for map in maps {
        for block in &map.0 {
            let bv = classify_block(annotation, block);
            if bv.multi_gene {
                multi_gene = true;
            }
            if bv.exon_found {
                exon_found = true;
            }
            if bv.gene_pass_found {
                gene_pass_found = true;
            }
            if let Some(gid) = bv.gene_id {
                match chosen_gene_id {
                    None => {
                        chosen_gene_id = Some(gid);
                        chosen_gene_type = bv.gene_type;
                    }
                    Some(existing) if existing == gid => {
                        chosen_gene_type = bv.gene_type;
                    }
                    Some(_) => {
                        multi_gene = true;
                    }
                }
            }
            sum_overlap += bv.best_local_overlap;
            block_count += 1;
        }
    }

    if chosen_gene_id.is_some() && !multi_gene {
        AlignmentVerdict {
            gene_id: chosen_gene_id,
            gene_type: chosen_gene_type,
            score: if block_count > 0 { sum_overlap / block_count as f64 } else { 0.0 },
            exon_found,
            gene_pass_found,
        }
    } else {
        AlignmentVerdict {
            gene_id: None,
            gene_type: None,
            score: 0.0,
            exon_found,
            gene_pass_found,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Interval, Strand};
    use crate::store::AnnotationStoreBuilder;

    fn block(ref_name: &str, begin: u64, end: u64) -> Block {
        Block {
            ref_name: ref_name.to_string(),
            begin,
            end,
        }
    }

    fn single_block_map(ref_name: &str, begin: u64, end: u64) -> Vec<Map> {
        vec![Map(vec![block(ref_name, begin, end)])]
    }

    #[test]
    fn s1_exon_single_hit() {
        let mut builder = AnnotationStoreBuilder::new();
        let feature_type = builder.intern("exon");
        let gene_id = builder.intern("G1");
        let gene_type = builder.intern("protein_coding");
        builder.push(
            "chr1",
            crate::model::FeatureEntry {
                interval: Interval::new(100, 200),
                strand: Strand::Forward,
                feature_type,
                gene_id: Some(gene_id),
                gene_type: Some(gene_type),
            },
        );
        let annotation = builder.build();
        let verdict = classify_alignment(&annotation, &single_block_map("chr1", 120, 180));
        assert!(verdict.is_hit());
        assert_eq!(annotation.resolve(verdict.gene_id.unwrap()), "G1");
        assert!(verdict.exon_found);
    }

    #[test]
    fn s2_multi_gene_exon_overlap() {
        let mut builder = AnnotationStoreBuilder::new();
        let exon = builder.intern("exon");
        let g1 = builder.intern("G1");
        let g2 = builder.intern("G2");
        let biotype = builder.intern("protein_coding");
        builder.push(
            "chr1",
            crate::model::FeatureEntry {
                interval: Interval::new(100, 200),
                strand: Strand::Forward,
                feature_type: exon,
                gene_id: Some(g1),
                gene_type: Some(biotype),
            },
        );
        builder.push(
            "chr1",
            crate::model::FeatureEntry {
                interval: Interval::new(150, 250),
                strand: Strand::Forward,
                feature_type: exon,
                gene_id: Some(g2),
                gene_type: Some(biotype),
            },
        );
        let annotation = builder.build();
        let verdict = classify_alignment(&annotation, &single_block_map("chr1", 160, 190));
        assert!(!verdict.is_hit());
        assert!(verdict.exon_found);
    }

    #[test]
    fn s3_intronic_fallback() {
        let mut builder = AnnotationStoreBuilder::new();
        let gene_feature = builder.intern("gene");
        let exon_feature = builder.intern("exon");
        let gene_id = builder.intern("G1");
        builder.push(
            "chr1",
            crate::model::FeatureEntry {
                interval: Interval::new(1, 10000),
                strand: Strand::Forward,
                feature_type: gene_feature,
                gene_id: Some(gene_id),
                gene_type: None,
            },
        );
        builder.push(
            "chr1",
            crate::model::FeatureEntry {
                interval: Interval::new(1, 100),
                strand: Strand::Forward,
                feature_type: exon_feature,
                gene_id: Some(gene_id),
                gene_type: None,
            },
        );
        builder.push(
            "chr1",
            crate::model::FeatureEntry {
                interval: Interval::new(9900, 10000),
                strand: Strand::Forward,
                feature_type: exon_feature,
                gene_id: Some(gene_id),
                gene_type: None,
            },
        );
        let annotation = builder.build();
        let verdict = classify_alignment(&annotation, &single_block_map("chr1", 5000, 5100));
        assert!(verdict.is_hit());
        assert!(!verdict.exon_found);
    }

    #[test]
    fn s4_spliced_alignment_averages_overlap() {
        let mut builder = AnnotationStoreBuilder::new();
        let exon = builder.intern("exon");
        let g1 = builder.intern("G1");
        builder.push(
            "chr1",
            crate::model::FeatureEntry {
                interval: Interval::new(100, 200),
                strand: Strand::Forward,
                feature_type: exon,
                gene_id: Some(g1),
                gene_type: None,
            },
        );
        builder.push(
            "chr1",
            crate::model::FeatureEntry {
                interval: Interval::new(5000, 5100),
                strand: Strand::Forward,
                feature_type: exon,
                gene_id: Some(g1),
                gene_type: None,
            },
        );
        let annotation = builder.build();
        let maps = vec![Map(vec![block("chr1", 100, 200), block("chr1", 5000, 5100)])];
        let verdict = classify_alignment(&annotation, &maps);
        assert!(verdict.is_hit());
        assert!(verdict.exon_found);
    }

    #[test]
    fn s6_unknown_reference_is_null_not_error() {
        let builder = AnnotationStoreBuilder::new();
        let annotation = builder.build();
        let verdict = classify_alignment(&annotation, &single_block_map("chr_unknown", 1, 100));
        assert!(!verdict.is_hit());
    }
}

use crate::classify::AlignmentVerdict;
use crate::counts::CountTables;
use crate::store::CompiledAnnotation;

// caller is expected to only call this for a template with exactly one
// accepted mmap and both ends mapped; anything else is handled as
// independent single ends
pub fn classify_pair(counts: &mut CountTables, annotation: &CompiledAnnotation, v1: &AlignmentVerdict, v2: &AlignmentVerdict) {
    match (v1.gene_id, v2.gene_id) {
        (Some(g1), Some(g2)) if g1 == g2 => {
            counts.pair_summary.single_gene_pairs += 1;
            let s1 = v1
                .type_label()
                .map(|l| annotation.get_symbol(l).expect("end1 type label must be interned"))
                .unwrap_or_else(|| annotation.intergenic_symbol());
            let s2 = v2
                .type_label()
                .map(|l| annotation.get_symbol(l).expect("end2 type label must be interned"))
                .unwrap_or_else(|| annotation.intergenic_symbol());
            counts.record_pair_pattern(s1, s2);
        }
        (Some(_), Some(_)) => {
            counts.pair_summary.multi_gene_pairs += 1;
        }
        _ => {
            counts.pair_summary.no_gene_pairs += 1;
        }
    }

    counts.record_alignment_verdict(v1, annotation);
    counts.record_alignment_verdict(v2, annotation);
}

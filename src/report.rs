use anyhow::Result;
use itertools::Itertools;
use std::io::Write;

use crate::counts::CountTables;
use crate::store::CompiledAnnotation;

const DASH: &str = "-----------------------------------------------------------------------";

pub fn write_report<W: Write>(annotation: &CompiledAnnotation, counts: &CountTables, out: &mut W) -> Result<()> {
    let ps = &counts.pair_summary;
    let grand_total = ps.single_end_reads + 2 * (ps.single_gene_pairs + ps.multi_gene_pairs + ps.no_gene_pairs);

    let (multi, single): (Vec<(&str, u64)>, Vec<(&str, u64)>) = counts
        .type_counts
        .iter()
        .map(|(&(sym, is_mg), &count)| (is_mg, (annotation.resolve(sym), count)))
        .partition_map(|(is_mg, pair)| if is_mg { itertools::Either::Left(pair) } else { itertools::Either::Right(pair) });
    let single = single.into_iter().sorted().collect_vec();
    let multi = multi.into_iter().sorted().collect_vec();
    let single_total: u64 = single.iter().map(|(_, c)| c).sum();
    let multi_total: u64 = multi.iter().map(|(_, c)| c).sum();

    writeln!(
        out,
        "Annotation type counts for single gene hits (Single: {} ({:.2}%))",
        single_total,
        pct(single_total, grand_total)
    )?;
    writeln!(out, "{DASH}")?;
    for (label, count) in &single {
        writeln!(out, "  {label:>40}: {count} ({:.5}%)", pct(*count, single_total))?;
    }
    writeln!(out, "{DASH}")?;

    writeln!(
        out,
        "Annotation type counts for multi gene hits (Multi: {} ({:.2}%))",
        multi_total,
        pct(multi_total, grand_total)
    )?;
    writeln!(out, "{DASH}")?;
    for (label, count) in &multi {
        writeln!(out, "  {label:>40}: {count} ({:.5}%)", pct(*count, multi_total))?;
    }
    writeln!(out, "{DASH}")?;

    let mut gene_types: Vec<(&str, u64)> = counts
        .gene_type_counts
        .iter()
        .map(|(sym, c)| (annotation.resolve(*sym), *c))
        .collect();
    gene_types.sort_unstable();
    let gene_types_total: u64 = gene_types.iter().map(|(_, c)| c).sum();
    writeln!(out, "Gene type counts for single gene Exons ({gene_types_total})")?;
    writeln!(out, "{DASH}")?;
    for (label, count) in &gene_types {
        writeln!(out, "  {label:>40}: {count} ({:.5}%)", pct(*count, gene_types_total))?;
    }
    writeln!(out, "{DASH}")?;

    let mut patterns: Vec<(String, u64)> = counts
        .pair_pattern_counts
        .iter()
        .map(|(&(a, b), &c)| (format!("{}/{}", annotation.resolve(a), annotation.resolve(b)), c))
        .collect();
    patterns.sort_unstable();
    let patterns_total: u64 = patterns.iter().map(|(_, c)| c).sum();
    writeln!(out, "Paired-read patterns ({patterns_total})")?;
    writeln!(out, "{DASH}")?;
    for (label, count) in &patterns {
        writeln!(out, "  {label:>40}: {count} ({:.5}%)", pct(*count, patterns_total))?;
    }
    writeln!(out, "{DASH}")?;

    let paired_total = ps.single_gene_pairs + ps.multi_gene_pairs + ps.no_gene_pairs;
    let grand = paired_total + ps.single_end_reads;
    writeln!(
        out,
        "Paired-reads Gene-Matches (pairs: {paired_total} singles: {} total: {grand})",
        ps.single_end_reads
    )?;
    writeln!(out, "{DASH}")?;
    writeln!(
        out,
        "  {:>40}: {} ({:.5}%)",
        "Single end reads",
        ps.single_end_reads,
        pct(ps.single_end_reads, grand)
    )?;
    writeln!(
        out,
        "  {:>40}: {} ({:.5}%)",
        "Pair not mapped to gene",
        ps.no_gene_pairs,
        pct(ps.no_gene_pairs, grand)
    )?;
    writeln!(
        out,
        "  {:>40}: {} ({:.5}%)",
        "Pair mapped to single gene",
        ps.single_gene_pairs,
        pct(ps.single_gene_pairs, grand)
    )?;
    writeln!(
        out,
        "  {:>40}: {} ({:.5}%)",
        "Pair mapped to multiple genes",
        ps.multi_gene_pairs,
        pct(ps.multi_gene_pairs, grand)
    )?;
    writeln!(out, "{DASH}")?;

    Ok(())
}

pub fn write_gene_counts<W: Write>(annotation: &CompiledAnnotation, counts: &CountTables, out: &mut W) -> Result<()> {
    let mut rows: Vec<(&str, u64)> = counts
        .gene_counts
        .iter()
        .map(|(sym, c)| (annotation.resolve(*sym), *c))
        .collect();
    rows.sort_unstable();
    for (gene_id, count) in rows {
        writeln!(out, "{gene_id}\t{count}")?;
    }
    Ok(())
}

fn pct(n: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        n as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::AnnotationStoreBuilder;

    #[test]
    fn report_renders_without_panicking_on_empty_counts() {
        let builder = AnnotationStoreBuilder::new();
        let annotation = builder.build();
        let counts = CountTables::new();
        let mut buf = Vec::new();
        write_report(&annotation, &counts, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Annotation type counts for single gene hits"));
        assert!(text.contains("Paired-reads Gene-Matches"));
    }

    #[test]
    fn gene_counts_tsv_has_one_line_per_gene() {
        let mut builder = AnnotationStoreBuilder::new();
        let g1 = builder.intern("G1");
        let annotation = builder.build();
        let mut counts = CountTables::new();
        counts.gene_counts.insert(g1, 3);
        let mut buf = Vec::new();
        write_gene_counts(&annotation, &counts, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "G1\t3\n");
    }
}

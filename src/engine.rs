use std::io::BufRead;
use std::sync::Mutex;

use anyhow::{Context, Result};
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::classify::classify_alignment;
use crate::counts::CountTables;
use crate::mapfmt::MapReader;
use crate::model::{Alignment, Template};
use crate::pairs::classify_pair;
use crate::store::CompiledAnnotation;

const BATCH_SIZE: usize = 256;

struct TemplateSource<R> {
    reader: Mutex<MapReader<R>>,
}

impl<R: BufRead> TemplateSource<R> {
    fn pull_batch(&self) -> Result<Vec<Template>> {
        let mut reader = self.reader.lock().expect("MAP reader mutex poisoned");
        let mut batch = Vec::with_capacity(BATCH_SIZE);
        for _ in 0..BATCH_SIZE {
            match reader.next_template()? {
                Some(template) => batch.push(template),
                None => break,
            }
        }
        Ok(batch)
    }
}

pub fn run<R: BufRead + Send>(
    annotation: &CompiledAnnotation,
    reader: MapReader<R>,
    workers: usize,
) -> Result<CountTables> {
    let source = TemplateSource {
        reader: Mutex::new(reader),
    };
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .context("building worker thread pool")?;

    pool.install(|| {
        (0..workers)
            .into_par_iter()
            .map(|_| worker_loop(annotation, &source))
            .try_reduce(CountTables::new, |a, b| Ok(a.merge(b)))
    })
}

fn worker_loop<R: BufRead + Send>(annotation: &CompiledAnnotation, source: &TemplateSource<R>) -> Result<CountTables> {
    let mut counts = CountTables::new();
    loop {
        let batch = source.pull_batch()?;
        if batch.is_empty() {
            break;
        }
        for template in batch {
            process_template(annotation, &mut counts, template);
        }
    }
    Ok(counts)
}

fn process_template(annotation: &CompiledAnnotation, counts: &mut CountTables, template: Template) {
    match template {
        Template::SingleEnd { alignment, .. } => {
            process_single_end(annotation, counts, &alignment);
        }
        Template::PairedEnd { end1, end2, mmaps, .. } => {
            if mmaps.len() == 1 {
                let mmap = mmaps[0];
                let v1 = classify_alignment(annotation, std::slice::from_ref(&end1.0[mmap.map1]));
                let v2 = classify_alignment(annotation, std::slice::from_ref(&end2.0[mmap.map2]));
                classify_pair(counts, annotation, &v1, &v2);
            } else {
                process_single_end(annotation, counts, &end1);
                process_single_end(annotation, counts, &end2);
            }
        }
    }
}

// used both for real single-end templates and for each end of a paired-end
// template whose pairing doesn't qualify as a single-gene pair
fn process_single_end(annotation: &CompiledAnnotation, counts: &mut CountTables, alignment: &Alignment) {
    let verdict = classify_alignment(annotation, &alignment.0);
    counts.record_alignment_verdict(&verdict, annotation);
    if alignment.0.len() == 1 {
        counts.pair_summary.single_end_reads += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapfmt::MapReader;
    use crate::model::{FeatureEntry, Interval, Strand};
    use crate::store::AnnotationStoreBuilder;
    use std::io::Cursor;

    fn sample_annotation() -> CompiledAnnotation {
        let mut builder = AnnotationStoreBuilder::new();
        let exon = builder.intern("exon");
        let gene_id = builder.intern("G1");
        let gene_type = builder.intern("protein_coding");
        builder.push(
            "chr1",
            FeatureEntry {
                interval: Interval::new(100, 200),
                strand: Strand::Forward,
                feature_type: exon,
                gene_id: Some(gene_id),
                gene_type: Some(gene_type),
            },
        );
        builder.build()
    }

    fn map_text() -> String {
        let mut lines = String::new();
        for i in 0..50 {
            lines.push_str(&format!("r{i}\tSE\tchr1:120-180\t-\t-\n"));
        }
        lines
    }

    #[test]
    fn single_worker_and_multi_worker_agree() {
        let annotation = sample_annotation();
        let text = map_text();

        let reader1 = MapReader::new(Cursor::new(text.as_bytes()), false);
        let counts1 = run(&annotation, reader1, 1).unwrap();

        let reader4 = MapReader::new(Cursor::new(text.as_bytes()), false);
        let counts4 = run(&annotation, reader4, 4).unwrap();

        assert_eq!(counts1.gene_counts, counts4.gene_counts);
        assert_eq!(counts1.type_counts, counts4.type_counts);
        assert_eq!(counts1.pair_summary.single_end_reads, counts4.pair_summary.single_end_reads);
        assert_eq!(counts1.pair_summary.single_end_reads, 50);
    }

    #[test]
    fn paired_single_gene_hits_pair_classifier() {
        let annotation = sample_annotation();
        let text = "r1\tPE\tchr1:120-180\tchr1:120-180\t0:0\n";
        let reader = MapReader::new(Cursor::new(text.as_bytes()), true);
        let counts = run(&annotation, reader, 1).unwrap();
        assert_eq!(counts.pair_summary.single_gene_pairs, 1);
        assert_eq!(counts.pair_summary.single_end_reads, 0);
    }
}

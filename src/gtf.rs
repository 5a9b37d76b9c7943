use anyhow::{Context, Result};
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::io::open_file;
use crate::model::{FeatureEntry, Interval, Strand};
use crate::store::AnnotationStoreBuilder;

/// Reads a (possibly gzip/zstd-compressed) GTF file into `builder`. Malformed
/// lines are skipped rather than aborting the run. Returns the number of
/// feature lines retained.
pub fn read_gtf(filename: impl AsRef<Path>, builder: &mut AnnotationStoreBuilder) -> Result<usize> {
    let f = BufReader::new(
        open_file(filename.as_ref()).with_context(|| format!("opening {:?}", filename.as_ref()))?,
    );
    let mut count = 0;
    for line in f.lines() {
        let line = line?;
        if line.starts_with('#') || line.is_empty() {
            continue;
        }
        if let Some((ref_name, feature_entry)) = parse_line(&line, builder) {
            builder.push(&ref_name, feature_entry);
            count += 1;
        }
    }
    Ok(count)
}

fn parse_line(line: &str, builder: &mut AnnotationStoreBuilder) -> Option<(String, FeatureEntry)> {
    let mut parts = line.splitn(9, '\t');
    let seqname = parts.next()?;
    parts.next(); // source
    let feature = parts.next()?;
    let start: u64 = parts.next()?.parse().ok()?;
    let end: u64 = parts.next()?.parse().ok()?;
    if start == 0 || start > end {
        return None;
    }
    parts.next(); // score
    let strand = Strand::from_gtf_char(parts.next()?);
    parts.next(); // frame
    let attributes = parts.next().unwrap_or("");

    let mut gene_id: Option<&str> = None;
    let mut gene_type: Option<&str> = None;
    for attr in attributes
        .split_terminator(';')
        .map(str::trim_start)
        .filter(|x| !x.is_empty())
    {
        let mut kv = attr.splitn(2, ' ');
        let key = kv.next()?;
        let raw_value = kv.next()?;
        let value = strip_value(raw_value);
        match key {
            "gene_id" => gene_id = Some(value),
            "gene_type" | "gene_biotype" => gene_type = Some(value),
            _ => {}
        }
    }

    let feature_type = builder.intern(feature);
    let gene_id = gene_id.map(|v| builder.intern(v));
    let gene_type = gene_type.map(|v| builder.intern(v));

    Some((
        seqname.to_string(),
        FeatureEntry {
            interval: Interval::new(start, end),
            strand,
            feature_type,
            gene_id,
            gene_type,
        },
    ))
}

fn strip_value(raw: &str) -> &str {
    raw.trim().trim_matches('"')
}

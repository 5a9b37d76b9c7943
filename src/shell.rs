use anyhow::Result;
use regex::Regex;
use std::io::{BufRead, Write};
use std::sync::LazyLock;

use crate::model::{FeatureEntry, Interval};
use crate::store::CompiledAnnotation;

static QUERY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^:\s]+):(\d+)(?:-(\d+))?$").expect("static query regex is valid"));

pub fn run_shell<R: BufRead, W: Write>(annotation: &CompiledAnnotation, mut input: R, mut out: W) -> Result<()> {
    write!(out, ">")?;
    out.flush()?;
    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let trimmed = line.trim();
        match parse_query(trimmed) {
            None => {
                writeln!(out, "Unable to parse query, expected ref:start[-end]")?;
            }
            Some((_, start, end)) if start > end => {
                writeln!(out, "start > end not allowed!")?;
            }
            Some((ref_name, start, end)) => {
                let hits = annotation.search(&ref_name, Interval::new(start, end));
                if hits.is_empty() {
                    writeln!(out, "Nothing found :(")?;
                } else {
                    for (_, entry) in &hits {
                        writeln!(out, "{}", format_entry(annotation, &ref_name, entry))?;
                    }
                }
            }
        }
        write!(out, ">")?;
        out.flush()?;
    }
    Ok(())
}

fn parse_query(line: &str) -> Option<(String, u64, u64)> {
    let caps = QUERY_RE.captures(line)?;
    let ref_name = caps.get(1)?.as_str().to_string();
    let start: u64 = caps.get(2)?.as_str().parse().ok()?;
    let end: u64 = match caps.get(3) {
        Some(m) => m.as_str().parse().ok()?,
        None => start,
    };
    Some((ref_name, start, end))
}

fn format_entry(annotation: &CompiledAnnotation, ref_name: &str, entry: &FeatureEntry) -> String {
    let gene_id = entry.gene_id.map(|s| annotation.resolve(s)).unwrap_or("-");
    let gene_type = entry.gene_type.map(|s| annotation.resolve(s)).unwrap_or("-");
    format!(
        "{}:{}-{}\ttype={}\tgene_id={}\tgene_type={}",
        ref_name,
        entry.interval.start,
        entry.interval.end,
        annotation.resolve(entry.feature_type),
        gene_id,
        gene_type
    )
}

// one record per line: qname \t kind \t end1_maps \t end2_maps \t mmaps
// kind is SE or PE; a maps field is - or a comma-separated list of maps;
// a map is a +-separated list of blocks; a block is ref:start-end
// (1-based inclusive); mmaps is - or a comma-separated list of i:j pairs
// indexing into end1_maps/end2_maps. a malformed record is a fatal error.

use anyhow::{bail, Context, Result};
use std::io::BufRead;

use crate::model::{Alignment, Block, Map, MMap, Template};

pub struct MapReader<R> {
    inner: R,
    line_no: u64,
    expect_paired: bool,
}

impl<R: BufRead> MapReader<R> {
    pub fn new(inner: R, expect_paired: bool) -> Self {
        MapReader {
            inner,
            line_no: 0,
            expect_paired,
        }
    }

    pub fn next_template(&mut self) -> Result<Option<Template>> {
        let mut line = String::new();
        loop {
            line.clear();
            let n = self
                .inner
                .read_line(&mut line)
                .with_context(|| format!("reading MAP input at line {}", self.line_no + 1))?;
            if n == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            let trimmed = line.trim_end_matches(['\n', '\r']);
            if trimmed.is_empty() {
                continue;
            }
            return parse_template_line(trimmed, self.expect_paired)
                .with_context(|| format!("malformed MAP record at line {}", self.line_no))
                .map(Some);
        }
    }
}

fn parse_template_line(line: &str, expect_paired: bool) -> Result<Template> {
    let mut fields = line.splitn(5, '\t');
    let name = fields.next().context("missing qname field")?.to_string();
    let kind = fields.next().context("missing kind field")?;
    let end1_field = fields.next().context("missing end1_maps field")?;
    let end2_field = fields.next().context("missing end2_maps field")?;
    let mmaps_field = fields.next().context("missing mmaps field")?;

    match kind {
        "SE" => {
            if expect_paired {
                bail!("record {name:?} is SE but --paired was requested");
            }
            if end2_field != "-" || mmaps_field != "-" {
                bail!("SE record {name:?} must have '-' end2_maps and mmaps fields");
            }
            let alignment = parse_alignment(end1_field)?;
            Ok(Template::SingleEnd { name, alignment })
        }
        "PE" => {
            if !expect_paired {
                bail!("record {name:?} is PE but --paired was not requested");
            }
            let end1 = parse_alignment(end1_field)?;
            let end2 = parse_alignment(end2_field)?;
            let mmaps = parse_mmaps(mmaps_field, end1.0.len(), end2.0.len())?;
            Ok(Template::PairedEnd { name, end1, end2, mmaps })
        }
        other => bail!("unknown template kind {other:?}, expected SE or PE"),
    }
}

fn parse_alignment(field: &str) -> Result<Alignment> {
    if field == "-" {
        return Ok(Alignment::default());
    }
    let maps = field.split(',').map(parse_map).collect::<Result<Vec<_>>>()?;
    Ok(Alignment(maps))
}

fn parse_map(field: &str) -> Result<Map> {
    let blocks = field.split('+').map(parse_block).collect::<Result<Vec<_>>>()?;
    if blocks.is_empty() {
        bail!("map with no blocks");
    }
    Ok(Map(blocks))
}

fn parse_block(field: &str) -> Result<Block> {
    let (ref_name, range) = field
        .rsplit_once(':')
        .with_context(|| format!("block {field:?} is missing 'ref:start-end'"))?;
    let (start_s, end_s) = range
        .split_once('-')
        .with_context(|| format!("block {field:?} is missing 'start-end'"))?;
    let begin: u64 = start_s.parse().with_context(|| format!("bad start in block {field:?}"))?;
    let end: u64 = end_s.parse().with_context(|| format!("bad end in block {field:?}"))?;
    if ref_name.is_empty() || begin > end {
        bail!("block {field:?} has an invalid range");
    }
    Ok(Block {
        ref_name: ref_name.to_string(),
        begin,
        end,
    })
}

fn parse_mmaps(field: &str, end1_len: usize, end2_len: usize) -> Result<Vec<MMap>> {
    if field == "-" {
        return Ok(Vec::new());
    }
    field
        .split(',')
        .map(|pair| {
            let (i, j) = pair
                .split_once(':')
                .with_context(|| format!("mmap {pair:?} is missing 'i:j'"))?;
            let map1: usize = i.parse().with_context(|| format!("bad end1 index in mmap {pair:?}"))?;
            let map2: usize = j.parse().with_context(|| format!("bad end2 index in mmap {pair:?}"))?;
            if map1 >= end1_len || map2 >= end2_len {
                bail!("mmap {pair:?} indexes a map that doesn't exist");
            }
            Ok(MMap { map1, map2 })
        })
        .collect()
}

use anyhow::{Context, Result};
use ex::Wrapper;
use std::io::{BufRead, BufReader, Write};

pub mod cli;
mod classify;
pub mod counts;
pub mod engine;
mod gtf;
mod io;
pub mod mapfmt;
pub mod model;
mod pairs;
mod report;
mod shell;
pub mod store;
pub mod tree;

use cli::Cli;

pub fn run(cli: &Cli) -> Result<()> {
    if cli.json_dump {
        println!("{}", serde_json::to_string_pretty(cli)?);
        return Ok(());
    }

    measure_time::info_time!("total runtime");

    let mut builder = store::AnnotationStoreBuilder::new();
    {
        measure_time::info_time!("reading GTF annotation");
        let n = gtf::read_gtf(&cli.annotation, &mut builder)
            .with_context(|| format!("Could not read GTF annotation file {}", cli.annotation))?;
        log::info!("read {n} GTF feature entries");
    }
    let annotation = builder.build();

    if cli.shell {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        return shell::run_shell(&annotation, stdin.lock(), stdout.lock());
    }

    let input: Box<dyn BufRead + Send> = match &cli.input {
        Some(path) => Box::new(BufReader::new(
            io::open_file(path).with_context(|| format!("Could not open MAP input file {path}"))?,
        )),
        None => Box::new(BufReader::new(std::io::stdin())),
    };
    let source = mapfmt::MapReader::new(input, cli.paired);

    let counts = {
        measure_time::info_time!("counting alignments");
        engine::run(&annotation, source, cli.threads.max(1))?
    };

    let mut out: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(std::io::BufWriter::new(
            ex::fs::File::create(path)
                .with_context(|| format!("Could not open output file {path}"))?
                .into_inner(),
        )),
        None => Box::new(std::io::BufWriter::new(std::io::stdout())),
    };
    report::write_report(&annotation, &counts, &mut out)?;

    if let Some(path) = &cli.gene_counts {
        let mut f = std::io::BufWriter::new(
            ex::fs::File::create(path)
                .with_context(|| format!("Could not open gene counts file {path}"))?
                .into_inner(),
        );
        report::write_gene_counts(&annotation, &counts, &mut f)?;
    }

    Ok(())
}

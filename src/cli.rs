use clap::Parser;
use serde::Serialize;

#[derive(Parser, Debug, Clone, Serialize)]
#[command(
    name = "mbf-map-quantifier",
    version,
    about = "Annotates MAP alignments against a GTF gene catalogue and reports per-gene/per-feature-type counts."
)]
pub struct Cli {
    /// MAP input file; reads stdin if omitted.
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<String>,

    /// Report output file; writes stdout if omitted.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<String>,

    /// Optional per-gene count TSV.
    #[arg(short = 'g', long = "gene-counts", value_name = "FILE")]
    pub gene_counts: Option<String>,

    /// Gene annotation in GTF format.
    #[arg(short, long, value_name = "FILE")]
    pub annotation: String,

    /// Treat the MAP input as paired-end.
    #[arg(short, long)]
    pub paired: bool,

    /// Number of parallel workers.
    #[arg(short, long, default_value_t = 1)]
    pub threads: usize,

    /// Increase logging verbosity; repeatable.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Drop into an interactive point-query shell instead of quantifying.
    #[arg(long)]
    pub shell: bool,

    /// Dump the parsed options as JSON and exit.
    #[arg(short = 'J')]
    pub json_dump: bool,
}

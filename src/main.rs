use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use clap::Parser;
use clap::error::ErrorKind;
use human_panic::{Metadata, setup_panic};

use mbf_map_quantifier::cli::Cli;

fn main() {
    // if not NO_FRIENDLY_PANIC in env
    if std::env::var("NO_FRIENDLY_PANIC").is_err() {
        setup_panic!(Metadata::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")));
    }

    // clap's usual exit code for a usage error is 2; this CLI's contract
    // is exit 1 for a missing/unknown flag, so the error path is handled
    // by hand instead of calling Cli::parse().
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{e}");
            std::process::exit(0);
        }
        Err(e) => {
            eprint!("{e}");
            std::process::exit(1);
        }
    };

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    if std::env::var("RUST_LOG").is_err() {
        // SAFETY: single-threaded at this point, before any worker pool exists.
        unsafe {
            std::env::set_var("RUST_LOG", log_level);
        }
    }
    env_logger::init();

    if let Err(e) = mbf_map_quantifier::run(&cli) {
        eprintln!("Unfortunatly an error was detected and lead to an early exit.\n\nDetails: {e:?}");
        std::process::exit(1);
    }
}

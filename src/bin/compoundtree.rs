//! Command-line interface for compoundtree
//!
//! Reads an `index<TAB>compound` corpus and writes one row per generated
//! tree.
//!
//! Usage:
//!   compoundtree --in `<corpus>` [--out `<rows>`] [--config `<toml>`]

use clap::{ArgAction, Parser};
use compoundtree::{
    AnalyzerConfig, CompoundReader, ErrorPolicy, Overrides, analyze_batch, write_rows,
};
use mimalloc::MiMalloc;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[command(name = "compoundtree")]
#[command(version, about = "Enumerate the binary trees of annotated compound nouns")]
struct Args {
    /// Input corpus, one `index<TAB>compound` per line (.gz allowed)
    #[arg(long = "in", value_name = "PATH")]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(long = "out", value_name = "PATH")]
    output: Option<PathBuf>,

    /// TOML configuration layered over the built-in defaults
    #[arg(long, short = 'c', value_name = "PATH")]
    config: Option<PathBuf>,

    /// Worker threads (0 = one per core)
    #[arg(long)]
    max_workers: Option<usize>,

    /// Largest number of subtrees to bracket
    #[arg(long)]
    max_segments: Option<usize>,

    /// Largest number of trees per word
    #[arg(long)]
    max_trees: Option<usize>,

    /// Leave failed words out instead of writing an `error` row
    #[arg(long)]
    skip_errors: bool,

    /// Log more (-v info, -vv debug)
    #[arg(long, short = 'v', action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let overrides = Overrides {
        workers: args.max_workers,
        max_segments: args.max_segments,
        max_trees: args.max_trees,
        skip_errors: args.skip_errors,
    };
    let config = AnalyzerConfig::load(args.config.as_deref(), &overrides)?;

    let entries = CompoundReader::from_file(&args.input)?.collect::<Result<Vec<_>, _>>()?;
    info!(words = entries.len(), path = %args.input.display(), "corpus read");

    let reports = analyze_batch(entries, &config.limits, &config.batch)?;

    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let rows = write_rows(&mut writer, &reports, config.batch.on_error)?;

    let failed = reports.iter().filter(|r| !r.is_ok()).count();
    if failed > 0 && config.batch.on_error == ErrorPolicy::Skip {
        info!(failed, "failed words left out");
    }
    info!(rows, "rows written");
    Ok(())
}

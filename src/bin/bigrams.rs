//! Count word bigrams in a text file and print the frequent ones.

use anyhow::{Context, Result};
use clap::Parser;
use fxtable::bigram::{self, DEFAULT_THRESHOLD};
use fxtable::{GrowthEvent, StrTable};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(about = "Count word bigrams in a text file")]
struct Args {
    /// Input text file.
    #[clap(default_value = "book.txt")]
    input: PathBuf,
    /// Report bigrams seen at least this many times.
    #[clap(short, long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: i32,
    /// Print collision counts whenever the table grows.
    #[clap(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let text = std::fs::read(&args.input)
        .with_context(|| format!("could not open {}", args.input.display()))?;

    let mut table = StrTable::try_new()?;
    if args.verbose {
        table.set_observer(|e: &GrowthEvent| {
            println!(
                "Rehashing reduced collisions from {} to {}",
                e.collisions_before, e.collisions_after
            );
        });
    }

    let pairs = bigram::count_bigrams(&mut table, &text)?;
    tracing::info!(
        input = %args.input.display(),
        bytes = text.len(),
        pairs,
        distinct = table.len(),
        capacity = table.capacity(),
        "input processed"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    bigram::report(&table, args.threshold, &mut out)?;
    out.flush()?;
    Ok(())
}

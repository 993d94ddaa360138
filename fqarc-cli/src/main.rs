#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
use cmd::{alphabet, compress, decompress, profile};
use human_panic::setup_panic;
use lazy_static::lazy_static;

use crate::logging::init_logging;
use crate::opts::{OutputMode, OutputWriter};
use crate::progress_bar::FqarcProgressBar;

mod cli;
mod cmd;
mod csv_stat;
mod logging;
mod opts;
mod progress_bar;

lazy_static! {
    pub(crate) static ref PROGRESS_BAR: FqarcProgressBar = FqarcProgressBar::new();
}

fn main() -> anyhow::Result<()> {
    setup_panic!();

    let cli: Cli = Cli::parse();

    if !cli.no_progress {
        PROGRESS_BAR.show();
    }

    init_logging(cli.verbose.log_level_filter()).expect("Could not initialize logging");

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(usize::from(threads))
            .build_global()
            .context("Could not initialize the thread pool")?;
    }

    match &cli.command {
        Commands::Compress {
            input,
            output,
            alphabet,
            symbols,
            no_identifiers,
        } => {
            let reader = input.as_reader()?;
            PROGRESS_BAR.set_total_bytes(reader.length()?.unwrap_or(0));
            let output =
                OutputWriter::from_path_and_input(output, &reader, "fqarc", OutputMode::Binary)?;
            let alphabet = alphabet
                .as_ref()
                .map(|path| path.read_alphabet())
                .transpose()?;

            compress::compress(
                reader.into_reopenable()?,
                output.into_write(),
                alphabet,
                symbols.into(),
                *no_identifiers,
                Arc::new(PROGRESS_BAR.clone()),
            )
            .context("Failed to compress given file")?;
        }
        Commands::Decompress { input, output } => {
            let reader = input.as_reader()?;
            PROGRESS_BAR.set_total_bytes(reader.length()?.unwrap_or(0));
            let output =
                OutputWriter::from_path_and_input(output, &reader, "fastq", OutputMode::Text)?;

            decompress::decompress(
                reader.into_read(),
                output.into_write(),
                Arc::new(PROGRESS_BAR.clone()),
            )
            .context("Failed to decompress given file")?;
        }
        Commands::Profile { input, csv } => {
            let reader = input.as_reader()?;
            PROGRESS_BAR.set_total_bytes(reader.length()?.unwrap_or(0));

            profile::profile(reader.into_read(), *csv)
                .context("Failed to profile given file")?;
        }
        Commands::Alphabet {
            input,
            output,
            symbols,
        } => {
            let reader = input.as_reader()?;
            PROGRESS_BAR.set_total_bytes(reader.length()?.unwrap_or(0));
            let output =
                OutputWriter::from_path_and_input(output, &reader, "json", OutputMode::Text)?;

            alphabet::alphabet(
                reader.into_read(),
                output.into_write(),
                symbols.into(),
                Arc::new(PROGRESS_BAR.clone()),
            )
            .context("Failed to build an alphabet for given file")?;
        }
    }

    PROGRESS_BAR.finish();
    Ok(())
}

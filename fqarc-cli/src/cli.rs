use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use fqarc::alphabet::{AlphabetParams, CodepointBudget};

use crate::opts::{input_file, input_stream, InputFile, InputStream};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
pub struct Cli {
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,

    /// Don't display a progress bar/spinner
    #[clap(long, global = true, value_parser)]
    pub no_progress: bool,

    /// Number of worker threads to use (defaults to the number of CPUs)
    #[clap(long, global = true, value_parser = clap::value_parser!(u16).range(1..))]
    pub threads: Option<u16>,

    #[clap(subcommand)]
    pub command: Commands,
}

/// Options controlling which codepoints the alphabet may use.
#[derive(clap::Args, Debug, Clone)]
pub struct SymbolOpts {
    /// Character that must never be used as a symbol; can be given multiple
    /// times. Defaults to `@`
    #[clap(long, value_name = "CHAR", value_parser)]
    pub reserved: Vec<char>,

    /// Only use single-byte (ASCII) symbols; fails if the input has more
    /// distinct pairs than that
    #[clap(long, value_parser)]
    pub single_byte: bool,
}

impl From<&SymbolOpts> for AlphabetParams {
    fn from(opts: &SymbolOpts) -> Self {
        let mut builder = AlphabetParams::builder();
        if !opts.reserved.is_empty() {
            builder.reserved(opts.reserved.iter().copied());
        }
        if opts.single_byte {
            builder.budget(CodepointBudget::SingleByte);
        }

        builder.build()
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compress a FASTQ file (optionally gzipped)
    Compress {
        /// Input FASTQ file to read; `-` is the standard input
        #[clap(default_value_t, value_parser = input_stream)]
        input: InputStream,

        /// Output archive path; `-` is the standard output
        #[clap(short, long, value_parser)]
        output: Option<PathBuf>,

        /// Use the alphabet stored in given JSON file instead of profiling
        /// the input first; its symbols must respect `--reserved` and
        /// `--single-byte`
        #[clap(long, value_name = "JSON", value_parser = input_file)]
        alphabet: Option<InputFile>,

        #[clap(flatten)]
        symbols: SymbolOpts,

        /// Do not include sequence identifiers when compressing data
        #[clap(long, value_parser)]
        no_identifiers: bool,
    },

    /// Decompress an archive to a FASTQ file
    Decompress {
        /// Input archive to read
        #[clap(default_value_t, value_parser = input_stream)]
        input: InputStream,

        /// Output file path; `-` is the standard output
        #[clap(short, long, value_parser)]
        output: Option<PathBuf>,
    },

    /// Print (acid, quality score) pair frequencies of a FASTQ file
    Profile {
        /// Input FASTQ file to read; `-` is the standard input
        #[clap(default_value_t, value_parser = input_stream)]
        input: InputStream,

        /// Output the frequencies as a CSV file to the standard output
        #[clap(long, value_parser)]
        csv: bool,
    },

    /// Build the symbol alphabet of a FASTQ file and save it as JSON
    Alphabet {
        /// Input FASTQ file to read; `-` is the standard input
        #[clap(default_value_t, value_parser = input_stream)]
        input: InputStream,

        /// Output file path; `-` is the standard output
        #[clap(short, long, value_parser)]
        output: Option<PathBuf>,

        #[clap(flatten)]
        symbols: SymbolOpts,
    },
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use fqarc::alphabet::{AlphabetParams, CodepointBudget};

    use crate::cli::{Cli, Commands};

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_symbol_opts() {
        let cli = Cli::parse_from([
            "fqarc",
            "alphabet",
            "in.fastq",
            "--reserved",
            ">",
            "--single-byte",
        ]);

        let symbols = match &cli.command {
            Commands::Alphabet { symbols, .. } => symbols,
            _ => panic!("Expected the alphabet command"),
        };
        let params = AlphabetParams::from(symbols);
        assert_eq!(params.reserved(), &['>']);
        assert_eq!(params.budget(), CodepointBudget::SingleByte);
    }

    #[test]
    fn test_symbol_opts_default() {
        let cli = Cli::parse_from(["fqarc", "compress", "in.fastq"]);

        let symbols = match &cli.command {
            Commands::Compress { symbols, .. } => symbols,
            _ => panic!("Expected the compress command"),
        };
        assert_eq!(AlphabetParams::from(symbols), AlphabetParams::default());
    }
}

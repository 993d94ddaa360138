use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use fqarc::alphabet::{AlphabetParams, SymbolAlphabet};
use fqarc::archive::compressor::{compress_two_pass, compress_with_alphabet, FqarcCompressorParams};
use fqarc::progress::ProgressNotifier;

use crate::opts::ReopenableInput;

pub fn compress<W: Write>(
    input: ReopenableInput,
    writer: W,
    alphabet: Option<SymbolAlphabet>,
    alphabet_params: AlphabetParams,
    no_identifiers: bool,
    progress_notifier: Arc<dyn ProgressNotifier>,
) -> anyhow::Result<()> {
    let params = FqarcCompressorParams::builder()
        .alphabet_params(alphabet_params)
        .include_identifiers(!no_identifiers)
        .progress_notifier(progress_notifier)
        .build();

    match alphabet {
        Some(alphabet) => {
            let reader = input.open().context("Could not open the FASTQ file")?;
            compress_with_alphabet(reader, writer, alphabet, params)?;
        }
        None => {
            compress_two_pass(|| input.open(), writer, params)?;
        }
    }

    Ok(())
}

use std::io::{BufWriter, Read, Write};
use std::sync::Arc;

use anyhow::Context;
use fqarc::alphabet::AlphabetParams;
use fqarc::alphabet_serializer::SerializableAlphabet;
use fqarc::archive::compressor::{build_alphabet, FqarcCompressorParams};
use fqarc::fastq::input::open_maybe_gzip;
use fqarc::progress::ProgressNotifier;
use log::info;

pub fn alphabet<R: Read + Send, W: Write>(
    reader: R,
    writer: W,
    alphabet_params: AlphabetParams,
    progress_notifier: Arc<dyn ProgressNotifier>,
) -> anyhow::Result<()> {
    let params = FqarcCompressorParams::builder()
        .alphabet_params(alphabet_params)
        .progress_notifier(progress_notifier)
        .build();

    let reader = open_maybe_gzip(reader).context("Could not open the FASTQ file")?;
    let alphabet = build_alphabet(reader, &params)?;
    info!(
        "Alphabet: {} symbols ({} single-byte), {} bits per symbol",
        alphabet.len(),
        alphabet.single_byte_len(),
        alphabet.bit_width()
    );

    let mut writer = BufWriter::new(writer);
    SerializableAlphabet::write_json(&alphabet, &mut writer)?;
    writer.flush()?;

    Ok(())
}

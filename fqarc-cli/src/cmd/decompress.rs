use std::io::{BufReader, BufWriter, Read, Write};
use std::sync::Arc;

use anyhow::Context;
use fqarc::archive::decompressor::{FqarcDecompressor, FqarcDecompressorParams};
use fqarc::fastq::writer::FastqWriter;
use fqarc::progress::ProgressNotifier;

pub fn decompress<R: Read, W: Write>(
    reader: R,
    writer: W,
    progress_notifier: Arc<dyn ProgressNotifier>,
) -> anyhow::Result<()> {
    let params = FqarcDecompressorParams::builder()
        .progress_notifier(progress_notifier)
        .build();
    let decompressor = FqarcDecompressor::with_params(BufReader::new(reader), params);
    let mut fastq_writer = FastqWriter::new(BufWriter::new(writer));

    for sequence in decompressor {
        let sequence = sequence.context("Could not read a sequence from the archive")?;
        fastq_writer
            .write_sequence(&sequence)
            .context("Could not write a sequence to the output file")?;
    }

    fastq_writer.flush()?;

    Ok(())
}

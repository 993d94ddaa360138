use std::io::Read;

use anyhow::Context;
use fqarc::alphabet::{AlphabetParams, SymbolAlphabet};
use fqarc::fastq::input::open_maybe_gzip;
use fqarc::fastq::reader::FastqReader;
use fqarc::profile::FrequencyTable;
use fqarc::progress::ProgressNotifier;
use log::warn;

use crate::csv_stat::CsvStatOutput;
use crate::PROGRESS_BAR;

const CSV_HEADER: [&str; 6] = ["rank", "acid", "quality_score", "count", "percentage", "symbol"];

pub(crate) fn profile<R: Read + Send>(reader: R, csv: bool) -> anyhow::Result<()> {
    let reader = open_maybe_gzip(reader).context("Could not open the FASTQ file")?;
    let mut sequences = FastqReader::new(reader).into_iter();
    let mut table = FrequencyTable::new();
    let mut reads: u64 = 0;

    PROGRESS_BAR.start_pass("Profiling");
    while let Some(result) = sequences.next() {
        let sequence = match result {
            Ok(sequence) => sequence,
            Err(e) if e.is_recoverable() => {
                warn!("Skipping record #{}: {}", sequences.records_read(), e);
                continue;
            }
            Err(e) => {
                return Err(e).context("Could not parse a sequence from the FASTQ file");
            }
        };

        table.add_sequence(&sequence);
        reads += 1;
        PROGRESS_BAR.processed_bytes(sequence.size());
    }

    PROGRESS_BAR.finish();

    let alphabet = SymbolAlphabet::build(&table, &AlphabetParams::default())
        .context("Could not assign symbols to the observed pairs")?;
    let mut output = CsvStatOutput::new(csv);
    if output.is_enabled() {
        write_csv(&mut output, &table, &alphabet)?;
    } else {
        print_profile(reads, &table, &alphabet);
    }

    Ok(())
}

fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

fn write_csv(
    output: &mut CsvStatOutput,
    table: &FrequencyTable,
    alphabet: &SymbolAlphabet,
) -> anyhow::Result<()> {
    output.add_record(CSV_HEADER)?;
    for (code, pair, symbol) in alphabet.iter() {
        let count = table.count(pair);
        output.add_record([
            code.0.to_string(),
            pair.acid.to_string(),
            pair.quality_score.get().to_string(),
            count.to_string(),
            format!("{:.6}", percentage(count, table.total())),
            symbol.to_string(),
        ])?;
    }

    output.flush()
}

fn print_profile(reads: u64, table: &FrequencyTable, alphabet: &SymbolAlphabet) {
    eprintln!("Reads: {}", reads);
    eprintln!("Positions: {}", table.total());
    eprintln!("Distinct pairs: {}", table.len());
    eprintln!(
        "Symbols: {} ({} single-byte), {} bits each",
        alphabet.len(),
        alphabet.single_byte_len(),
        alphabet.bit_width()
    );

    if alphabet.is_empty() {
        return;
    }

    eprintln!();
    eprintln!("Pairs:");
    for (code, pair, symbol) in alphabet.iter() {
        let count = table.count(pair);
        eprintln!(
            "  {:>5} {} (Q{:>2}) {:>12} {:>9.4}%  {}",
            code.to_string(),
            pair,
            pair.quality_score.get(),
            count,
            percentage(count, table.total()),
            symbol,
        );
    }
}

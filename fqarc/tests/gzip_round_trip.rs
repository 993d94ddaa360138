use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use fqarc::_internal_test_data::{random_reads, random_reads_fastq};
use fqarc::alphabet::{AlphabetParams, SymbolAlphabet};
use fqarc::archive::compressor::{
    build_alphabet, compress_two_pass, compress_with_alphabet, FqarcCompressorParams,
};
use fqarc::archive::decompressor::FqarcDecompressor;
use fqarc::fastq::input::open_maybe_gzip;
use fqarc::fastq::reader::FastqReader;
use fqarc::fastq::writer::FastqWriter;
use fqarc::profile::FrequencyTable;

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

#[test_log::test]
fn test_round_trip_gzip_input() {
    let fastq = random_reads_fastq(300, 100);
    let compressed_input = gzip(&fastq);

    let mut archive = Vec::new();
    let params = FqarcCompressorParams::builder().batch_size(64).build();
    let stats = compress_two_pass(
        || open_maybe_gzip(compressed_input.as_slice()),
        &mut archive,
        params,
    )
    .unwrap();
    assert_eq!(stats.records(), 300);

    let mut out = Vec::new();
    let mut writer = FastqWriter::new(&mut out);
    for sequence in FqarcDecompressor::new(archive.as_slice()) {
        writer.write_sequence(&sequence.unwrap()).unwrap();
    }
    writer.flush().unwrap();
    drop(writer);

    assert_eq!(out, fastq);
}

#[test_log::test]
fn test_alphabet_matches_profile() {
    let fastq = random_reads_fastq(200, 50);
    let params = FqarcCompressorParams::default();

    let alphabet = build_alphabet(fastq.as_slice(), &params).unwrap();

    let table = FrequencyTable::profile_parallel(&random_reads(200, 50));
    let expected = SymbolAlphabet::build(&table, &AlphabetParams::default()).unwrap();
    assert_eq!(alphabet, expected);
}

#[test_log::test]
fn test_reused_alphabet() {
    // an alphabet built from a larger corpus covers a subset of it
    let alphabet_source = random_reads_fastq(500, 80);
    let params = FqarcCompressorParams::default();
    let alphabet = build_alphabet(alphabet_source.as_slice(), &params).unwrap();

    let subset: Vec<_> = FastqReader::new(alphabet_source.as_slice())
        .into_iter()
        .take(20)
        .collect::<Result<_, _>>()
        .unwrap();
    let mut subset_fastq = Vec::new();
    let mut writer = FastqWriter::new(&mut subset_fastq);
    for sequence in &subset {
        writer.write_sequence(sequence).unwrap();
    }
    drop(writer);

    let mut archive = Vec::new();
    let stats =
        compress_with_alphabet(subset_fastq.as_slice(), &mut archive, alphabet.clone(), params)
            .unwrap();
    assert_eq!(stats.records(), 20);

    let mut decompressor = FqarcDecompressor::new(archive.as_slice());
    assert_eq!(decompressor.alphabet().unwrap(), &alphabet);
    let result: Result<Vec<_>, _> = decompressor.into_iter().collect();
    assert_eq!(result.unwrap(), subset);
}

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{BufRead, Write};
use std::mem;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, trace, warn};
use rayon::prelude::*;

use crate::alphabet::{AlphabetError, AlphabetParams, SymbolAlphabet};
use crate::archive::no_seek::NoSeek;
use crate::archive::writer::{write_end, write_preamble, BatchWriter};
use crate::archive::FQARC_VERSION;
use crate::bitpack::PackedBuffer;
use crate::fastq::reader::{FastqReader, FastqReaderError};
use crate::fastq::FastqSequence;
use crate::profile::FrequencyTable;
use crate::progress::{format_bytes, format_stats, ByteNum, DummyProgressNotifier, ProgressNotifier};
use crate::read_codec::{encode_sequence, EncodedRead, ReadCodecResult};

/// Error occurring during creation of an archive.
#[derive(Debug)]
pub enum FqarcCompressorError {
    /// I/O error occurred when reading the input or writing the archive.
    IoError(std::io::Error),
    /// Error occurred trying to serialize the headers.
    SerializeError(binrw::Error),
    /// The FASTQ input is malformed.
    FastqError(FastqReaderError),
    /// The alphabet could not be built from the input.
    AlphabetError(AlphabetError),
    /// The alphabet could not be serialized.
    AlphabetSerializeError(anyhow::Error),
    /// A read is longer than a record can describe.
    SequenceTooLong(usize, usize),
}

impl FqarcCompressorError {
    pub(super) fn sequence_too_long(sequence_len: usize, max_len: usize) -> Self {
        Self::SequenceTooLong(sequence_len, max_len)
    }
}

impl From<std::io::Error> for FqarcCompressorError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

impl From<binrw::Error> for FqarcCompressorError {
    fn from(e: binrw::Error) -> Self {
        Self::SerializeError(e)
    }
}

impl From<FastqReaderError> for FqarcCompressorError {
    fn from(e: FastqReaderError) -> Self {
        Self::FastqError(e)
    }
}

impl From<AlphabetError> for FqarcCompressorError {
    fn from(e: AlphabetError) -> Self {
        Self::AlphabetError(e)
    }
}

impl Display for FqarcCompressorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FqarcCompressorError::IoError(e) => write!(f, "IO error: {}", e),
            FqarcCompressorError::SerializeError(e) => write!(f, "Serialize error: {}", e),
            FqarcCompressorError::FastqError(e) => write!(f, "FASTQ error: {}", e),
            FqarcCompressorError::AlphabetError(e) => write!(f, "Alphabet error: {}", e),
            FqarcCompressorError::AlphabetSerializeError(e) => {
                write!(f, "Could not serialize the alphabet: {}", e)
            }
            FqarcCompressorError::SequenceTooLong(sequence_len, max_len) => write!(
                f,
                "Sequence too long (sequence length: {}, limit: {})",
                sequence_len, max_len
            ),
        }
    }
}

impl Error for FqarcCompressorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FqarcCompressorError::IoError(e) => Some(e),
            FqarcCompressorError::SerializeError(e) => Some(e),
            FqarcCompressorError::FastqError(e) => Some(e),
            FqarcCompressorError::AlphabetError(e) => Some(e),
            FqarcCompressorError::AlphabetSerializeError(e) => Some(&**e),
            FqarcCompressorError::SequenceTooLong(..) => None,
        }
    }
}

/// The result of creating an archive.
pub type FqarcCompressResult<T> = Result<T, FqarcCompressorError>;

#[derive(Debug, Clone)]
pub struct FqarcCompressorParams {
    alphabet_params: AlphabetParams,
    batch_size: usize,
    include_identifiers: bool,
    progress_notifier: Arc<dyn ProgressNotifier>,
}

impl FqarcCompressorParams {
    pub fn builder() -> FqarcCompressorParamsBuilder {
        FqarcCompressorParamsBuilder::new()
    }

    #[must_use]
    pub fn alphabet_params(&self) -> &AlphabetParams {
        &self.alphabet_params
    }
}

impl Default for FqarcCompressorParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Clone)]
pub struct FqarcCompressorParamsBuilder {
    alphabet_params: AlphabetParams,
    batch_size: usize,
    include_identifiers: bool,
    progress_notifier: Arc<dyn ProgressNotifier>,
}

impl FqarcCompressorParamsBuilder {
    pub fn new() -> Self {
        Self {
            alphabet_params: AlphabetParams::default(),
            batch_size: 16 * 1024,
            include_identifiers: true,
            progress_notifier: Arc::new(DummyProgressNotifier),
        }
    }

    pub fn alphabet_params(&mut self, alphabet_params: AlphabetParams) -> &mut Self {
        let mut new = self;
        new.alphabet_params = alphabet_params;
        new
    }

    /// Number of reads profiled or encoded at once.
    ///
    /// # Panics
    /// This function panics if `batch_size` is 0.
    pub fn batch_size(&mut self, batch_size: usize) -> &mut Self {
        assert!(batch_size > 0);

        let mut new = self;
        new.batch_size = batch_size;
        new
    }

    pub fn include_identifiers(&mut self, include_identifiers: bool) -> &mut Self {
        let mut new = self;
        new.include_identifiers = include_identifiers;
        new
    }

    pub fn progress_notifier(&mut self, progress_notifier: Arc<dyn ProgressNotifier>) -> &mut Self {
        let mut new = self;
        new.progress_notifier = progress_notifier;
        new
    }

    pub fn build(&mut self) -> FqarcCompressorParams {
        FqarcCompressorParams {
            alphabet_params: self.alphabet_params.clone(),
            batch_size: self.batch_size,
            include_identifiers: self.include_identifiers,
            progress_notifier: self.progress_notifier.clone(),
        }
    }
}

impl Default for FqarcCompressorParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary of a finished archive.
#[derive(Debug, Clone)]
pub struct CompressionStats {
    start_time: Instant,
    in_bytes: ByteNum,
    out_bytes: u64,
    records: u64,
    skipped: u64,
    symbols: u64,
}

impl CompressionStats {
    #[must_use]
    fn new() -> Self {
        Self {
            start_time: Instant::now(),
            in_bytes: ByteNum::ZERO,
            out_bytes: 0,
            records: 0,
            skipped: 0,
            symbols: 0,
        }
    }

    /// Number of reads stored in the archive.
    #[must_use]
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Number of reads left out because they were malformed or could not be
    /// encoded.
    #[must_use]
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    #[must_use]
    pub fn symbols(&self) -> u64 {
        self.symbols
    }

    #[must_use]
    pub fn in_bytes(&self) -> ByteNum {
        self.in_bytes
    }

    #[must_use]
    pub fn out_bytes(&self) -> u64 {
        self.out_bytes
    }

    fn print_stats(&self) {
        info!("Compressed {}", format_stats(self.start_time, self.in_bytes));

        let in_bytes = self.in_bytes.get();
        let rate = self.out_bytes as f32 / in_bytes as f32 * 100.0;
        info!(
            "File: {:>9} -> {:>9} ({:>7.3}%)",
            in_bytes, self.out_bytes, rate
        );
        info!("{} records, {} symbols", self.records, self.symbols);
        if self.skipped > 0 {
            warn!("{} reads were skipped", self.skipped);
        }
    }
}

/// Writes reads to an archive using a fixed alphabet.
///
/// Reads are collected into batches; each batch is encoded on the rayon
/// thread pool and written out in input order.
#[derive(Debug)]
pub struct FqarcCompressor<W> {
    writer: NoSeek<W>,
    alphabet: SymbolAlphabet,
    params: FqarcCompressorParams,
    initialized: bool,
    batch: Vec<FastqSequence>,
    stats: CompressionStats,
}

impl<W: Write> FqarcCompressor<W> {
    #[must_use]
    pub fn new(writer: W, alphabet: SymbolAlphabet) -> Self {
        Self::with_params(writer, alphabet, FqarcCompressorParams::default())
    }

    #[must_use]
    pub fn with_params(writer: W, alphabet: SymbolAlphabet, params: FqarcCompressorParams) -> Self {
        Self {
            writer: NoSeek::new(writer),
            alphabet,
            batch: Vec::with_capacity(params.batch_size),
            params,
            initialized: false,
            stats: CompressionStats::new(),
        }
    }

    #[must_use]
    pub fn alphabet(&self) -> &SymbolAlphabet {
        &self.alphabet
    }

    pub fn add_sequence(&mut self, sequence: FastqSequence) -> FqarcCompressResult<()> {
        let sequence = if self.params.include_identifiers {
            sequence
        } else {
            sequence.with_identifier_discarded()
        };
        self.batch.push(sequence);

        if self.batch.len() >= self.params.batch_size {
            self.write_batch()?;
        }

        Ok(())
    }

    /// Counts a read the FASTQ reader rejected as skipped.
    pub fn skip_malformed(&mut self, record: u64, error: &FastqReaderError) {
        warn!("Skipping record #{}: {}", record, error);
        self.stats.skipped += 1;
    }

    fn initialize(&mut self) -> FqarcCompressResult<()> {
        write_preamble(&mut self.writer, FQARC_VERSION, &self.alphabet)?;
        self.initialized = true;
        debug!(
            "Wrote archive header with {} symbols of {} bits",
            self.alphabet.len(),
            self.alphabet.bit_width()
        );

        Ok(())
    }

    fn write_batch(&mut self) -> FqarcCompressResult<()> {
        if !self.initialized {
            self.initialize()?;
        }

        let batch = mem::take(&mut self.batch);
        let encoded = encode_batch(&batch, &self.alphabet);

        let mut batch_writer = BatchWriter::new();
        let mut batch_bytes = ByteNum::ZERO;
        for (sequence, result) in batch.iter().zip(encoded) {
            batch_bytes += sequence.size();

            match result {
                Ok((encoded, packed)) => {
                    trace!(
                        "Record `{}`: {} symbols in {} bytes",
                        encoded.identifier(),
                        encoded.len(),
                        packed.len()
                    );
                    batch_writer.write_record(encoded.identifier(), encoded.len(), &packed)?;
                    self.stats.symbols += encoded.len() as u64;
                }
                Err(e) => {
                    warn!("Skipping read `{}`: {}", sequence.identifier(), e);
                    self.stats.skipped += 1;
                }
            }
        }

        self.stats.records += batch_writer.records();
        self.stats.in_bytes += batch_bytes;
        batch_writer.write_to(&mut self.writer)?;
        self.params.progress_notifier.processed_bytes(batch_bytes);

        Ok(())
    }

    /// Writes the remaining reads and the end marker, and flushes the output.
    pub fn finish(mut self) -> FqarcCompressResult<CompressionStats> {
        self.write_batch()?;

        write_end(&mut self.writer, self.stats.records)?;
        self.writer.flush()?;
        self.stats.out_bytes = self.writer.position();

        self.stats.print_stats();
        Ok(self.stats)
    }
}

fn encode_batch(
    batch: &[FastqSequence],
    alphabet: &SymbolAlphabet,
) -> Vec<ReadCodecResult<(EncodedRead, PackedBuffer)>> {
    let bit_width = alphabet.bit_width();

    batch
        .par_iter()
        .map(|sequence| {
            let encoded = encode_sequence(sequence, alphabet)?;
            let packed = encoded.pack(bit_width)?;
            Ok((encoded, packed))
        })
        .collect()
}

/// Profiles every read of `reader` and builds the alphabet for them.
pub fn build_alphabet<R: BufRead>(
    reader: R,
    params: &FqarcCompressorParams,
) -> FqarcCompressResult<SymbolAlphabet> {
    let start_time = Instant::now();
    params.progress_notifier.start_pass("Profiling");

    let mut table = FrequencyTable::new();
    let mut bytes = ByteNum::ZERO;
    let mut batch = Vec::with_capacity(params.batch_size);
    let mut sequences = FastqReader::new(reader).into_iter();

    let mut rejected: u64 = 0;

    loop {
        batch.clear();
        let mut exhausted = true;
        for _ in 0..params.batch_size {
            let result = match sequences.next() {
                Some(result) => result,
                None => break,
            };
            exhausted = false;
            match result {
                Ok(sequence) => batch.push(sequence),
                Err(e) if e.is_recoverable() => {
                    debug!("Not profiling record #{}: {}", sequences.records_read(), e);
                    rejected += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
        if exhausted {
            break;
        }

        let batch_bytes = batch
            .iter()
            .fold(ByteNum::ZERO, |acc, sequence| acc + sequence.size());
        table.merge(&FrequencyTable::profile_parallel(&batch));
        bytes += batch_bytes;
        params.progress_notifier.processed_bytes(batch_bytes);
    }

    info!(
        "Profiled {}: {} distinct pairs in {} positions",
        format_stats(start_time, bytes),
        table.len(),
        table.total()
    );
    if rejected > 0 {
        warn!("{} malformed reads were left out of the profile", rejected);
    }

    Ok(SymbolAlphabet::build(&table, &params.alphabet_params)?)
}

/// Creates an archive from a FASTQ source in two passes: the first one
/// builds the alphabet, the second one encodes the reads.
///
/// `open` is called once per pass and must return the same data each time.
pub fn compress_two_pass<F, R, W>(
    mut open: F,
    writer: W,
    params: FqarcCompressorParams,
) -> FqarcCompressResult<CompressionStats>
where
    F: FnMut() -> std::io::Result<R>,
    R: BufRead,
    W: Write,
{
    let alphabet = build_alphabet(open()?, &params)?;
    info!(
        "Alphabet: {} symbols ({} single-byte), {} bits per symbol",
        alphabet.len(),
        alphabet.single_byte_len(),
        alphabet.bit_width()
    );

    compress_with_alphabet(open()?, writer, alphabet, params)
}

/// Creates an archive from a FASTQ source using an existing alphabet.
///
/// Fails if the alphabet uses a codepoint that `params` rule out.
pub fn compress_with_alphabet<R, W>(
    reader: R,
    writer: W,
    alphabet: SymbolAlphabet,
    params: FqarcCompressorParams,
) -> FqarcCompressResult<CompressionStats>
where
    R: BufRead,
    W: Write,
{
    alphabet.check_params(&params.alphabet_params)?;
    params.progress_notifier.start_pass("Compressing");

    let mut compressor = FqarcCompressor::with_params(writer, alphabet, params);
    let mut sequences = FastqReader::new(reader).into_iter();
    while let Some(result) = sequences.next() {
        match result {
            Ok(sequence) => compressor.add_sequence(sequence)?,
            Err(e) if e.is_recoverable() => {
                compressor.skip_malformed(sequences.records_read(), &e);
            }
            Err(e) => return Err(e.into()),
        }
    }
    let stats = compressor.finish()?;
    debug!("Archive size: {}", format_bytes(ByteNum::new(stats.out_bytes as usize)));

    Ok(stats)
}

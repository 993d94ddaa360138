use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::io::Read;
use std::string::FromUtf8Error;
use std::sync::Arc;
use std::time::Instant;

use binrw::BinRead;
use log::{debug, info, trace};
use rayon::prelude::*;

use crate::alphabet::SymbolAlphabet;
use crate::alphabet_serializer::SerializableAlphabet;
use crate::archive::data::{FqarcAlphabetHeader, FqarcHeader, FqarcRecordHeader, FqarcSliceHeader};
use crate::archive::no_seek::NoSeek;
use crate::archive::FQARC_VERSION;
use crate::bitpack::packed_len;
use crate::fastq::FastqSequence;
use crate::progress::{format_stats, ByteNum, DummyProgressNotifier, ProgressNotifier};
use crate::read_codec::{decode_packed, ReadCodecError};

#[derive(Debug, Default)]
pub enum FqarcDecompressorError {
    #[default]
    InvalidState,
    IoError(std::io::Error),
    Utf8Error(FromUtf8Error),
    SerializeError(binrw::Error),
    InvalidVersion(u8),
    InvalidAlphabet(anyhow::Error),
    ChecksumMismatch(u32, u32),
    RecordCountMismatch(u64, u64),
    CodecError(ReadCodecError),
}

impl FqarcDecompressorError {
    #[must_use]
    pub fn checksum_mismatch(actual: u32, expected: u32) -> Self {
        Self::ChecksumMismatch(actual, expected)
    }

    #[must_use]
    pub fn record_count_mismatch(actual: u64, expected: u64) -> Self {
        Self::RecordCountMismatch(actual, expected)
    }
}

impl From<std::io::Error> for FqarcDecompressorError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

impl From<FromUtf8Error> for FqarcDecompressorError {
    fn from(e: FromUtf8Error) -> Self {
        Self::Utf8Error(e)
    }
}

impl From<binrw::Error> for FqarcDecompressorError {
    fn from(e: binrw::Error) -> Self {
        Self::SerializeError(e)
    }
}

impl From<ReadCodecError> for FqarcDecompressorError {
    fn from(e: ReadCodecError) -> Self {
        Self::CodecError(e)
    }
}

impl Display for FqarcDecompressorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FqarcDecompressorError::InvalidState => write!(f, "Invalid decompressor state"),
            FqarcDecompressorError::IoError(e) => write!(f, "IO error: {}", e),
            FqarcDecompressorError::Utf8Error(e) => write!(f, "UTF-8 error: {}", e),
            FqarcDecompressorError::SerializeError(e) => write!(f, "Serialize error: {}", e),
            FqarcDecompressorError::InvalidVersion(ver) => {
                write!(f, "Invalid archive version: {}", ver)
            }
            FqarcDecompressorError::InvalidAlphabet(e) => write!(f, "Invalid alphabet: {}", e),
            FqarcDecompressorError::ChecksumMismatch(actual, expected) => write!(
                f,
                "Invalid record checksum (actual: {:08X}, expected: {:08X})",
                actual, expected
            ),
            FqarcDecompressorError::RecordCountMismatch(actual, expected) => write!(
                f,
                "Invalid record count (read: {}, expected: {})",
                actual, expected
            ),
            FqarcDecompressorError::CodecError(e) => write!(f, "Decoding error: {}", e),
        }
    }
}

impl Error for FqarcDecompressorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FqarcDecompressorError::IoError(e) => Some(e),
            FqarcDecompressorError::Utf8Error(e) => Some(e),
            FqarcDecompressorError::SerializeError(e) => Some(e),
            FqarcDecompressorError::InvalidAlphabet(e) => Some(&**e),
            FqarcDecompressorError::CodecError(e) => Some(e),
            _ => None,
        }
    }
}

pub type FqarcDecompressResult<T> = Result<T, FqarcDecompressorError>;

#[derive(Debug, Clone)]
pub struct FqarcDecompressorParams {
    batch_size: usize,
    progress_notifier: Arc<dyn ProgressNotifier>,
}

impl FqarcDecompressorParams {
    pub fn builder() -> FqarcDecompressorParamsBuilder {
        FqarcDecompressorParamsBuilder::new()
    }
}

impl Default for FqarcDecompressorParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Clone)]
pub struct FqarcDecompressorParamsBuilder {
    batch_size: usize,
    progress_notifier: Arc<dyn ProgressNotifier>,
}

impl FqarcDecompressorParamsBuilder {
    pub fn new() -> Self {
        Self {
            batch_size: 16 * 1024,
            progress_notifier: Arc::new(DummyProgressNotifier),
        }
    }

    /// Number of records decoded at once.
    ///
    /// # Panics
    /// This function panics if `batch_size` is 0.
    pub fn batch_size(&mut self, batch_size: usize) -> &mut Self {
        assert!(batch_size > 0);

        let mut new = self;
        new.batch_size = batch_size;
        new
    }

    pub fn progress_notifier(&mut self, progress_notifier: Arc<dyn ProgressNotifier>) -> &mut Self {
        let mut new = self;
        new.progress_notifier = progress_notifier;
        new
    }

    pub fn build(&mut self) -> FqarcDecompressorParams {
        FqarcDecompressorParams {
            batch_size: self.batch_size,
            progress_notifier: self.progress_notifier.clone(),
        }
    }
}

impl Default for FqarcDecompressorParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Eq, PartialEq)]
enum FqarcDecompressorState {
    Uninitialized,
    Reading,
    EndReached,
    Finished,
}

/// A record as stored, before decoding.
#[derive(Debug)]
struct RawRecord {
    header: FqarcRecordHeader,
    identifier: Vec<u8>,
    packed: Vec<u8>,
}

impl RawRecord {
    fn decode(self, alphabet: &SymbolAlphabet) -> FqarcDecompressResult<FastqSequence> {
        let checksum = crc32fast::hash(&self.packed);
        if checksum != self.header.checksum {
            return Err(FqarcDecompressorError::checksum_mismatch(
                checksum,
                self.header.checksum,
            ));
        }

        let identifier = String::from_utf8(self.identifier)?;
        let sequence = decode_packed(
            identifier,
            &self.packed,
            self.header.seq_len as usize,
            alphabet,
        )?;

        Ok(sequence)
    }
}

/// Reads [`FastqSequence`]s back from an archive.
#[derive(Debug)]
pub struct FqarcDecompressor<R> {
    reader: NoSeek<R>,
    params: FqarcDecompressorParams,
    state: FqarcDecompressorState,
    alphabet: Option<SymbolAlphabet>,

    sequences_to_get: Vec<FastqSequence>,
    records_read: u64,
    start_time: Instant,
    bytes_decompressed: ByteNum,
    position_reported: u64,
}

impl<R: Read> FqarcDecompressor<R> {
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self::with_params(reader, FqarcDecompressorParams::default())
    }

    #[must_use]
    pub fn with_params(reader: R, params: FqarcDecompressorParams) -> Self {
        Self {
            reader: NoSeek::new(reader),
            params,
            state: FqarcDecompressorState::Uninitialized,
            alphabet: None,

            sequences_to_get: Vec::new(),
            records_read: 0,
            start_time: Instant::now(),
            bytes_decompressed: ByteNum::ZERO,
            position_reported: 0,
        }
    }

    /// Returns the alphabet stored in the archive, reading the archive
    /// header first if needed.
    pub fn alphabet(&mut self) -> FqarcDecompressResult<&SymbolAlphabet> {
        if self.state == FqarcDecompressorState::Uninitialized {
            self.initialize()?;
        }

        self.alphabet
            .as_ref()
            .ok_or(FqarcDecompressorError::InvalidState)
    }

    fn initialize(&mut self) -> FqarcDecompressResult<()> {
        let header = FqarcHeader::read(&mut self.reader)?;
        debug!("Read archive header: {:?}", header);
        if header.version != FQARC_VERSION {
            return Err(FqarcDecompressorError::InvalidVersion(header.version));
        }

        let alphabet_header = FqarcAlphabetHeader::read(&mut self.reader)?;
        let mut data = vec![0; alphabet_header.length as usize];
        self.reader.read_exact(&mut data)?;
        let alphabet = SerializableAlphabet::read_alphabet(data.as_slice())
            .map_err(FqarcDecompressorError::InvalidAlphabet)?;
        debug!(
            "Read alphabet: {} symbols, {} bits per symbol",
            alphabet.len(),
            alphabet.bit_width()
        );

        self.alphabet = Some(alphabet);
        self.state = FqarcDecompressorState::Reading;
        self.report_progress();

        Ok(())
    }

    fn read_record(&mut self, header: FqarcRecordHeader) -> FqarcDecompressResult<RawRecord> {
        let bit_width = self
            .alphabet
            .as_ref()
            .ok_or(FqarcDecompressorError::InvalidState)?
            .bit_width();

        let mut identifier = vec![0; header.identifier_len as usize];
        self.reader.read_exact(&mut identifier)?;
        let mut packed = vec![0; packed_len(header.seq_len as usize, bit_width)];
        self.reader.read_exact(&mut packed)?;
        trace!(
            "Read record with {} symbols in {} bytes",
            header.seq_len,
            packed.len()
        );

        Ok(RawRecord {
            header,
            identifier,
            packed,
        })
    }

    fn read_next_batch(&mut self) -> FqarcDecompressResult<()> {
        match self.state {
            FqarcDecompressorState::Uninitialized => self.initialize()?,
            FqarcDecompressorState::Reading => {}
            FqarcDecompressorState::EndReached | FqarcDecompressorState::Finished => {
                return Ok(())
            }
        }

        let mut records = Vec::new();
        while records.len() < self.params.batch_size {
            match FqarcSliceHeader::read_forward(&mut self.reader)? {
                FqarcSliceHeader::Record(header) => records.push(self.read_record(header)?),
                FqarcSliceHeader::End(end) => {
                    let actual = self.records_read + records.len() as u64;
                    if actual != end.record_count {
                        return Err(FqarcDecompressorError::record_count_mismatch(
                            actual,
                            end.record_count,
                        ));
                    }

                    debug!("End of archive reached");
                    self.state = FqarcDecompressorState::EndReached;
                    break;
                }
            }
        }

        let alphabet = self
            .alphabet
            .as_ref()
            .ok_or(FqarcDecompressorError::InvalidState)?;
        let mut sequences = records
            .into_par_iter()
            .map(|record| record.decode(alphabet))
            .collect::<FqarcDecompressResult<Vec<_>>>()?;

        self.records_read += sequences.len() as u64;
        sequences.reverse();
        self.sequences_to_get = sequences;
        self.report_progress();

        Ok(())
    }

    fn report_progress(&mut self) {
        let position = self.reader.position();
        let bytes = (position - self.position_reported) as usize;
        self.position_reported = position;
        self.params
            .progress_notifier
            .processed_bytes(ByteNum::new(bytes));
    }

    pub fn next_sequence(&mut self) -> FqarcDecompressResult<Option<FastqSequence>> {
        if self.state == FqarcDecompressorState::Finished {
            return Ok(None);
        }

        let result = self.next_sequence_internal();
        match &result {
            Ok(Some(sequence)) => self.bytes_decompressed += sequence.size(),
            Ok(None) => {
                self.state = FqarcDecompressorState::Finished;
                self.print_stats();
            }
            Err(_) => self.state = FqarcDecompressorState::Finished,
        }

        result
    }

    fn next_sequence_internal(&mut self) -> FqarcDecompressResult<Option<FastqSequence>> {
        while self.sequences_to_get.is_empty() {
            if self.state == FqarcDecompressorState::EndReached {
                return Ok(None);
            }
            self.read_next_batch()?;
        }

        Ok(self.sequences_to_get.pop())
    }

    fn print_stats(&self) {
        info!(
            "Decompressed {} records: {}",
            self.records_read,
            format_stats(self.start_time, self.bytes_decompressed)
        );
    }
}

impl<R: Read> IntoIterator for FqarcDecompressor<R> {
    type Item = FqarcDecompressResult<FastqSequence>;
    type IntoIter = FqarcDecompressorIterator<R>;

    fn into_iter(self) -> Self::IntoIter {
        Self::IntoIter { decompressor: self }
    }
}

#[derive(Debug)]
pub struct FqarcDecompressorIterator<R> {
    decompressor: FqarcDecompressor<R>,
}

impl<R: Read> Iterator for FqarcDecompressorIterator<R> {
    type Item = FqarcDecompressResult<FastqSequence>;

    fn next(&mut self) -> Option<Self::Item> {
        self.decompressor.next_sequence().transpose()
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;
    use std::io;
    use std::io::ErrorKind::NotFound;

    use crate::alphabet::SymbolCode;
    use crate::archive::decompressor::{FqarcDecompressor, FqarcDecompressorError};
    use crate::read_codec::ReadCodecError;

    #[test]
    fn test_error_display() {
        assert_eq!(
            FqarcDecompressorError::InvalidState.to_string(),
            "Invalid decompressor state"
        );
        assert_eq!(
            FqarcDecompressorError::from(io::Error::from(NotFound)).to_string(),
            "IO error: entity not found"
        );
        assert_eq!(
            FqarcDecompressorError::from(binrw::Error::NoVariantMatch { pos: 0 }).to_string(),
            "Serialize error: no variants matched at 0x0"
        );
        assert_eq!(
            FqarcDecompressorError::InvalidVersion(255).to_string(),
            "Invalid archive version: 255"
        );
        assert_eq!(
            FqarcDecompressorError::checksum_mismatch(123, 456).to_string(),
            "Invalid record checksum (actual: 0000007B, expected: 000001C8)"
        );
        assert_eq!(
            FqarcDecompressorError::record_count_mismatch(3, 4).to_string(),
            "Invalid record count (read: 3, expected: 4)"
        );
        assert_eq!(
            FqarcDecompressorError::from(ReadCodecError::UnknownSymbol(SymbolCode(9))).to_string(),
            "Decoding error: Symbol #9 is not in the alphabet"
        );
    }

    #[test]
    fn test_error_source() {
        assert!(FqarcDecompressorError::InvalidState.source().is_none());
        assert!(
            FqarcDecompressorError::from(ReadCodecError::UnknownSymbol(SymbolCode(9)))
                .source()
                .is_some()
        );
    }

    #[test]
    fn test_invalid_magic() {
        let data = b"FASTQ\x01";
        let mut decompressor = FqarcDecompressor::new(&data[..]);

        assert!(matches!(
            decompressor.next_sequence(),
            Err(FqarcDecompressorError::SerializeError(_))
        ));
        assert!(decompressor.next_sequence().unwrap().is_none());
    }

    #[test]
    fn test_invalid_version() {
        let data = b"FQARC\x07";
        let mut decompressor = FqarcDecompressor::new(&data[..]);

        assert!(matches!(
            decompressor.alphabet(),
            Err(FqarcDecompressorError::InvalidVersion(7))
        ));
    }
}

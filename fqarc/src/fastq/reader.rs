use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::BufRead;

use crate::fastq::consts::{FASTQ_BYTE_TO_ACID, FASTQ_BYTE_TO_Q_SCORE};
use crate::fastq::{
    FastqQualityScore, FastqSequence, FASTQ_QUALITY_SCORE_SEPARATOR, FASTQ_TITLE_PREFIX,
};
use crate::progress::ByteNum;
use crate::sequence::Acid;

/// Error occurring during parsing a FASTQ file. Record numbers start at 1.
#[derive(Debug)]
pub enum FastqReaderError {
    /// I/O error occurred when reading the FASTQ file.
    IoError(std::io::Error),
    /// The input ended in the middle of a record.
    TruncatedRecord { record: u64 },
    /// The title line does not start with `@`.
    InvalidTitle { record: u64 },
    /// The third line of a record does not start with `+`.
    InvalidSeparator { record: u64 },
    /// Invalid acid character.
    InvalidAcid(char),
    /// Invalid quality score character.
    InvalidQualityScore(char),
    /// The acid and quality score lines differ in length.
    LengthMismatch { acids: usize, quality_scores: usize },
}

impl From<std::io::Error> for FastqReaderError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

impl Display for FastqReaderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FastqReaderError::IoError(e) => write!(f, "IO error: {}", e),
            FastqReaderError::TruncatedRecord { record } => {
                write!(f, "Record #{} is truncated", record)
            }
            FastqReaderError::InvalidTitle { record } => {
                write!(f, "Record #{}: title line must start with `@`", record)
            }
            FastqReaderError::InvalidSeparator { record } => {
                write!(f, "Record #{}: separator line must start with `+`", record)
            }
            FastqReaderError::InvalidAcid(ch) => write!(f, "Invalid acid: `{}`", ch),
            FastqReaderError::InvalidQualityScore(ch) => {
                write!(f, "Invalid quality score: `{}`", ch)
            }
            FastqReaderError::LengthMismatch {
                acids,
                quality_scores,
            } => write!(
                f,
                "{} acids but {} quality scores",
                acids, quality_scores
            ),
        }
    }
}

impl Error for FastqReaderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FastqReaderError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl FastqReaderError {
    /// Whether the error concerns the contents of a single, fully consumed
    /// record, so that reading can continue with the next one.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FastqReaderError::InvalidAcid(_)
                | FastqReaderError::InvalidQualityScore(_)
                | FastqReaderError::LengthMismatch { .. }
        )
    }
}

/// The result of a FASTQ reading operation.
pub type FastqResult<T> = Result<T, FastqReaderError>;

const TITLE: usize = 0;
const ACIDS: usize = 1;
const SEPARATOR: usize = 2;
const QUALITY_SCORES: usize = 3;

/// Pull-based FASTQ parser. Blank lines between records are skipped.
///
/// All four lines of a record are read before their contents are checked,
/// so after a [recoverable](FastqReaderError::is_recoverable) error the
/// reader is positioned at the start of the next record.
#[derive(Debug)]
pub struct FastqReader<R> {
    reader: R,
    lines: [Vec<u8>; 4],
    record: u64,
    record_bytes: usize,
}

impl<R: BufRead> FastqReader<R> {
    /// Creates new `FastqReader` instance.
    ///
    /// # Examples
    /// ```
    /// use fqarc::fastq::reader::FastqReader;
    ///
    /// let data = "@r1\nACGT\n+\nIIII\n";
    /// let sequences: Result<Vec<_>, _> = FastqReader::new(data.as_bytes()).into_iter().collect();
    /// assert_eq!(sequences.unwrap().len(), 1);
    /// ```
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            lines: Default::default(),
            record: 0,
            record_bytes: 0,
        }
    }

    /// Number of records read so far, including rejected ones.
    #[must_use]
    pub fn records_read(&self) -> u64 {
        self.record
    }

    /// Reads the next record, or `None` once the input is exhausted.
    pub fn read_sequence(&mut self) -> FastqResult<Option<FastqSequence>> {
        self.record_bytes = 0;
        loop {
            if !self.read_line(TITLE)? {
                return Ok(None);
            }
            if !self.lines[TITLE].iter().all(u8::is_ascii_whitespace) {
                break;
            }
        }
        self.record += 1;
        let record = self.record;

        let identifier = match self.lines[TITLE].split_first() {
            Some((&prefix, title)) if prefix == FASTQ_TITLE_PREFIX as u8 => {
                String::from_utf8_lossy(title).trim().to_owned()
            }
            _ => return Err(FastqReaderError::InvalidTitle { record }),
        };

        for index in [ACIDS, SEPARATOR, QUALITY_SCORES] {
            if !self.read_line(index)? {
                return Err(FastqReaderError::TruncatedRecord { record });
            }
        }
        if self.lines[SEPARATOR].first() != Some(&FASTQ_QUALITY_SCORE_SEPARATOR) {
            return Err(FastqReaderError::InvalidSeparator { record });
        }

        let acids: Vec<Acid> = decode_line(&self.lines[ACIDS], &FASTQ_BYTE_TO_ACID)
            .map_err(FastqReaderError::InvalidAcid)?;
        let quality_scores: Vec<FastqQualityScore> =
            decode_line(&self.lines[QUALITY_SCORES], &FASTQ_BYTE_TO_Q_SCORE)
                .map_err(FastqReaderError::InvalidQualityScore)?;
        if acids.len() != quality_scores.len() {
            return Err(FastqReaderError::LengthMismatch {
                acids: acids.len(),
                quality_scores: quality_scores.len(),
            });
        }

        Ok(Some(FastqSequence::with_size(
            identifier,
            acids,
            quality_scores,
            ByteNum::new(self.record_bytes),
        )))
    }

    /// Reads the next line into `lines[index]` without its line terminator.
    /// Returns `false` at the end of input.
    fn read_line(&mut self, index: usize) -> FastqResult<bool> {
        let line = &mut self.lines[index];
        line.clear();
        let n = self.reader.read_until(b'\n', line)?;
        while let Some(b'\n' | b'\r') = line.last().copied() {
            line.pop();
        }
        self.record_bytes += n;

        Ok(n > 0)
    }
}

fn decode_line<T: Copy>(line: &[u8], table: &[Option<T>; 256]) -> Result<Vec<T>, char> {
    line.iter()
        .map(|&byte| table[byte as usize].ok_or(byte as char))
        .collect()
}

impl<R: BufRead> IntoIterator for FastqReader<R> {
    type Item = FastqResult<FastqSequence>;
    type IntoIter = FastqReaderIterator<R>;

    fn into_iter(self) -> Self::IntoIter {
        Self::IntoIter {
            reader: self,
            done: false,
        }
    }
}

/// Iterator over all records of a FASTQ file.
///
/// Recoverable errors are yielded and iteration goes on; any other error
/// is yielded once and ends the iteration.
#[derive(Debug)]
pub struct FastqReaderIterator<R> {
    reader: FastqReader<R>,
    done: bool,
}

impl<R> FastqReaderIterator<R> {
    /// Number of records read so far, including rejected ones.
    #[must_use]
    pub fn records_read(&self) -> u64 {
        self.reader.record
    }
}

impl<R: BufRead> Iterator for FastqReaderIterator<R> {
    type Item = FastqResult<FastqSequence>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.reader.read_sequence().transpose();
        match &result {
            Some(Ok(_)) => {}
            Some(Err(e)) if e.is_recoverable() => {}
            _ => self.done = true,
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;
    use std::io::ErrorKind::NotFound;

    use crate::_internal_test_data::{
        random_reads_fastq, EMPTY_TEST_SEQUENCE, EMPTY_TEST_SEQUENCE_STR, SIMPLE_TEST_SEQUENCE,
        SIMPLE_TEST_SEQUENCE_STR,
    };
    use crate::fastq::reader::{FastqReader, FastqReaderError, FastqResult};
    use crate::fastq::FastqSequence;

    fn read_one(data: &str) -> FastqResult<Option<FastqSequence>> {
        FastqReader::new(data.as_bytes()).read_sequence()
    }

    #[test]
    fn test_empty_sequence() {
        let sequence = read_one(EMPTY_TEST_SEQUENCE_STR).unwrap();

        assert_eq!(sequence.as_ref(), Some(&*EMPTY_TEST_SEQUENCE));
    }

    #[test]
    fn test_simple_sequence() {
        let sequence = read_one(SIMPLE_TEST_SEQUENCE_STR).unwrap();

        assert_eq!(sequence.as_ref(), Some(&*SIMPLE_TEST_SEQUENCE));
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let data = "\r\n@seq\r\nAC\r\n+\r\nI#\r\n\n\n@next\nG\n+\n!\n";
        let sequences: Vec<_> = FastqReader::new(data.as_bytes())
            .into_iter()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(sequences.len(), 2);
        assert_eq!(sequences[0].identifier().str(), "seq");
        assert_eq!(sequences[0].len(), 2);
        assert_eq!(sequences[1].identifier().str(), "next");
    }

    #[test]
    fn test_invalid_acid() {
        let error = read_one("@seq\nX\n+\n!").unwrap_err();

        assert!(matches!(error, FastqReaderError::InvalidAcid('X')));
    }

    #[test]
    fn test_invalid_quality_score() {
        let error = read_one("@seq\nA\n+\n\x07").unwrap_err();

        assert!(matches!(error, FastqReaderError::InvalidQualityScore('\x07')));
    }

    #[test]
    fn test_invalid_title_reports_record() {
        let data = "@ok\nA\n+\n!\nseq\nA\n+\n!\n";
        let results: Vec<_> = FastqReader::new(data.as_bytes()).into_iter().collect();

        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(FastqReaderError::InvalidTitle { record: 2 })
        ));
    }

    #[test]
    fn test_invalid_separator() {
        let error = read_one("@seq\nA\n-\n!\n").unwrap_err();

        assert!(matches!(
            error,
            FastqReaderError::InvalidSeparator { record: 1 }
        ));
    }

    #[test]
    fn test_length_mismatch() {
        let error = read_one("@seq\nA\n+\n123").unwrap_err();

        assert!(matches!(
            error,
            FastqReaderError::LengthMismatch {
                acids: 1,
                quality_scores: 3
            }
        ));
    }

    #[test]
    fn test_truncated_record() {
        let mut reader = FastqReader::new("@a\nA\n+\n!\n@b\nACGT\n".as_bytes());

        assert!(reader.read_sequence().unwrap().is_some());
        assert!(matches!(
            reader.read_sequence(),
            Err(FastqReaderError::TruncatedRecord { record: 2 })
        ));
        assert_eq!(reader.records_read(), 2);
    }

    #[test]
    fn test_iterator_continues_after_bad_record() {
        let data = "@r1\nACGT\n+\nIIII\n@r2\nACRT\n+\nIIII\n@r3\nAC\n+\nI\n@r4\nacgt\n+\nIIII\n@r5\nGG\n+\n!!\n";
        let mut sequences = FastqReader::new(data.as_bytes()).into_iter();

        assert_eq!(sequences.next().unwrap().unwrap().identifier().str(), "r1");
        assert!(matches!(
            sequences.next(),
            Some(Err(FastqReaderError::InvalidAcid('R')))
        ));
        assert!(matches!(
            sequences.next(),
            Some(Err(FastqReaderError::LengthMismatch { .. }))
        ));
        assert!(matches!(
            sequences.next(),
            Some(Err(FastqReaderError::InvalidAcid('a')))
        ));
        assert_eq!(sequences.records_read(), 4);
        assert_eq!(sequences.next().unwrap().unwrap().identifier().str(), "r5");
        assert!(sequences.next().is_none());
    }

    #[test]
    fn test_iterator_stops_after_fatal_error() {
        let data = "@seq\nA\n-\n!\n@seq\nA\n+\n!\n";
        let results: Vec<_> = FastqReader::new(data.as_bytes()).into_iter().collect();

        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0],
            Err(FastqReaderError::InvalidSeparator { record: 1 })
        ));
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(FastqReaderError::InvalidAcid('R').is_recoverable());
        assert!(FastqReaderError::InvalidQualityScore(' ').is_recoverable());
        assert!(!FastqReaderError::TruncatedRecord { record: 1 }.is_recoverable());
        assert!(!FastqReaderError::InvalidTitle { record: 1 }.is_recoverable());
    }

    #[test]
    fn test_random_reads() {
        let data = random_reads_fastq(100, 76);
        let sequences: Vec<_> = FastqReader::new(data.as_slice())
            .into_iter()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(sequences.len(), 100);
        assert!(sequences.iter().all(|seq| !seq.identifier().is_empty()));
        assert!(sequences.iter().all(|seq| seq.len() == 76));
    }

    #[test]
    fn test_empty_input() {
        for data in ["", "\n", " \n\r\n"] {
            let mut reader = FastqReader::new(data.as_bytes());
            assert!(reader.read_sequence().unwrap().is_none(), "{:?}", data);
            assert_eq!(reader.records_read(), 0);
        }
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            FastqReaderError::from(std::io::Error::from(NotFound)).to_string(),
            "IO error: entity not found"
        );
        assert_eq!(
            FastqReaderError::TruncatedRecord { record: 7 }.to_string(),
            "Record #7 is truncated"
        );
        assert_eq!(
            FastqReaderError::InvalidAcid('#').to_string(),
            "Invalid acid: `#`"
        );
        assert_eq!(
            FastqReaderError::LengthMismatch {
                acids: 4,
                quality_scores: 3
            }
            .to_string(),
            "4 acids but 3 quality scores"
        );
    }

    #[test]
    fn test_error_source() {
        assert!(FastqReaderError::from(std::io::Error::from(NotFound))
            .source()
            .is_some());
        assert!(FastqReaderError::InvalidTitle { record: 1 }
            .source()
            .is_none());
    }
}

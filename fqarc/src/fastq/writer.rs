use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;

use crate::fastq::{FastqSequence, FASTQ_QUALITY_SCORE_SEPARATOR, FASTQ_TITLE_PREFIX};

#[derive(Debug)]
pub enum FastqWriterError {
    IoError(std::io::Error),
}

impl From<std::io::Error> for FastqWriterError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

impl Display for FastqWriterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FastqWriterError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl Error for FastqWriterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FastqWriterError::IoError(e) => Some(e),
        }
    }
}

pub type FastqWriteResult<T> = Result<T, FastqWriterError>;

/// Writes [`FastqSequence`] records in the four-line FASTQ layout.
#[derive(Debug)]
pub struct FastqWriter<W> {
    writer: W,
    line: Vec<u8>,
}

impl<W: Write> FastqWriter<W> {
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            line: Vec::new(),
        }
    }

    pub fn write_sequence(&mut self, sequence: &FastqSequence) -> FastqWriteResult<()> {
        writeln!(
            &mut self.writer,
            "{}{}",
            FASTQ_TITLE_PREFIX,
            sequence.identifier()
        )?;

        self.line.clear();
        self.line
            .extend(sequence.acids().iter().map(|acid| acid.as_char() as u8));
        self.line.push(b'\n');
        self.line.push(FASTQ_QUALITY_SCORE_SEPARATOR);
        self.line.push(b'\n');
        self.line.extend(
            sequence
                .quality_scores()
                .iter()
                .map(|q_score| q_score.as_fastq_char() as u8),
        );
        self.line.push(b'\n');
        self.writer.write_all(&self.line)?;

        Ok(())
    }

    pub fn flush(&mut self) -> FastqWriteResult<()> {
        self.writer.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;
    use std::io::ErrorKind::NotFound;

    use crate::_internal_test_data::{
        random_reads, EMPTY_TEST_SEQUENCE, EMPTY_TEST_SEQUENCE_STR, SIMPLE_TEST_SEQUENCE,
        SIMPLE_TEST_SEQUENCE_STR,
    };
    use crate::fastq::reader::FastqReader;
    use crate::fastq::writer::{FastqWriter, FastqWriterError};

    #[test]
    fn should_return_empty_seq() {
        let mut buf = Vec::new();
        FastqWriter::new(&mut buf)
            .write_sequence(&EMPTY_TEST_SEQUENCE)
            .unwrap();

        assert_eq!(String::from_utf8(buf).unwrap(), EMPTY_TEST_SEQUENCE_STR);
    }

    #[test]
    fn should_return_simple_seq() {
        let mut buf = Vec::new();
        FastqWriter::new(&mut buf)
            .write_sequence(&SIMPLE_TEST_SEQUENCE)
            .unwrap();

        assert_eq!(String::from_utf8(buf).unwrap(), SIMPLE_TEST_SEQUENCE_STR);
    }

    #[test]
    fn test_write_then_read() {
        let sequences = random_reads(50, 30);
        let mut buf = Vec::new();
        let mut writer = FastqWriter::new(&mut buf);
        for sequence in &sequences {
            writer.write_sequence(sequence).unwrap();
        }
        writer.flush().unwrap();

        let result: Result<Vec<_>, _> = FastqReader::new(buf.as_slice()).into_iter().collect();
        assert_eq!(result.unwrap(), sequences);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            format!("{}", FastqWriterError::from(std::io::Error::from(NotFound))),
            "IO error: entity not found"
        )
    }

    #[test]
    fn test_error_source() {
        assert!(FastqWriterError::from(std::io::Error::from(NotFound))
            .source()
            .is_some());
    }
}

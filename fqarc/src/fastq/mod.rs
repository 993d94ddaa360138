//! FASTQ reading and writing.

mod consts;
pub mod input;
pub mod reader;
pub mod writer;

pub use consts::{FastqQualityScore, FastqSequence, FASTQ_Q_END};
pub(crate) use consts::{
    FASTQ_QUALITY_SCORE_CHARS, FASTQ_QUALITY_SCORE_SEPARATOR, FASTQ_TITLE_PREFIX,
};

use std::ops::RangeInclusive;

use crate::sequence::{Acid, NucleotideSequence, QualityScore};

pub(crate) const FASTQ_TITLE_PREFIX: char = '@';
pub(crate) const FASTQ_QUALITY_SCORE_SEPARATOR: u8 = b'+';

const FASTQ_QUALITY_SCORE_BYTE_START: u8 = b'!';
const FASTQ_QUALITY_SCORE_BYTE_END: u8 = b'~';

pub(crate) const FASTQ_QUALITY_SCORE_CHARS: RangeInclusive<char> =
    (FASTQ_QUALITY_SCORE_BYTE_START as char)..=(FASTQ_QUALITY_SCORE_BYTE_END as char);

/// Number of distinct quality scores that can be written in a FASTQ file
/// (Phred+33, `'!'..='~'`).
pub const FASTQ_Q_END: usize = 94;

/// Read whose quality scores fit the FASTQ range.
pub type FastqSequence = NucleotideSequence<FASTQ_Q_END>;
/// Quality score that fits the FASTQ range.
pub type FastqQualityScore = QualityScore<FASTQ_Q_END>;

pub(super) const FASTQ_BYTE_TO_ACID: [Option<Acid>; 256] = {
    let mut acids = [None; 256];

    let mut i = 0;
    while i < Acid::ALL.len() {
        let acid = Acid::ALL[i];
        acids[acid.as_char() as usize] = Some(acid);
        i += 1;
    }

    acids
};

pub(super) const FASTQ_BYTE_TO_Q_SCORE: [Option<FastqQualityScore>; 256] = {
    let mut q_scores = [None; 256];

    let mut byte = FASTQ_QUALITY_SCORE_BYTE_START;
    while byte <= FASTQ_QUALITY_SCORE_BYTE_END {
        q_scores[byte as usize] = Some(FastqQualityScore::new(
            byte - FASTQ_QUALITY_SCORE_BYTE_START,
        ));
        byte += 1;
    }

    q_scores
};

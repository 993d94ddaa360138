use itertools::Itertools;
use lazy_static::lazy_static;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::fastq::writer::FastqWriter;
use crate::fastq::{FastqQualityScore, FastqSequence, FASTQ_Q_END};
use crate::sequence::Acid::{A, C, G, T};
use crate::sequence::{Acid, PairObservation};

pub const EMPTY_TEST_SEQUENCE_STR: &str = "@seq

+

";

lazy_static! {
    pub static ref EMPTY_TEST_SEQUENCE: FastqSequence = FastqSequence::new("seq", [], []);
}

pub const SIMPLE_TEST_SEQUENCE_STR: &str = "@SEQ_ID
GATTTGGGGTTCAAAGCAGTATCGATCAAATAGTAAATCCATTTGTTCAACTCACAGTTT
+
!''*((((***+))%%%++)(%%%%).1***-+*''))**55CCF>>>>>>CCCCCCC65
";

lazy_static! {
    pub static ref SIMPLE_TEST_SEQUENCE: FastqSequence = FastqSequence::new(
        "SEQ_ID",
        [
            G, A, T, T, T, G, G, G, G, T, T, C, A, A, A, G, C, A, G, T, A, T, C, G, A, T, C, A, A,
            A, T, A, G, T, A, A, A, T, C, C, A, T, T, T, G, T, T, C, A, A, C, T, C, A, C, A, G, T,
            T, T
        ],
        [
            0, 6, 6, 9, 7, 7, 7, 7, 9, 9, 9, 10, 8, 8, 4, 4, 4, 10, 10, 8, 7, 4, 4, 4, 4, 8, 13,
            16, 9, 9, 9, 12, 10, 9, 6, 6, 8, 8, 9, 9, 20, 20, 34, 34, 37, 29, 29, 29, 29, 29, 29,
            34, 34, 34, 34, 34, 34, 34, 21, 20
        ]
        .into_iter()
        .map_into()
        .collect::<Vec<FastqQualityScore>>(),
    );
}

/// Shorthand for a pair given as an acid and a FASTQ quality character.
#[must_use]
pub fn pair(acid: Acid, quality_char: char) -> PairObservation {
    let quality_score = FastqQualityScore::from_fastq_char(quality_char)
        .unwrap_or_else(|| panic!("invalid quality character: {:?}", quality_char));
    PairObservation::new(acid, quality_score)
}

/// The first `n` pairs in (quality score, acid) order, all distinct.
#[must_use]
pub fn distinct_pairs(n: usize) -> Vec<PairObservation> {
    FastqQualityScore::values()
        .cartesian_product(Acid::ALL)
        .map(|(quality_score, acid)| PairObservation::new(acid, quality_score))
        .take(n)
        .collect()
}

/// Deterministic pseudo-random reads with a skewed, Illumina-like quality
/// distribution. N is rare; low quality scores are rare.
#[must_use]
pub fn random_reads(num: usize, len: usize) -> Vec<FastqSequence> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(1337);

    (0..num)
        .map(|i| {
            let acids: Vec<Acid> = (0..len)
                .map(|_| {
                    if rng.gen_ratio(1, 50) {
                        Acid::N
                    } else {
                        [A, C, G, T][rng.gen_range(0..4)]
                    }
                })
                .collect();
            let quality_scores: Vec<FastqQualityScore> = (0..len)
                .map(|_| {
                    let value = if rng.gen_ratio(4, 5) {
                        rng.gen_range(30..=41)
                    } else {
                        rng.gen_range(2..30)
                    };
                    debug_assert!((value as usize) < FASTQ_Q_END);
                    FastqQualityScore::new(value)
                })
                .collect();

            FastqSequence::new(format!("read_{}/1", i), acids, quality_scores)
        })
        .collect()
}

/// [`random_reads`] written out as FASTQ.
#[must_use]
pub fn random_reads_fastq(num: usize, len: usize) -> Vec<u8> {
    let mut data = Vec::new();
    let mut writer = FastqWriter::new(&mut data);
    for sequence in random_reads(num, len) {
        writer.write_sequence(&sequence).unwrap();
    }
    writer.flush().unwrap();
    drop(writer);

    data
}

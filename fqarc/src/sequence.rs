use std::fmt::{Display, Formatter};

use derive_more::Deref;
use serde::{Deserialize, Serialize};

use crate::fastq::{FastqQualityScore, FastqSequence, FASTQ_QUALITY_SCORE_CHARS};
use crate::progress::ByteNum;

/// Identifier (title/name) of a sequencing read.
#[derive(Debug, Eq, PartialEq, Hash, Clone, Default)]
pub struct ReadIdentifier(pub String);

impl ReadIdentifier {
    /// Empty identifier.
    pub const EMPTY: ReadIdentifier = ReadIdentifier(String::new());

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns this identifier as string.
    #[inline]
    #[must_use]
    pub fn str(&self) -> &str {
        &self.0
    }
}

impl Display for ReadIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ReadIdentifier {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for ReadIdentifier {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A sequencing read: identifier, bases and the per-base quality scores.
#[derive(Clone, Debug)]
pub struct NucleotideSequence<const Q_END: usize> {
    identifier: ReadIdentifier,
    acids: Vec<Acid>,
    quality_scores: Vec<QualityScore<Q_END>>,
    size: ByteNum,
}

impl<const Q_END: usize> NucleotideSequence<Q_END> {
    /// Creates a new instance of `NucleotideSequence`.
    ///
    /// # Examples
    /// ```
    /// use fqarc::sequence::{Acid, NucleotideSequence, QualityScore};
    ///
    /// let seq: NucleotideSequence<20> = NucleotideSequence::new(
    ///     "READ_1",
    ///     [Acid::A, Acid::C, Acid::G],
    ///     [
    ///         QualityScore::<20>::new(5),
    ///         QualityScore::<20>::new(10),
    ///         QualityScore::<20>::new(15),
    ///     ],
    /// );
    /// assert_eq!(seq.len(), 3);
    /// ```
    ///
    /// # Panics
    /// This function panics if the number of acids is not equal to the number
    /// of quality scores.
    #[must_use]
    pub fn new<T, U, V>(identifier: T, acids: U, quality_scores: V) -> Self
    where
        T: Into<ReadIdentifier>,
        U: Into<Vec<Acid>>,
        V: Into<Vec<QualityScore<Q_END>>>,
    {
        let identifier = identifier.into();
        let acids = acids.into();
        let quality_scores = quality_scores.into();

        const FASTQ_BOILERPLATE_LEN: usize = "@\n\n+\n\n".len();
        let approximate_size =
            identifier.len() + acids.len() + quality_scores.len() + FASTQ_BOILERPLATE_LEN;

        Self::with_size(
            identifier,
            acids,
            quality_scores,
            ByteNum::new(approximate_size),
        )
    }

    /// Same as [`NucleotideSequence::new`], but with the size of the source
    /// record given explicitly (used for progress reporting).
    #[must_use]
    pub fn with_size<T, U, V>(identifier: T, acids: U, quality_scores: V, size: ByteNum) -> Self
    where
        T: Into<ReadIdentifier>,
        U: Into<Vec<Acid>>,
        V: Into<Vec<QualityScore<Q_END>>>,
    {
        let acids = acids.into();
        let quality_scores = quality_scores.into();
        assert_eq!(acids.len(), quality_scores.len());

        Self {
            identifier: identifier.into(),
            acids,
            quality_scores,
            size,
        }
    }

    #[must_use]
    pub fn identifier(&self) -> &ReadIdentifier {
        &self.identifier
    }

    #[must_use]
    pub fn acids(&self) -> &[Acid] {
        &self.acids
    }

    #[must_use]
    pub fn quality_scores(&self) -> &[QualityScore<Q_END>] {
        &self.quality_scores
    }

    /// Returns a copy of this read with an empty identifier.
    #[must_use]
    pub fn with_identifier_discarded(self) -> Self {
        Self::with_size(
            ReadIdentifier::EMPTY,
            self.acids,
            self.quality_scores,
            self.size,
        )
    }

    /// Consumes this read and returns its acids and quality scores.
    #[must_use]
    pub fn into_data(self) -> (Vec<Acid>, Vec<QualityScore<Q_END>>) {
        (self.acids, self.quality_scores)
    }

    /// Number of positions (acid/quality score pairs) in the read.
    #[must_use]
    pub fn len(&self) -> usize {
        self.acids.len()
    }

    #[must_use]
    pub fn size(&self) -> ByteNum {
        self.size
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.acids.is_empty()
    }
}

// The byte size is bookkeeping only and does not take part in equality.
impl<const Q_END: usize> PartialEq for NucleotideSequence<Q_END> {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
            && self.acids == other.acids
            && self.quality_scores == other.quality_scores
    }
}

impl<const Q_END: usize> Eq for NucleotideSequence<Q_END> {}

/// Nucleic acid.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum Acid {
    #[default]
    /// Unknown nucleic acid.
    N,
    /// Adenine.
    A,
    /// Cytosine.
    C,
    /// Thymine.
    T,
    /// Guanine.
    G,
}

impl Acid {
    /// All acids, in declaration order.
    pub const ALL: [Acid; 5] = [Acid::N, Acid::A, Acid::C, Acid::T, Acid::G];

    /// The FASTQ letter of this acid.
    #[must_use]
    pub const fn as_char(&self) -> char {
        match self {
            Acid::A => 'A',
            Acid::C => 'C',
            Acid::G => 'G',
            Acid::T => 'T',
            Acid::N => 'N',
        }
    }

    /// Parses a FASTQ letter.
    ///
    /// # Examples
    /// ```
    /// use fqarc::sequence::Acid;
    ///
    /// assert_eq!(Acid::from_char('G'), Some(Acid::G));
    /// assert_eq!(Acid::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(ch: char) -> Option<Acid> {
        match ch {
            'A' => Some(Acid::A),
            'C' => Some(Acid::C),
            'G' => Some(Acid::G),
            'T' => Some(Acid::T),
            'N' => Some(Acid::N),
            _ => None,
        }
    }
}

impl Display for Acid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Quality score (how certain the base call is) of a single position.
#[derive(Deref, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Clone, Copy)]
#[repr(transparent)]
pub struct QualityScore<const Q_END: usize>(u8);

impl<const Q_END: usize> QualityScore<Q_END> {
    pub const ZERO: QualityScore<Q_END> = Self(0);

    /// Constructs a new QualityScore instance.
    ///
    /// # Panics
    /// This function panics if `value` >= `Q_END`.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        assert!((value as usize) < Q_END);

        Self(value)
    }

    /// Same as [`QualityScore::new`], but returns `None` instead of
    /// panicking.
    #[must_use]
    pub const fn checked_new(value: u8) -> Option<Self> {
        if (value as usize) < Q_END {
            Some(Self(value))
        } else {
            None
        }
    }

    #[must_use]
    pub fn get(&self) -> usize {
        self.0 as usize
    }

    /// Every representable quality score, ascending.
    pub fn values() -> impl Iterator<Item = Self> {
        (0..Q_END).map(|value| Self(value as u8))
    }
}

impl FastqQualityScore {
    /// The Phred+33 character of this quality score.
    #[must_use]
    pub fn as_fastq_char(&self) -> char {
        (*FASTQ_QUALITY_SCORE_CHARS.start() as u8 + self.0) as char
    }

    /// Parses a Phred+33 character.
    ///
    /// # Examples
    /// ```
    /// use fqarc::fastq::FastqQualityScore;
    ///
    /// assert_eq!(FastqQualityScore::from_fastq_char('!'), Some(FastqQualityScore::new(0)));
    /// assert_eq!(FastqQualityScore::from_fastq_char('I'), Some(FastqQualityScore::new(40)));
    /// assert_eq!(FastqQualityScore::from_fastq_char(' '), None);
    /// ```
    #[must_use]
    pub fn from_fastq_char(ch: char) -> Option<Self> {
        if FASTQ_QUALITY_SCORE_CHARS.contains(&ch) {
            Some(Self(ch as u8 - *FASTQ_QUALITY_SCORE_CHARS.start() as u8))
        } else {
            None
        }
    }
}

impl Display for FastqQualityScore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_fastq_char())
    }
}

impl<const Q_END: usize> From<u8> for QualityScore<Q_END> {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

/// The (acid, quality score) combination observed at one position of a read.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairObservation {
    pub acid: Acid,
    pub quality_score: FastqQualityScore,
}

impl PairObservation {
    #[must_use]
    pub const fn new(acid: Acid, quality_score: FastqQualityScore) -> Self {
        Self {
            acid,
            quality_score,
        }
    }
}

impl Display for PairObservation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.acid, self.quality_score)
    }
}

impl FastqSequence {
    /// Iterates over the (acid, quality score) pairs of this read, in order.
    pub fn pairs(&self) -> impl Iterator<Item = PairObservation> + '_ {
        self.acids
            .iter()
            .zip(&self.quality_scores)
            .map(|(&acid, &quality_score)| PairObservation::new(acid, quality_score))
    }
}

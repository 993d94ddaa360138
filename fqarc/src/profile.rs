//! Counting (acid, quality score) pair occurrences over a corpus of reads.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::fastq::FastqSequence;
use crate::sequence::PairObservation;

/// Occurrence counts of distinct [`PairObservation`]s.
///
/// Iteration order is the order in which pairs were first seen. The alphabet
/// builder uses it to break ties between equally frequent pairs, so profiling
/// the same input always yields the same table, entry order included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    index: HashMap<PairObservation, usize>,
    entries: Vec<(PairObservation, u64)>,
}

impl FrequencyTable {
    /// Creates an empty `FrequencyTable`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts a single occurrence of `pair`.
    ///
    /// # Examples
    /// ```
    /// use fqarc::fastq::FastqQualityScore;
    /// use fqarc::profile::FrequencyTable;
    /// use fqarc::sequence::{Acid, PairObservation};
    ///
    /// let pair = PairObservation::new(Acid::A, FastqQualityScore::new(37));
    /// let mut table = FrequencyTable::new();
    /// table.add(pair);
    /// table.add(pair);
    /// assert_eq!(table.count(pair), 2);
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn add(&mut self, pair: PairObservation) {
        self.add_count(pair, 1);
    }

    fn add_count(&mut self, pair: PairObservation, count: u64) {
        match self.index.get(&pair) {
            Some(&position) => self.entries[position].1 += count,
            None => {
                self.index.insert(pair, self.entries.len());
                self.entries.push((pair, count));
            }
        }
    }

    /// Counts every position of `sequence`.
    pub fn add_sequence(&mut self, sequence: &FastqSequence) {
        for pair in sequence.pairs() {
            self.add(pair);
        }
    }

    /// Profiles a stream of reads, stopping at the first read error.
    pub fn from_sequences<I, E>(sequences: I) -> Result<Self, E>
    where
        I: IntoIterator<Item = Result<FastqSequence, E>>,
    {
        let mut table = Self::new();
        for sequence in sequences {
            table.add_sequence(&sequence?);
        }
        Ok(table)
    }

    /// Profiles a batch of reads on the rayon thread pool.
    ///
    /// The result is identical to profiling the batch sequentially, including
    /// the first-seen order of the entries.
    #[must_use]
    pub fn profile_parallel(sequences: &[FastqSequence]) -> Self {
        sequences
            .par_iter()
            .fold(Self::new, |mut table, sequence| {
                table.add_sequence(sequence);
                table
            })
            .reduce(Self::new, |mut left, right| {
                left.merge(&right);
                left
            })
    }

    /// Adds all counts of `other` to this table.
    ///
    /// Pairs already present keep their position; pairs new to this table
    /// are appended in `other`'s order, so merging the profiles of two
    /// consecutive chunks gives the profile of their concatenation.
    pub fn merge(&mut self, other: &FrequencyTable) {
        for &(pair, count) in &other.entries {
            self.add_count(pair, count);
        }
    }

    /// Number of occurrences of `pair` (0 if never seen).
    #[must_use]
    pub fn count(&self, pair: PairObservation) -> u64 {
        self.index
            .get(&pair)
            .map_or(0, |&position| self.entries[position].1)
    }

    /// Number of distinct pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of observations.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|&(_, count)| count).sum()
    }

    /// Iterates over `(pair, count)` entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (PairObservation, u64)> + Clone + '_ {
        self.entries.iter().copied()
    }
}

impl FromIterator<PairObservation> for FrequencyTable {
    fn from_iter<T: IntoIterator<Item = PairObservation>>(iter: T) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

impl Extend<PairObservation> for FrequencyTable {
    fn extend<T: IntoIterator<Item = PairObservation>>(&mut self, iter: T) {
        for pair in iter {
            self.add(pair);
        }
    }
}

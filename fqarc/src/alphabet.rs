//! Frequency-ranked symbol alphabet over (acid, quality score) pairs.
//!
//! Every distinct pair observed in a corpus gets one printable codepoint. The
//! most frequent pairs get the single-byte (ASCII) codepoints, the rest fall
//! through to two-byte UTF-8 letters. The rank of a pair (its position in the
//! frequency order) doubles as its integer [`SymbolCode`] for bit packing.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

use log::debug;

use crate::bitpack::bit_width_for;
use crate::profile::FrequencyTable;
use crate::sequence::PairObservation;

/// Character used as the record marker by the text representation; never
/// assigned to a pair unless the reserved set is overridden.
pub const DEFAULT_RESERVED: char = '@';

const SINGLE_BYTE_CODEPOINTS: std::ops::RangeInclusive<char> = '!'..='~';
const TWO_BYTE_CODEPOINTS: std::ops::Range<u32> = 0x80..0x800;

// Letters of general category Lu or Ll in `U+0080..U+0800`, as of Unicode
// 14.0. The table is fixed so that symbol assignment does not depend on the
// Unicode version of the toolchain (U+0295 is Ll in 14.0 but not later).
const CASED_LETTERS: [std::ops::RangeInclusive<char>; 24] = [
    '\u{B5}'..='\u{B5}',
    '\u{C0}'..='\u{D6}',
    '\u{D8}'..='\u{F6}',
    '\u{F8}'..='\u{1BA}',
    '\u{1BC}'..='\u{1BF}',
    '\u{1C4}'..='\u{1C4}',
    '\u{1C6}'..='\u{1C7}',
    '\u{1C9}'..='\u{1CA}',
    '\u{1CC}'..='\u{1F1}',
    '\u{1F3}'..='\u{293}',
    '\u{295}'..='\u{2AF}',
    '\u{370}'..='\u{373}',
    '\u{376}'..='\u{377}',
    '\u{37B}'..='\u{37D}',
    '\u{37F}'..='\u{37F}',
    '\u{386}'..='\u{386}',
    '\u{388}'..='\u{38A}',
    '\u{38C}'..='\u{38C}',
    '\u{38E}'..='\u{3A1}',
    '\u{3A3}'..='\u{3F5}',
    '\u{3F7}'..='\u{481}',
    '\u{48A}'..='\u{52F}',
    '\u{531}'..='\u{556}',
    '\u{560}'..='\u{588}',
];

/// Error occurring when building or loading a [`SymbolAlphabet`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum AlphabetError {
    /// More distinct pairs than candidate codepoints.
    Overflow { pairs: usize, budget: usize },
    /// The same codepoint was assigned to two pairs.
    DuplicateSymbol(char),
    /// The same pair was listed twice.
    DuplicatePair(PairObservation),
    /// A codepoint that the [`AlphabetParams`] rule out (reserved, or
    /// outside the budget) is assigned to a pair.
    UnavailableSymbol(char),
}

impl Display for AlphabetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AlphabetError::Overflow { pairs, budget } => write!(
                f,
                "Alphabet overflow: {} distinct pairs, but only {} symbols available ({} too many)",
                pairs,
                budget,
                pairs.saturating_sub(*budget)
            ),
            AlphabetError::DuplicateSymbol(ch) => {
                write!(f, "Symbol `{}` (U+{:04X}) assigned twice", ch, *ch as u32)
            }
            AlphabetError::DuplicatePair(pair) => write!(f, "Pair `{}` listed twice", pair),
            AlphabetError::UnavailableSymbol(ch) => write!(
                f,
                "Symbol `{}` (U+{:04X}) is reserved or outside the codepoint budget",
                ch, *ch as u32
            ),
        }
    }
}

impl Error for AlphabetError {}

pub type AlphabetResult<T> = Result<T, AlphabetError>;

/// Which codepoint tiers the builder may draw from.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum CodepointBudget {
    /// Printable, non-space ASCII only.
    SingleByte,
    /// ASCII first, then upper/lower case letters encoded in two UTF-8 bytes.
    #[default]
    TwoByte,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AlphabetParams {
    reserved: Vec<char>,
    budget: CodepointBudget,
}

impl AlphabetParams {
    #[must_use]
    pub fn builder() -> AlphabetParamsBuilder {
        AlphabetParamsBuilder::new()
    }

    #[must_use]
    pub fn reserved(&self) -> &[char] {
        &self.reserved
    }

    #[must_use]
    pub fn budget(&self) -> CodepointBudget {
        self.budget
    }
}

impl Default for AlphabetParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Clone)]
pub struct AlphabetParamsBuilder {
    reserved: Vec<char>,
    budget: CodepointBudget,
}

impl AlphabetParamsBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            reserved: vec![DEFAULT_RESERVED],
            budget: CodepointBudget::default(),
        }
    }

    /// Replaces the set of characters that must never be assigned.
    pub fn reserved<I: IntoIterator<Item = char>>(&mut self, reserved: I) -> &mut Self {
        let mut new = self;
        new.reserved = reserved.into_iter().collect();
        new
    }

    pub fn budget(&mut self, budget: CodepointBudget) -> &mut Self {
        let mut new = self;
        new.budget = budget;
        new
    }

    #[must_use]
    pub fn build(&self) -> AlphabetParams {
        AlphabetParams {
            reserved: self.reserved.clone(),
            budget: self.budget,
        }
    }
}

impl Default for AlphabetParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn is_cased_letter(ch: char) -> bool {
    CASED_LETTERS.iter().any(|range| range.contains(&ch))
}

/// Candidate codepoints in assignment order: the single-byte tier, then (if
/// the budget allows) the two-byte tier, both ascending and without the
/// reserved characters.
///
/// # Examples
/// ```
/// use fqarc::alphabet::{candidate_codepoints, AlphabetParams};
///
/// let params = AlphabetParams::default();
/// let candidates: Vec<char> = candidate_codepoints(&params).take(3).collect();
/// assert_eq!(candidates, ['!', '"', '#']);
/// assert!(candidate_codepoints(&params).all(|ch| ch != '@'));
/// ```
pub fn candidate_codepoints(params: &AlphabetParams) -> impl Iterator<Item = char> + '_ {
    let two_byte_range = match params.budget {
        CodepointBudget::SingleByte => 0..0,
        CodepointBudget::TwoByte => TWO_BYTE_CODEPOINTS,
    };
    let two_byte = two_byte_range
        .filter_map(char::from_u32)
        .filter(|&ch| is_cased_letter(ch));

    SINGLE_BYTE_CODEPOINTS
        .chain(two_byte)
        .filter(move |ch| !params.reserved.contains(ch))
}

/// Integer code of a pair: its rank in the alphabet, 0 being the most
/// frequent pair.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct SymbolCode(pub u32);

impl SymbolCode {
    #[inline]
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl Display for SymbolCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Bijection between the observed pairs and their symbols.
///
/// Built once from a complete [`FrequencyTable`], immutable afterwards and
/// safe to share between threads for encoding and decoding.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SymbolAlphabet {
    symbols: Vec<(PairObservation, char)>,
    pair_codes: HashMap<PairObservation, SymbolCode>,
    codepoint_codes: HashMap<char, SymbolCode>,
}

impl SymbolAlphabet {
    /// Ranks the pairs of `table` by descending count (ties keep first-seen
    /// order) and assigns candidate codepoints in that order.
    ///
    /// # Examples
    /// ```
    /// use fqarc::alphabet::{AlphabetParams, SymbolAlphabet};
    /// use fqarc::fastq::FastqQualityScore;
    /// use fqarc::profile::FrequencyTable;
    /// use fqarc::sequence::{Acid, PairObservation};
    ///
    /// let a_f = PairObservation::new(Acid::A, FastqQualityScore::from_fastq_char('F').unwrap());
    /// let c_f = PairObservation::new(Acid::C, FastqQualityScore::from_fastq_char('F').unwrap());
    /// let table: FrequencyTable = [c_f, a_f, a_f].into_iter().collect();
    ///
    /// let alphabet = SymbolAlphabet::build(&table, &AlphabetParams::default()).unwrap();
    /// assert_eq!(alphabet.codepoint_of(a_f), Some('!'));
    /// assert_eq!(alphabet.codepoint_of(c_f), Some('"'));
    /// ```
    pub fn build(table: &FrequencyTable, params: &AlphabetParams) -> AlphabetResult<Self> {
        let mut ranked: Vec<(usize, (PairObservation, u64))> = table.iter().enumerate().collect();
        ranked.sort_unstable_by_key(|&(first_seen, (_, count))| (Reverse(count), first_seen));

        let budget = candidate_codepoints(params).count();
        if ranked.len() > budget {
            return Err(AlphabetError::Overflow {
                pairs: ranked.len(),
                budget,
            });
        }

        let symbols: Vec<(PairObservation, char)> = ranked
            .into_iter()
            .zip(candidate_codepoints(params))
            .map(|((_, (pair, _)), ch)| (pair, ch))
            .collect();

        let alphabet = Self::from_ranked(symbols)?;
        debug!(
            "Built alphabet of {} symbols ({} single-byte, {} bits per symbol) out of {} candidates",
            alphabet.len(),
            alphabet.single_byte_len(),
            alphabet.bit_width(),
            budget
        );

        Ok(alphabet)
    }

    /// Creates an alphabet from `(pair, codepoint)` entries listed by rank.
    ///
    /// Fails if a codepoint or a pair appears more than once, i.e. when the
    /// entries do not form a bijection.
    pub fn from_ranked(symbols: Vec<(PairObservation, char)>) -> AlphabetResult<Self> {
        let mut pair_codes = HashMap::with_capacity(symbols.len());
        let mut codepoint_codes = HashMap::with_capacity(symbols.len());

        for (rank, &(pair, ch)) in symbols.iter().enumerate() {
            let code = SymbolCode(rank as u32);
            if pair_codes.insert(pair, code).is_some() {
                return Err(AlphabetError::DuplicatePair(pair));
            }
            if codepoint_codes.insert(ch, code).is_some() {
                return Err(AlphabetError::DuplicateSymbol(ch));
            }
        }

        Ok(Self {
            symbols,
            pair_codes,
            codepoint_codes,
        })
    }

    /// Checks that every symbol is one [`build`](Self::build) could have
    /// assigned with `params`, e.g. for an alphabet loaded from a file.
    pub fn check_params(&self, params: &AlphabetParams) -> AlphabetResult<()> {
        let candidates: HashSet<char> = candidate_codepoints(params).collect();
        match self.symbols.iter().find(|(_, ch)| !candidates.contains(ch)) {
            Some(&(_, ch)) => Err(AlphabetError::UnavailableSymbol(ch)),
            None => Ok(()),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    #[must_use]
    pub fn code_of(&self, pair: PairObservation) -> Option<SymbolCode> {
        self.pair_codes.get(&pair).copied()
    }

    #[must_use]
    pub fn pair_of(&self, code: SymbolCode) -> Option<PairObservation> {
        self.symbols.get(code.0 as usize).map(|&(pair, _)| pair)
    }

    #[must_use]
    pub fn codepoint(&self, code: SymbolCode) -> Option<char> {
        self.symbols.get(code.0 as usize).map(|&(_, ch)| ch)
    }

    #[must_use]
    pub fn codepoint_of(&self, pair: PairObservation) -> Option<char> {
        self.code_of(pair).and_then(|code| self.codepoint(code))
    }

    #[must_use]
    pub fn code_of_codepoint(&self, ch: char) -> Option<SymbolCode> {
        self.codepoint_codes.get(&ch).copied()
    }

    /// Number of bits needed to pack any code of this alphabet.
    #[must_use]
    pub fn bit_width(&self) -> u8 {
        bit_width_for(self.len())
    }

    /// Number of symbols whose codepoint is a single UTF-8 byte.
    #[must_use]
    pub fn single_byte_len(&self) -> usize {
        self.symbols
            .iter()
            .take_while(|(_, ch)| ch.len_utf8() == 1)
            .count()
    }

    /// Iterates over `(code, pair, codepoint)` in rank order.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolCode, PairObservation, char)> + '_ {
        self.symbols
            .iter()
            .enumerate()
            .map(|(rank, &(pair, ch))| (SymbolCode(rank as u32), pair, ch))
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use crate::_internal_test_data::{distinct_pairs, pair, random_reads};
    use crate::alphabet::{
        candidate_codepoints, AlphabetError, AlphabetParams, CodepointBudget, SymbolAlphabet,
        SymbolCode, CASED_LETTERS, DEFAULT_RESERVED,
    };
    use crate::profile::FrequencyTable;
    use crate::sequence::Acid;

    fn table_with_counts(counts: &[(Acid, char, u64)]) -> FrequencyTable {
        let mut table = FrequencyTable::new();
        for &(acid, q, count) in counts {
            for _ in 0..count {
                table.add(pair(acid, q));
            }
        }
        table
    }

    #[test]
    fn test_three_pairs() {
        let table = table_with_counts(&[(Acid::A, 'F', 10), (Acid::C, 'F', 5), (Acid::A, 'E', 1)]);
        let alphabet = SymbolAlphabet::build(&table, &AlphabetParams::default()).unwrap();

        assert_eq!(alphabet.len(), 3);
        assert_eq!(alphabet.codepoint_of(pair(Acid::A, 'F')), Some('!'));
        assert_eq!(alphabet.codepoint_of(pair(Acid::C, 'F')), Some('"'));
        assert_eq!(alphabet.codepoint_of(pair(Acid::A, 'E')), Some('#'));
        assert_eq!(alphabet.bit_width(), 2);
    }

    #[test]
    fn test_ranking_by_count_not_insertion() {
        let table = table_with_counts(&[(Acid::A, 'E', 1), (Acid::C, 'F', 5), (Acid::A, 'F', 10)]);
        let alphabet = SymbolAlphabet::build(&table, &AlphabetParams::default()).unwrap();

        assert_eq!(
            alphabet.iter().map(|(_, pair, _)| pair).collect_vec(),
            [pair(Acid::A, 'F'), pair(Acid::C, 'F'), pair(Acid::A, 'E')]
        );
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let table = table_with_counts(&[
            (Acid::G, '#', 3),
            (Acid::T, '5', 7),
            (Acid::A, 'I', 3),
            (Acid::N, '!', 3),
        ]);
        let alphabet = SymbolAlphabet::build(&table, &AlphabetParams::default()).unwrap();

        assert_eq!(
            alphabet.iter().map(|(_, pair, _)| pair).collect_vec(),
            [
                pair(Acid::T, '5'),
                pair(Acid::G, '#'),
                pair(Acid::A, 'I'),
                pair(Acid::N, '!'),
            ]
        );
    }

    #[test]
    fn test_deterministic() {
        let reads = random_reads(200, 40);
        let table = FrequencyTable::profile_parallel(&reads);

        let first = SymbolAlphabet::build(&table, &AlphabetParams::default()).unwrap();
        let second = SymbolAlphabet::build(&table.clone(), &AlphabetParams::default()).unwrap();

        assert_eq!(first.iter().collect_vec(), second.iter().collect_vec());
    }

    #[test]
    fn test_bijection() {
        let reads = random_reads(200, 40);
        let table = FrequencyTable::profile_parallel(&reads);
        let alphabet = SymbolAlphabet::build(&table, &AlphabetParams::default()).unwrap();

        assert_eq!(alphabet.len(), table.len());
        for (pair, _) in table.iter() {
            let code = alphabet.code_of(pair).unwrap();
            assert_eq!(alphabet.pair_of(code), Some(pair));

            let ch = alphabet.codepoint(code).unwrap();
            assert_eq!(alphabet.code_of_codepoint(ch), Some(code));
        }
    }

    #[test]
    fn test_frequency_ordering() {
        let reads = random_reads(300, 60);
        let table = FrequencyTable::profile_parallel(&reads);
        let alphabet = SymbolAlphabet::build(&table, &AlphabetParams::default()).unwrap();

        for ((p1, c1), (p2, c2)) in table.iter().tuple_combinations() {
            if c1 > c2 {
                let ch1 = alphabet.codepoint_of(p1).unwrap();
                let ch2 = alphabet.codepoint_of(p2).unwrap();
                assert!(ch1.len_utf8() <= ch2.len_utf8());
                assert!(alphabet.code_of(p1) < alphabet.code_of(p2));
            }
        }
    }

    #[test]
    fn test_reserved_never_assigned() {
        let table: FrequencyTable = distinct_pairs(200).into_iter().collect();
        let alphabet = SymbolAlphabet::build(&table, &AlphabetParams::default()).unwrap();

        assert!(alphabet.iter().all(|(_, _, ch)| ch != DEFAULT_RESERVED));
        assert_eq!(alphabet.code_of_codepoint(DEFAULT_RESERVED), None);
    }

    #[test]
    fn test_reserved_override() {
        let params = AlphabetParams::builder().reserved(['!', '#']).build();
        let candidates = candidate_codepoints(&params).take(3).collect_vec();

        assert_eq!(candidates, ['"', '$', '%']);
        assert!(candidate_codepoints(&params).any(|ch| ch == '@'));
    }

    #[test]
    fn test_single_byte_tier() {
        let params = AlphabetParams::builder()
            .budget(CodepointBudget::SingleByte)
            .build();
        let candidates = candidate_codepoints(&params).collect_vec();

        assert_eq!(candidates.len(), 93);
        assert!(candidates.iter().all(|ch| ch.is_ascii_graphic()));
    }

    #[test]
    fn test_two_byte_tier() {
        let candidates = candidate_codepoints(&AlphabetParams::default()).collect_vec();

        assert_eq!(candidates[92], '~');
        assert_eq!(candidates[93], '\u{B5}');
        assert_eq!(candidates[94], '\u{C0}');
        assert!(candidates[93..].iter().all(|ch| ch.len_utf8() == 2));
        assert!(candidates[93..].iter().all(|ch| ch.is_alphabetic()));
        for excluded in ['\u{AA}', '\u{BA}', '\u{D7}', '\u{F7}', '\u{2B0}', '\u{1C5}'] {
            assert!(!candidates.contains(&excluded), "{:?} is a candidate", excluded);
        }
        assert!(candidates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_check_params() {
        let table: FrequencyTable = distinct_pairs(100).into_iter().collect();
        let alphabet = SymbolAlphabet::build(&table, &AlphabetParams::default()).unwrap();

        assert_eq!(alphabet.check_params(&AlphabetParams::default()), Ok(()));
        assert_eq!(
            alphabet.check_params(&AlphabetParams::builder().reserved(['#']).build()),
            Err(AlphabetError::UnavailableSymbol('#'))
        );
        assert_eq!(
            alphabet.check_params(
                &AlphabetParams::builder()
                    .budget(CodepointBudget::SingleByte)
                    .build()
            ),
            Err(AlphabetError::UnavailableSymbol('\u{B5}'))
        );
    }

    #[test]
    fn test_two_byte_tier_is_fixed() {
        let candidates = candidate_codepoints(&AlphabetParams::default()).collect_vec();

        assert_eq!(candidates.len(), 93 + 987);
        assert!(candidates.contains(&'\u{295}'));
        assert!(!candidates.contains(&'\u{294}'));
        assert!(CASED_LETTERS
            .windows(2)
            .all(|w| w[0].end() < w[1].start()));
    }

    #[test]
    fn test_falls_through_to_two_byte_tier() {
        let table: FrequencyTable = distinct_pairs(150).into_iter().collect();
        let alphabet = SymbolAlphabet::build(&table, &AlphabetParams::default()).unwrap();

        assert_eq!(alphabet.len(), 150);
        assert_eq!(alphabet.single_byte_len(), 93);
        assert_eq!(alphabet.codepoint(SymbolCode(93)), Some('\u{B5}'));
        assert_eq!(alphabet.bit_width(), 8);
    }

    #[test]
    fn test_overflow() {
        let table: FrequencyTable = distinct_pairs(100).into_iter().collect();
        let params = AlphabetParams::builder()
            .budget(CodepointBudget::SingleByte)
            .build();

        let error = SymbolAlphabet::build(&table, &params).unwrap_err();
        assert_eq!(
            error,
            AlphabetError::Overflow {
                pairs: 100,
                budget: 93
            }
        );
        assert_eq!(
            error.to_string(),
            "Alphabet overflow: 100 distinct pairs, but only 93 symbols available (7 too many)"
        );
    }

    #[test]
    fn test_empty_table() {
        let alphabet = SymbolAlphabet::build(&FrequencyTable::new(), &AlphabetParams::default())
            .unwrap();

        assert!(alphabet.is_empty());
        assert_eq!(alphabet.bit_width(), 1);
    }

    #[test]
    fn test_from_ranked_rejects_duplicates() {
        let result = SymbolAlphabet::from_ranked(vec![
            (pair(Acid::A, 'F'), '!'),
            (pair(Acid::C, 'F'), '!'),
        ]);
        assert_eq!(result, Err(AlphabetError::DuplicateSymbol('!')));

        let result = SymbolAlphabet::from_ranked(vec![
            (pair(Acid::A, 'F'), '!'),
            (pair(Acid::A, 'F'), '"'),
        ]);
        assert_eq!(result, Err(AlphabetError::DuplicatePair(pair(Acid::A, 'F'))));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AlphabetError::DuplicateSymbol('µ').to_string(),
            "Symbol `µ` (U+00B5) assigned twice"
        );
        assert_eq!(
            AlphabetError::DuplicatePair(pair(Acid::G, '#')).to_string(),
            "Pair `G#` listed twice"
        );
    }
}

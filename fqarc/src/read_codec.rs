//! Substituting a read's (acid, quality score) pairs with alphabet symbols,
//! and back.

use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::alphabet::{SymbolAlphabet, SymbolCode};
use crate::bitpack::{pack, unpack, BitPackError, PackedBuffer};
use crate::fastq::{FastqQualityScore, FastqSequence};
use crate::sequence::{Acid, PairObservation, ReadIdentifier};

/// Error occurring when encoding or decoding a single read.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ReadCodecError {
    /// The read has a different number of acids and quality scores.
    LengthMismatch { acids: usize, quality_scores: usize },
    /// The read contains a pair the alphabet was not built with.
    UnknownPair(PairObservation),
    /// A code outside of the alphabet.
    UnknownSymbol(SymbolCode),
    /// A character of the text form that is not a symbol of the alphabet.
    UnknownCodepoint(char),
    /// Packing or unpacking the codes failed.
    BitPack(BitPackError),
}

impl Display for ReadCodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadCodecError::LengthMismatch {
                acids,
                quality_scores,
            } => write!(
                f,
                "Length mismatch: {} acids, but {} quality scores",
                acids, quality_scores
            ),
            ReadCodecError::UnknownPair(pair) => {
                write!(f, "Pair `{}` is not in the alphabet", pair)
            }
            ReadCodecError::UnknownSymbol(code) => {
                write!(f, "Symbol {} is not in the alphabet", code)
            }
            ReadCodecError::UnknownCodepoint(ch) => write!(
                f,
                "Character `{}` (U+{:04X}) is not in the alphabet",
                ch, *ch as u32
            ),
            ReadCodecError::BitPack(e) => write!(f, "Bit packing error: {}", e),
        }
    }
}

impl Error for ReadCodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ReadCodecError::BitPack(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BitPackError> for ReadCodecError {
    fn from(e: BitPackError) -> Self {
        Self::BitPack(e)
    }
}

pub type ReadCodecResult<T> = Result<T, ReadCodecError>;

/// A read's identifier along with one [`SymbolCode`] per position.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct EncodedRead {
    identifier: ReadIdentifier,
    codes: Vec<SymbolCode>,
}

impl EncodedRead {
    #[must_use]
    pub fn new<T: Into<ReadIdentifier>>(identifier: T, codes: Vec<SymbolCode>) -> Self {
        Self {
            identifier: identifier.into(),
            codes,
        }
    }

    #[must_use]
    pub fn identifier(&self) -> &ReadIdentifier {
        &self.identifier
    }

    #[must_use]
    pub fn codes(&self) -> &[SymbolCode] {
        &self.codes
    }

    /// Number of symbols; this is the element count [`unpack`] needs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Packs the codes into `bit_width`-bit fields.
    pub fn pack(&self, bit_width: u8) -> ReadCodecResult<PackedBuffer> {
        let values: Vec<u32> = self.codes.iter().map(SymbolCode::get).collect();
        Ok(pack(&values, bit_width)?)
    }

    /// Returns the symbols as a string of the alphabet's codepoints.
    pub fn to_text(&self, alphabet: &SymbolAlphabet) -> ReadCodecResult<String> {
        self.codes
            .iter()
            .map(|&code| {
                alphabet
                    .codepoint(code)
                    .ok_or(ReadCodecError::UnknownSymbol(code))
            })
            .collect()
    }
}

/// Encodes a read given as parallel acid and quality score slices.
///
/// # Examples
/// ```
/// use fqarc::alphabet::{AlphabetParams, SymbolAlphabet, SymbolCode};
/// use fqarc::fastq::FastqQualityScore;
/// use fqarc::profile::FrequencyTable;
/// use fqarc::read_codec::encode_read;
/// use fqarc::sequence::Acid;
///
/// let acids = [Acid::A, Acid::A, Acid::C];
/// let quality_scores = [FastqQualityScore::new(37); 3];
///
/// let mut table = FrequencyTable::new();
/// for (&acid, &quality_score) in acids.iter().zip(&quality_scores) {
///     table.add(fqarc::sequence::PairObservation::new(acid, quality_score));
/// }
/// let alphabet = SymbolAlphabet::build(&table, &AlphabetParams::default()).unwrap();
///
/// let encoded = encode_read("r1", &acids, &quality_scores, &alphabet).unwrap();
/// assert_eq!(encoded.codes(), [SymbolCode(0), SymbolCode(0), SymbolCode(1)]);
/// ```
pub fn encode_read<T: Into<ReadIdentifier>>(
    identifier: T,
    acids: &[Acid],
    quality_scores: &[FastqQualityScore],
    alphabet: &SymbolAlphabet,
) -> ReadCodecResult<EncodedRead> {
    if acids.len() != quality_scores.len() {
        return Err(ReadCodecError::LengthMismatch {
            acids: acids.len(),
            quality_scores: quality_scores.len(),
        });
    }

    let codes = acids
        .iter()
        .zip(quality_scores)
        .map(|(&acid, &quality_score)| {
            let pair = PairObservation::new(acid, quality_score);
            alphabet
                .code_of(pair)
                .ok_or(ReadCodecError::UnknownPair(pair))
        })
        .collect::<ReadCodecResult<Vec<_>>>()?;

    Ok(EncodedRead::new(identifier, codes))
}

pub fn encode_sequence(
    sequence: &FastqSequence,
    alphabet: &SymbolAlphabet,
) -> ReadCodecResult<EncodedRead> {
    encode_read(
        sequence.identifier().clone(),
        sequence.acids(),
        sequence.quality_scores(),
        alphabet,
    )
}

/// Decodes symbol codes back into a read.
pub fn decode_read<T: Into<ReadIdentifier>>(
    identifier: T,
    codes: &[SymbolCode],
    alphabet: &SymbolAlphabet,
) -> ReadCodecResult<FastqSequence> {
    let pairs = codes
        .iter()
        .map(|&code| {
            alphabet
                .pair_of(code)
                .ok_or(ReadCodecError::UnknownSymbol(code))
        })
        .collect::<ReadCodecResult<Vec<_>>>()?;

    Ok(sequence_from_pairs(identifier, pairs))
}

/// Decodes a read from its text form (see [`EncodedRead::to_text`]).
pub fn decode_text<T: Into<ReadIdentifier>>(
    identifier: T,
    text: &str,
    alphabet: &SymbolAlphabet,
) -> ReadCodecResult<FastqSequence> {
    let pairs = text
        .chars()
        .map(|ch| {
            alphabet
                .code_of_codepoint(ch)
                .and_then(|code| alphabet.pair_of(code))
                .ok_or(ReadCodecError::UnknownCodepoint(ch))
        })
        .collect::<ReadCodecResult<Vec<_>>>()?;

    Ok(sequence_from_pairs(identifier, pairs))
}

/// Unpacks `element_count` codes of the alphabet's bit width and decodes them.
pub fn decode_packed<T: Into<ReadIdentifier>>(
    identifier: T,
    buffer: &[u8],
    element_count: usize,
    alphabet: &SymbolAlphabet,
) -> ReadCodecResult<FastqSequence> {
    let codes: Vec<SymbolCode> = unpack(buffer, alphabet.bit_width(), element_count)?
        .into_iter()
        .map(SymbolCode)
        .collect();

    decode_read(identifier, &codes, alphabet)
}

fn sequence_from_pairs<T: Into<ReadIdentifier>>(
    identifier: T,
    pairs: Vec<PairObservation>,
) -> FastqSequence {
    let (acids, quality_scores): (Vec<_>, Vec<_>) = pairs
        .into_iter()
        .map(|pair| (pair.acid, pair.quality_score))
        .unzip();

    FastqSequence::new(identifier, acids, quality_scores)
}

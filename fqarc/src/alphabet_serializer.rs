use std::io::{Read, Write};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::alphabet::SymbolAlphabet;
use crate::fastq::FastqQualityScore;
use crate::sequence::{Acid, PairObservation};

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
struct SerializableSymbol {
    acid: Acid,
    quality_score: u8,
    symbol: char,
}

impl SerializableSymbol {
    #[must_use]
    fn new(pair: PairObservation, symbol: char) -> Self {
        Self {
            acid: pair.acid,
            quality_score: pair.quality_score.get() as u8,
            symbol,
        }
    }

    fn to_entry(&self) -> anyhow::Result<(PairObservation, char)> {
        let quality_score = FastqQualityScore::checked_new(self.quality_score)
            .with_context(|| format!("Invalid quality score: {}", self.quality_score))?;

        Ok((PairObservation::new(self.acid, quality_score), self.symbol))
    }
}

/// An intermediate structure that can be converted to and from
/// [`SymbolAlphabet`], and additionally can be serialized and deserialized.
///
/// Symbols are listed by rank, so the position of an entry is its code.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SerializableAlphabet {
    bit_width: u8,
    symbols: Vec<SerializableSymbol>,
}

impl SerializableAlphabet {
    #[must_use]
    pub fn bit_width(&self) -> u8 {
        self.bit_width
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Validates the entries and rebuilds the alphabet.
    pub fn into_alphabet(self) -> anyhow::Result<SymbolAlphabet> {
        let entries = self
            .symbols
            .iter()
            .map(SerializableSymbol::to_entry)
            .collect::<anyhow::Result<Vec<_>>>()?;
        let alphabet = SymbolAlphabet::from_ranked(entries)?;

        if alphabet.bit_width() != self.bit_width {
            bail!(
                "Stored bit width ({}) does not match the alphabet size ({} symbols need {} bits)",
                self.bit_width,
                alphabet.len(),
                alphabet.bit_width()
            );
        }

        Ok(alphabet)
    }

    pub fn read_alphabet<R: Read>(reader: R) -> anyhow::Result<SymbolAlphabet> {
        Self::read(reader)?.into_alphabet()
    }

    pub fn read<R: Read>(reader: R) -> anyhow::Result<SerializableAlphabet> {
        let result = rmp_serde::from_read(reader)?;
        Ok(result)
    }

    pub fn write_alphabet<W: Write>(alphabet: &SymbolAlphabet, mut writer: W) -> anyhow::Result<()> {
        SerializableAlphabet::from(alphabet).write(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn write<W: Write>(&self, mut writer: W) -> anyhow::Result<()> {
        self.serialize(&mut rmp_serde::Serializer::new(&mut writer))?;
        writer.flush()?;
        Ok(())
    }

    pub fn read_json<R: Read>(reader: R) -> anyhow::Result<SymbolAlphabet> {
        let result: SerializableAlphabet =
            serde_json::from_reader(reader).context("Could not parse the alphabet JSON")?;
        result.into_alphabet()
    }

    pub fn write_json<W: Write>(alphabet: &SymbolAlphabet, mut writer: W) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(&mut writer, &SerializableAlphabet::from(alphabet))?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}

impl From<&SymbolAlphabet> for SerializableAlphabet {
    fn from(alphabet: &SymbolAlphabet) -> Self {
        Self {
            bit_width: alphabet.bit_width(),
            symbols: alphabet
                .iter()
                .map(|(_, pair, symbol)| SerializableSymbol::new(pair, symbol))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::_internal_test_data::{distinct_pairs, pair, random_reads};
    use crate::alphabet::{AlphabetError, AlphabetParams, SymbolAlphabet};
    use crate::alphabet_serializer::{SerializableAlphabet, SerializableSymbol};
    use crate::profile::FrequencyTable;
    use crate::sequence::Acid;

    fn test_alphabet() -> SymbolAlphabet {
        let table = FrequencyTable::profile_parallel(&random_reads(100, 50));
        SymbolAlphabet::build(&table, &AlphabetParams::default()).unwrap()
    }

    #[test]
    fn test_alphabet_to_serializable() {
        let alphabet =
            SymbolAlphabet::from_ranked(vec![(pair(Acid::A, 'F'), '!'), (pair(Acid::C, '#'), 'µ')])
                .unwrap();

        let serializable = SerializableAlphabet::from(&alphabet);
        assert_eq!(serializable.bit_width(), 1);
        assert_eq!(
            serializable.symbols,
            [
                SerializableSymbol {
                    acid: Acid::A,
                    quality_score: 37,
                    symbol: '!'
                },
                SerializableSymbol {
                    acid: Acid::C,
                    quality_score: 2,
                    symbol: 'µ'
                },
            ]
        );

        assert_eq!(serializable.into_alphabet().unwrap(), alphabet);
    }

    #[test]
    fn test_write_and_read_alphabet() {
        let mut data = Vec::new();
        let alphabet = test_alphabet();

        SerializableAlphabet::write_alphabet(&alphabet, &mut data).unwrap();
        let alphabet_2 = SerializableAlphabet::read_alphabet(data.as_slice()).unwrap();

        assert_eq!(alphabet, alphabet_2);
    }

    #[test]
    fn test_write_and_read_json() {
        let mut data = Vec::new();
        let table: FrequencyTable = distinct_pairs(120).into_iter().collect();
        let alphabet = SymbolAlphabet::build(&table, &AlphabetParams::default()).unwrap();

        SerializableAlphabet::write_json(&alphabet, &mut data).unwrap();
        let json = String::from_utf8(data.clone()).unwrap();
        assert!(json.contains("\"bit_width\": 7"));

        let alphabet_2 = SerializableAlphabet::read_json(data.as_slice()).unwrap();
        assert_eq!(alphabet, alphabet_2);
    }

    #[test]
    fn test_bit_width_mismatch() {
        let mut serializable = SerializableAlphabet::from(&test_alphabet());
        serializable.bit_width += 1;

        let error = serializable.into_alphabet().unwrap_err();
        assert!(error.to_string().starts_with("Stored bit width"));
    }

    #[test]
    fn test_duplicate_symbol_rejected() {
        let serializable = SerializableAlphabet {
            bit_width: 1,
            symbols: vec![
                SerializableSymbol::new(pair(Acid::A, 'F'), '!'),
                SerializableSymbol::new(pair(Acid::C, 'F'), '!'),
            ],
        };

        let error = serializable.into_alphabet().unwrap_err();
        assert_eq!(
            error.downcast_ref::<AlphabetError>(),
            Some(&AlphabetError::DuplicateSymbol('!'))
        );
    }

    #[test]
    fn test_invalid_quality_score_rejected() {
        let serializable = SerializableAlphabet {
            bit_width: 1,
            symbols: vec![SerializableSymbol {
                acid: Acid::G,
                quality_score: 200,
                symbol: '!',
            }],
        };

        let error = serializable.into_alphabet().unwrap_err();
        assert_eq!(error.to_string(), "Invalid quality score: 200");
    }

    #[test]
    fn test_read_garbage() {
        let data = [0xc1u8, 0x00, 0x13];
        assert!(SerializableAlphabet::read_alphabet(&data[..]).is_err());
    }
}

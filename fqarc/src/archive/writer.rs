use std::io::{Cursor, Seek, Write};

use binrw::BinWrite;

use crate::alphabet::SymbolAlphabet;
use crate::alphabet_serializer::SerializableAlphabet;
use crate::archive::compressor::{FqarcCompressResult, FqarcCompressorError};
use crate::archive::data::{
    FqarcAlphabetHeader, FqarcEndHeader, FqarcHeader, FqarcRecordHeader, FqarcSliceHeader,
};
use crate::sequence::ReadIdentifier;

pub(super) fn write_preamble<W: Write + Seek>(
    mut writer: W,
    version: u8,
    alphabet: &SymbolAlphabet,
) -> FqarcCompressResult<()> {
    let mut alphabet_data = Vec::new();
    SerializableAlphabet::write_alphabet(alphabet, &mut alphabet_data)
        .map_err(FqarcCompressorError::AlphabetSerializeError)?;

    FqarcHeader { version }.write_to(&mut writer)?;
    FqarcAlphabetHeader {
        length: alphabet_data.len() as u32,
    }
    .write_to(&mut writer)?;
    writer.write_all(&alphabet_data)?;

    Ok(())
}

pub(super) fn write_end<W: Write + Seek>(mut writer: W, record_count: u64) -> FqarcCompressResult<()> {
    FqarcSliceHeader::End(FqarcEndHeader { record_count }).write_to(&mut writer)?;
    Ok(())
}

/// In-memory buffer for the records of one batch.
pub(super) struct BatchWriter {
    data: Cursor<Vec<u8>>,
    records: u64,
}

impl BatchWriter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Cursor::new(Vec::new()),
            records: 0,
        }
    }

    pub fn write_record(
        &mut self,
        identifier: &ReadIdentifier,
        seq_len: usize,
        packed: &[u8],
    ) -> FqarcCompressResult<()> {
        let seq_len = u32::try_from(seq_len)
            .map_err(|_| FqarcCompressorError::sequence_too_long(seq_len, u32::MAX as usize))?;
        let identifier = identifier.str().as_bytes();

        let header = FqarcRecordHeader {
            identifier_len: identifier.len() as u32,
            seq_len,
            checksum: crc32fast::hash(packed),
        };
        FqarcSliceHeader::Record(header).write_to(&mut self.data)?;
        self.data.write_all(identifier)?;
        self.data.write_all(packed)?;
        self.records += 1;

        Ok(())
    }

    #[must_use]
    pub fn records(&self) -> u64 {
        self.records
    }

    pub fn write_to<W: Write>(self, mut writer: W) -> FqarcCompressResult<usize> {
        let data = self.data.into_inner();
        writer.write_all(&data)?;

        Ok(data.len())
    }
}

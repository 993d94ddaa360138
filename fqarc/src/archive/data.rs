use std::io::{Read, Seek};

use binrw::{binrw, BinRead, BinResult};

#[binrw]
#[brw(big, magic = b"FQARC")]
#[derive(Debug)]
pub struct FqarcHeader {
    pub version: u8,
}

/// Followed by `length` bytes of MessagePack-encoded alphabet.
#[binrw]
#[brw(big)]
#[derive(Debug)]
pub struct FqarcAlphabetHeader {
    pub length: u32,
}

#[binrw]
#[brw(big)]
#[derive(Debug)]
pub enum FqarcSliceHeader {
    #[brw(magic = 0u8)]
    Record(FqarcRecordHeader),
    #[brw(magic = 1u8)]
    End(FqarcEndHeader),
}

impl FqarcSliceHeader {
    /// Reads a slice header from a stream that cannot seek backwards.
    ///
    /// The derived enum reader rewinds to retry variants, which
    /// [`NoSeek`](super::no_seek::NoSeek) rejects, so the tag byte is
    /// dispatched on by hand.
    pub fn read_forward<R: Read + Seek>(reader: &mut R) -> BinResult<Self> {
        let pos = reader.stream_position()?;
        let mut tag = [0; 1];
        reader.read_exact(&mut tag)?;

        match tag[0] {
            0 => Ok(Self::Record(FqarcRecordHeader::read(reader)?)),
            1 => Ok(Self::End(FqarcEndHeader::read(reader)?)),
            found => Err(binrw::Error::BadMagic {
                pos,
                found: Box::new(found),
            }),
        }
    }
}

/// Followed by the identifier and the packed symbol codes of a single read.
#[binrw]
#[brw(big)]
#[derive(Debug)]
pub struct FqarcRecordHeader {
    pub identifier_len: u32,
    pub seq_len: u32,
    pub checksum: u32,
}

#[binrw]
#[brw(big)]
#[derive(Debug)]
pub struct FqarcEndHeader {
    pub record_count: u64,
}

#[cfg(test)]
mod tests {
    use binrw::BinWrite;

    use crate::archive::data::{FqarcEndHeader, FqarcRecordHeader, FqarcSliceHeader};
    use crate::archive::no_seek::NoSeek;

    #[test]
    fn test_slices_read_from_stream() {
        let mut data = Vec::new();
        let mut writer = NoSeek::new(&mut data);
        FqarcSliceHeader::Record(FqarcRecordHeader {
            identifier_len: 3,
            seq_len: 10,
            checksum: 0xDEAD_BEEF,
        })
        .write_to(&mut writer)
        .unwrap();
        FqarcSliceHeader::End(FqarcEndHeader { record_count: 1 })
            .write_to(&mut writer)
            .unwrap();

        let mut reader = NoSeek::new(data.as_slice());
        match FqarcSliceHeader::read_forward(&mut reader).unwrap() {
            FqarcSliceHeader::Record(header) => {
                assert_eq!(header.identifier_len, 3);
                assert_eq!(header.seq_len, 10);
                assert_eq!(header.checksum, 0xDEAD_BEEF);
            }
            other => panic!("expected a record slice, got {:?}", other),
        }
        assert!(matches!(
            FqarcSliceHeader::read_forward(&mut reader).unwrap(),
            FqarcSliceHeader::End(FqarcEndHeader { record_count: 1 })
        ));
        assert_eq!(reader.position(), data.len() as u64);
    }

    #[test]
    fn test_unknown_slice_tag() {
        let data = [7u8, 0, 0, 0];
        let mut reader = NoSeek::new(&data[..]);

        assert!(matches!(
            FqarcSliceHeader::read_forward(&mut reader),
            Err(binrw::Error::BadMagic { pos: 0, .. })
        ));
    }
}

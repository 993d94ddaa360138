//! The `.fqarc` container.
//!
//! Layout (big endian):
//! - header: magic `FQARC`, version byte,
//! - alphabet: `u32` length, then the MessagePack-encoded alphabet,
//! - one slice per read: tag `0`, identifier length, sequence length and the
//!   CRC32 of the packed symbols, followed by the identifier and the packed
//!   symbols (the symbol count is the sequence length),
//! - end slice: tag `1` and the total number of records.

pub mod compressor;
mod data;
pub mod decompressor;
pub mod no_seek;
mod writer;

pub(crate) const FQARC_VERSION: u8 = 1;

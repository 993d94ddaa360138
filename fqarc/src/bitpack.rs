//! Fixed-width bit packing.
//!
//! Values are laid out most significant bit first, one after another, and the
//! last byte is padded with zero bits on the right. The padding cannot be told
//! apart from a trailing zero value, so [`unpack`] always takes the element
//! count explicitly.

use std::error::Error;
use std::fmt::{Display, Formatter};

use derive_more::Deref;

/// Widest supported value, in bits.
pub const MAX_BIT_WIDTH: u8 = 32;

/// Error occurring when packing or unpacking values.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum BitPackError {
    /// A value does not fit in the requested bit width.
    ValueOutOfRange { value: u32, limit: u64 },
    /// The buffer length is not exactly what `element_count` values of
    /// `bit_width` bits pack into.
    InvalidPackedLength {
        buffer_len: usize,
        bit_width: u8,
        element_count: usize,
    },
    /// Bit width outside of `1..=32`.
    InvalidBitWidth(u8),
}

impl Display for BitPackError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BitPackError::ValueOutOfRange { value, limit } => write!(
                f,
                "Value out of range (value: {}, must be less than {})",
                value, limit
            ),
            BitPackError::InvalidPackedLength {
                buffer_len,
                bit_width,
                element_count,
            } => write!(
                f,
                "Invalid packed length ({} bytes cannot hold exactly {} values of {} bits)",
                buffer_len, element_count, bit_width
            ),
            BitPackError::InvalidBitWidth(bit_width) => write!(
                f,
                "Invalid bit width: {} (must be between 1 and {})",
                bit_width, MAX_BIT_WIDTH
            ),
        }
    }
}

impl Error for BitPackError {}

pub type BitPackResult<T> = Result<T, BitPackError>;

/// Byte-aligned buffer of packed values.
#[derive(Deref, Debug, Clone, Default, Eq, PartialEq, Hash)]
pub struct PackedBuffer(Vec<u8>);

impl PackedBuffer {
    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl From<PackedBuffer> for Vec<u8> {
    fn from(buffer: PackedBuffer) -> Self {
        buffer.0
    }
}

/// Smallest bit width able to represent `symbol_count` distinct codes
/// (`0..symbol_count`); never less than 1.
///
/// # Examples
/// ```
/// use fqarc::bitpack::bit_width_for;
///
/// assert_eq!(bit_width_for(2), 1);
/// assert_eq!(bit_width_for(3), 2);
/// assert_eq!(bit_width_for(93), 7);
/// assert_eq!(bit_width_for(256), 8);
/// assert_eq!(bit_width_for(257), 9);
/// ```
#[must_use]
pub fn bit_width_for(symbol_count: usize) -> u8 {
    if symbol_count <= 2 {
        1
    } else {
        (usize::BITS - (symbol_count - 1).leading_zeros()) as u8
    }
}

/// Number of bytes `element_count` values of `bit_width` bits pack into.
#[must_use]
pub fn packed_len(element_count: usize, bit_width: u8) -> usize {
    (element_count * bit_width as usize + 7) / 8
}

fn check_bit_width(bit_width: u8) -> BitPackResult<()> {
    if bit_width == 0 || bit_width > MAX_BIT_WIDTH {
        return Err(BitPackError::InvalidBitWidth(bit_width));
    }

    Ok(())
}

/// Packs `values` into `bit_width`-bit fields.
///
/// All values are validated before anything is written.
///
/// # Examples
/// ```
/// use fqarc::bitpack::pack;
///
/// let packed = pack(&[1, 2, 3], 3).unwrap();
/// assert_eq!(packed.as_slice(), &[0b0010_1001, 0b1000_0000]);
/// ```
pub fn pack(values: &[u32], bit_width: u8) -> BitPackResult<PackedBuffer> {
    check_bit_width(bit_width)?;

    let limit = 1u64 << bit_width;
    if let Some(&value) = values.iter().find(|&&value| u64::from(value) >= limit) {
        return Err(BitPackError::ValueOutOfRange { value, limit });
    }

    let bit_width = u32::from(bit_width);
    let mut data = Vec::with_capacity(packed_len(values.len(), bit_width as u8));
    // fewer than 8 pending bits are carried between values
    let mut pending: u64 = 0;
    let mut pending_bits: u32 = 0;

    for &value in values {
        pending = (pending << bit_width) | u64::from(value);
        pending_bits += bit_width;

        while pending_bits >= 8 {
            pending_bits -= 8;
            data.push((pending >> pending_bits) as u8);
        }
        pending &= (1 << pending_bits) - 1;
    }

    if pending_bits > 0 {
        data.push((pending << (8 - pending_bits)) as u8);
    }

    Ok(PackedBuffer(data))
}

/// Unpacks exactly `element_count` values of `bit_width` bits from `buffer`,
/// ignoring the trailing padding bits.
///
/// # Examples
/// ```
/// use fqarc::bitpack::unpack;
///
/// // 101 000 00: the padding looks like another zero value
/// assert_eq!(unpack(&[0b1010_0000], 3, 2).unwrap(), [5, 0]);
/// assert_eq!(unpack(&[0b1010_0000], 3, 1).unwrap(), [5]);
/// ```
pub fn unpack(buffer: &[u8], bit_width: u8, element_count: usize) -> BitPackResult<Vec<u32>> {
    check_bit_width(bit_width)?;

    let expected_len = element_count
        .checked_mul(bit_width as usize)
        .map(|bits| (bits + 7) / 8);
    if expected_len != Some(buffer.len()) {
        return Err(BitPackError::InvalidPackedLength {
            buffer_len: buffer.len(),
            bit_width,
            element_count,
        });
    }

    let bit_width = u32::from(bit_width);
    let mask = (1u64 << bit_width) - 1;
    let mut values = Vec::with_capacity(element_count);
    let mut pending: u64 = 0;
    let mut pending_bits: u32 = 0;

    for &byte in buffer {
        pending = (pending << 8) | u64::from(byte);
        pending_bits += 8;

        while pending_bits >= bit_width && values.len() < element_count {
            pending_bits -= bit_width;
            values.push(((pending >> pending_bits) & mask) as u32);
        }
        pending &= (1 << pending_bits) - 1;
    }

    debug_assert_eq!(values.len(), element_count);
    Ok(values)
}

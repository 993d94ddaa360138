use std::io::{BufRead, BufReader, Read};

use flate2::bufread::MultiGzDecoder;
use log::debug;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Wraps `reader` so that gzip-compressed FASTQ files are decompressed
/// transparently. Plain input is passed through unchanged.
///
/// # Examples
/// ```
/// use std::io::Read;
///
/// use fqarc::fastq::input::open_maybe_gzip;
///
/// let mut plain = String::new();
/// open_maybe_gzip("@r\nA\n+\n!\n".as_bytes())
///     .unwrap()
///     .read_to_string(&mut plain)
///     .unwrap();
/// assert_eq!(plain, "@r\nA\n+\n!\n");
/// ```
pub fn open_maybe_gzip<'a, R: Read + Send + 'a>(
    reader: R,
) -> std::io::Result<Box<dyn BufRead + Send + 'a>> {
    let mut reader = BufReader::new(reader);
    let is_gzip = reader.fill_buf()?.starts_with(&GZIP_MAGIC);

    if is_gzip {
        debug!("Input is gzip-compressed");
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}

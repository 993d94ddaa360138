use std::fmt::Debug;
use std::io::{Error, ErrorKind, Read, Seek, SeekFrom, Write};

/// Adapter giving a plain stream (stdin, stdout, a gzip decoder, ...) the
/// [`Seek`] implementation binrw asks for.
///
/// Only seeks that stay at the current position succeed; the adapter counts
/// the bytes that went through it to know where that is.
#[derive(Debug)]
pub struct NoSeek<T> {
    inner: T,
    position: u64,
}

impl<T> NoSeek<T> {
    /// # Examples
    /// ```
    /// use std::io::{Read, Seek, SeekFrom};
    ///
    /// use fqarc::archive::no_seek::NoSeek;
    ///
    /// let data = [1u8, 2, 3];
    /// let mut reader = NoSeek::new(&data[..]);
    /// let mut buf = [0; 2];
    /// reader.read_exact(&mut buf).unwrap();
    ///
    /// assert_eq!(reader.position(), 2);
    /// assert_eq!(reader.seek(SeekFrom::Current(0)).unwrap(), 2);
    /// assert!(reader.seek(SeekFrom::Start(0)).is_err());
    /// ```
    pub fn new(inner: T) -> Self {
        Self { inner, position: 0 }
    }

    /// Number of bytes read or written so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn into_inner(self) -> T {
        self.inner
    }

    fn unsupported(&self, pos: SeekFrom) -> Error {
        Error::new(
            ErrorKind::Unsupported,
            format!("Cannot seek to {:?} from {} in a stream", pos, self.position),
        )
    }
}

impl<T> Seek for NoSeek<T> {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        match pos {
            SeekFrom::Start(i) if i == self.position => Ok(self.position),
            SeekFrom::Current(0) => Ok(self.position),
            _ => Err(self.unsupported(pos)),
        }
    }
}

impl<R: Read> Read for NoSeek<R> {
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let size = self.inner.read(buf)?;
        self.position += size as u64;
        Ok(size)
    }
}

impl<W: Write> Write for NoSeek<W> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.position += size as u64;
        Ok(size)
    }

    #[inline]
    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

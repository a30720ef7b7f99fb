//! Byte stream trait
//!
//! The byte-oriented source underneath the plain-file backend.

use std::io::{self, Cursor, Read, Seek};

/// A seekable byte source that can report its current length.
///
/// `File` is the production implementation; `Cursor` and test doubles make
/// the sector engine testable against short reads and failing seeks.
pub trait ByteStream: Read + Seek {
    /// Current length of the stream in bytes. Must not move the position.
    fn byte_len(&self) -> io::Result<u64>;

    /// Releases the stream, reporting the status of the release.
    fn close(self) -> io::Result<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

impl<T: AsRef<[u8]>> ByteStream for Cursor<T> {
    fn byte_len(&self) -> io::Result<u64> {
        Ok(self.get_ref().as_ref().len() as u64)
    }
}

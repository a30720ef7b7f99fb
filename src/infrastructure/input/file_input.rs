//! Plain-file sector input
//!
//! Serves whole sectors from a byte stream (a disc image, or a device node
//! opened as an ordinary file). The stream may short-read, fail, or end in
//! the middle of a sector; callers only ever see whole sectors, and after an
//! end-of-medium read the stream is left on a sector boundary.

use crate::core::sector::{
    check_buffer, partial_tail, sector_offset, sectors_to_bytes, whole_sectors,
};
use crate::core::{InputError, Result, SECTOR_SIZE};
use crate::domain::repositories::{ByteStream, SectorInput};
use crate::infrastructure::storage::advise_sequential;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom};
use tracing::{debug, warn};

/// Sector input over a [`ByteStream`]
pub struct FileInput<S: ByteStream = File> {
    stream: S,
    last_error: Option<String>,
}

impl FileInput<File> {
    /// Opens `target` read-only.
    ///
    /// # Errors
    ///
    /// `NotFound` or `PermissionDenied` for the usual open failures, `Io` for
    /// anything else. Nothing stays open on failure.
    pub fn open(target: &str) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .open(target)
            .map_err(|e| InputError::from_open(target, e))?;

        advise_sequential(&file);
        debug!("Opened file input {}", target);

        Ok(Self::from_stream(file))
    }
}

impl<S: ByteStream> FileInput<S> {
    pub fn from_stream(stream: S) -> Self {
        Self {
            stream,
            last_error: None,
        }
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Steps back over a partially read trailing sector so the stream sits on
    /// the boundary after the last delivered sector.
    fn rewind_partial(&mut self, consumed: usize) {
        let over_read = partial_tail(consumed);
        if over_read == 0 {
            return;
        }

        if let Err(e) = self.stream.seek(SeekFrom::Current(-(over_read as i64))) {
            warn!("Failed to rewind {} bytes after end of medium: {}", over_read, e);
            self.last_error = Some(format!("rewind after end of medium failed: {}", e));
        }
    }
}

impl<S: ByteStream> SectorInput for FileInput<S> {
    fn read_sectors(&mut self, start: u32, count: u32, buffer: &mut [u8]) -> Result<u32> {
        check_buffer(count, buffer.len())?;

        if let Err(e) = self.stream.seek(SeekFrom::Start(sector_offset(start))) {
            debug!("Seek to sector {} failed: {}", start, e);
            self.last_error = Some(format!("seek to sector {} failed: {}", start, e));
            return Ok(0);
        }
        self.last_error = None;

        let total = sectors_to_bytes(count);
        let mut remaining = total;

        while remaining > 0 {
            let filled = total - remaining;

            match self.stream.read(&mut buffer[filled..total]) {
                Ok(0) => {
                    let consumed = total - remaining;
                    self.rewind_partial(consumed);

                    let delivered = whole_sectors(consumed);
                    debug!(
                        "End of medium: {} of {} sectors delivered from sector {}",
                        delivered, count, start
                    );
                    return Ok(delivered);
                }
                Ok(n) => remaining -= n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    // Position is left wherever the failed read put it
                    self.last_error = Some(format!("read at sector {} failed: {}", start, e));
                    return Err(InputError::Io(e));
                }
            }
        }

        Ok(count)
    }

    fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn total_sectors(&self) -> u32 {
        match self.stream.byte_len() {
            Ok(len) => (len / SECTOR_SIZE as u64).min(u32::MAX as u64) as u32,
            Err(e) => {
                warn!("Could not determine input size: {}", e);
                0
            }
        }
    }

    fn close(self) -> Result<()> {
        self.stream.close().map_err(|e| {
            warn!("Closing file input: {}", e);
            InputError::Io(e)
        })?;
        debug!("Closed file input");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn medium(sectors: usize, tail: usize) -> Vec<u8> {
        (0..sectors * SECTOR_SIZE + tail)
            .map(|i| ((i / SECTOR_SIZE) as u8).wrapping_mul(7) ^ (i as u8))
            .collect()
    }

    /// Returns at most `chunk` bytes per read call.
    struct Trickle {
        inner: Cursor<Vec<u8>>,
        chunk: usize,
        reads: usize,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.reads += 1;
            let len = buf.len().min(self.chunk);
            self.inner.read(&mut buf[..len])
        }
    }

    impl Seek for Trickle {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    impl ByteStream for Trickle {
        fn byte_len(&self) -> io::Result<u64> {
            self.inner.byte_len()
        }
    }

    /// Fails every seek, or every read after `fail_after` bytes.
    struct Faulty {
        inner: Cursor<Vec<u8>>,
        fail_seek: bool,
        fail_rewind: bool,
        fail_close: bool,
        fail_after: Option<usize>,
        delivered: usize,
        interrupts: usize,
    }

    impl Faulty {
        fn new(data: Vec<u8>) -> Self {
            Self {
                inner: Cursor::new(data),
                fail_seek: false,
                fail_rewind: false,
                fail_close: false,
                fail_after: None,
                delivered: 0,
                interrupts: 0,
            }
        }
    }

    impl Read for Faulty {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.interrupts > 0 {
                self.interrupts -= 1;
                return Err(io::Error::from(io::ErrorKind::Interrupted));
            }
            if let Some(limit) = self.fail_after {
                if self.delivered >= limit {
                    return Err(io::Error::other("medium error"));
                }
                let len = buf.len().min(limit - self.delivered);
                let n = self.inner.read(&mut buf[..len])?;
                self.delivered += n;
                return Ok(n);
            }
            self.inner.read(buf)
        }
    }

    impl Seek for Faulty {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            if self.fail_seek || (self.fail_rewind && matches!(pos, SeekFrom::Current(_))) {
                return Err(io::Error::new(io::ErrorKind::InvalidInput, "bad seek"));
            }
            self.inner.seek(pos)
        }
    }

    impl ByteStream for Faulty {
        fn byte_len(&self) -> io::Result<u64> {
            Err(io::Error::other("no fstat"))
        }

        fn close(self) -> io::Result<()> {
            if self.fail_close {
                Err(io::Error::other("close failed"))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_full_read() {
        let data = medium(10, 0);
        let mut input = FileInput::from_stream(Cursor::new(data.clone()));
        let mut buffer = vec![0u8; 3 * SECTOR_SIZE];

        assert_eq!(input.read_sectors(4, 3, &mut buffer).unwrap(), 3);
        assert_eq!(buffer, data[4 * SECTOR_SIZE..7 * SECTOR_SIZE]);
        assert!(input.last_error().is_none());
    }

    #[test]
    fn test_read_past_end_returns_whole_sectors() {
        let data = medium(10, 0);
        let mut input = FileInput::from_stream(Cursor::new(data.clone()));
        let mut buffer = vec![0u8; 5 * SECTOR_SIZE];

        assert_eq!(input.read_sectors(8, 5, &mut buffer).unwrap(), 2);
        assert_eq!(buffer[..2 * SECTOR_SIZE], data[8 * SECTOR_SIZE..]);
    }

    #[test]
    fn test_mid_sector_end_rewinds_to_boundary() {
        let data = medium(3, 1000);
        let mut input = FileInput::from_stream(Cursor::new(data.clone()));
        let mut buffer = vec![0u8; 4 * SECTOR_SIZE];

        assert_eq!(input.read_sectors(1, 4, &mut buffer).unwrap(), 2);
        assert_eq!(buffer[..2 * SECTOR_SIZE], data[SECTOR_SIZE..3 * SECTOR_SIZE]);

        let position = input.get_mut().stream_position().unwrap();
        assert_eq!(position, 3 * SECTOR_SIZE as u64);
    }

    #[test]
    fn test_short_reads_are_retried() {
        let data = medium(6, 0);
        let stream = Trickle {
            inner: Cursor::new(data.clone()),
            chunk: 700,
            reads: 0,
        };
        let mut input = FileInput::from_stream(stream);
        let mut buffer = vec![0u8; 4 * SECTOR_SIZE];

        assert_eq!(input.read_sectors(1, 4, &mut buffer).unwrap(), 4);
        assert_eq!(buffer, data[SECTOR_SIZE..5 * SECTOR_SIZE]);
        assert!(input.get_ref().reads >= (4 * SECTOR_SIZE) / 700);
    }

    #[test]
    fn test_short_reads_then_end_of_medium() {
        let data = medium(2, 300);
        let stream = Trickle {
            inner: Cursor::new(data.clone()),
            chunk: 1,
            reads: 0,
        };
        let mut input = FileInput::from_stream(stream);
        let mut buffer = vec![0u8; 4 * SECTOR_SIZE];

        assert_eq!(input.read_sectors(0, 4, &mut buffer).unwrap(), 2);
        assert_eq!(buffer[..2 * SECTOR_SIZE], data[..2 * SECTOR_SIZE]);
        assert_eq!(
            input.get_mut().stream_position().unwrap(),
            2 * SECTOR_SIZE as u64
        );
    }

    #[test]
    fn test_zero_count_reads_nothing() {
        let stream = Trickle {
            inner: Cursor::new(medium(2, 0)),
            chunk: SECTOR_SIZE,
            reads: 0,
        };
        let mut input = FileInput::from_stream(stream);
        let mut buffer: [u8; 0] = [];

        assert_eq!(input.read_sectors(1, 0, &mut buffer).unwrap(), 0);
        assert_eq!(input.get_ref().reads, 0);
        assert_eq!(
            input.get_mut().stream_position().unwrap(),
            SECTOR_SIZE as u64
        );
    }

    #[test]
    fn test_seek_failure_reports_zero_and_records_error() {
        let mut stream = Faulty::new(medium(4, 0));
        stream.fail_seek = true;
        let mut input = FileInput::from_stream(stream);
        let mut buffer = vec![0u8; SECTOR_SIZE];

        assert_eq!(input.read_sectors(1, 1, &mut buffer).unwrap(), 0);
        assert!(input.last_error().unwrap().contains("seek to sector 1"));
    }

    #[test]
    fn test_failed_rewind_keeps_delivered_count() {
        let data = medium(3, 1000);
        let mut stream = Faulty::new(data.clone());
        stream.fail_rewind = true;
        let mut input = FileInput::from_stream(stream);
        let mut buffer = vec![0u8; 4 * SECTOR_SIZE];

        assert_eq!(input.read_sectors(1, 4, &mut buffer).unwrap(), 2);
        assert_eq!(buffer[..2 * SECTOR_SIZE], data[SECTOR_SIZE..3 * SECTOR_SIZE]);
        assert!(input.last_error().unwrap().contains("rewind"));

        // The next read seeks absolutely and clears the error
        assert_eq!(input.read_sectors(0, 1, &mut buffer).unwrap(), 1);
        assert!(input.last_error().is_none());
    }

    #[test]
    fn test_close_reports_stream_failure() {
        let mut stream = Faulty::new(medium(1, 0));
        stream.fail_close = true;
        let input = FileInput::from_stream(stream);
        assert!(matches!(input.close(), Err(InputError::Io(_))));

        let input = FileInput::from_stream(Faulty::new(medium(1, 0)));
        assert!(input.close().is_ok());
    }

    #[test]
    fn test_read_error_is_propagated() {
        let mut stream = Faulty::new(medium(4, 0));
        stream.fail_after = Some(SECTOR_SIZE + 10);
        let mut input = FileInput::from_stream(stream);
        let mut buffer = vec![0u8; 3 * SECTOR_SIZE];

        let err = input.read_sectors(0, 3, &mut buffer).unwrap_err();
        assert!(matches!(err, InputError::Io(_)));
        assert!(input.last_error().is_some());
    }

    #[test]
    fn test_interrupted_reads_are_retried() {
        let data = medium(2, 0);
        let mut stream = Faulty::new(data.clone());
        stream.interrupts = 3;
        let mut input = FileInput::from_stream(stream);
        let mut buffer = vec![0u8; 2 * SECTOR_SIZE];

        assert_eq!(input.read_sectors(0, 2, &mut buffer).unwrap(), 2);
        assert_eq!(buffer, data);
    }

    #[test]
    fn test_successful_read_clears_last_error() {
        let mut stream = Faulty::new(medium(4, 0));
        stream.fail_seek = true;
        let mut input = FileInput::from_stream(stream);
        let mut buffer = vec![0u8; SECTOR_SIZE];

        input.read_sectors(0, 1, &mut buffer).unwrap();
        assert!(input.last_error().is_some());

        input.get_mut().fail_seek = false;
        assert_eq!(input.read_sectors(0, 1, &mut buffer).unwrap(), 1);
        assert!(input.last_error().is_none());
    }

    #[test]
    fn test_buffer_too_small() {
        let mut input = FileInput::from_stream(Cursor::new(medium(4, 0)));
        let mut buffer = vec![0u8; SECTOR_SIZE];

        let err = input.read_sectors(0, 2, &mut buffer).unwrap_err();
        assert!(matches!(err, InputError::InvalidBufferSize { .. }));
    }

    #[test]
    fn test_total_sectors_floors_and_survives_errors() {
        let input = FileInput::from_stream(Cursor::new(medium(5, 2047)));
        assert_eq!(input.total_sectors(), 5);

        let input = FileInput::from_stream(Faulty::new(medium(5, 0)));
        assert_eq!(input.total_sectors(), 0);
    }

    #[test]
    fn test_authenticate_and_decrypt_are_no_ops() {
        let mut input = FileInput::from_stream(Cursor::new(medium(1, 0)));
        let mut buffer = vec![0x5Au8; 2 * SECTOR_SIZE];

        input.authenticate().unwrap();
        input.decrypt(&mut buffer, 2).unwrap();
        assert!(buffer.iter().all(|&b| b == 0x5A));
        assert!(!input.is_protected());
        input.close().unwrap();
    }
}

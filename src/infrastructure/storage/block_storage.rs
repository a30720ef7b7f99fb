//! Raw block storage
//!
//! `StorageDevice` over an operating-system block device such as an optical
//! drive node. Geometry comes from the kernel; reads are positional and always
//! whole sectors. Disc images opened through this adapter are treated as a
//! device whose native sector size is the logical sector size.

use super::ioctl;
use crate::core::{StatusCode, SECTOR_SIZE};
use crate::domain::entities::DeviceInfo;
use crate::domain::repositories::{StorageDevice, CONFIG_BLOCK_LEN};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

fn status_of(err: &io::Error) -> StatusCode {
    StatusCode(err.raw_os_error().unwrap_or(-1))
}

/// Block device reachable through a path
pub struct BlockStorage {
    path: PathBuf,
    file: Option<File>,
}

impl BlockStorage {
    /// Creates an unopened adapter for `path`
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            file: None,
        }
    }

    fn open_file(&self) -> io::Result<File> {
        OpenOptions::new().read(true).open(&self.path)
    }

    fn query_geometry(file: &File) -> io::Result<DeviceInfo> {
        let metadata = file.metadata()?;

        let (sector_size, size) = if metadata.is_file() {
            (SECTOR_SIZE as u32, metadata.len())
        } else {
            (ioctl::logical_sector_size(file)?, ioctl::block_device_size(file)?)
        };

        if sector_size == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "device reports zero sector size",
            ));
        }

        let total = (size / sector_size as u64).min(u32::MAX as u64) as u32;
        Ok(DeviceInfo::new(sector_size, total))
    }

    fn file(&self) -> Result<&File, StatusCode> {
        self.file.as_ref().ok_or(StatusCode(libc::EBADF))
    }

    #[cfg(unix)]
    fn read_at(file: &File, buffer: &mut [u8], offset: u64) -> io::Result<usize> {
        use std::os::unix::fs::FileExt;
        file.read_at(buffer, offset)
    }

    #[cfg(windows)]
    fn read_at(file: &File, buffer: &mut [u8], offset: u64) -> io::Result<usize> {
        use std::os::windows::fs::FileExt;
        file.seek_read(buffer, offset)
    }
}

impl StorageDevice for BlockStorage {
    fn device_info(&mut self) -> Result<DeviceInfo, StatusCode> {
        let info = match self.file.as_ref() {
            Some(file) => Self::query_geometry(file),
            None => self.open_file().and_then(|f| Self::query_geometry(&f)),
        };
        info.map_err(|e| status_of(&e))
    }

    fn open(&mut self) -> Result<(), StatusCode> {
        let file = self.open_file().map_err(|e| status_of(&e))?;
        debug!("Opened block storage {}", self.path.display());
        self.file = Some(file);
        Ok(())
    }

    fn configuration(&mut self, buffer: &mut [u8; CONFIG_BLOCK_LEN]) -> Result<(), StatusCode> {
        self.file()?;
        // No vendor feature bits: the kernel already exposes the data mode.
        buffer.fill(0);
        Ok(())
    }

    fn mode_sense(&mut self, buffer: &mut [u8; CONFIG_BLOCK_LEN]) -> Result<(), StatusCode> {
        self.file()?;
        buffer.fill(0);
        Ok(())
    }

    fn mode_select(&mut self) -> Result<(), StatusCode> {
        self.file()?;
        Ok(())
    }

    fn read_sectors(
        &mut self,
        start: u32,
        count: u32,
        buffer: &mut [u8],
    ) -> Result<u32, StatusCode> {
        let file = self.file()?;
        let total = count as usize * SECTOR_SIZE;
        let base = start as u64 * SECTOR_SIZE as u64;
        let buffer = buffer.get_mut(..total).ok_or(StatusCode(libc::EINVAL))?;

        let mut filled = 0usize;
        while filled < total {
            match Self::read_at(file, &mut buffer[filled..], base + filled as u64) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(status_of(&e)),
            }
        }

        Ok((filled / SECTOR_SIZE) as u32)
    }

    #[cfg(unix)]
    fn descriptor(&self) -> i32 {
        use std::os::unix::io::AsRawFd;
        self.file.as_ref().map(|f| f.as_raw_fd()).unwrap_or(-1)
    }

    #[cfg(not(unix))]
    fn descriptor(&self) -> i32 {
        if self.file.is_some() {
            0
        } else {
            -1
        }
    }

    fn close(&mut self) -> Result<(), StatusCode> {
        match self.file.take() {
            Some(_) => {
                debug!("Closed block storage {}", self.path.display());
                Ok(())
            }
            None => Err(StatusCode(libc::EBADF)),
        }
    }
}

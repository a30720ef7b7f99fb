//! Block device geometry queries

use std::fs::{File, Metadata};
use std::io;
use std::path::Path;

#[cfg(target_os = "linux")]
pub fn block_device_size(file: &File) -> io::Result<u64> {
    use std::os::unix::io::AsRawFd;

    const BLKGETSIZE64: libc::c_ulong = 0x80081272;

    let mut size: u64 = 0;
    let result = unsafe { libc::ioctl(file.as_raw_fd(), BLKGETSIZE64, &mut size) };

    if result == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(size)
    }
}

#[cfg(not(target_os = "linux"))]
pub fn block_device_size(_file: &File) -> io::Result<u64> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "Not supported on this platform",
    ))
}

#[cfg(target_os = "linux")]
pub fn logical_sector_size(file: &File) -> io::Result<u32> {
    use std::os::unix::io::AsRawFd;

    const BLKSSZGET: libc::c_ulong = 0x1268;

    let mut size: libc::c_int = 0;
    let result = unsafe { libc::ioctl(file.as_raw_fd(), BLKSSZGET, &mut size) };

    if result == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(size as u32)
    }
}

#[cfg(not(target_os = "linux"))]
pub fn logical_sector_size(_file: &File) -> io::Result<u32> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "Not supported on this platform",
    ))
}

#[cfg(unix)]
pub fn is_device_node(metadata: &Metadata) -> bool {
    use std::os::unix::fs::FileTypeExt;

    let file_type = metadata.file_type();
    file_type.is_block_device() || file_type.is_char_device()
}

#[cfg(not(unix))]
pub fn is_device_node(_metadata: &Metadata) -> bool {
    false
}

/// Whether `path` names a device node. Only stats the path.
pub fn path_is_device(path: impl AsRef<Path>) -> bool {
    std::fs::metadata(path)
        .map(|m| is_device_node(&m))
        .unwrap_or(false)
}

//! `ByteStream` for files and block device nodes opened as files

use super::ioctl;
use crate::domain::repositories::ByteStream;
use std::fs::File;
use std::io;

impl ByteStream for File {
    fn byte_len(&self) -> io::Result<u64> {
        let metadata = self.metadata()?;

        // Device nodes report zero length through fstat
        if metadata.len() == 0 && ioctl::is_device_node(&metadata) {
            return ioctl::block_device_size(self);
        }

        Ok(metadata.len())
    }

    fn close(self) -> io::Result<()> {
        close_file(self)
    }
}

#[cfg(unix)]
fn close_file(file: File) -> io::Result<()> {
    use std::os::unix::io::IntoRawFd;

    let fd = file.into_raw_fd();
    let result = unsafe { libc::close(fd) };

    if result == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

#[cfg(not(unix))]
fn close_file(file: File) -> io::Result<()> {
    drop(file);
    Ok(())
}

/// Hints the kernel that `file` will be read front to back. Best effort.
pub fn advise_sequential(file: &File) {
    #[cfg(target_os = "linux")]
    {
        use rustix::fs::{fadvise, Advice};

        let _ = fadvise(file, 0, None, Advice::Sequential);
    }

    #[cfg(not(target_os = "linux"))]
    let _ = file;
}

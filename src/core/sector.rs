//! Sector address space.
//!
//! Every public offset and count is expressed in whole logical sectors of
//! [`SECTOR_SIZE`] bytes. Byte offsets only exist inside the backends.

/// Logical sector size of the medium, in bytes.
pub const SECTOR_SIZE: usize = 2048;

/// Byte offset of the first byte of `sector`.
#[inline]
pub fn sector_offset(sector: u32) -> u64 {
    sector as u64 * SECTOR_SIZE as u64
}

/// Number of bytes occupied by `count` sectors.
#[inline]
pub fn sectors_to_bytes(count: u32) -> usize {
    count as usize * SECTOR_SIZE
}

/// Number of whole sectors contained in `bytes`.
#[inline]
pub fn whole_sectors(bytes: usize) -> u32 {
    (bytes / SECTOR_SIZE) as u32
}

/// Bytes past the last whole sector boundary.
#[inline]
pub fn partial_tail(bytes: usize) -> usize {
    bytes % SECTOR_SIZE
}

/// Checks that `buffer_len` can hold `count` sectors.
pub fn check_buffer(count: u32, buffer_len: usize) -> crate::core::Result<()> {
    let expected = sectors_to_bytes(count);
    if buffer_len < expected {
        return Err(crate::core::InputError::InvalidBufferSize {
            expected,
            actual: buffer_len,
        });
    }
    Ok(())
}

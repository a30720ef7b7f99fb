//! Sector input trait
//!
//! The operation set every opened medium exposes, whatever backend serves it.

use crate::core::Result;

/// An opened medium addressed in whole logical sectors.
///
/// Implementations are blocking and not reentrant: every method takes the
/// handle mutably or by value, so concurrent use of one handle needs an
/// external lock around each call.
///
/// # Example
///
/// ```ignore
/// let mut handle = driver.open("disc.iso")?;
/// let mut buffer = vec![0u8; 4 * SECTOR_SIZE];
/// let delivered = handle.read_sectors(16, 4, &mut buffer)?;
/// handle.decrypt(&mut buffer, delivered)?;
/// handle.close()?;
/// ```
pub trait SectorInput {
    /// Reads `count` sectors starting at `start` into the front of `buffer`.
    ///
    /// # Returns
    ///
    /// The number of whole sectors delivered. `Ok(0)` covers both a failed
    /// seek and an exhausted medium; [`SectorInput::last_error`] tells them
    /// apart. An `Err` means the underlying read failed and the stream
    /// position is unspecified.
    fn read_sectors(&mut self, start: u32, count: u32, buffer: &mut [u8]) -> Result<u32>;

    /// Message describing the most recent read failure, if any.
    fn last_error(&self) -> Option<&str>;

    /// Establishes access to protected content. Unprotected media succeed
    /// without doing anything.
    fn authenticate(&mut self) -> Result<()> {
        Ok(())
    }

    /// Decrypts `block_count` sectors of `buffer` in place. Unprotected media
    /// leave the buffer untouched.
    fn decrypt(&mut self, _buffer: &mut [u8], _block_count: u32) -> Result<()> {
        Ok(())
    }

    /// Whether reads return ciphertext that needs [`SectorInput::decrypt`].
    fn is_protected(&self) -> bool {
        false
    }

    /// Number of sectors on the medium, or 0 when it cannot be determined.
    fn total_sectors(&self) -> u32;

    /// Releases the handle and everything it acquired.
    fn close(self) -> Result<()>
    where
        Self: Sized;
}

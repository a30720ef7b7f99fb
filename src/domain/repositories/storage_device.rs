//! Storage device trait
//!
//! Boundary to a raw storage driver: geometry queries, vendor configuration
//! commands and sector-granular reads. The backend only interprets the
//! returned sector size and the configuration bits it needs for mode
//! adaptation.

use crate::core::StatusCode;
use crate::domain::entities::DeviceInfo;

/// Length of the configuration and mode-sense blocks
pub const CONFIG_BLOCK_LEN: usize = 64;

/// Raw storage device driven by the device backend.
pub trait StorageDevice: Send {
    /// Queries geometry. May be called before `open`.
    fn device_info(&mut self) -> Result<DeviceInfo, StatusCode>;

    /// Opens the device for reading.
    fn open(&mut self) -> Result<(), StatusCode>;

    /// Fills `buffer` with the vendor configuration block.
    fn configuration(&mut self, buffer: &mut [u8; CONFIG_BLOCK_LEN]) -> Result<(), StatusCode>;

    /// Fills `buffer` with the current mode page.
    fn mode_sense(&mut self, buffer: &mut [u8; CONFIG_BLOCK_LEN]) -> Result<(), StatusCode>;

    /// Switches the device into its sector-read mode.
    fn mode_select(&mut self) -> Result<(), StatusCode>;

    /// Reads `count` sectors starting at `start` into `buffer`.
    ///
    /// # Returns
    ///
    /// The number of sectors the driver delivered.
    fn read_sectors(&mut self, start: u32, count: u32, buffer: &mut [u8])
        -> Result<u32, StatusCode>;

    /// Identifier the security module binds its key exchange to.
    fn descriptor(&self) -> i32;

    /// Closes the device.
    fn close(&mut self) -> Result<(), StatusCode>;
}

//! Raw-device sector input
//!
//! Serves sectors through a [`StorageDevice`], optionally gated by a hardware
//! security module. Reads are already sector granular, so no byte accounting
//! happens here; a non-success driver status is reported as zero sectors.

use super::security_session::SecuritySession;
use crate::core::sector::check_buffer;
use crate::core::{InputError, Result, StatusCode, SECTOR_SIZE};
use crate::domain::entities::DeviceInfo;
use crate::domain::repositories::{
    SectorInput, SecurityModule, StorageDevice, CONFIG_BLOCK_LEN,
};
use tracing::{debug, error, info};

/// Mode-sense byte that reports the device needs a mode select
const MODE_SELECT_TRIGGER: (usize, u8) = (11, 2);

fn device_error(operation: &'static str) -> impl Fn(StatusCode) -> InputError {
    move |status| InputError::Device { operation, status }
}

/// Sector input backed by a raw storage device
pub struct DeviceInput {
    storage: Box<dyn StorageDevice>,
    info: DeviceInfo,
    session: Option<SecuritySession>,
    last_error: Option<String>,
    closed: bool,
}

impl DeviceInput {
    /// Opens `storage`, adapts its mode when asked to, and validates its
    /// sector size.
    ///
    /// # Errors
    ///
    /// Any failing driver call, or `SectorSizeMismatch` when the native sector
    /// size differs from [`SECTOR_SIZE`]. The device is closed again before
    /// the error is returned.
    pub fn open(
        mut storage: Box<dyn StorageDevice>,
        security: Option<Box<dyn SecurityModule>>,
        adapt_mode: bool,
    ) -> Result<Self> {
        storage
            .device_info()
            .map_err(device_error("device info query"))?;
        storage.open().map_err(device_error("open"))?;

        let info = match Self::prepare(storage.as_mut(), adapt_mode) {
            Ok(info) => info,
            Err(e) => {
                if let Err(status) = storage.close() {
                    error!("Closing device after failed open ({})", status);
                }
                return Err(e);
            }
        };

        info!(
            "Opened device input: {} sectors of {} bytes{}",
            info.total_sectors,
            info.sector_size,
            if security.is_some() { ", protected" } else { "" }
        );

        Ok(Self {
            storage,
            info,
            session: security.map(SecuritySession::new),
            last_error: None,
            closed: false,
        })
    }

    fn prepare(storage: &mut dyn StorageDevice, adapt_mode: bool) -> Result<DeviceInfo> {
        if adapt_mode {
            Self::adapt_mode(storage)?;
        }

        let info = storage
            .device_info()
            .map_err(device_error("device info query"))?;
        debug!("device_info: {}", hex::encode(info.to_le_bytes()));

        if !info.has_logical_sector_size() {
            error!("Incorrect sector size [{:#x}]", info.sector_size);
            return Err(InputError::SectorSizeMismatch {
                expected: SECTOR_SIZE as u32,
                actual: info.sector_size,
            });
        }

        Ok(info)
    }

    /// Issues mode sense, and mode select if the sense data asks for it, when
    /// the configuration block advertises the feature.
    fn adapt_mode(storage: &mut dyn StorageDevice) -> Result<()> {
        let mut buffer = [0u8; CONFIG_BLOCK_LEN];
        storage
            .configuration(&mut buffer)
            .map_err(device_error("configuration query"))?;
        debug!("config: {}", hex::encode(buffer));

        if buffer[0] & 1 == 0 {
            return Ok(());
        }

        debug!("Executing mode sense");
        storage
            .mode_sense(&mut buffer)
            .map_err(device_error("mode sense"))?;

        let (index, value) = MODE_SELECT_TRIGGER;
        if buffer[index] == value {
            debug!("Executing mode select");
            storage
                .mode_select()
                .map_err(device_error("mode select"))?;
        }

        Ok(())
    }

    pub fn device_info(&self) -> DeviceInfo {
        self.info
    }

    pub fn is_authenticated(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(SecuritySession::is_authenticated)
    }

    /// Tears down the session, then closes the device. Runs at most once.
    fn release(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        if let Some(session) = self.session.as_mut() {
            session.teardown();
        }

        self.storage.close().map_err(|status| {
            error!("Closing device ({})", status);
            InputError::Device {
                operation: "close",
                status,
            }
        })?;

        debug!("Closed device input");
        Ok(())
    }
}

impl SectorInput for DeviceInput {
    fn read_sectors(&mut self, start: u32, count: u32, buffer: &mut [u8]) -> Result<u32> {
        check_buffer(count, buffer.len())?;

        match self.storage.read_sectors(start, count, buffer) {
            Ok(delivered) => {
                self.last_error = None;
                Ok(delivered.min(count))
            }
            Err(status) => {
                debug!("Device read at sector {} failed ({})", start, status);
                self.last_error = Some(format!(
                    "device read of {} sectors at {} failed with status {}",
                    count, start, status
                ));
                Ok(0)
            }
        }
    }

    fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn authenticate(&mut self) -> Result<()> {
        let descriptor = self.storage.descriptor();
        match self.session.as_mut() {
            Some(session) => session.authenticate(descriptor),
            None => Ok(()),
        }
    }

    fn decrypt(&mut self, buffer: &mut [u8], block_count: u32) -> Result<()> {
        match self.session.as_mut() {
            Some(session) => session.decrypt(buffer, block_count),
            None => Ok(()),
        }
    }

    fn is_protected(&self) -> bool {
        self.session.is_some()
    }

    fn total_sectors(&self) -> u32 {
        self.info.total_sectors
    }

    fn close(mut self) -> Result<()> {
        self.release()
    }
}

impl Drop for DeviceInput {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            error!("Releasing device input: {}", e);
        }
    }
}

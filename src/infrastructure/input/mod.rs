//! Sector input backends

mod device_input;
mod file_input;
mod security_session;

pub use device_input::DeviceInput;
pub use file_input::FileInput;
pub use security_session::{SecuritySession, SessionState};

use crate::core::Result;
use crate::domain::entities::{BackendKind, DeviceInfo};
use crate::domain::repositories::SectorInput;

/// An opened input, dispatching to whichever backend served the open
pub enum InputHandle {
    File(FileInput),
    Device(DeviceInput),
}

impl InputHandle {
    pub fn backend(&self) -> BackendKind {
        match self {
            InputHandle::File(_) => BackendKind::File,
            InputHandle::Device(_) => BackendKind::Device,
        }
    }

    /// Geometry reported by the device, for device-backed handles
    pub fn device_info(&self) -> Option<DeviceInfo> {
        match self {
            InputHandle::File(_) => None,
            InputHandle::Device(i) => Some(i.device_info()),
        }
    }
}

impl SectorInput for InputHandle {
    fn read_sectors(&mut self, start: u32, count: u32, buffer: &mut [u8]) -> Result<u32> {
        match self {
            InputHandle::File(i) => i.read_sectors(start, count, buffer),
            InputHandle::Device(i) => i.read_sectors(start, count, buffer),
        }
    }

    fn last_error(&self) -> Option<&str> {
        match self {
            InputHandle::File(i) => i.last_error(),
            InputHandle::Device(i) => i.last_error(),
        }
    }

    fn authenticate(&mut self) -> Result<()> {
        match self {
            InputHandle::File(i) => i.authenticate(),
            InputHandle::Device(i) => i.authenticate(),
        }
    }

    fn decrypt(&mut self, buffer: &mut [u8], block_count: u32) -> Result<()> {
        match self {
            InputHandle::File(i) => i.decrypt(buffer, block_count),
            InputHandle::Device(i) => i.decrypt(buffer, block_count),
        }
    }

    fn is_protected(&self) -> bool {
        match self {
            InputHandle::File(i) => i.is_protected(),
            InputHandle::Device(i) => i.is_protected(),
        }
    }

    #[inline]
    fn total_sectors(&self) -> u32 {
        match self {
            InputHandle::File(i) => i.total_sectors(),
            InputHandle::Device(i) => i.total_sectors(),
        }
    }

    fn close(self) -> Result<()> {
        match self {
            InputHandle::File(i) => i.close(),
            InputHandle::Device(i) => i.close(),
        }
    }
}

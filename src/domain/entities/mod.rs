//! Domain entities

mod device_info;

pub use device_info::{DeviceInfo, BackendKind};

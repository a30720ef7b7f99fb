//! Sector input for optical-disc media.
//!
//! A uniform open / read / authenticate / decrypt / size / close operation
//! set over disc images, raw devices and hardware-gated devices, addressed in
//! whole 2048-byte logical sectors.

pub mod application;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod logging;
pub mod presentation;

pub use application::dto::InputOptions;
pub use application::{InputDriver, ReadSummary, SectorReader};
pub use crate::core::{InputError, Result, SECTOR_SIZE};
pub use domain::entities::{BackendKind, DeviceInfo};
pub use domain::repositories::{ByteStream, SectorInput, SecurityModule, StorageDevice};
pub use infrastructure::input::{DeviceInput, FileInput, InputHandle};

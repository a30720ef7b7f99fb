//! Repository traits (interfaces)
//!
//! Contracts for the backends and for the external collaborators they drive.
//! Tests substitute in-memory implementations for all of them.

mod byte_stream;
mod sector_input;
mod security_module;
mod storage_device;

pub use byte_stream::ByteStream;
pub use sector_input::SectorInput;
pub use security_module::{SecurityModule, MAX_DECRYPT_SECTORS};
pub use storage_device::{StorageDevice, CONFIG_BLOCK_LEN};

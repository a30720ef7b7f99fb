//! Application layer
//!
//! Backend selection and the services built on top of an opened input.

mod driver;
pub mod dto;
mod sector_reader;

pub use driver::{InputDriver, SecurityModuleFactory, StorageFactory};
pub use sector_reader::{ReadSummary, SectorReader, DEFAULT_BATCH_SECTORS};

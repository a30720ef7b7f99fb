//! Storage adapters and platform queries

mod block_storage;
mod file_stream;
pub mod ioctl;

pub use block_storage::BlockStorage;
pub use file_stream::advise_sequential;

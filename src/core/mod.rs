//! Core definitions shared by every layer: the error taxonomy and the
//! sector address space.

mod error;
pub mod sector;

pub use error::{InputError, Result, SessionStage, StatusCode};
pub use sector::SECTOR_SIZE;
